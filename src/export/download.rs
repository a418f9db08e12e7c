//! Download sinks
//!
//! `FileSink` writes through a temporary file in the target directory and
//! renames it into place, so readers never see a partial document. The
//! temporary file is removed if any step before the rename fails.

use super::Download;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Somewhere a finished download can be delivered
pub trait DownloadSink {
    /// Deliver the file, returning where it ended up
    fn deliver(&mut self, download: &Download) -> Result<PathBuf>;
}

/// Writes downloads into a directory on disk
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for FileSink {
    fn deliver(&mut self, download: &Download) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;

        let target = self.dir.join(&download.file_name);

        // Same directory as the target, so the final rename stays on one filesystem
        let mut temp = NamedTempFile::new_in(&self.dir)
            .with_context(|| format!("Failed to create temp file in {}", self.dir.display()))?;
        temp.write_all(&download.bytes)
            .context("Failed to write export")?;
        temp.as_file()
            .sync_all()
            .context("Failed to sync export")?;
        // The persist error still owns the temp file; drop it here so it is removed
        temp.persist(&target)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to save {}", target.display()))?;

        tracing::info!(
            path = %target.display(),
            bytes = download.bytes.len(),
            mime = %download.mime_type,
            "Exported script"
        );
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn download(name: &str, body: &str) -> Download {
        Download {
            file_name: name.to_string(),
            mime_type: "application/msword".to_string(),
            bytes: body.as_bytes().to_vec(),
        }
    }

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_deliver_writes_file() {
        let dir = TempDir::new().unwrap();
        let mut sink = FileSink::new(dir.path());

        let path = sink.deliver(&download("a-script.doc", "<html/>")).unwrap();

        assert_eq!(path, dir.path().join("a-script.doc"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<html/>");
        assert_eq!(entries(dir.path()), vec!["a-script.doc"]);
    }

    #[test]
    fn test_deliver_overwrites_previous_export() {
        let dir = TempDir::new().unwrap();
        let mut sink = FileSink::new(dir.path());

        sink.deliver(&download("a-script.doc", "first")).unwrap();
        let path = sink.deliver(&download("a-script.doc", "second")).unwrap();

        assert_eq!(std::fs::read_to_string(path).unwrap(), "second");
        assert_eq!(entries(dir.path()), vec!["a-script.doc"]);
    }

    #[test]
    fn test_deliver_creates_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("exports").join("today");
        let mut sink = FileSink::new(&nested);

        sink.deliver(&download("b-script.doc", "x")).unwrap();
        assert!(nested.join("b-script.doc").exists());
    }

    #[test]
    fn test_failed_persist_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        // A directory where the file should go makes the rename fail
        std::fs::create_dir(dir.path().join("c-script.doc")).unwrap();
        std::fs::write(dir.path().join("c-script.doc").join("keep"), "").unwrap();
        let mut sink = FileSink::new(dir.path());

        let result = sink.deliver(&download("c-script.doc", "x"));

        assert!(result.is_err());
        assert_eq!(entries(dir.path()), vec!["c-script.doc"]);
    }
}
