// CLI module - command-line argument parsing and one-shot handlers
//
// Subcommands:
// - reveal (default): generate or load a script and reveal it (TUI or headless)
// - render: print the markup for a script
// - copy: put a script on the clipboard (plain text or markdown)
// - export: write the word-processor document
// - config --show | --path | --reset

use adscript::config::{Config, VERSION};
use adscript::export::{self, DownloadSink, FileSink, SystemClipboard};
use adscript::generation::{Brief, GenerationError, HttpSource, Source};
use adscript::render;
use adscript::Document;
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;

/// adscript - generate, reveal and export ad scripts
#[derive(Parser)]
#[command(name = "adscript")]
#[command(version = VERSION)]
#[command(about = "Generate, reveal and export ad scripts", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate (or load) a script and reveal it
    Reveal(RevealArgs),

    /// Print the rendered markup of a script
    Render {
        /// Markdown file (stdin when omitted)
        file: Option<PathBuf>,
    },

    /// Copy a script to the clipboard
    Copy {
        /// Markdown file (stdin when omitted)
        file: Option<PathBuf>,

        /// Copy the raw markdown instead of plain text
        #[arg(long)]
        markdown: bool,
    },

    /// Export a script as a word-processor document
    Export {
        /// Markdown file (stdin when omitted)
        file: Option<PathBuf>,

        /// Output directory (defaults to export_dir from config)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,

        /// Reset config file to defaults
        #[arg(long)]
        reset: bool,
    },
}

/// Where the script comes from and how to show it
#[derive(Args, Debug, Default, Clone)]
pub struct RevealArgs {
    /// Reveal an existing markdown file ("-" for stdin)
    #[arg(long, conflicts_with_all = ["prompt", "demo"])]
    pub file: Option<PathBuf>,

    /// Brief sent to the generation backend
    #[arg(long, short)]
    pub prompt: Option<String>,

    /// Industry of the advertised product
    #[arg(long)]
    pub industry: Option<String>,

    /// Tone of voice (repeatable)
    #[arg(long = "tone")]
    pub tones: Vec<String>,

    /// Product or brand name
    #[arg(long)]
    pub product: Option<String>,

    /// Regional dialect ("standard" for none)
    #[arg(long)]
    pub dialect: Option<String>,

    /// Use the bundled sample instead of the backend
    #[arg(long)]
    pub demo: bool,

    /// No TUI: status lines to stderr, script to stdout
    #[arg(long)]
    pub headless: bool,

    /// Headless only: print the final markup instead of the raw text
    #[arg(long, requires = "headless")]
    pub html: bool,
}

impl RevealArgs {
    /// Brief built from the flags; the prompt may still be empty
    pub fn brief(&self) -> Brief {
        Brief {
            prompt: self.prompt.clone().unwrap_or_default(),
            product_name: self.product.clone(),
            industry: self.industry.clone(),
            tones: self.tones.clone(),
            dialect: self.dialect.clone(),
        }
    }

    /// Resolve the source the flags point at
    ///
    /// `None` means nothing was chosen up front; the TUI then asks for a
    /// prompt.
    pub fn source(&self, config: &Config) -> Result<Option<Source>, GenerationError> {
        if self.demo || config.demo_mode {
            return Ok(Some(Source::Demo(config.reveal.demo_delay())));
        }
        if let Some(path) = &self.file {
            return Ok(Some(input_source(Some(path.clone()))));
        }
        if self.prompt.is_some() {
            let client = HttpSource::new(&config.api_url, &config.generation)?;
            return Ok(Some(Source::Http(client, self.brief())));
        }
        Ok(None)
    }
}

/// File argument to source; stdin when absent or "-"
fn input_source(file: Option<PathBuf>) -> Source {
    match file {
        Some(path) if path.as_os_str() != "-" => Source::File(path),
        _ => Source::Stdin,
    }
}

async fn read_document(file: Option<PathBuf>) -> Result<Document> {
    let generated = input_source(file)
        .fetch()
        .await
        .context("Failed to read script")?;
    Ok(generated.document)
}

/// `adscript render`
pub async fn handle_render(file: Option<PathBuf>) -> Result<()> {
    let doc = read_document(file).await?;
    print!("{}", render(doc.as_str()));
    std::io::stdout().flush().context("Failed to write output")?;
    Ok(())
}

/// `adscript copy`
pub async fn handle_copy(file: Option<PathBuf>, markdown: bool) -> Result<()> {
    let doc = read_document(file).await?;
    let mut clipboard = SystemClipboard;
    if markdown {
        export::copy_markdown(&doc, &mut clipboard)?;
        eprintln!("Copied as Markdown!");
    } else {
        export::copy_plain(&doc, &mut clipboard)?;
        eprintln!("Copied to clipboard!");
    }
    Ok(())
}

/// `adscript export`
pub async fn handle_export(config: &Config, file: Option<PathBuf>, out: Option<PathBuf>) -> Result<()> {
    let doc = read_document(file).await?;
    let download = export::word_document(&doc, &config.export);
    let mut sink = FileSink::new(out.unwrap_or_else(|| config.export_dir.clone()));
    let path = sink.deliver(&download)?;
    println!("{}", path.display());
    Ok(())
}

/// `adscript config`
///
/// Runs before the config is loaded so `--reset` can repair a broken file.
pub fn handle_config(show: bool, path: bool, reset: bool) -> Result<()> {
    if path {
        handle_config_path()
    } else if show {
        handle_config_show()
    } else if reset {
        handle_config_reset()
    } else {
        // No flag provided, show help
        println!("Usage: adscript config [--show|--path|--reset]");
        println!();
        println!("Options:");
        println!("  --show    Display effective configuration");
        println!("  --path    Show config file path");
        println!("  --reset   Reset config file to defaults");
        Ok(())
    }
}

fn handle_config_path() -> Result<()> {
    let path = Config::config_path().context("Could not determine config path")?;
    println!("{}", path.display());
    Ok(())
}

fn handle_config_show() -> Result<()> {
    let config = Config::load()?;

    println!("# Effective configuration (env > file > defaults)");
    println!();
    print!("{}", config.to_toml());

    // Show source info
    println!();
    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("# Source: {}", path.display());
        } else {
            println!("# Source: defaults (no config file)");
        }
    }
    Ok(())
}

fn handle_config_reset() -> Result<()> {
    let path = Config::config_path().context("Could not determine config path")?;

    // Confirm if file exists
    if path.exists() {
        eprint!(
            "Config file exists at {}. Overwrite? [y/N] ",
            path.display()
        );
        std::io::stderr().flush()?;

        let mut input = String::new();
        std::io::stdin()
            .read_line(&mut input)
            .context("Failed to read answer")?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    Config::write_template(&path)?;
    println!("Config reset to defaults: {}", path.display());
    Ok(())
}

/// Headless reveal needs something to reveal
pub fn require_source(source: Option<Source>) -> Result<Source> {
    match source {
        Some(source) => Ok(source),
        None if stdin_is_terminal() => {
            bail!("Nothing to reveal: pass --prompt, --file or --demo, or pipe a script on stdin")
        }
        None => Ok(Source::Stdin),
    }
}

/// Whether stdin is an interactive terminal
fn stdin_is_terminal() -> bool {
    use std::io::IsTerminal;
    std::io::stdin().is_terminal()
}
