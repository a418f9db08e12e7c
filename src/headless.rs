// Headless reveal - the typing effect on a plain terminal
//
// Status phrases go to stderr while the request is in flight. Once the
// script arrives it is written to stdout as it is revealed, or, with
// `--html`, printed as markup when the reveal completes.

use adscript::config::Config;
use adscript::generation::Source;
use adscript::reveal::RevealEvent;
use adscript::session::{Session, SessionState};
use adscript::{render, Document};
use anyhow::{bail, Context, Result};
use std::io::Write;

pub async fn run(config: &Config, source: Source, html: bool) -> Result<()> {
    let (mut session, mut events) = Session::new(&config.reveal);
    session.on_request();
    tracing::info!(source = source.label(), "Headless reveal started");

    let fetch = source.fetch();
    tokio::pin!(fetch);

    let mut stdout = std::io::stdout().lock();
    let mut document: Option<Document> = None;
    // Byte length of the text already written to stdout
    let mut written = 0;

    loop {
        tokio::select! {
            result = &mut fetch, if session.state() == SessionState::AwaitingContent => {
                match result {
                    Ok(generated) => {
                        if let Some(warning) = &generated.warning {
                            eprintln!("Warning: {}", warning.message());
                        }
                        document = Some(generated.document.clone());
                        session.on_content(generated.document);
                    }
                    Err(e) => {
                        session.on_failure();
                        return Err(e).context("Generation failed");
                    }
                }
            }
            Some(event) = events.recv() => {
                if !session.accepts(&event) {
                    continue;
                }
                match event {
                    RevealEvent::Status(phrase) => eprintln!("{phrase}"),
                    RevealEvent::Frame(frame) if !html => {
                        if let Some(doc) = &document {
                            let visible = doc.prefix(frame.revealed);
                            stdout.write_all(visible[written..].as_bytes())?;
                            stdout.flush()?;
                            written = visible.len();
                        }
                    }
                    RevealEvent::Frame(_) => {}
                    RevealEvent::Completed { run, total } => {
                        if session.on_reveal_complete(run) {
                            tracing::debug!(total, "Headless reveal complete");
                            break;
                        }
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                session.cancel();
                bail!("Interrupted");
            }
        }
    }

    let doc = session
        .document()
        .context("Reveal finished without a document")?;
    if html {
        stdout.write_all(render(doc.as_str()).as_bytes())?;
    } else if !doc.as_str().ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;
    Ok(())
}
