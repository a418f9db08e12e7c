// adscript - streaming ad-script viewer
//
// Generates an advertising script (or loads one), then reveals it a few
// characters at a time as if it were being typed live.
//
// Architecture:
// - Generation source: backend client, file, stdin or bundled demo script
// - Session: state machine owning the phrase timer or the reveal timer
// - TUI (ratatui): renders each frame, handles copy/export keys
// - Headless: the same session driven from a plain terminal
// - Event system: mpsc channels connect timers and the front end

mod cli;
mod headless;
mod tui;

use adscript::config::Config;
use adscript::logging::{self, LogBuffer};
use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands, RevealArgs};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config commands run before loading so a broken file can be reset
    if let Some(Commands::Config { show, path, reset }) = cli.command {
        return cli::handle_config(show, path, reset);
    }

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("╭─ Configuration error ─────────────────────────────");
            eprintln!("│ {:#}", e);
            eprintln!("│");
            eprintln!("│ Fix the file, or run `adscript config --reset`");
            eprintln!("╰───────────────────────────────────────────────────");
            std::process::exit(1);
        }
    };

    let command = cli.command.unwrap_or(Commands::Reveal(RevealArgs::default()));

    // Only an interactive reveal owns the terminal; everything else logs to stderr
    let use_tui = matches!(&command, Commands::Reveal(args) if !args.headless) && config.enable_tui;

    // Create log buffer for TUI mode
    // In TUI mode: capture logs to buffer (prevents garbling the display)
    // Otherwise: output logs to stderr
    let log_buffer = LogBuffer::new();
    let _file_guard = logging::init(&config.logging, use_tui.then(|| log_buffer.clone()));

    match command {
        Commands::Reveal(args) => {
            let source = args.source(&config)?;
            if use_tui {
                tracing::info!("Starting TUI");
                tui::run_tui(config, log_buffer, source, args.brief()).await?;
            } else {
                tracing::info!("TUI disabled, running in headless mode");
                let source = cli::require_source(source)?;
                headless::run(&config, source, args.html).await?;
            }
        }
        Commands::Render { file } => cli::handle_render(file).await?,
        Commands::Copy { file, markdown } => cli::handle_copy(file, markdown).await?,
        Commands::Export { file, out } => cli::handle_export(&config, file, out).await?,
        Commands::Config { show, path, reset } => cli::handle_config(show, path, reset)?,
    }

    tracing::debug!("Shutdown complete");
    Ok(())
}
