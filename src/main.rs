//! CardioRisk: cardiovascular risk assessment
//!
//! Main entry point for the terminal application.

use anyhow::{Context, Result};
use std::io::IsTerminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cardiorisk::adapters::sanitize::SanitizingMakeWriter;
use cardiorisk::config::AppConfig;
use cardiorisk::tui::App;

const DEFAULT_LOG_FILE: &str = "cardiorisk.log";

fn main() -> Result<()> {
    // Writing logs to the terminal corrupts the TUI (alternate screen), so an
    // interactive session logs to a file and anything else logs to stdout.
    let log_mode = std::env::var("CARDIORISK_LOG_MODE").unwrap_or_else(|_| "auto".to_string());

    let interactive = std::io::stdout().is_terminal();
    let use_file = match log_mode.as_str() {
        "file" => true,
        "stdout" => false,
        // auto
        _ => interactive,
    };

    let (writer, _guard) = if use_file {
        let log_file =
            std::env::var("CARDIORISK_LOG_FILE").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());

        if let Some(parent) = std::path::Path::new(&log_file).parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .with_context(|| format!("Failed to open log file {log_file}"))?;
        tracing_appender::non_blocking(file)
    } else {
        tracing_appender::non_blocking(std::io::stdout())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(SanitizingMakeWriter::new(writer)))
        .init();

    tracing::info!("Starting CardioRisk...");

    let config = AppConfig::load().context("Failed to load configuration")?;

    let mut app = App::new(config)?;
    app.run()?;

    tracing::info!("CardioRisk shutdown complete.");
    Ok(())
}
