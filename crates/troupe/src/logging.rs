use anyhow::{Context as _, Result};
use std::fs::{self, File};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{LogOutput, LoggingConfig};

/// Default log file when file output is requested without a path.
const DEFAULT_LOG_FILE: &str = "logs/troupe.log";

/// Installs the global tracing subscriber described by `config`.
///
/// Fails if a global subscriber is already installed.
pub fn setup_global_logging(config: &LoggingConfig) -> Result<()> {
    // Format: info,troupe=debug
    let filter = format!("{},troupe={}", config.level, config.level);

    match config.output {
        LogOutput::Stdout => {
            let stdout_layer = fmt::layer()
                .with_writer(std::io::stdout)
                .with_thread_ids(true)
                .with_line_number(true)
                .with_file(true)
                .with_target(true)
                .with_ansi(true)
                .with_filter(EnvFilter::builder().parse(&filter)?);

            tracing_subscriber::registry()
                .with(stdout_layer)
                .try_init()
                .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;
        }
        LogOutput::File => {
            let log_path = config
                .file_path
                .clone()
                .unwrap_or_else(|| DEFAULT_LOG_FILE.into());

            // Ensure parent directory exists
            if let Some(parent) = log_path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
            }

            let file = File::create(&log_path)
                .with_context(|| format!("Failed to create log file {}", log_path.display()))?;
            let file_writer = std::sync::Mutex::new(file);

            let file_layer = fmt::layer()
                .with_writer(file_writer)
                .with_thread_ids(true)
                .with_line_number(true)
                .with_file(true)
                .with_target(true)
                .with_ansi(false)
                .with_filter(EnvFilter::builder().parse(&filter)?);

            tracing_subscriber::registry()
                .with(file_layer)
                .try_init()
                .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;
        }
    }

    Ok(())
}
