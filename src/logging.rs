use anyhow::Result;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

pub const LOG_FILE: &str = "pocketjobs.log";

fn filter_layer(directive: &str) -> EnvFilter {
    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Logs to stderr, for one-shot commands.
pub fn init_stderr(directive: &str) {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).without_time().with_target(false))
        .with(filter_layer(directive))
        .init();
}

/// Logs to a file in `dir`, for the interactive browser where stderr belongs to the terminal.
/// Keep the guard alive until exit so buffered lines are flushed.
pub fn init_file(directive: &str, dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(dir)?;
    let file_appender = tracing_appender::rolling::never(dir, LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .with(filter_layer(directive))
        .init();
    Ok(guard)
}
