use std::fs::{self, OpenOptions};
use std::io;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::constants::LOG_FILE;

/// Route tracing output to the log file. The terminal belongs to the UI.
///
/// `RUST_LOG` wins over the configured level. Keep the guard alive until
/// exit or buffered lines are lost.
pub fn init(config: &AppConfig) -> io::Result<WorkerGuard> {
    fs::create_dir_all(&config.log_dir)?;
    let file = OpenOptions::new().create(true).append(true).open(config.log_dir.join(LOG_FILE))?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level).map_err(io::Error::other)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_names(true)
        .try_init()
        .map_err(io::Error::other)?;

    Ok(guard)
}
