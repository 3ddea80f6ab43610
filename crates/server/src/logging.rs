//! Subscriber setup for the server binary.
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::ServerConfig;

pub const LOG_FILE_NAME: &str = "totem-server.log";

/// Installs the global subscriber: stderr and/or a non-blocking file writer,
/// filtered by `RUST_LOG` (default `info`).
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// whole run.
pub fn setup_logging(config: &ServerConfig) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = config
        .log_stderr
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    let (file_layer, guard) = if config.log_file {
        let dir = config.log_dir.clone().unwrap_or_else(log_directory);
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create log directory {}", dir.display()))?;

        let appender = tracing_appender::rolling::never(&dir, LOG_FILE_NAME);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false);
        (Some(layer), Some((guard, dir)))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(guard.map(|(guard, dir)| {
        tracing::info!("Log file: {}", dir.join(LOG_FILE_NAME).display());
        guard
    }))
}

/// Platform cache directory for logs, e.g. `~/.cache/totem-guard/logs` on Linux.
pub fn log_directory() -> PathBuf {
    directories::ProjectDirs::from("", "", "totem-guard")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| std::env::temp_dir().join("totem-guard"))
        .join("logs")
}
