//! Shared observability helpers for binaries and integration tests.
//!
//! [`init_logging`] installs the global `tracing` subscriber once per
//! process: a daily-rolling file sink plus an optional stderr mirror, with
//! `RUST_LOG` taking precedence over the configured default filter. Repeat
//! calls are no-ops that hand back the originally resolved log path.

use std::path::PathBuf;
use std::sync::OnceLock;

use anyhow::Context;
use chrono::Local;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();
static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Output encoding for structured logs.
#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Text,
    Json,
}

/// Configuration passed to [`init_logging`].
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Logical name of the component; names the log file.
    pub component: &'static str,
    /// Explicit log directory. Falls back to `TILLER_LOG_DIR`, then the
    /// platform data dir (e.g. `~/.local/share/tiller`).
    pub directory: Option<PathBuf>,
    /// Mirror events to stderr in addition to the file sink.
    pub stderr: bool,
    pub format: LogFormat,
    /// Filter used when `RUST_LOG` is unset.
    pub default_filter: &'static str,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            component: "tiller",
            directory: None,
            stderr: false,
            format: LogFormat::Text,
            default_filter: "info",
        }
    }
}

/// Install the global subscriber and return the current log file path.
pub fn init_logging(config: LogConfig) -> anyhow::Result<PathBuf> {
    if let Some(path) = LOG_PATH.get() {
        return Ok(path.clone());
    }

    let dir = log_dir(&config);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create log directory: {}", dir.display()))?;

    let file_name = format!("{}.log", config.component);
    let appender = rolling::daily(&dir, &file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = LOG_GUARD.set(guard);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_filter));

    // Option<Layer> is itself a Layer, which spares us a format × stderr
    // match arm explosion.
    match config.format {
        LogFormat::Text => {
            let mirror = config
                .stderr
                .then(|| fmt::layer().with_writer(std::io::stderr));
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .with(mirror)
                .try_init()
                .map_err(|e| anyhow::anyhow!("tracing setup failed: {e}"))?;
        }
        LogFormat::Json => {
            let mirror = config
                .stderr
                .then(|| fmt::layer().json().with_writer(std::io::stderr));
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(writer))
                .with(mirror)
                .try_init()
                .map_err(|e| anyhow::anyhow!("tracing setup failed: {e}"))?;
        }
    }

    let today = Local::now().format("%Y-%m-%d").to_string();
    let path = dir.join(format!("{}.log.{}", config.component, today));
    let _ = LOG_PATH.set(path.clone());
    Ok(path)
}

fn log_dir(config: &LogConfig) -> PathBuf {
    if let Some(dir) = &config.directory {
        return dir.clone();
    }
    if let Ok(dir) = std::env::var("TILLER_LOG_DIR") {
        return PathBuf::from(dir);
    }
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(config.component)
}
