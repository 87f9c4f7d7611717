use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{Builder, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{AppError, AppResult};

/// Used when RUST_LOG is unset; connection-level crates only report warnings
pub const DEFAULT_LOG_DIRECTIVES: &str = "info,hyper=warn,hyper_util=warn,reqwest=warn,rustls=warn";

/// Days of `service.*.log` files kept next to the binary
pub const LOG_RETENTION_DAYS: usize = 14;

pub fn get_log_dir(base_dir: &Path) -> AppResult<PathBuf> {
    let log_dir = base_dir.join("logs");

    if !log_dir.exists() {
        fs::create_dir_all(&log_dir)?;
    }

    Ok(log_dir)
}

/// Keeps the background file writer alive; drop it last so buffered lines are flushed
#[must_use = "dropping the guard stops file logging"]
pub struct LoggerGuard {
    _file: WorkerGuard,
}

fn build_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVES))
}

/// Console plus daily rolling file output under `<base_dir>/logs`
pub fn init_logger(base_dir: &Path) -> AppResult<LoggerGuard> {
    // Bridge `log` records from dependencies
    let _ = tracing_log::LogTracer::init();

    let log_dir = get_log_dir(base_dir)?;
    let file_appender = Builder::new()
        .rotation(Rotation::DAILY)
        .filename_prefix("service")
        .filename_suffix("log")
        .max_log_files(LOG_RETENTION_DAYS)
        .build(&log_dir)
        .map_err(|e| AppError::Config(format!("Failed to open log file in {}: {}", log_dir.display(), e)))?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = fmt::Layer::new().with_target(false).with_level(true);

    // Files get targets, consoles stay short
    let file_layer = fmt::Layer::new()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_level(true);

    if tracing_subscriber::registry()
        .with(build_filter())
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .is_err()
    {
        tracing::debug!("Global subscriber already installed, keeping it");
    }

    info!("Logging to {} (keeping {} days)", log_dir.display(), LOG_RETENTION_DAYS);
    Ok(LoggerGuard { _file: guard })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_dir_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = get_log_dir(dir.path()).unwrap();
        assert!(log_dir.is_dir());
        assert_eq!(log_dir, dir.path().join("logs"));
    }

    #[test]
    fn test_unusable_base_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        fs::write(&blocker, "file").unwrap();

        assert!(matches!(init_logger(&blocker), Err(AppError::Io(_))));
    }

    #[test]
    fn test_default_directives_parse() {
        assert!(EnvFilter::try_new(DEFAULT_LOG_DIRECTIVES).is_ok());
    }
}
