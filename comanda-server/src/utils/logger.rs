//! Logging Infrastructure
//!
//! Console output plus daily rotating application logs under
//! `{work_dir}/logs/app`. Old files are removed by [`cleanup_old_logs`].

use std::fs;
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

/// Days of application logs kept on disk
pub const LOG_RETENTION_DAYS: i64 = 14;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// `RUST_LOG` wins over the configured level
fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Initialize the logger (console only)
pub fn init_logger(level: &str) -> anyhow::Result<()> {
    init_logger_with_file(level, false, None)
}

/// Initialize the logging system with daily rotating logs
///
/// # Arguments
/// * `level` - Log level (e.g., "info", "debug", "comanda_server=debug")
/// * `json_format` - JSON lines instead of the pretty format
/// * `log_dir` - Optional directory for file logging
pub fn init_logger_with_file(
    level: &str,
    json_format: bool,
    log_dir: Option<&Path>,
) -> anyhow::Result<()> {
    let mut layers: Vec<BoxedLayer> = Vec::new();

    // Console layer
    if json_format {
        layers.push(
            fmt::layer()
                .json()
                .with_target(true)
                .with_current_span(true)
                .with_filter(filter(level))
                .boxed(),
        );
    } else {
        layers.push(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter(level))
                .boxed(),
        );
    }

    if let Some(dir) = log_dir {
        let app_log_dir = dir.join("app");
        fs::create_dir_all(&app_log_dir)?;

        let app_log = RollingFileAppender::new(Rotation::DAILY, app_log_dir, "app");
        let writer = std::sync::Mutex::new(app_log);

        if json_format {
            layers.push(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true)
                    .with_writer(writer)
                    .with_filter(filter(level))
                    .boxed(),
            );
        } else {
            layers.push(
                fmt::layer()
                    .with_target(true)
                    .with_ansi(false)
                    .with_writer(writer)
                    .with_filter(filter(level))
                    .boxed(),
            );
        }
    }

    tracing_subscriber::registry().with(layers).try_init()?;
    Ok(())
}

/// Remove application log files older than [`LOG_RETENTION_DAYS`]
///
/// Files are named `app.YYYY-MM-DD` by the daily appender. Returns the number
/// of deleted files.
pub fn cleanup_old_logs(log_dir: &Path) -> anyhow::Result<usize> {
    let app_log_dir = log_dir.join("app");
    if !app_log_dir.exists() {
        return Ok(0);
    }

    let cutoff = chrono::Local::now().date_naive() - chrono::Duration::days(LOG_RETENTION_DAYS);
    let mut deleted = 0;

    for entry in fs::read_dir(app_log_dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(date_part) = name.strip_prefix("app.") else {
            continue;
        };
        if let Ok(date) = chrono::NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
            && date < cutoff
        {
            fs::remove_file(&path)?;
            tracing::info!(file = %name, "Deleted old log file");
            deleted += 1;
        }
    }

    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_old_logs() {
        let dir = tempfile::tempdir().unwrap();
        let app = dir.path().join("app");
        fs::create_dir_all(&app).unwrap();

        let today = chrono::Local::now().date_naive();
        let old = today - chrono::Duration::days(LOG_RETENTION_DAYS + 3);
        fs::write(app.join(format!("app.{}", old.format("%Y-%m-%d"))), "x").unwrap();
        fs::write(app.join(format!("app.{}", today.format("%Y-%m-%d"))), "x").unwrap();
        fs::write(app.join("notes.txt"), "x").unwrap();

        assert_eq!(cleanup_old_logs(dir.path()).unwrap(), 1);
        assert_eq!(fs::read_dir(&app).unwrap().count(), 2);
    }

    #[test]
    fn test_cleanup_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(cleanup_old_logs(&dir.path().join("nope")).unwrap(), 0);
    }
}
