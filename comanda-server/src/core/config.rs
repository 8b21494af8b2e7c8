use std::path::PathBuf;
use std::time::Duration;

use chrono_tz::Tz;

/// Server configuration
///
/// # Environment variables
///
/// Every field can be overridden from the environment:
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | /var/lib/comanda | Working directory (database, logs) |
/// | HTTP_PORT | 3000 | HTTP API port |
/// | ENVIRONMENT | development | Runtime environment |
/// | LOG_LEVEL | info | Default log filter (RUST_LOG wins) |
/// | LOG_JSON | false | JSON log lines |
/// | TIMEZONE | Europe/Madrid | Timezone printed on tickets |
/// | TICKET_WIDTH | 48 | Ticket width in characters |
/// | PRINT_TIMEOUT_MS | 10000 | Delivery budget (connect + write) |
/// | PROBE_TIMEOUT_MS | 3000 | Liveness probe budget |
/// | LIVENESS_INTERVAL_SECS | 300 | Liveness sweep period |
/// | RETRY_INTERVAL_SECS | 120 | Retry sweep period |
/// | STARTUP_PROBE_DELAY_SECS | 10 | Delay before the first liveness sweep |
/// | MAX_TICKET_RETRIES | 5 | Scheduled retry cap per ticket |
/// | RETRY_WINDOW_MINUTES | 60 | Only tickets failed within this window are retried |
/// | DEVICE_CHECK_INTERVAL_MS | 5000 | Polling interval handed to devices |
///
/// # Example
///
/// ```ignore
/// WORK_DIR=/data/comanda HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory (database and logs)
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// Runtime environment: development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_json: bool,
    /// Timezone used to print order times
    pub timezone: Tz,
    pub ticket_width: usize,
    pub print_timeout_ms: u64,
    pub probe_timeout_ms: u64,
    pub liveness_interval_secs: u64,
    pub retry_interval_secs: u64,
    pub startup_probe_delay_secs: u64,
    pub max_ticket_retries: u32,
    pub retry_window_minutes: i64,
    pub device_check_interval_ms: u64,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from the environment
    ///
    /// Unset or unparsable variables fall back to defaults.
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/comanda".into()),
            http_port: env_or("HTTP_PORT", 3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: env_or("LOG_JSON", false),
            timezone: env_or("TIMEZONE", chrono_tz::Europe::Madrid),
            ticket_width: env_or("TICKET_WIDTH", 48),
            print_timeout_ms: env_or("PRINT_TIMEOUT_MS", 10_000),
            probe_timeout_ms: env_or("PROBE_TIMEOUT_MS", 3_000),
            liveness_interval_secs: env_or("LIVENESS_INTERVAL_SECS", 300),
            retry_interval_secs: env_or("RETRY_INTERVAL_SECS", 120),
            startup_probe_delay_secs: env_or("STARTUP_PROBE_DELAY_SECS", 10),
            max_ticket_retries: env_or("MAX_TICKET_RETRIES", 5),
            retry_window_minutes: env_or("RETRY_WINDOW_MINUTES", 60),
            device_check_interval_ms: env_or("DEVICE_CHECK_INTERVAL_MS", 5_000),
        }
    }

    /// Override the working directory and port
    ///
    /// Mostly used by tests
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    pub fn logs_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// Create the working directory layout
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }

    pub fn print_timeout(&self) -> Duration {
        Duration::from_millis(self.print_timeout_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn liveness_interval(&self) -> Duration {
        Duration::from_secs(self.liveness_interval_secs.max(1))
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.retry_interval_secs.max(1))
    }

    pub fn startup_probe_delay(&self) -> Duration {
        Duration::from_secs(self.startup_probe_delay_secs)
    }

    /// Retry window in milliseconds
    pub fn retry_window_ms(&self) -> i64 {
        self.retry_window_minutes * 60 * 1000
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
