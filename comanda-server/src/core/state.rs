use std::path::PathBuf;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::core::{Config, Result};
use crate::printing::{
    DeviceHealthMonitor, Dispatcher, MonitorSettings, PrintStorage, TicketRenderer, ZoneRouter,
};
use crate::services::{CatalogService, DeviceRegistry, TicketService, ZoneRegistry};
use crate::utils::logger::cleanup_old_logs;

/// Database file inside `work_dir/database`
const DATABASE_FILE: &str = "comanda.redb";

/// Period of the rotated log cleanup
const LOG_CLEANUP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Server state - shared handles to every service
///
/// Every field is cheap to clone (`Arc` inside).
///
/// | Field | Role |
/// |-------|------|
/// | config | immutable configuration |
/// | storage | redb storage |
/// | catalog | business directory |
/// | zones | zone administration |
/// | tickets | ticket listings and overrides |
/// | devices | device registration and status |
/// | router | order intake, one ticket per zone |
/// | monitor | liveness and retry sweeps |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub storage: PrintStorage,
    pub catalog: CatalogService,
    pub zones: ZoneRegistry,
    pub tickets: TicketService,
    pub devices: DeviceRegistry,
    pub router: ZoneRouter,
    pub monitor: DeviceHealthMonitor,
}

impl ServerState {
    /// Wire every service on top of an opened storage
    pub fn new(config: Config, storage: PrintStorage) -> Self {
        let dispatcher = Dispatcher::new(
            storage.clone(),
            config.print_timeout(),
            config.probe_timeout(),
        );
        let renderer = TicketRenderer::new(config.ticket_width, config.timezone);

        Self {
            catalog: CatalogService::new(storage.clone()),
            zones: ZoneRegistry::new(storage.clone()),
            tickets: TicketService::new(storage.clone(), dispatcher.clone()),
            devices: DeviceRegistry::new(
                storage.clone(),
                dispatcher.clone(),
                config.device_check_interval_ms,
            ),
            router: ZoneRouter::new(storage.clone(), dispatcher.clone(), renderer),
            monitor: DeviceHealthMonitor::new(
                storage.clone(),
                dispatcher,
                MonitorSettings::from(&config),
            ),
            storage,
            config,
        }
    }

    /// Initialize server state
    ///
    /// 1. work directory structure
    /// 2. database (work_dir/database/comanda.redb)
    /// 3. services
    pub fn initialize(config: &Config) -> Result<Self> {
        config.ensure_work_dir_structure()?;

        let db_path = config.database_dir().join(DATABASE_FILE);
        let storage = PrintStorage::open(&db_path)?;
        let stats = storage.get_stats()?;
        tracing::info!(
            path = %db_path.display(),
            zones = stats.zone_count,
            tickets = stats.ticket_count,
            devices = stats.device_count,
            "Database opened"
        );

        Ok(Self::new(config.clone(), storage))
    }

    /// State over an in-memory database
    pub fn for_testing(config: Config) -> Result<Self> {
        let storage = PrintStorage::open_in_memory()?;
        Ok(Self::new(config, storage))
    }

    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.work_dir)
    }

    /// Register the background tasks
    ///
    /// - startup printer probe (Warmup)
    /// - liveness sweep (Periodic)
    /// - retry sweep (Periodic)
    /// - rotated log cleanup (Periodic)
    pub fn start_background_tasks(&self, tasks: &mut BackgroundTasks) {
        let token = tasks.shutdown_token();

        let monitor = self.monitor.clone();
        let shutdown = token.clone();
        tasks.spawn("startup_probe", TaskKind::Warmup, monitor.startup_probe(shutdown));

        let monitor = self.monitor.clone();
        let shutdown = token.clone();
        tasks.spawn("liveness_sweep", TaskKind::Periodic, monitor.run_liveness_loop(shutdown));

        let monitor = self.monitor.clone();
        let shutdown = token.clone();
        tasks.spawn("retry_sweep", TaskKind::Periodic, monitor.run_retry_loop(shutdown));

        let logs_dir = self.config.logs_dir();
        tasks.spawn("log_cleanup", TaskKind::Periodic, run_log_cleanup(logs_dir, token));
    }
}

async fn run_log_cleanup(logs_dir: PathBuf, shutdown: CancellationToken) {
    let mut interval = tokio::time::interval(LOG_CLEANUP_INTERVAL);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = interval.tick() => {
                match cleanup_old_logs(&logs_dir) {
                    Ok(0) => {}
                    Ok(removed) => tracing::info!(removed, "Old log files removed"),
                    Err(e) => tracing::warn!(error = %e, "Log cleanup failed"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_creates_database() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::with_overrides(dir.path().to_string_lossy(), 0);

        let state = ServerState::initialize(&config).unwrap();
        assert!(config.database_dir().join(DATABASE_FILE).exists());
        assert_eq!(state.storage.get_stats().unwrap().zone_count, 0);
    }

    #[tokio::test]
    async fn test_background_tasks_stop_on_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::with_overrides(dir.path().to_string_lossy(), 0);
        let state = ServerState::for_testing(config).unwrap();

        let mut tasks = BackgroundTasks::new();
        state.start_background_tasks(&mut tasks);
        assert_eq!(tasks.count_by_kind(), (1, 3));
        assert_eq!(tasks.check_health(), 0);

        tasks.shutdown().await;
    }
}
