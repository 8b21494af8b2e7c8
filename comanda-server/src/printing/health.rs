//! Device health monitor
//!
//! Background sweeps over the configured printers:
//!
//! - liveness: probe every zone printer and update its devices
//! - retry: redeliver recent FAILED tickets whose printer answers a probe
//! - startup: one liveness sweep shortly after boot

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use futures::future::join_all;
use shared::util::now_millis;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::dispatch::Dispatcher;
use super::storage::{PrintStorage, PrintStorageError};
use super::types::{DeliveryOutcome, Observation};
use crate::core::Config;

#[derive(Debug, Clone, Copy)]
pub struct MonitorSettings {
    pub liveness_interval: Duration,
    pub retry_interval: Duration,
    pub startup_delay: Duration,
    pub max_retries: u32,
    /// Only tickets failed within this window are retried
    pub retry_window: Duration,
}

impl From<&Config> for MonitorSettings {
    fn from(config: &Config) -> Self {
        Self {
            liveness_interval: config.liveness_interval(),
            retry_interval: config.retry_interval(),
            startup_delay: config.startup_probe_delay(),
            max_retries: config.max_ticket_retries,
            retry_window: Duration::from_millis(config.retry_window_ms().max(0) as u64),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LivenessReport {
    pub printers: usize,
    pub online: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RetryReport {
    pub candidates: usize,
    pub printed: usize,
    pub failed: usize,
    /// Printer did not answer the probe, no attempt consumed
    pub skipped_offline: usize,
    /// Zone missing or inactive
    pub skipped_config: usize,
}

#[derive(Debug, Clone)]
pub struct DeviceHealthMonitor {
    storage: PrintStorage,
    dispatcher: Dispatcher,
    settings: MonitorSettings,
}

impl DeviceHealthMonitor {
    pub fn new(storage: PrintStorage, dispatcher: Dispatcher, settings: MonitorSettings) -> Self {
        Self {
            storage,
            dispatcher,
            settings,
        }
    }

    /// Probe every configured printer, active zones or not
    ///
    /// An IP counts as online when any of its ports answers. Zone `active`
    /// flags are never touched.
    pub async fn liveness_sweep(&self) -> Result<LivenessReport, PrintStorageError> {
        let zones = self.storage.list_all_zones()?;

        let mut targets: Vec<(String, u16)> = zones
            .iter()
            .map(|z| (z.printer_ip.clone(), z.printer_port))
            .collect();
        targets.sort();
        targets.dedup();

        let results = join_all(targets.iter().map(|(ip, port)| async move {
            (ip.as_str(), self.dispatcher.probe(ip, *port).await)
        }))
        .await;

        let mut by_ip: BTreeMap<&str, bool> = BTreeMap::new();
        for (ip, online) in results {
            *by_ip.entry(ip).or_default() |= online;
        }

        let mut report = LivenessReport {
            printers: by_ip.len(),
            online: 0,
        };
        for (ip, online) in by_ip {
            if online {
                report.online += 1;
            }
            self.dispatcher.observe(ip, Observation::Probe { online });
        }

        tracing::info!(
            printers = report.printers,
            online = report.online,
            "Printer liveness sweep finished"
        );
        Ok(report)
    }

    /// Redeliver FAILED tickets that are still within the retry budget
    ///
    /// Each printer is probed at most once per sweep and a ticket is only
    /// attempted when its printer answers.
    pub async fn retry_sweep(&self) -> Result<RetryReport, PrintStorageError> {
        let since = now_millis() - self.settings.retry_window.as_millis() as i64;
        let candidates = self
            .storage
            .retry_candidates(self.settings.max_retries, since)?;

        let mut report = RetryReport {
            candidates: candidates.len(),
            ..Default::default()
        };
        if candidates.is_empty() {
            return Ok(report);
        }

        let mut probes: HashMap<(String, u16), bool> = HashMap::new();

        for ticket in candidates {
            let zone = match self.storage.get_zone(ticket.printer_zone_id)? {
                Some(zone) if zone.active => zone,
                _ => {
                    report.skipped_config += 1;
                    continue;
                }
            };

            let key = (zone.printer_ip.clone(), zone.printer_port);
            let online = match probes.get(&key) {
                Some(online) => *online,
                None => {
                    let online = self.dispatcher.probe(&zone.printer_ip, zone.printer_port).await;
                    probes.insert(key, online);
                    online
                }
            };
            if !online {
                report.skipped_offline += 1;
                continue;
            }

            match self.dispatcher.deliver(ticket.id).await {
                Ok(DeliveryOutcome::Failed(_)) => report.failed += 1,
                Ok(_) => report.printed += 1,
                Err(e) => {
                    tracing::warn!(ticket = ticket.id, error = %e, "Retry skipped");
                    report.skipped_config += 1;
                }
            }
        }

        tracing::info!(
            candidates = report.candidates,
            printed = report.printed,
            failed = report.failed,
            offline = report.skipped_offline,
            "Ticket retry sweep finished"
        );
        Ok(report)
    }

    /// One liveness sweep after the startup delay
    pub async fn startup_probe(self, shutdown: CancellationToken) {
        tokio::select! {
            _ = shutdown.cancelled() => return,
            _ = tokio::time::sleep(self.settings.startup_delay) => {}
        }
        tracing::info!("Running startup printer probe");
        if let Err(e) = self.liveness_sweep().await {
            tracing::error!(error = %e, "Startup printer probe failed");
        }
    }

    pub async fn run_liveness_loop(self, shutdown: CancellationToken) {
        let period = self.settings.liveness_interval;
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::debug!("Liveness loop stopped");
                    break;
                }
                _ = interval.tick() => {
                    if let Err(e) = self.liveness_sweep().await {
                        tracing::error!(error = %e, "Printer liveness sweep failed");
                    }
                }
            }
        }
    }

    pub async fn run_retry_loop(self, shutdown: CancellationToken) {
        let period = self.settings.retry_interval;
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::debug!("Retry loop stopped");
                    break;
                }
                _ = interval.tick() => {
                    if let Err(e) = self.retry_sweep().await {
                        tracing::error!(error = %e, "Ticket retry sweep failed");
                    }
                }
            }
        }
    }
}
