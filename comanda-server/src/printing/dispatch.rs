//! Ticket delivery
//!
//! Sends stored ticket bytes to the zone printer over raw TCP and records
//! the outcome on the ticket and on every device watching that printer.

use std::sync::Arc;
use std::time::Duration;

use comanda_printer::{NetworkPrinter, Printer};
use dashmap::DashSet;
use shared::error::{AppError, ErrorCode};
use shared::models::TicketStatus;
use shared::util::now_millis;
use thiserror::Error;
use tracing::instrument;

use super::storage::{PrintStorage, PrintStorageError};
use super::types::{DeliveryOutcome, Observation};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Storage(#[from] PrintStorageError),

    #[error("Print ticket not found: {0}")]
    TicketNotFound(i64),

    #[error("Printer zone not found: {0}")]
    ZoneNotFound(i64),

    #[error("Printer zone {0} is inactive")]
    ZoneInactive(i64),

    #[error("Ticket {0} has no stored content")]
    ContentMissing(i64),

    #[error("Ticket {0} is already being delivered")]
    AlreadyInFlight(i64),
}

impl From<PrintStorageError> for AppError {
    fn from(err: PrintStorageError) -> Self {
        match err {
            PrintStorageError::TicketNotFound(id) => {
                AppError::new(ErrorCode::TicketNotFound).with_detail("id", id)
            }
            PrintStorageError::ZoneNotFound(id) => {
                AppError::new(ErrorCode::ZoneNotFound).with_detail("id", id)
            }
            other => AppError::database(other.to_string()),
        }
    }
}

impl From<DispatchError> for AppError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Storage(e) => e.into(),
            DispatchError::TicketNotFound(id) => {
                AppError::new(ErrorCode::TicketNotFound).with_detail("id", id)
            }
            DispatchError::ZoneNotFound(id) => {
                AppError::with_message(ErrorCode::ConfigError, format!("Printer zone {id} not found"))
                    .with_detail("zone_id", id)
            }
            DispatchError::ZoneInactive(id) => {
                AppError::new(ErrorCode::ZoneInactive).with_detail("zone_id", id)
            }
            DispatchError::ContentMissing(id) => {
                AppError::new(ErrorCode::TicketContentMissing).with_detail("id", id)
            }
            DispatchError::AlreadyInFlight(id) => {
                AppError::new(ErrorCode::TicketInFlight).with_detail("id", id)
            }
        }
    }
}

/// Removes the ticket from the in-flight set when dropped
struct InFlightClaim {
    set: Arc<DashSet<i64>>,
    ticket_id: i64,
}

impl Drop for InFlightClaim {
    fn drop(&mut self) {
        self.set.remove(&self.ticket_id);
    }
}

/// Delivers tickets and probes printers
#[derive(Debug, Clone)]
pub struct Dispatcher {
    storage: PrintStorage,
    print_timeout: Duration,
    probe_timeout: Duration,
    in_flight: Arc<DashSet<i64>>,
}

impl Dispatcher {
    pub fn new(storage: PrintStorage, print_timeout: Duration, probe_timeout: Duration) -> Self {
        Self {
            storage,
            print_timeout,
            probe_timeout,
            in_flight: Arc::new(DashSet::new()),
        }
    }

    fn claim(&self, ticket_id: i64) -> Result<InFlightClaim, DispatchError> {
        if !self.in_flight.insert(ticket_id) {
            return Err(DispatchError::AlreadyInFlight(ticket_id));
        }
        Ok(InFlightClaim {
            set: self.in_flight.clone(),
            ticket_id,
        })
    }

    /// Deliver a ticket to its zone printer
    ///
    /// A transport failure is an outcome, not an error: the ticket becomes
    /// FAILED and the reason is returned in [`DeliveryOutcome::Failed`].
    /// A missing or inactive zone is an error and leaves the ticket as is.
    #[instrument(skip(self))]
    pub async fn deliver(&self, ticket_id: i64) -> Result<DeliveryOutcome, DispatchError> {
        let _claim = self.claim(ticket_id)?;

        let ticket = self
            .storage
            .get_ticket(ticket_id)?
            .ok_or(DispatchError::TicketNotFound(ticket_id))?;

        if ticket.status == TicketStatus::Printed {
            tracing::debug!("Ticket already printed, skipping");
            return Ok(DeliveryOutcome::AlreadyPrinted);
        }

        let zone = self
            .storage
            .get_zone(ticket.printer_zone_id)?
            .ok_or(DispatchError::ZoneNotFound(ticket.printer_zone_id))?;
        if !zone.active {
            return Err(DispatchError::ZoneInactive(zone.id));
        }

        let content = self
            .storage
            .get_ticket_content(ticket_id)?
            .ok_or(DispatchError::ContentMissing(ticket_id))?;

        let result = match NetworkPrinter::new(&zone.printer_ip, zone.printer_port) {
            Ok(printer) => printer.with_timeout(self.print_timeout).print(&content).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                self.storage.mark_printed(ticket_id)?;
                self.observe(&zone.printer_ip, Observation::Delivered);
                tracing::info!(zone = %zone.name, order_id = %ticket.order_id, "Ticket printed");
                Ok(DeliveryOutcome::Printed)
            }
            Err(e) => {
                let reason = e.to_string();
                let updated = self.storage.mark_failed(ticket_id, &reason)?;
                self.observe(&zone.printer_ip, Observation::DeliveryFailed(reason.clone()));
                tracing::warn!(
                    zone = %zone.name,
                    order_id = %ticket.order_id,
                    retry_count = updated.retry_count,
                    error = %reason,
                    "Ticket delivery failed"
                );
                Ok(DeliveryOutcome::Failed(reason))
            }
        }
    }

    /// Connect-only liveness probe
    pub async fn probe(&self, ip: &str, port: u16) -> bool {
        match NetworkPrinter::new(ip, port) {
            Ok(printer) => printer.with_probe_timeout(self.probe_timeout).is_online().await,
            Err(e) => {
                tracing::warn!(ip = %ip, error = %e, "Cannot probe printer");
                false
            }
        }
    }

    /// Record an observation on every device of a printer IP
    ///
    /// Device bookkeeping never fails the caller; errors are logged.
    pub fn observe(&self, ip: &str, observation: Observation) -> usize {
        let now = now_millis();
        match self
            .storage
            .update_devices_for_ip(ip, |device| observation.apply(device, now))
        {
            Ok(count) => {
                tracing::debug!(ip = %ip, devices = count, online = observation.online(), "Device status updated");
                count
            }
            Err(e) => {
                tracing::error!(ip = %ip, error = %e, "Failed to update device status");
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printing::testing::{dead_port, fake_printer, seed_device, seed_ticket, seed_zone};
    use shared::models::ConnectionStatus;

    fn dispatcher(storage: &PrintStorage) -> Dispatcher {
        Dispatcher::new(
            storage.clone(),
            Duration::from_secs(2),
            Duration::from_millis(500),
        )
    }

    #[tokio::test]
    async fn test_deliver_success() {
        let storage = PrintStorage::open_in_memory().unwrap();
        let (port, mut received) = fake_printer().await;
        let zone = seed_zone(&storage, 1, "Cocina", port, vec![]);
        let ticket = seed_ticket(&storage, &zone, b"hello printer");
        seed_device(&storage, "esp-1", 1, Some("127.0.0.1"), None);

        let outcome = dispatcher(&storage).deliver(ticket.id).await.unwrap();
        assert_eq!(outcome, DeliveryOutcome::Printed);
        assert_eq!(received.recv().await.unwrap(), b"hello printer");

        let stored = storage.get_ticket(ticket.id).unwrap().unwrap();
        assert_eq!(stored.status, TicketStatus::Printed);

        let device = storage.get_device("esp-1").unwrap().unwrap();
        assert!(device.online);
        assert!(device.last_seen.is_some());
        assert_eq!(device.connection_history.len(), 1);
        assert_eq!(device.connection_history[0].status, ConnectionStatus::Connected);
    }

    #[tokio::test]
    async fn test_redeliver_printed_is_noop() {
        let storage = PrintStorage::open_in_memory().unwrap();
        let zone = seed_zone(&storage, 1, "Cocina", dead_port(), vec![]);
        let ticket = seed_ticket(&storage, &zone, b"x");
        storage.mark_printed(ticket.id).unwrap();

        let outcome = dispatcher(&storage).deliver(ticket.id).await.unwrap();
        assert_eq!(outcome, DeliveryOutcome::AlreadyPrinted);
        assert_eq!(
            storage.get_ticket(ticket.id).unwrap().unwrap().retry_count,
            0
        );
    }

    #[tokio::test]
    async fn test_deliver_failure_marks_failed() {
        let storage = PrintStorage::open_in_memory().unwrap();
        let zone = seed_zone(&storage, 1, "Barra", dead_port(), vec![]);
        let ticket = seed_ticket(&storage, &zone, b"x");
        seed_device(&storage, "esp-1", 1, Some("127.0.0.1"), None);
        seed_device(&storage, "esp-2", 1, Some("127.0.0.1"), None);

        let d = dispatcher(&storage);
        let outcome = d.deliver(ticket.id).await.unwrap();
        assert!(matches!(outcome, DeliveryOutcome::Failed(_)));
        d.deliver(ticket.id).await.unwrap();

        let stored = storage.get_ticket(ticket.id).unwrap().unwrap();
        assert_eq!(stored.status, TicketStatus::Failed);
        assert_eq!(stored.retry_count, 2);
        assert!(stored.last_error.is_some());

        for id in ["esp-1", "esp-2"] {
            let device = storage.get_device(id).unwrap().unwrap();
            assert!(!device.online);
            assert_eq!(device.connection_history.len(), 2);
            assert_eq!(device.connection_history[0].status, ConnectionStatus::Error);
        }
    }

    #[tokio::test]
    async fn test_inactive_zone_leaves_ticket_untouched() {
        let storage = PrintStorage::open_in_memory().unwrap();
        let mut zone = seed_zone(&storage, 1, "Cocina", dead_port(), vec![]);
        let ticket = seed_ticket(&storage, &zone, b"x");

        zone.active = false;
        let txn = storage.begin_write().unwrap();
        storage.store_zone(&txn, &zone).unwrap();
        txn.commit().unwrap();

        let err = dispatcher(&storage).deliver(ticket.id).await.unwrap_err();
        assert!(matches!(err, DispatchError::ZoneInactive(_)));
        let stored = storage.get_ticket(ticket.id).unwrap().unwrap();
        assert_eq!(stored.status, TicketStatus::Pending);
        assert_eq!(stored.retry_count, 0);
    }

    #[tokio::test]
    async fn test_in_flight_claim() {
        let storage = PrintStorage::open_in_memory().unwrap();
        let zone = seed_zone(&storage, 1, "Cocina", dead_port(), vec![]);
        let ticket = seed_ticket(&storage, &zone, b"x");

        let d = dispatcher(&storage);
        let claim = d.claim(ticket.id).unwrap();
        let err = d.deliver(ticket.id).await.unwrap_err();
        assert!(matches!(err, DispatchError::AlreadyInFlight(_)));
        assert_eq!(AppError::from(err).code, ErrorCode::TicketInFlight);

        drop(claim);
        assert!(d.deliver(ticket.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_probe() {
        let storage = PrintStorage::open_in_memory().unwrap();
        let (port, _received) = fake_printer().await;
        let d = dispatcher(&storage);

        assert!(d.probe("127.0.0.1", port).await);
        assert!(!d.probe("127.0.0.1", dead_port()).await);
        assert!(!d.probe("not-an-ip", port).await);
    }
}
