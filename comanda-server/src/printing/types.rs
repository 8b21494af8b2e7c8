//! Print engine types

use serde::{Deserialize, Serialize};
use shared::models::{ConnectionEvent, ConnectionStatus, PrinterDevice};

/// What the engine learned about a printer IP
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// A ticket was written to the printer
    Delivered,
    /// A delivery attempt failed with the given reason
    DeliveryFailed(String),
    /// Connect-only liveness probe
    Probe { online: bool },
}

impl Observation {
    pub fn online(&self) -> bool {
        match self {
            Self::Delivered => true,
            Self::DeliveryFailed(_) => false,
            Self::Probe { online } => *online,
        }
    }

    /// Apply the observation to a device record
    ///
    /// Deliveries always leave a history entry; probes only on a state change.
    pub fn apply(&self, device: &mut PrinterDevice, now: i64) {
        let changed = device.set_online(self.online(), now);

        let event = match self {
            Self::Delivered => Some((ConnectionStatus::Connected, "ticket delivered".to_string())),
            Self::DeliveryFailed(reason) => Some((ConnectionStatus::Error, reason.clone())),
            Self::Probe { online: true } if changed => {
                Some((ConnectionStatus::Connected, "printer reachable".to_string()))
            }
            Self::Probe { online: false } if changed => {
                Some((ConnectionStatus::Disconnected, "printer unreachable".to_string()))
            }
            Self::Probe { .. } => None,
        };

        if let Some((status, details)) = event {
            device.record(ConnectionEvent {
                timestamp: now,
                status,
                details: Some(details),
            });
        }
    }
}

/// Result of one delivery attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Written to the printer, ticket now PRINTED
    Printed,
    /// Ticket was already PRINTED, nothing sent
    AlreadyPrinted,
    /// Delivery failed, ticket now FAILED with this reason
    Failed(String),
}

impl DeliveryOutcome {
    pub fn is_printed(&self) -> bool {
        matches!(self, Self::Printed | Self::AlreadyPrinted)
    }
}

/// Ticket created for one zone of an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutedTicket {
    pub id: i64,
    pub ticket_id: String,
    pub zone_id: i64,
    pub zone_name: String,
    pub item_count: usize,
    pub printed: bool,
    pub error: Option<String>,
}

/// Zone that could not get a ticket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneError {
    pub zone: String,
    pub error: String,
}

/// Outcome of routing one order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteSummary {
    /// No zone failed to produce a ticket
    pub success: bool,
    pub tickets: Vec<RoutedTicket>,
    pub errors: Vec<ZoneError>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    fn device(online: bool) -> PrinterDevice {
        PrinterDevice {
            device_id: "esp-1".into(),
            business_id: 1,
            name: None,
            ip_address: None,
            printer_ip: Some("10.0.0.50".into()),
            mac_address: None,
            firmware_version: None,
            online,
            last_seen: None,
            connection_history: VecDeque::new(),
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_probe_records_only_changes() {
        let mut d = device(true);
        Observation::Probe { online: true }.apply(&mut d, 10);
        assert!(d.connection_history.is_empty());
        assert_eq!(d.last_seen, Some(10));

        Observation::Probe { online: false }.apply(&mut d, 20);
        assert!(!d.online);
        assert_eq!(d.last_seen, Some(10));
        assert_eq!(d.connection_history.len(), 1);
        assert_eq!(d.connection_history[0].status, ConnectionStatus::Disconnected);
    }

    #[test]
    fn test_deliveries_always_record() {
        let mut d = device(false);
        Observation::DeliveryFailed("refused".into()).apply(&mut d, 5);
        Observation::DeliveryFailed("refused".into()).apply(&mut d, 6);
        Observation::Delivered.apply(&mut d, 7);

        let statuses: Vec<_> = d.connection_history.iter().map(|e| e.status).collect();
        assert_eq!(
            statuses,
            vec![
                ConnectionStatus::Error,
                ConnectionStatus::Error,
                ConnectionStatus::Connected
            ]
        );
        assert!(d.online);
        assert_eq!(d.last_seen, Some(7));
    }
}
