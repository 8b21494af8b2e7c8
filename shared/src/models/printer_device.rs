//! Printer Device Model
//!
//! Devices are the embedded controllers sitting next to (or inside) the
//! thermal printers. Several devices may report the same printer IP.

use super::business::CategoryRef;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Maximum retained connection history entries per device
pub const CONNECTION_HISTORY_CAPACITY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
    Error,
}

/// One connection history entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionEvent {
    pub timestamp: i64,
    pub status: ConnectionStatus,
    pub details: Option<String>,
}

/// Printer device entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterDevice {
    pub device_id: String,
    pub business_id: i64,
    pub name: Option<String>,
    /// Address of the device itself
    pub ip_address: Option<String>,
    /// Address of the printer the device drives
    pub printer_ip: Option<String>,
    pub mac_address: Option<String>,
    pub firmware_version: Option<String>,
    pub online: bool,
    pub last_seen: Option<i64>,
    #[serde(default)]
    pub connection_history: VecDeque<ConnectionEvent>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl PrinterDevice {
    /// Append a history entry, evicting the oldest past capacity
    pub fn record(&mut self, event: ConnectionEvent) {
        self.connection_history.push_back(event);
        while self.connection_history.len() > CONNECTION_HISTORY_CAPACITY {
            self.connection_history.pop_front();
        }
    }

    /// Set liveness. Returns true when the state changed.
    ///
    /// `last_seen` only moves forward on an online observation.
    pub fn set_online(&mut self, online: bool, now: i64) -> bool {
        let changed = self.online != online;
        self.online = online;
        if online {
            self.last_seen = Some(now);
        }
        self.updated_at = now;
        changed
    }
}

/// Device self-registration request
///
/// Required fields are optional here so that a missing value produces a
/// validation error instead of a body rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceRegistration {
    pub device_id: Option<String>,
    pub business_code: Option<String>,
    pub name: Option<String>,
    pub ip_address: Option<String>,
    pub printer_ip: Option<String>,
    pub mac_address: Option<String>,
    pub firmware_version: Option<String>,
}

/// Printer configuration handed to a registered device
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredPrinter {
    pub zone_id: i64,
    pub name: String,
    pub printer_ip: String,
    pub printer_port: u16,
    /// Category references (id and name) printed by this zone
    #[serde(rename = "category_ids")]
    pub categories: Vec<CategoryRef>,
}

/// Device self-registration response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRegistrationResponse {
    pub success: bool,
    pub device_id: String,
    pub business_id: i64,
    pub business_name: String,
    pub printers: Vec<RegisteredPrinter>,
    /// Polling interval for the device, in milliseconds
    pub check_interval: u64,
}

/// Device line inside a printer status report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceStatus {
    pub device_id: String,
    pub name: Option<String>,
    pub ip_address: Option<String>,
    pub online: bool,
    pub last_seen: Option<i64>,
    pub history_count: usize,
}

impl From<&PrinterDevice> for DeviceStatus {
    fn from(d: &PrinterDevice) -> Self {
        Self {
            device_id: d.device_id.clone(),
            name: d.name.clone(),
            ip_address: d.ip_address.clone(),
            online: d.online,
            last_seen: d.last_seen,
            history_count: d.connection_history.len(),
        }
    }
}

/// Per-zone printer status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrinterStatus {
    pub zone_id: i64,
    pub zone_name: String,
    pub printer_ip: String,
    pub printer_port: u16,
    pub active: bool,
    /// Any device for this IP online
    pub online: bool,
    pub devices: Vec<DeviceStatus>,
}

/// Connection history of one device
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceHistory {
    pub device_id: String,
    pub name: Option<String>,
    pub online: bool,
    pub last_seen: Option<i64>,
    pub connection_history: Vec<ConnectionEvent>,
}

/// Result of an on-demand printer check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrinterCheck {
    pub printer_ip: String,
    pub printer_port: u16,
    pub online: bool,
    pub devices: Vec<DeviceStatus>,
}
