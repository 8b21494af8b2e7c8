//! Device Registry
//!
//! Embedded printer controllers register themselves with a business code and
//! get back the printer configuration of that business.

use std::collections::VecDeque;

use shared::error::ErrorCode;
use shared::models::{
    CategoryRef, ConnectionEvent, ConnectionStatus, DEFAULT_PRINTER_PORT, DeviceHistory,
    DeviceRegistration, DeviceRegistrationResponse, DeviceStatus, PrinterCheck, PrinterDevice,
    PrinterStatus, RegisteredPrinter,
};
use shared::util::now_millis;

use crate::printing::{Dispatcher, Observation, PrintStorage};
use crate::utils::validation::validate_ipv4;
use crate::utils::{AppError, AppResult};

/// Polling interval handed to devices when not configured
pub const DEFAULT_CHECK_INTERVAL_MS: u64 = 5000;

fn required(value: &Option<String>, field: &'static str) -> AppResult<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(AppError::with_message(ErrorCode::RequiredField, format!("{field} is required"))
            .with_detail("field", field)),
    }
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// Devices watching `ip`: by printer address first, device address otherwise
fn devices_watching<'a>(devices: &'a [PrinterDevice], ip: &str) -> Vec<&'a PrinterDevice> {
    let by_printer: Vec<_> = devices
        .iter()
        .filter(|d| d.printer_ip.as_deref() == Some(ip))
        .collect();
    if !by_printer.is_empty() {
        return by_printer;
    }
    devices
        .iter()
        .filter(|d| d.ip_address.as_deref() == Some(ip))
        .collect()
}

#[derive(Debug, Clone)]
pub struct DeviceRegistry {
    storage: PrintStorage,
    dispatcher: Dispatcher,
    check_interval_ms: u64,
}

impl DeviceRegistry {
    pub fn new(storage: PrintStorage, dispatcher: Dispatcher, check_interval_ms: u64) -> Self {
        Self {
            storage,
            dispatcher,
            check_interval_ms,
        }
    }

    /// Register or reconnect a device
    pub fn register(&self, payload: DeviceRegistration) -> AppResult<DeviceRegistrationResponse> {
        let device_id = required(&payload.device_id, "device_id")?;
        let code = required(&payload.business_code, "business_code")?;

        let business = self.storage.find_business_by_code(&code)?.ok_or_else(|| {
            AppError::new(ErrorCode::BusinessNotFound).with_detail("business_code", code.clone())
        })?;

        let now = now_millis();
        let device = self.storage.upsert_device(&device_id, |existing| {
            let (mut device, details) = match existing {
                Some(device) => (device, "reconnected"),
                None => (
                    PrinterDevice {
                        device_id: device_id.clone(),
                        business_id: business.id,
                        name: None,
                        ip_address: None,
                        printer_ip: None,
                        mac_address: None,
                        firmware_version: None,
                        online: false,
                        last_seen: None,
                        connection_history: VecDeque::new(),
                        created_at: now,
                        updated_at: now,
                    },
                    "initial registration",
                ),
            };

            device.business_id = business.id;
            device.name = trimmed(&payload.name).or(device.name);
            device.ip_address = trimmed(&payload.ip_address).or(device.ip_address);
            device.printer_ip = trimmed(&payload.printer_ip).or(device.printer_ip);
            device.mac_address = trimmed(&payload.mac_address).or(device.mac_address);
            device.firmware_version = trimmed(&payload.firmware_version).or(device.firmware_version);
            device.set_online(true, now);
            device.record(ConnectionEvent {
                timestamp: now,
                status: ConnectionStatus::Connected,
                details: Some(details.to_string()),
            });
            device
        })?;

        let mut printers = Vec::new();
        for zone in self.storage.list_zones(business.id)?.into_iter().filter(|z| z.active) {
            let categories = self
                .storage
                .get_categories(&zone.category_ids)?
                .iter()
                .map(CategoryRef::from)
                .collect();
            printers.push(RegisteredPrinter {
                zone_id: zone.id,
                name: zone.name,
                printer_ip: zone.printer_ip,
                printer_port: zone.printer_port,
                categories,
            });
        }

        tracing::info!(
            device_id = %device.device_id,
            business_id = business.id,
            history = device.connection_history.len(),
            printers = printers.len(),
            "Printer device registered"
        );

        Ok(DeviceRegistrationResponse {
            success: true,
            device_id: device.device_id,
            business_id: business.id,
            business_name: business.name,
            printers,
            check_interval: self.check_interval_ms,
        })
    }

    /// Printer status of every zone of a business
    pub fn status(&self, business_id: i64) -> AppResult<Vec<PrinterStatus>> {
        if self.storage.get_business(business_id)?.is_none() {
            return Err(AppError::new(ErrorCode::BusinessNotFound).with_detail("business_id", business_id));
        }

        let devices = self.storage.list_devices(business_id)?;
        let statuses = self
            .storage
            .list_zones(business_id)?
            .into_iter()
            .map(|zone| {
                let watching = devices_watching(&devices, &zone.printer_ip);
                PrinterStatus {
                    online: watching.iter().any(|d| d.online),
                    devices: watching.into_iter().map(DeviceStatus::from).collect(),
                    zone_id: zone.id,
                    zone_name: zone.name,
                    printer_ip: zone.printer_ip,
                    printer_port: zone.printer_port,
                    active: zone.active,
                }
            })
            .collect();
        Ok(statuses)
    }

    pub fn history(&self, device_id: &str) -> AppResult<DeviceHistory> {
        let device = self
            .storage
            .get_device(device_id)?
            .ok_or_else(|| AppError::new(ErrorCode::DeviceNotFound).with_detail("device_id", device_id))?;

        Ok(DeviceHistory {
            device_id: device.device_id,
            name: device.name,
            online: device.online,
            last_seen: device.last_seen,
            connection_history: device.connection_history.into(),
        })
    }

    /// Probe a printer now and record the result on its devices
    ///
    /// Uses the port of a zone declaring this IP, 9100 otherwise.
    pub async fn check_printer(&self, printer_ip: &str) -> AppResult<PrinterCheck> {
        let ip = validate_ipv4(printer_ip)?;
        let port = self
            .storage
            .list_all_zones()?
            .into_iter()
            .find(|z| z.printer_ip == ip)
            .map_or(DEFAULT_PRINTER_PORT, |z| z.printer_port);

        let online = self.dispatcher.probe(&ip, port).await;
        self.dispatcher.observe(&ip, Observation::Probe { online });

        let devices = self
            .storage
            .devices_for_ip(&ip)?
            .iter()
            .map(DeviceStatus::from)
            .collect();

        tracing::info!(printer = %ip, port, online, "Printer checked on demand");
        Ok(PrinterCheck {
            printer_ip: ip,
            printer_port: port,
            online,
            devices,
        })
    }
}
