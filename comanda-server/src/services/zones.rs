//! Zone Registry
//!
//! Administrative CRUD of printer zones. Name uniqueness and the pending
//! ticket check run inside the write transaction that applies the change.

use std::collections::HashSet;

use shared::error::ErrorCode;
use shared::models::{
    CategoryRef, PrinterZone, PrinterZoneCreate, PrinterZoneDetail, PrinterZoneUpdate,
};
use shared::util::{now_millis, snowflake_id};

use crate::printing::{PrintStorage, PrintStorageError};
use crate::utils::validation::{normalize_zone_name, validate_ipv4, validate_port};
use crate::utils::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct ZoneRegistry {
    storage: PrintStorage,
}

impl ZoneRegistry {
    pub fn new(storage: PrintStorage) -> Self {
        Self { storage }
    }

    fn ensure_business(&self, business_id: i64) -> AppResult<()> {
        match self.storage.get_business(business_id)? {
            Some(_) => Ok(()),
            None => Err(AppError::new(ErrorCode::BusinessNotFound).with_detail("business_id", business_id)),
        }
    }

    /// Deduplicate and check that every category belongs to the business
    fn validate_categories(&self, business_id: i64, ids: &[i64]) -> AppResult<Vec<i64>> {
        let mut seen = HashSet::new();
        let unique: Vec<i64> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();

        let categories = self.storage.get_categories(&unique)?;
        for id in &unique {
            match categories.iter().find(|c| c.id == *id) {
                None => {
                    return Err(AppError::new(ErrorCode::CategoryNotFound).with_detail("category_id", *id));
                }
                Some(c) if c.business_id != business_id => {
                    return Err(AppError::new(ErrorCode::CategoryNotInBusiness)
                        .with_detail("category_id", *id)
                        .with_detail("business_id", business_id));
                }
                Some(_) => {}
            }
        }
        Ok(unique)
    }

    fn name_taken(name: &str) -> AppError {
        AppError::with_message(
            ErrorCode::ZoneNameExists,
            format!("A printer zone named '{name}' already exists"),
        )
        .with_detail("name", name)
    }

    fn detail(&self, zone: PrinterZone) -> AppResult<PrinterZoneDetail> {
        let categories = self
            .storage
            .get_categories(&zone.category_ids)?
            .iter()
            .map(CategoryRef::from)
            .collect();
        Ok(PrinterZoneDetail { zone, categories })
    }

    pub fn create(&self, payload: PrinterZoneCreate) -> AppResult<PrinterZone> {
        self.ensure_business(payload.business_id)?;
        let name = normalize_zone_name(&payload.name)?;
        let printer_ip = validate_ipv4(&payload.printer_ip)?;
        let printer_port = validate_port(payload.printer_port)?;
        let category_ids = self.validate_categories(payload.business_id, &payload.category_ids)?;

        let now = now_millis();
        let zone = PrinterZone {
            id: snowflake_id(),
            business_id: payload.business_id,
            name,
            printer_ip,
            printer_port,
            active: payload.active,
            category_ids,
            created_at: now,
            updated_at: now,
        };

        let txn = self.storage.begin_write()?;
        if self
            .storage
            .find_zone_by_name(&txn, zone.business_id, &zone.name, None)?
            .is_some()
        {
            return Err(Self::name_taken(&zone.name));
        }
        self.storage.store_zone(&txn, &zone)?;
        txn.commit().map_err(PrintStorageError::from)?;

        tracing::info!(zone_id = zone.id, name = %zone.name, printer = %zone.printer_ip, "Printer zone created");
        Ok(zone)
    }

    /// Zones of a business with category names resolved
    pub fn list(&self, business_id: i64) -> AppResult<Vec<PrinterZoneDetail>> {
        self.storage
            .list_zones(business_id)?
            .into_iter()
            .map(|zone| self.detail(zone))
            .collect()
    }

    pub fn get(&self, id: i64) -> AppResult<PrinterZoneDetail> {
        let zone = self
            .storage
            .get_zone(id)?
            .ok_or_else(|| AppError::new(ErrorCode::ZoneNotFound).with_detail("id", id))?;
        self.detail(zone)
    }

    pub fn update(&self, id: i64, payload: PrinterZoneUpdate) -> AppResult<PrinterZone> {
        let mut zone = self
            .storage
            .get_zone(id)?
            .ok_or_else(|| AppError::new(ErrorCode::ZoneNotFound).with_detail("id", id))?;

        if let Some(name) = &payload.name {
            zone.name = normalize_zone_name(name)?;
        }
        if let Some(ip) = &payload.printer_ip {
            zone.printer_ip = validate_ipv4(ip)?;
        }
        if let Some(port) = payload.printer_port {
            zone.printer_port = validate_port(port)?;
        }
        if let Some(ids) = &payload.category_ids {
            zone.category_ids = self.validate_categories(zone.business_id, ids)?;
        }
        if let Some(active) = payload.active {
            zone.active = active;
        }
        zone.updated_at = now_millis();

        let txn = self.storage.begin_write()?;
        if self
            .storage
            .find_zone_by_name(&txn, zone.business_id, &zone.name, Some(zone.id))?
            .is_some()
        {
            return Err(Self::name_taken(&zone.name));
        }
        self.storage.store_zone(&txn, &zone)?;
        txn.commit().map_err(PrintStorageError::from)?;

        tracing::info!(zone_id = zone.id, name = %zone.name, active = zone.active, "Printer zone updated");
        Ok(zone)
    }

    /// Delete a zone without PENDING tickets
    pub fn delete(&self, id: i64) -> AppResult<()> {
        let zone = self
            .storage
            .get_zone(id)?
            .ok_or_else(|| AppError::new(ErrorCode::ZoneNotFound).with_detail("id", id))?;

        let txn = self.storage.begin_write()?;
        let pending = self.storage.pending_count_in(&txn, zone.id)?;
        if pending > 0 {
            return Err(AppError::with_message(
                ErrorCode::ZoneHasPendingTickets,
                format!("Printer zone has {pending} pending ticket(s)"),
            )
            .with_detail("pending_tickets", pending));
        }
        self.storage.delete_zone(&txn, &zone)?;
        txn.commit().map_err(PrintStorageError::from)?;

        tracing::info!(zone_id = zone.id, name = %zone.name, "Printer zone deleted");
        Ok(())
    }
}
