//! redb-based storage for zones, tickets, devices and the business directory
//!
//! Records are stored as JSON. Secondary indexes are `(parent, child) -> ()`
//! tables scanned by range.

use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition,
    WriteTransaction,
};
use shared::models::{
    Business, Category, PrintTicket, PrinterDevice, PrinterZone, TicketStatus,
};
use shared::util::now_millis;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Businesses: key = business_id, value = JSON
const BUSINESSES_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("businesses");

/// Index: business code -> business_id
const BUSINESS_BY_CODE_TABLE: TableDefinition<&str, i64> = TableDefinition::new("business_by_code");

/// Categories: key = category_id, value = JSON
const CATEGORIES_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("categories");

/// Printer zones: key = zone_id, value = JSON
const ZONES_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("printer_zones");

/// Index: (business_id, zone_id) -> ()
const ZONES_BY_BUSINESS_TABLE: TableDefinition<(i64, i64), ()> =
    TableDefinition::new("printer_zones_by_business");

/// Print tickets: key = ticket id, value = JSON (without content)
const TICKETS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("print_tickets");

/// Ticket content: key = ticket id, value = encoded ESC/POS bytes
const TICKET_CONTENT_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("print_ticket_content");

/// Index: (zone_id, ticket id) -> ()
const TICKETS_BY_ZONE_TABLE: TableDefinition<(i64, i64), ()> =
    TableDefinition::new("print_tickets_by_zone");

/// Printer devices: key = device_id, value = JSON
const DEVICES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("printer_devices");

#[derive(Debug, Error)]
pub enum PrintStorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Print ticket not found: {0}")]
    TicketNotFound(i64),

    #[error("Printer zone not found: {0}")]
    ZoneNotFound(i64),
}

pub type PrintStorageResult<T> = Result<T, PrintStorageError>;

fn zone_range(zone_id: i64) -> std::ops::RangeInclusive<(i64, i64)> {
    (zone_id, i64::MIN)..=(zone_id, i64::MAX)
}

/// Count PENDING tickets of a zone (works in read and write transactions)
fn count_pending<I, T>(idx_table: &I, tickets: &T, zone_id: i64) -> PrintStorageResult<usize>
where
    I: ReadableTable<(i64, i64), ()>,
    T: ReadableTable<i64, &'static [u8]>,
{
    let mut count = 0;
    for result in idx_table.range(zone_range(zone_id))? {
        let (key, _) = result?;
        let (_, ticket_id) = key.value();
        if let Some(guard) = tickets.get(ticket_id)? {
            let ticket: PrintTicket = serde_json::from_slice(guard.value())?;
            if ticket.status == TicketStatus::Pending {
                count += 1;
            }
        }
    }
    Ok(count)
}

/// Load every zone of a business (works in read and write transactions)
fn zones_of_business<I, Z>(idx_table: &I, zones: &Z, business_id: i64) -> PrintStorageResult<Vec<PrinterZone>>
where
    I: ReadableTable<(i64, i64), ()>,
    Z: ReadableTable<i64, &'static [u8]>,
{
    let mut result_zones = Vec::new();
    for result in idx_table.range((business_id, i64::MIN)..=(business_id, i64::MAX))? {
        let (key, _) = result?;
        let (_, zone_id) = key.value();
        if let Some(guard) = zones.get(zone_id)? {
            result_zones.push(serde_json::from_slice::<PrinterZone>(guard.value())?);
        }
    }
    result_zones.sort_by_key(|z| (z.created_at, z.id));
    Ok(result_zones)
}

/// Print engine storage
#[derive(Clone)]
pub struct PrintStorage {
    db: Arc<Database>,
}

impl std::fmt::Debug for PrintStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrintStorage").finish_non_exhaustive()
    }
}

impl PrintStorage {
    /// Open or create database
    pub fn open(path: impl AsRef<Path>) -> PrintStorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open in-memory database (tests and ephemeral runs)
    pub fn open_in_memory() -> PrintStorageResult<Self> {
        let db =
            Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> PrintStorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(BUSINESSES_TABLE)?;
            let _ = write_txn.open_table(BUSINESS_BY_CODE_TABLE)?;
            let _ = write_txn.open_table(CATEGORIES_TABLE)?;
            let _ = write_txn.open_table(ZONES_TABLE)?;
            let _ = write_txn.open_table(ZONES_BY_BUSINESS_TABLE)?;
            let _ = write_txn.open_table(TICKETS_TABLE)?;
            let _ = write_txn.open_table(TICKET_CONTENT_TABLE)?;
            let _ = write_txn.open_table(TICKETS_BY_ZONE_TABLE)?;
            let _ = write_txn.open_table(DEVICES_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    pub fn begin_write(&self) -> PrintStorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Business directory ==========

    /// Insert or replace a business, keeping the code index in sync
    pub fn upsert_business(&self, business: &Business) -> PrintStorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(BUSINESSES_TABLE)?;
            let mut code_idx = txn.open_table(BUSINESS_BY_CODE_TABLE)?;

            let previous_code = match table.get(business.id)? {
                Some(guard) => Some(serde_json::from_slice::<Business>(guard.value())?.code),
                None => None,
            };
            if let Some(code) = previous_code
                && code != business.code
            {
                code_idx.remove(code.as_str())?;
            }

            let value = serde_json::to_vec(business)?;
            table.insert(business.id, value.as_slice())?;
            code_idx.insert(business.code.as_str(), business.id)?;
        }
        txn.commit()?;
        Ok(())
    }

    pub fn get_business(&self, id: i64) -> PrintStorageResult<Option<Business>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(BUSINESSES_TABLE)?;

        match table.get(id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    pub fn find_business_by_code(&self, code: &str) -> PrintStorageResult<Option<Business>> {
        let read_txn = self.db.begin_read()?;
        let code_idx = read_txn.open_table(BUSINESS_BY_CODE_TABLE)?;
        let table = read_txn.open_table(BUSINESSES_TABLE)?;

        let Some(id) = code_idx.get(code)?.map(|g| g.value()) else {
            return Ok(None);
        };
        match table.get(id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    pub fn upsert_category(&self, category: &Category) -> PrintStorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(CATEGORIES_TABLE)?;
            let value = serde_json::to_vec(category)?;
            table.insert(category.id, value.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Load categories by id, skipping unknown ids
    pub fn get_categories(&self, ids: &[i64]) -> PrintStorageResult<Vec<Category>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CATEGORIES_TABLE)?;

        let mut categories = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(guard) = table.get(*id)? {
                categories.push(serde_json::from_slice(guard.value())?);
            }
        }
        Ok(categories)
    }

    // ========== Printer zones ==========

    /// Store a zone (insert or replace)
    pub fn store_zone(&self, txn: &WriteTransaction, zone: &PrinterZone) -> PrintStorageResult<()> {
        let mut table = txn.open_table(ZONES_TABLE)?;
        let value = serde_json::to_vec(zone)?;
        table.insert(zone.id, value.as_slice())?;

        let mut idx_table = txn.open_table(ZONES_BY_BUSINESS_TABLE)?;
        idx_table.insert((zone.business_id, zone.id), ())?;

        Ok(())
    }

    /// Find a zone of `business_id` with the given name, ignoring `exclude_id`
    ///
    /// Runs inside the write transaction so check and insert are atomic.
    pub fn find_zone_by_name(
        &self,
        txn: &WriteTransaction,
        business_id: i64,
        name: &str,
        exclude_id: Option<i64>,
    ) -> PrintStorageResult<Option<PrinterZone>> {
        let idx_table = txn.open_table(ZONES_BY_BUSINESS_TABLE)?;
        let zones = txn.open_table(ZONES_TABLE)?;

        Ok(zones_of_business(&idx_table, &zones, business_id)?
            .into_iter()
            .find(|z| z.name == name && Some(z.id) != exclude_id))
    }

    pub fn get_zone(&self, id: i64) -> PrintStorageResult<Option<PrinterZone>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ZONES_TABLE)?;

        match table.get(id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Zones of a business, oldest first
    pub fn list_zones(&self, business_id: i64) -> PrintStorageResult<Vec<PrinterZone>> {
        let read_txn = self.db.begin_read()?;
        let idx_table = read_txn.open_table(ZONES_BY_BUSINESS_TABLE)?;
        let zones = read_txn.open_table(ZONES_TABLE)?;

        zones_of_business(&idx_table, &zones, business_id)
    }

    /// Every configured zone, oldest first
    pub fn list_all_zones(&self) -> PrintStorageResult<Vec<PrinterZone>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ZONES_TABLE)?;

        let mut zones: Vec<PrinterZone> = Vec::new();
        for result in table.iter()? {
            let (_, guard) = result?;
            zones.push(serde_json::from_slice(guard.value())?);
        }
        zones.sort_by_key(|z| (z.created_at, z.id));
        Ok(zones)
    }

    /// Pending ticket count for a zone, inside a write transaction
    pub fn pending_count_in(&self, txn: &WriteTransaction, zone_id: i64) -> PrintStorageResult<usize> {
        let idx_table = txn.open_table(TICKETS_BY_ZONE_TABLE)?;
        let tickets = txn.open_table(TICKETS_TABLE)?;
        count_pending(&idx_table, &tickets, zone_id)
    }

    /// Remove a zone. Tickets are kept for history.
    pub fn delete_zone(&self, txn: &WriteTransaction, zone: &PrinterZone) -> PrintStorageResult<()> {
        let mut table = txn.open_table(ZONES_TABLE)?;
        let mut idx_table = txn.open_table(ZONES_BY_BUSINESS_TABLE)?;

        if table.remove(zone.id)?.is_none() {
            return Err(PrintStorageError::ZoneNotFound(zone.id));
        }
        idx_table.remove((zone.business_id, zone.id))?;
        Ok(())
    }

    // ========== Print tickets ==========

    /// Store a new ticket with its encoded content
    pub fn create_ticket(
        &self,
        txn: &WriteTransaction,
        ticket: &PrintTicket,
        content: &[u8],
    ) -> PrintStorageResult<()> {
        let mut table = txn.open_table(TICKETS_TABLE)?;
        let value = serde_json::to_vec(ticket)?;
        table.insert(ticket.id, value.as_slice())?;

        let mut content_table = txn.open_table(TICKET_CONTENT_TABLE)?;
        content_table.insert(ticket.id, content)?;

        let mut idx_table = txn.open_table(TICKETS_BY_ZONE_TABLE)?;
        idx_table.insert((ticket.printer_zone_id, ticket.id), ())?;

        Ok(())
    }

    pub fn get_ticket(&self, id: i64) -> PrintStorageResult<Option<PrintTicket>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TICKETS_TABLE)?;

        match table.get(id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    pub fn get_ticket_content(&self, id: i64) -> PrintStorageResult<Option<Vec<u8>>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TICKET_CONTENT_TABLE)?;

        Ok(table.get(id)?.map(|guard| guard.value().to_vec()))
    }

    /// Tickets of a zone, oldest first, optionally filtered by status
    pub fn list_tickets_for_zone(
        &self,
        zone_id: i64,
        status: Option<TicketStatus>,
    ) -> PrintStorageResult<Vec<PrintTicket>> {
        let read_txn = self.db.begin_read()?;
        let idx_table = read_txn.open_table(TICKETS_BY_ZONE_TABLE)?;
        let data_table = read_txn.open_table(TICKETS_TABLE)?;

        let mut tickets = Vec::new();
        for result in idx_table.range(zone_range(zone_id))? {
            let (key, _) = result?;
            let (_, ticket_id) = key.value();
            if let Some(guard) = data_table.get(ticket_id)? {
                let ticket: PrintTicket = serde_json::from_slice(guard.value())?;
                if status.is_none_or(|s| s == ticket.status) {
                    tickets.push(ticket);
                }
            }
        }

        tickets.sort_by_key(|t| (t.created_at, t.id));
        Ok(tickets)
    }

    /// Read-modify-write a ticket in its own transaction
    ///
    /// `f` returns whether it changed the ticket; unchanged tickets are not
    /// written back.
    fn update_ticket<F>(&self, id: i64, f: F) -> PrintStorageResult<PrintTicket>
    where
        F: FnOnce(&mut PrintTicket) -> bool,
    {
        let txn = self.db.begin_write()?;
        let ticket = {
            let mut table = txn.open_table(TICKETS_TABLE)?;

            // Read first
            let bytes = {
                let value = table
                    .get(id)?
                    .ok_or(PrintStorageError::TicketNotFound(id))?;
                value.value().to_vec()
            };

            let mut ticket: PrintTicket = serde_json::from_slice(&bytes)?;
            if f(&mut ticket) {
                ticket.updated_at = now_millis();
                let new_value = serde_json::to_vec(&ticket)?;
                table.insert(id, new_value.as_slice())?;
            }
            ticket
        };
        txn.commit()?;
        Ok(ticket)
    }

    /// Mark a ticket PRINTED
    pub fn mark_printed(&self, id: i64) -> PrintStorageResult<PrintTicket> {
        self.update_ticket(id, |t| {
            t.status = TicketStatus::Printed;
            true
        })
    }

    /// Mark a ticket FAILED, counting the attempt and keeping the reason
    ///
    /// A ticket already PRINTED (manually, while the attempt was running)
    /// is left as is.
    pub fn mark_failed(&self, id: i64, reason: &str) -> PrintStorageResult<PrintTicket> {
        self.update_ticket(id, |t| {
            if t.status == TicketStatus::Printed {
                return false;
            }
            t.status = TicketStatus::Failed;
            t.retry_count += 1;
            t.last_error = Some(reason.to_string());
            true
        })
    }

    /// FAILED tickets still eligible for a scheduled retry
    ///
    /// `retry_count < max_retries` and last update at or after `since`.
    pub fn retry_candidates(&self, max_retries: u32, since: i64) -> PrintStorageResult<Vec<PrintTicket>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TICKETS_TABLE)?;

        let mut tickets: Vec<PrintTicket> = Vec::new();
        for result in table.iter()? {
            let (_, guard) = result?;
            let ticket: PrintTicket = serde_json::from_slice(guard.value())?;
            if ticket.status == TicketStatus::Failed
                && ticket.retry_count < max_retries
                && ticket.updated_at >= since
            {
                tickets.push(ticket);
            }
        }
        tickets.sort_by_key(|t| (t.updated_at, t.id));
        Ok(tickets)
    }

    // ========== Printer devices ==========

    pub fn get_device(&self, device_id: &str) -> PrintStorageResult<Option<PrinterDevice>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(DEVICES_TABLE)?;

        match table.get(device_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Insert or update a device in one transaction
    ///
    /// `f` receives the stored record, if any, and returns the new one.
    pub fn upsert_device<F>(&self, device_id: &str, f: F) -> PrintStorageResult<PrinterDevice>
    where
        F: FnOnce(Option<PrinterDevice>) -> PrinterDevice,
    {
        let txn = self.db.begin_write()?;
        let device = {
            let mut table = txn.open_table(DEVICES_TABLE)?;
            let existing = match table.get(device_id)? {
                Some(guard) => Some(serde_json::from_slice::<PrinterDevice>(guard.value())?),
                None => None,
            };

            let device = f(existing);
            let value = serde_json::to_vec(&device)?;
            table.insert(device.device_id.as_str(), value.as_slice())?;
            device
        };
        txn.commit()?;
        Ok(device)
    }

    /// Devices of a business
    pub fn list_devices(&self, business_id: i64) -> PrintStorageResult<Vec<PrinterDevice>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(DEVICES_TABLE)?;

        let mut devices: Vec<PrinterDevice> = Vec::new();
        for result in table.iter()? {
            let (_, guard) = result?;
            let device: PrinterDevice = serde_json::from_slice(guard.value())?;
            if device.business_id == business_id {
                devices.push(device);
            }
        }
        Ok(devices)
    }

    /// Devices reporting a printer IP
    ///
    /// Devices whose `printer_ip` matches win; when there are none, devices
    /// whose own address is the printer IP are returned instead.
    pub fn devices_for_ip(&self, ip: &str) -> PrintStorageResult<Vec<PrinterDevice>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(DEVICES_TABLE)?;

        let mut by_printer = Vec::new();
        let mut by_address = Vec::new();
        for result in table.iter()? {
            let (_, guard) = result?;
            let device: PrinterDevice = serde_json::from_slice(guard.value())?;
            if device.printer_ip.as_deref() == Some(ip) {
                by_printer.push(device);
            } else if device.ip_address.as_deref() == Some(ip) {
                by_address.push(device);
            }
        }
        Ok(if by_printer.is_empty() { by_address } else { by_printer })
    }

    /// Apply `f` to every device of a printer IP in one write transaction
    ///
    /// Same device selection as [`devices_for_ip`](Self::devices_for_ip).
    /// Returns the number of devices updated.
    pub fn update_devices_for_ip<F>(&self, ip: &str, mut f: F) -> PrintStorageResult<usize>
    where
        F: FnMut(&mut PrinterDevice),
    {
        let txn = self.db.begin_write()?;
        let updated = {
            let mut table = txn.open_table(DEVICES_TABLE)?;

            let mut by_printer = Vec::new();
            let mut by_address = Vec::new();
            for result in table.iter()? {
                let (_, guard) = result?;
                let device: PrinterDevice = serde_json::from_slice(guard.value())?;
                if device.printer_ip.as_deref() == Some(ip) {
                    by_printer.push(device);
                } else if device.ip_address.as_deref() == Some(ip) {
                    by_address.push(device);
                }
            }

            let mut targets = if by_printer.is_empty() { by_address } else { by_printer };
            for device in &mut targets {
                f(device);
                let value = serde_json::to_vec(device)?;
                table.insert(device.device_id.as_str(), value.as_slice())?;
            }
            targets.len()
        };
        txn.commit()?;
        Ok(updated)
    }

    /// Get storage statistics
    pub fn get_stats(&self) -> PrintStorageResult<PrintStorageStats> {
        let read_txn = self.db.begin_read()?;
        let zones = read_txn.open_table(ZONES_TABLE)?;
        let tickets = read_txn.open_table(TICKETS_TABLE)?;
        let devices = read_txn.open_table(DEVICES_TABLE)?;

        Ok(PrintStorageStats {
            zone_count: zones.len()?,
            ticket_count: tickets.len()?,
            device_count: devices.len()?,
        })
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct PrintStorageStats {
    pub zone_count: u64,
    pub ticket_count: u64,
    pub device_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{ConnectionEvent, ConnectionStatus};
    use std::collections::VecDeque;

    fn zone(id: i64, business_id: i64, name: &str) -> PrinterZone {
        PrinterZone {
            id,
            business_id,
            name: name.to_string(),
            printer_ip: "192.168.1.50".to_string(),
            printer_port: 9100,
            active: true,
            category_ids: vec![],
            created_at: id,
            updated_at: id,
        }
    }

    fn ticket(id: i64, zone_id: i64) -> PrintTicket {
        PrintTicket {
            id,
            ticket_id: format!("uuid-{id}"),
            business_id: 1,
            order_id: "order-1".to_string(),
            printer_zone_id: zone_id,
            status: TicketStatus::Pending,
            retry_count: 0,
            last_error: None,
            content_len: 3,
            created_at: id,
            updated_at: now_millis(),
        }
    }

    fn pending(storage: &PrintStorage, zone_id: i64) -> usize {
        let txn = storage.begin_write().unwrap();
        let count = storage.pending_count_in(&txn, zone_id).unwrap();
        txn.abort().unwrap();
        count
    }

    fn device(id: &str, printer_ip: Option<&str>, ip_address: Option<&str>) -> PrinterDevice {
        PrinterDevice {
            device_id: id.to_string(),
            business_id: 1,
            name: None,
            ip_address: ip_address.map(String::from),
            printer_ip: printer_ip.map(String::from),
            mac_address: None,
            firmware_version: None,
            online: false,
            last_seen: None,
            connection_history: VecDeque::new(),
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_zone_crud_and_name_lookup() {
        let storage = PrintStorage::open_in_memory().unwrap();

        let txn = storage.begin_write().unwrap();
        storage.store_zone(&txn, &zone(1, 10, "Cocina")).unwrap();
        storage.store_zone(&txn, &zone(2, 10, "Barra")).unwrap();
        storage.store_zone(&txn, &zone(3, 20, "Cocina")).unwrap();
        txn.commit().unwrap();

        let zones = storage.list_zones(10).unwrap();
        assert_eq!(zones.len(), 2);
        assert_eq!(zones[0].name, "Cocina");

        let txn = storage.begin_write().unwrap();
        assert!(storage.find_zone_by_name(&txn, 10, "Barra", None).unwrap().is_some());
        assert!(storage.find_zone_by_name(&txn, 10, "Barra", Some(2)).unwrap().is_none());
        assert!(storage.find_zone_by_name(&txn, 10, "Terraza", None).unwrap().is_none());
        storage.delete_zone(&txn, &zone(2, 10, "Barra")).unwrap();
        txn.commit().unwrap();

        assert_eq!(storage.list_zones(10).unwrap().len(), 1);
        assert_eq!(storage.list_all_zones().unwrap().len(), 2);
    }

    #[test]
    fn test_ticket_lifecycle() {
        let storage = PrintStorage::open_in_memory().unwrap();

        let txn = storage.begin_write().unwrap();
        storage.create_ticket(&txn, &ticket(1, 7), b"abc").unwrap();
        storage.create_ticket(&txn, &ticket(2, 7), b"def").unwrap();
        storage.create_ticket(&txn, &ticket(3, 8), b"ghi").unwrap();
        txn.commit().unwrap();

        assert_eq!(pending(&storage, 7), 2);
        assert_eq!(storage.get_ticket_content(2).unwrap().unwrap(), b"def");

        storage.mark_printed(1).unwrap();
        let failed = storage.mark_failed(2, "connection refused").unwrap();
        assert_eq!(failed.retry_count, 1);
        let failed = storage.mark_failed(2, "timeout").unwrap();
        assert_eq!(failed.retry_count, 2);
        assert_eq!(failed.last_error.as_deref(), Some("timeout"));

        assert_eq!(pending(&storage, 7), 0);
        let only_failed = storage
            .list_tickets_for_zone(7, Some(TicketStatus::Failed))
            .unwrap();
        assert_eq!(only_failed.len(), 1);
        assert_eq!(storage.list_tickets_for_zone(7, None).unwrap().len(), 2);

        assert!(matches!(
            storage.mark_printed(99),
            Err(PrintStorageError::TicketNotFound(99))
        ));
    }

    #[test]
    fn test_failure_after_manual_print_keeps_printed() {
        let storage = PrintStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        storage.create_ticket(&txn, &ticket(1, 7), b"abc").unwrap();
        txn.commit().unwrap();

        let printed = storage.mark_printed(1).unwrap();
        let after = storage.mark_failed(1, "connection refused").unwrap();
        assert_eq!(after.status, TicketStatus::Printed);
        assert_eq!(after.retry_count, 0);
        assert!(after.last_error.is_none());

        let stored = storage.get_ticket(1).unwrap().unwrap();
        assert_eq!(stored.status, TicketStatus::Printed);
        assert_eq!(stored.updated_at, printed.updated_at);
    }

    #[test]
    fn test_retry_candidates_respect_cap_and_window() {
        let storage = PrintStorage::open_in_memory().unwrap();

        let txn = storage.begin_write().unwrap();
        storage.create_ticket(&txn, &ticket(1, 7), b"a").unwrap();
        storage.create_ticket(&txn, &ticket(2, 7), b"b").unwrap();
        txn.commit().unwrap();

        for _ in 0..5 {
            storage.mark_failed(1, "offline").unwrap();
        }
        storage.mark_failed(2, "offline").unwrap();

        let candidates = storage.retry_candidates(5, now_millis() - 60_000).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id, 2);

        // outside the window
        let candidates = storage.retry_candidates(5, now_millis() + 60_000).unwrap();
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_business_code_index() {
        let storage = PrintStorage::open_in_memory().unwrap();
        let mut business = Business {
            id: 1,
            code: "BAR01".into(),
            name: "Bar Pepe".into(),
        };
        storage.upsert_business(&business).unwrap();
        assert!(storage.find_business_by_code("BAR01").unwrap().is_some());

        business.code = "BAR02".into();
        storage.upsert_business(&business).unwrap();
        assert!(storage.find_business_by_code("BAR01").unwrap().is_none());
        assert_eq!(storage.find_business_by_code("BAR02").unwrap().unwrap().id, 1);
    }

    #[test]
    fn test_update_devices_for_ip_with_fallback() {
        let storage = PrintStorage::open_in_memory().unwrap();
        storage
            .upsert_device("a", |_| device("a", Some("10.0.0.50"), Some("10.0.0.9")))
            .unwrap();
        storage
            .upsert_device("b", |_| device("b", Some("10.0.0.50"), Some("10.0.0.8")))
            .unwrap();
        storage
            .upsert_device("c", |_| device("c", None, Some("10.0.0.60")))
            .unwrap();

        let n = storage
            .update_devices_for_ip("10.0.0.50", |d| {
                d.set_online(true, 1);
                d.record(ConnectionEvent {
                    timestamp: 1,
                    status: ConnectionStatus::Connected,
                    details: None,
                });
            })
            .unwrap();
        assert_eq!(n, 2);
        assert!(storage.get_device("a").unwrap().unwrap().online);
        assert!(storage.get_device("b").unwrap().unwrap().online);
        assert!(!storage.get_device("c").unwrap().unwrap().online);

        // embedded printer: matched by its own address
        let n = storage.update_devices_for_ip("10.0.0.60", |d| {
            d.set_online(true, 2);
        });
        assert_eq!(n.unwrap(), 1);
        assert!(storage.get_device("c").unwrap().unwrap().online);

        assert_eq!(storage.update_devices_for_ip("10.9.9.9", |_| {}).unwrap(), 0);
    }
}
