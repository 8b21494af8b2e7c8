//! Printer Zone Model

use super::business::CategoryRef;
use serde::{Deserialize, Serialize};

/// Raw TCP port used by ESC/POS network printers
pub const DEFAULT_PRINTER_PORT: u16 = 9100;

/// Maximum zone name length (after trimming)
pub const MAX_ZONE_NAME_LEN: usize = 50;

/// Printer zone entity (a group of categories printed at one station)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterZone {
    pub id: i64,
    pub business_id: i64,
    pub name: String,
    pub printer_ip: String,
    pub printer_port: u16,
    /// Admin toggle. Liveness checks never change it.
    pub active: bool,
    /// Empty means catch-all zone
    pub category_ids: Vec<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl PrinterZone {
    /// Zone without category restriction
    pub fn is_catch_all(&self) -> bool {
        self.category_ids.is_empty()
    }

    /// Whether items of `category_id` print at this zone by category match
    pub fn matches_category(&self, category_id: Option<i64>) -> bool {
        category_id.is_some_and(|id| self.category_ids.contains(&id))
    }
}

fn default_port() -> u16 {
    DEFAULT_PRINTER_PORT
}

fn default_true() -> bool {
    true
}

/// Create printer zone payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrinterZoneCreate {
    pub business_id: i64,
    pub name: String,
    pub printer_ip: String,
    #[serde(default = "default_port")]
    pub printer_port: u16,
    #[serde(default)]
    pub category_ids: Vec<i64>,
    #[serde(default = "default_true")]
    pub active: bool,
}

/// Update printer zone payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrinterZoneUpdate {
    pub name: Option<String>,
    pub printer_ip: Option<String>,
    pub printer_port: Option<u16>,
    pub category_ids: Option<Vec<i64>>,
    pub active: Option<bool>,
}

/// Zone with category names resolved (listing view)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrinterZoneDetail {
    #[serde(flatten)]
    pub zone: PrinterZone,
    pub categories: Vec<CategoryRef>,
}
