//! Print Ticket Model

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ticket lifecycle
///
/// `Pending -> Printed | Failed`, `Failed -> Printed | Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    Pending,
    Printed,
    Failed,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Printed => "PRINTED",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Print ticket record (one per order and zone)
///
/// The encoded bytes are stored apart from the record; `content_len`
/// tells whether they exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintTicket {
    pub id: i64,
    /// Independently generated job id (UUID v4)
    pub ticket_id: String,
    pub business_id: i64,
    pub order_id: String,
    pub printer_zone_id: i64,
    pub status: TicketStatus,
    pub retry_count: u32,
    pub last_error: Option<String>,
    pub content_len: usize,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Ticket summary returned by listings (content withheld)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketSummary {
    pub id: i64,
    pub ticket_id: String,
    pub order_id: String,
    pub status: TicketStatus,
    pub retry_count: u32,
    pub last_error: Option<String>,
    pub created_at: i64,
    pub content_available: bool,
}

impl From<&PrintTicket> for TicketSummary {
    fn from(t: &PrintTicket) -> Self {
        Self {
            id: t.id,
            ticket_id: t.ticket_id.clone(),
            order_id: t.order_id.clone(),
            status: t.status,
            retry_count: t.retry_count,
            last_error: t.last_error.clone(),
            created_at: t.created_at,
            content_available: t.content_len > 0,
        }
    }
}
