//! Ticket administration: listings, raw content, manual overrides

use serde::Serialize;
use shared::error::ErrorCode;
use shared::models::{PrintTicket, TicketStatus, TicketSummary};

use crate::printing::{DeliveryOutcome, Dispatcher, PrintStorage};
use crate::utils::{AppError, AppResult};

/// Result of a manual retry
#[derive(Debug, Clone, Serialize)]
pub struct TicketRetryResult {
    pub ticket: TicketSummary,
    pub printed: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TicketService {
    storage: PrintStorage,
    dispatcher: Dispatcher,
}

impl TicketService {
    pub fn new(storage: PrintStorage, dispatcher: Dispatcher) -> Self {
        Self { storage, dispatcher }
    }

    fn load(&self, id: i64) -> AppResult<PrintTicket> {
        self.storage
            .get_ticket(id)?
            .ok_or_else(|| AppError::new(ErrorCode::TicketNotFound).with_detail("id", id))
    }

    /// Ticket summaries of a zone, oldest first
    pub fn list_for_zone(&self, zone_id: i64, status: Option<TicketStatus>) -> AppResult<Vec<TicketSummary>> {
        let tickets = self.storage.list_tickets_for_zone(zone_id, status)?;
        Ok(tickets.iter().map(TicketSummary::from).collect())
    }

    /// Stored ESC/POS bytes of a ticket
    pub fn content(&self, id: i64) -> AppResult<Vec<u8>> {
        self.load(id)?;
        match self.storage.get_ticket_content(id)? {
            Some(bytes) if !bytes.is_empty() => Ok(bytes),
            _ => Err(AppError::new(ErrorCode::TicketContentMissing).with_detail("id", id)),
        }
    }

    /// Operator confirmation that the ticket came out of the printer
    pub fn mark_printed(&self, id: i64) -> AppResult<TicketSummary> {
        let ticket = self.storage.mark_printed(id)?;
        tracing::info!(ticket = id, order_id = %ticket.order_id, "Ticket marked printed manually");
        Ok(TicketSummary::from(&ticket))
    }

    /// Deliver a FAILED ticket again now, regardless of retry count and age
    ///
    /// A PRINTED ticket is a successful no-op; PENDING tickets are still
    /// owned by their first delivery attempt and are refused.
    pub async fn retry(&self, id: i64) -> AppResult<TicketRetryResult> {
        let ticket = self.load(id)?;
        if ticket.status == TicketStatus::Pending {
            return Err(AppError::new(ErrorCode::TicketNotRetryable)
                .with_detail("id", id)
                .with_detail("status", "PENDING"));
        }
        let outcome = self.dispatcher.deliver(id).await?;
        let ticket = self.load(id)?;

        let (printed, error) = match outcome {
            DeliveryOutcome::Failed(reason) => (false, Some(reason)),
            other => (other.is_printed(), None),
        };
        tracing::info!(ticket = id, printed, "Manual retry finished");

        Ok(TicketRetryResult {
            ticket: TicketSummary::from(&ticket),
            printed,
            error,
        })
    }
}
