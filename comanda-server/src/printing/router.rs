//! Zone router
//!
//! Turns a finalized order into one ticket per zone, persists the tickets and
//! makes the first delivery attempt. Zones are handled concurrently and a
//! failing zone never blocks the others.

use futures::future::join_all;
use shared::error::{AppError, ErrorCode};
use shared::models::{Business, FinalizedOrder, Order, PrintTicket, TicketStatus};
use shared::util::{new_uuid, now_millis, snowflake_id};
use thiserror::Error;
use tracing::instrument;

use super::dispatch::Dispatcher;
use super::renderer::{TicketContext, TicketRenderer};
use super::routing::{ZoneAssignment, plan_routes};
use super::storage::{PrintStorage, PrintStorageError};
use super::types::{DeliveryOutcome, RouteSummary, RoutedTicket, ZoneError};

#[derive(Debug, Error)]
pub enum RouteError {
    #[error(transparent)]
    Storage(#[from] PrintStorageError),

    #[error("Business not found: {0}")]
    BusinessNotFound(i64),
}

impl From<RouteError> for AppError {
    fn from(err: RouteError) -> Self {
        match err {
            RouteError::Storage(e) => e.into(),
            RouteError::BusinessNotFound(id) => {
                AppError::new(ErrorCode::BusinessNotFound).with_detail("business_id", id)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ZoneRouter {
    storage: PrintStorage,
    dispatcher: Dispatcher,
    renderer: TicketRenderer,
}

impl ZoneRouter {
    pub fn new(storage: PrintStorage, dispatcher: Dispatcher, renderer: TicketRenderer) -> Self {
        Self {
            storage,
            dispatcher,
            renderer,
        }
    }

    /// Route a finalized order to its printer zones
    ///
    /// Fails only when the business is unknown or its zones cannot be read.
    /// Per-zone problems are reported in the summary.
    #[instrument(skip_all, fields(order_id = %finalized.order.id, business_id = finalized.order.business_id))]
    pub async fn process_order(&self, finalized: &FinalizedOrder) -> Result<RouteSummary, RouteError> {
        let order = &finalized.order;
        let business = self
            .storage
            .get_business(order.business_id)?
            .ok_or(RouteError::BusinessNotFound(order.business_id))?;

        let zones = self.storage.list_zones(business.id)?;
        let plan = plan_routes(&zones, &finalized.items);

        if plan.is_empty() {
            tracing::info!("No active printer zones for this order, nothing to print");
            return Ok(RouteSummary {
                success: true,
                ..Default::default()
            });
        }

        let results = join_all(
            plan.iter()
                .map(|assignment| self.process_zone(&business, order, assignment)),
        )
        .await;

        let mut summary = RouteSummary::default();
        for result in results {
            match result {
                Ok(ticket) => {
                    if let Some(error) = &ticket.error {
                        summary.errors.push(ZoneError {
                            zone: ticket.zone_name.clone(),
                            error: error.clone(),
                        });
                    }
                    summary.tickets.push(ticket);
                }
                Err(error) => summary.errors.push(error),
            }
        }
        summary.success = summary.errors.is_empty();

        tracing::info!(
            tickets = summary.tickets.len(),
            errors = summary.errors.len(),
            "Order routed"
        );
        Ok(summary)
    }

    /// Encode, persist and deliver the ticket of one zone
    async fn process_zone(
        &self,
        business: &Business,
        order: &Order,
        assignment: &ZoneAssignment<'_>,
    ) -> Result<RoutedTicket, ZoneError> {
        let zone = assignment.zone;
        let zone_error = |error: String| {
            tracing::error!(zone = %zone.name, error = %error, "Zone ticket not created");
            ZoneError {
                zone: zone.name.clone(),
                error,
            }
        };

        let content = self.renderer.render(&TicketContext {
            business_name: &business.name,
            zone_name: &zone.name,
            order,
            items: &assignment.items,
            companion_notice: assignment.companion_notice,
        })
        .map_err(|e| zone_error(e.to_string()))?;

        let now = now_millis();
        let ticket = PrintTicket {
            id: snowflake_id(),
            ticket_id: new_uuid(),
            business_id: business.id,
            order_id: order.id.clone(),
            printer_zone_id: zone.id,
            status: TicketStatus::Pending,
            retry_count: 0,
            last_error: None,
            content_len: content.len(),
            created_at: now,
            updated_at: now,
        };

        let persisted = self.storage.begin_write().and_then(|txn| {
            self.storage.create_ticket(&txn, &ticket, &content)?;
            txn.commit()?;
            Ok(())
        });
        persisted.map_err(|e| zone_error(e.to_string()))?;

        tracing::debug!(
            zone = %zone.name,
            rule = ?assignment.rule,
            items = assignment.items.len(),
            bytes = content.len(),
            "Ticket created"
        );

        let (printed, error) = match self.dispatcher.deliver(ticket.id).await {
            Ok(DeliveryOutcome::Failed(reason)) => (false, Some(reason)),
            Ok(outcome) => (outcome.is_printed(), None),
            Err(e) => (false, Some(e.to_string())),
        };

        Ok(RoutedTicket {
            id: ticket.id,
            ticket_id: ticket.ticket_id,
            zone_id: zone.id,
            zone_name: zone.name.clone(),
            item_count: assignment.items.len(),
            printed,
            error,
        })
    }
}
