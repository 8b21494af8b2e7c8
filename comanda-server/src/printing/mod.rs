//! Ticket Printing Module
//!
//! Finalized orders are split per printer zone, encoded as ESC/POS tickets,
//! stored and pushed to the zone printers over raw TCP:
//! - routing: which items print at which zone
//! - renderer: ticket layout
//! - dispatch: delivery and device status bookkeeping
//! - health: liveness probes and scheduled retries

pub mod dispatch;
pub mod health;
pub mod renderer;
pub mod router;
pub mod routing;
pub mod storage;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use dispatch::{DispatchError, Dispatcher};
pub use health::{DeviceHealthMonitor, LivenessReport, MonitorSettings, RetryReport};
pub use renderer::{TicketContext, TicketRenderer};
pub use router::{RouteError, ZoneRouter};
pub use routing::{RouteRule, ZoneAssignment, plan_routes};
pub use storage::{PrintStorage, PrintStorageError, PrintStorageResult, PrintStorageStats};
pub use types::*;
