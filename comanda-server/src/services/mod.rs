//! Service layer
//!
//! - [`CatalogService`] - business directory pushed by the ordering platform
//! - [`ZoneRegistry`] - printer zone administration
//! - [`TicketService`] - ticket listings and manual overrides
//! - [`DeviceRegistry`] - device registration, status and on-demand checks

pub mod catalog;
pub mod devices;
pub mod tickets;
pub mod zones;

pub use catalog::CatalogService;
pub use devices::{DEFAULT_CHECK_INTERVAL_MS, DeviceRegistry};
pub use tickets::{TicketRetryResult, TicketService};
pub use zones::ZoneRegistry;
