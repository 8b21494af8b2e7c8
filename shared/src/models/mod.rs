//! Data models
//!
//! Shared between the print server and its API clients.
//! Entity IDs are `i64` snowflakes; timestamps are Unix millis.

pub mod business;
pub mod order;
pub mod print_ticket;
pub mod printer_device;
pub mod printer_zone;

// Re-exports
pub use business::*;
pub use order::*;
pub use print_ticket::*;
pub use printer_device::*;
pub use printer_zone::*;
