//! # comanda-printer
//!
//! ESC/POS thermal printer library - low-level printing capabilities only.
//!
//! ## Scope
//!
//! This crate handles HOW to print:
//! - ESC/POS command building
//! - ASCII transliteration for Western code pages
//! - Fixed-width column layout
//! - Network printing (TCP port 9100)
//!
//! Business logic (WHAT to print) stays in the server crate.
//!
//! ## Example
//!
//! ```ignore
//! use comanda_printer::{Column, EscPosBuilder, NetworkPrinter, Printer};
//!
//! let mut builder = EscPosBuilder::new(48);
//! builder.center().double_height().bold().line("COCINA");
//! builder.normal().left().sep_double();
//! builder.columns(&[Column::left("2", 5), Column::left("Pizza", 31), Column::right("16.00€", 12)]);
//! builder.cut();
//!
//! let printer = NetworkPrinter::new("192.168.1.100", 9100)?;
//! printer.print(&builder.build()).await?;
//! ```

mod encoding;
mod error;
mod escpos;
mod printer;

// Re-exports
pub use encoding::{PLACEHOLDER, blank_controls, convert_to_ascii, pad, transliterate, truncate_ellipsis};
pub use error::{PrintError, PrintResult};
pub use escpos::{Column, EscPosBuilder, mode};
pub use printer::{DEFAULT_PRINT_TIMEOUT, DEFAULT_PROBE_TIMEOUT, NetworkPrinter, Printer};
