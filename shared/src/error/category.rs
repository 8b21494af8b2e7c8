//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Business directory errors
/// - 2xxx: Printer zone errors
/// - 3xxx: Print ticket errors
/// - 4xxx: Printer device errors
/// - 5xxx: Order errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Business directory errors (1xxx)
    Business,
    /// Printer zone errors (2xxx)
    Zone,
    /// Print ticket errors (3xxx)
    Ticket,
    /// Printer device errors (4xxx)
    Device,
    /// Order errors (5xxx)
    Order,
    /// System errors (6xxx and above)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Business,
            2000..3000 => Self::Zone,
            3000..4000 => Self::Ticket,
            4000..5000 => Self::Device,
            5000..6000 => Self::Order,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Business => "business",
            Self::Zone => "zone",
            Self::Ticket => "ticket",
            Self::Device => "device",
            Self::Order => "order",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code() {
        assert_eq!(ErrorCategory::from_code(0), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(999), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(1001), ErrorCategory::Business);
        assert_eq!(ErrorCategory::from_code(2003), ErrorCategory::Zone);
        assert_eq!(ErrorCategory::from_code(3001), ErrorCategory::Ticket);
        assert_eq!(ErrorCategory::from_code(4001), ErrorCategory::Device);
        assert_eq!(ErrorCategory::from_code(5001), ErrorCategory::Order);
        assert_eq!(ErrorCategory::from_code(9001), ErrorCategory::System);
        assert_eq!(ErrorCategory::from_code(10000), ErrorCategory::System);
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::Success.category(), ErrorCategory::General);
        assert_eq!(ErrorCode::ZoneHasPendingTickets.category(), ErrorCategory::Zone);
        assert_eq!(ErrorCode::TicketNotFound.category(), ErrorCategory::Ticket);
        assert_eq!(ErrorCode::PrintFailed.category(), ErrorCategory::System);
    }

    #[test]
    fn test_category_serialize() {
        let json = serde_json::to_string(&ErrorCategory::Zone).unwrap();
        assert_eq!(json, "\"zone\"");

        let category: ErrorCategory = serde_json::from_str("\"system\"").unwrap();
        assert_eq!(category, ErrorCategory::System);
    }
}
