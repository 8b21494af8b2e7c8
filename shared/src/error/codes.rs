//! Unified error codes for the Comanda print engine
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Business directory errors
//! - 2xxx: Printer zone errors
//! - 3xxx: Print ticket errors
//! - 4xxx: Printer device errors
//! - 5xxx: Order errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Business ====================
    /// Business not found
    BusinessNotFound = 1001,
    /// Category not found
    CategoryNotFound = 1002,
    /// Category belongs to another business
    CategoryNotInBusiness = 1003,

    // ==================== 2xxx: Zone ====================
    /// Printer zone not found
    ZoneNotFound = 2001,
    /// Zone name already exists in this business
    ZoneNameExists = 2002,
    /// Zone still has pending tickets
    ZoneHasPendingTickets = 2003,
    /// Printer IP is not a valid IPv4 address
    InvalidIpAddress = 2004,
    /// Printer port out of range
    InvalidPort = 2005,
    /// Zone is disabled
    ZoneInactive = 2006,

    // ==================== 3xxx: Ticket ====================
    /// Print ticket not found
    TicketNotFound = 3001,
    /// Print ticket has no content
    TicketContentMissing = 3002,
    /// Ticket is already being delivered
    TicketInFlight = 3003,
    /// Only FAILED tickets can be retried manually
    TicketNotRetryable = 3004,

    // ==================== 4xxx: Device ====================
    /// Printer device not found
    DeviceNotFound = 4001,

    // ==================== 5xxx: Order ====================
    /// Order has no items
    OrderEmpty = 5001,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Operation timed out
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
    /// Printer not available
    PrinterNotAvailable = 9201,
    /// Print operation failed
    PrintFailed = 9202,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Business
            ErrorCode::BusinessNotFound => "Business not found",
            ErrorCode::CategoryNotFound => "Category not found",
            ErrorCode::CategoryNotInBusiness => "Category does not belong to this business",

            // Zone
            ErrorCode::ZoneNotFound => "Printer zone not found",
            ErrorCode::ZoneNameExists => "A zone with this name already exists",
            ErrorCode::ZoneHasPendingTickets => "Zone has pending tickets",
            ErrorCode::InvalidIpAddress => "Invalid printer IP address",
            ErrorCode::InvalidPort => "Invalid printer port",
            ErrorCode::ZoneInactive => "Printer zone is inactive",

            // Ticket
            ErrorCode::TicketNotFound => "Print ticket not found",
            ErrorCode::TicketContentMissing => "Ticket content not available",
            ErrorCode::TicketInFlight => "Ticket is already being printed",
            ErrorCode::TicketNotRetryable => "Only failed tickets can be retried",

            // Device
            ErrorCode::DeviceNotFound => "Printer device not found",

            // Order
            ErrorCode::OrderEmpty => "Order has no items",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::PrinterNotAvailable => "Printer is not available",
            ErrorCode::PrintFailed => "Print operation failed",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Business
            1001 => Ok(ErrorCode::BusinessNotFound),
            1002 => Ok(ErrorCode::CategoryNotFound),
            1003 => Ok(ErrorCode::CategoryNotInBusiness),

            // Zone
            2001 => Ok(ErrorCode::ZoneNotFound),
            2002 => Ok(ErrorCode::ZoneNameExists),
            2003 => Ok(ErrorCode::ZoneHasPendingTickets),
            2004 => Ok(ErrorCode::InvalidIpAddress),
            2005 => Ok(ErrorCode::InvalidPort),
            2006 => Ok(ErrorCode::ZoneInactive),

            // Ticket
            3001 => Ok(ErrorCode::TicketNotFound),
            3002 => Ok(ErrorCode::TicketContentMissing),
            3003 => Ok(ErrorCode::TicketInFlight),
            3004 => Ok(ErrorCode::TicketNotRetryable),

            // Device
            4001 => Ok(ErrorCode::DeviceNotFound),

            // Order
            5001 => Ok(ErrorCode::OrderEmpty),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),
            9201 => Ok(ErrorCode::PrinterNotAvailable),
            9202 => Ok(ErrorCode::PrintFailed),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
