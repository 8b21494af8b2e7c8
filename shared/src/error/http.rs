//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::BusinessNotFound
            | Self::CategoryNotFound
            | Self::ZoneNotFound
            | Self::TicketNotFound
            | Self::TicketContentMissing
            | Self::DeviceNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::ZoneNameExists
            | Self::ZoneHasPendingTickets
            | Self::TicketInFlight => StatusCode::CONFLICT,

            // 503 Service Unavailable (transient errors, client can retry)
            Self::NetworkError
            | Self::TimeoutError
            | Self::PrinterNotAvailable => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError
            | Self::PrintFailed => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (default for validation errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
