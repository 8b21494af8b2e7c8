//! Input validation helpers
//!
//! Centralized text length constants and validation functions used by the
//! CRUD handlers.

use std::net::Ipv4Addr;

use shared::error::ErrorCode;
use shared::models::MAX_ZONE_NAME_LEN;

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Business and category names
pub const MAX_NAME_LEN: usize = 200;

/// Short identifiers: business code, device id, MAC address, firmware
pub const MAX_SHORT_TEXT_LEN: usize = 100;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.chars().count() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.chars().count()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.chars().count() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.chars().count()
        )));
    }
    Ok(())
}

/// Trim a zone name and check its length (1..=50 after trimming)
pub fn normalize_zone_name(name: &str) -> Result<String, AppError> {
    let trimmed = name.trim();
    validate_required_text(trimmed, "name", MAX_ZONE_NAME_LEN)?;
    Ok(trimmed.to_string())
}

/// Parse a dotted-quad IPv4 literal, each octet 0..=255
pub fn validate_ipv4(ip: &str) -> Result<String, AppError> {
    let trimmed = ip.trim();
    trimmed
        .parse::<Ipv4Addr>()
        .map(|addr| addr.to_string())
        .map_err(|_| {
            AppError::with_message(
                ErrorCode::InvalidIpAddress,
                format!("Invalid IPv4 address: {ip}"),
            )
            .with_detail("printer_ip", ip)
        })
}

/// Port 0 is never a printer
pub fn validate_port(port: u16) -> Result<u16, AppError> {
    if port == 0 {
        return Err(AppError::with_message(
            ErrorCode::InvalidPort,
            "Printer port must be between 1 and 65535",
        ));
    }
    Ok(port)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_name_is_trimmed() {
        assert_eq!(normalize_zone_name("  Cocina ").unwrap(), "Cocina");
        assert!(normalize_zone_name("   ").is_err());
        assert!(normalize_zone_name(&"x".repeat(50)).is_ok());
        assert!(normalize_zone_name(&"x".repeat(51)).is_err());
        // length counts characters, not bytes
        assert!(normalize_zone_name(&"ñ".repeat(50)).is_ok());
    }

    #[test]
    fn test_ipv4() {
        assert_eq!(validate_ipv4("192.168.1.50").unwrap(), "192.168.1.50");
        assert_eq!(validate_ipv4(" 10.0.0.1 ").unwrap(), "10.0.0.1");

        let err = validate_ipv4("300.1.1.1").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidIpAddress);
        assert!(validate_ipv4("192.168.1").is_err());
        assert!(validate_ipv4("printer.local").is_err());
        assert!(validate_ipv4("::1").is_err());
    }

    #[test]
    fn test_port() {
        assert_eq!(validate_port(9100).unwrap(), 9100);
        assert_eq!(validate_port(0).unwrap_err().code, ErrorCode::InvalidPort);
    }

    #[test]
    fn test_optional_text() {
        assert!(validate_optional_text(&None, "mac", 5).is_ok());
        assert!(validate_optional_text(&Some("abcdef".into()), "mac", 5).is_err());
    }
}
