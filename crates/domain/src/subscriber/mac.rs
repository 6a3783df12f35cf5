//! MAC address format check.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ValidationError;

// Six hex octets with one consistent separator (`:` or `-`) or none at all.
static MAC_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[0-9a-f]{2}(?::[0-9a-f]{2}){5}|[0-9a-f]{2}(?:-[0-9a-f]{2}){5}|[0-9a-f]{12})$")
        .unwrap_or_else(|err| unreachable!("static MAC pattern must compile: {err}"))
});

/// Check that `value` is a 12-hex-digit MAC address, case-insensitively.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidMacAddress`] carrying the original value.
pub fn validate_mac_address(value: &str) -> Result<(), ValidationError> {
    if MAC_ADDRESS.is_match(&value.to_ascii_lowercase()) {
        Ok(())
    } else {
        Err(ValidationError::InvalidMacAddress(value.to_string()))
    }
}
