//! Time and timestamp helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp used for `created`, `updated`, event times, etc.
///
/// Bumping `updated` on a service instance is what marks it dirty for the
/// synchronizer.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Parse an RFC 3339 string as stored by adapters back into a [`Timestamp`].
///
/// # Errors
///
/// Returns [`chrono::ParseError`] when `value` is not valid RFC 3339.
pub fn parse_rfc3339(value: &str) -> Result<Timestamp, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value).map(|ts| ts.to_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_return_current_utc_time() {
        let before = Utc::now();
        let ts = now();
        let after = Utc::now();
        assert!(ts >= before);
        assert!(ts <= after);
    }

    #[test]
    fn should_parse_what_to_rfc3339_produces() {
        let ts = now();
        let parsed = parse_rfc3339(&ts.to_rfc3339()).unwrap();
        assert_eq!(parsed, ts);
    }

    #[test]
    fn should_reject_garbage_timestamp() {
        assert!(parse_rfc3339("yesterday").is_err());
    }
}
