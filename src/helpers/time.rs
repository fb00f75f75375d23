use std::fmt::Debug;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use tracing::warn;

use crate::errors::TokenError;

/// Layout of `expireTime` in generateAccessToken responses.
pub const EXPIRE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

static EXPIRE_TIME_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}Z$").expect("valid regex"));

static FRACTIONAL_SECONDS_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d+Z$").expect("valid regex")
});

/// Source of "now" for expiry decisions.
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Parse an expiry timestamp in strict `YYYY-MM-DDTHH:MM:SSZ` form.
///
/// Fractional seconds and offsets other than `Z` are rejected, not truncated.
pub fn parse_expire_time(value: &str) -> Result<DateTime<Utc>, TokenError> {
    if !EXPIRE_TIME_SHAPE.is_match(value) {
        if FRACTIONAL_SECONDS_SHAPE.is_match(value) {
            warn!(
                expire_time = %value,
                "expiry carries fractional seconds, rejecting it; upstream may have changed its timestamp format"
            );
        }
        return Err(TokenError::TimestampMalformed {
            value: value.to_owned(),
        });
    }
    NaiveDateTime::parse_from_str(value, EXPIRE_TIME_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| TokenError::TimestampMalformed {
            value: value.to_owned(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn strict_format_is_accepted() {
        let parsed = parse_expire_time("2025-01-01T00:10:00Z").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 1, 1, 0, 10, 0).unwrap());
    }

    #[test]
    fn fractional_seconds_are_rejected() {
        let err = parse_expire_time("2025-01-01T00:10:00.500Z").unwrap_err();
        assert_eq!(
            err,
            TokenError::TimestampMalformed {
                value: "2025-01-01T00:10:00.500Z".into()
            }
        );
    }

    #[test]
    fn other_layouts_are_rejected() {
        for value in [
            "2025-01-01T00:10:00+00:00",
            "2025-01-01 00:10:00Z",
            "2025-1-1T0:10:00Z",
            "2025-13-01T00:10:00Z",
            "",
        ] {
            assert!(
                matches!(parse_expire_time(value), Err(TokenError::TimestampMalformed { .. })),
                "{value} should be rejected"
            );
        }
    }
}
