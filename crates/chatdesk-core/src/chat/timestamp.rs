//! Text message timestamp encoding.
//!
//! Text messages persist their timestamps as strings inside the chat
//! document; voice records use a native integer instant. Both are unified on
//! `DateTime<Utc>` at the store boundary using these helpers.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use tracing::warn;

/// Encode a text message timestamp (RFC 3339, millisecond precision, `Z`).
pub fn format_text_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Decode a stored text message timestamp.
///
/// Accepts RFC 3339 with any offset, and offset-less `YYYY-MM-DD HH:MM:SS[.fff]`
/// which is read as UTC. Anything else decodes to [`DateTime::<Utc>::MIN_UTC`]
/// so the message still takes part in ordering (it sorts first) instead of
/// aborting the whole read.
pub fn parse_text_timestamp(raw: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return naive.and_utc();
    }
    warn!(raw = %raw, "Unparseable text message timestamp, ordering it first");
    DateTime::<Utc>::MIN_UTC
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_then_parse_preserves_millis() {
        let dt = Utc.timestamp_millis_opt(1_714_557_600_123).unwrap();
        let raw = format_text_timestamp(&dt);
        assert_eq!(raw, "2024-05-01T10:00:00.123Z");
        assert_eq!(parse_text_timestamp(&raw), dt);
    }

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let parsed = parse_text_timestamp("2024-05-01T17:00:00+07:00");
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_naive_as_utc() {
        let parsed = parse_text_timestamp("2024-05-01 10:00:00");
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_garbage_is_minimum_instant() {
        assert_eq!(parse_text_timestamp("yesterday-ish"), DateTime::<Utc>::MIN_UTC);
        assert_eq!(parse_text_timestamp(""), DateTime::<Utc>::MIN_UTC);
    }
}
