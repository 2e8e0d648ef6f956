//! strftime-style formatting and parsing that never panics on a bad pattern.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Date part appended to the full version.
pub const VERSION_DATE_PATTERN: &str = "%Y%m%d";

/// Layout of every date in the XML report.
pub const XML_DATE_PATTERN: &str = "%Y-%m-%dT%H:%M:%S";

/// True when `pattern` contains no unrecognized specifier.
pub fn is_valid_pattern(pattern: &str) -> bool {
    !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error))
}

/// Format `date` with `pattern`, or `None` when the pattern is invalid.
pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>, pattern: &str) -> Option<String>
where
    Tz::Offset: std::fmt::Display,
{
    is_valid_pattern(pattern).then(|| date.format(pattern).to_string())
}

/// Parse `value` with `pattern`.
///
/// Accepts patterns with an offset, with a time but no offset (read as UTC)
/// and date-only patterns (midnight).
pub fn parse_date(value: &str, pattern: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_str(value, pattern) {
        return Some(dt.with_timezone(&Utc).naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, pattern) {
        return Some(dt);
    }
    NaiveDate::parse_from_str(value, pattern)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parse `value` with `pattern` into a UTC timestamp.
pub fn parse_utc(value: &str, pattern: &str) -> Option<DateTime<Utc>> {
    parse_date(value, pattern).map(|naive| naive.and_utc())
}
