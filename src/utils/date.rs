//! Front matter dates.

use chrono::{DateTime, FixedOffset, NaiveDate};

/// Parse "YYYY-MM-DD" or an RFC 3339 timestamp (fractional seconds allowed).
///
/// Date-only values are taken as midnight UTC.
pub fn parse_date(s: &str) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().fixed_offset())
}

/// Long human form, e.g. "March 16, 2020".
pub fn display_date(dt: &DateTime<FixedOffset>) -> String {
    dt.format("%B %-d, %Y").to_string()
}

/// RFC 2822 form used by the feed.
pub fn rfc2822(dt: &DateTime<FixedOffset>) -> String {
    dt.to_rfc2822()
}
