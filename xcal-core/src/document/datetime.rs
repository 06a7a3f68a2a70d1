//! DATE / DATE-TIME values as they appear in property text.

use chrono::{NaiveDate, NaiveDateTime};

/// Parse `YYYYMMDDTHHMMSS[Z]` or `YYYYMMDD` (midnight). Zone suffixes and
/// TZID parameters are ignored: times are compared as wall-clock values.
pub fn parse_ics_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    let value = value.strip_suffix('Z').unwrap_or(value);

    NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y%m%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Render a start time for the detail view (`2016-04-04 09:30:00`).
/// Unparseable values are shown as-is.
pub fn format_detail_time(value: &str) -> String {
    match parse_ics_datetime(value) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => value.to_string(),
    }
}
