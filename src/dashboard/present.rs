//! Display helpers for dashboard rows

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::models::DEFAULT_VACCINATION_STATUS;

pub const VACCINATED_ICON: &str = "✔";
pub const ATTENTION_ICON: &str = "⚠";

/// Shown for dates that cannot be parsed
pub const INVALID_DATE: &str = "Invalid Date";

/// Check mark for exactly "Up to Date", a warning sign for anything else
pub fn vaccination_icon(status: &str) -> &'static str {
    if status == DEFAULT_VACCINATION_STATUS {
        VACCINATED_ICON
    } else {
        ATTENTION_ICON
    }
}

/// Formats an ISO-8601 date or timestamp as day, short month and year,
/// e.g. `2024-03-05` becomes `05 Mar 2024`.
///
/// Timestamps keep the calendar date of their own offset.
pub fn format_date(date: &str) -> String {
    parse_date(date.trim())
        .map(|d| d.format("%d %b %Y").to_string())
        .unwrap_or_else(|| INVALID_DATE.to_string())
}

fn parse_date(date: &str) -> Option<NaiveDate> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(date) {
        return Some(timestamp.date_naive());
    }
    if let Ok(timestamp) = NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(timestamp.date());
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}
