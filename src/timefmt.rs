//! Datetime parsing and relative-time labels.
//!
//! The feed stamps events with a fixed `DD Month YYYY - HH:MM AM/PM` string.
//! Parse failures degrade to `"Unknown"` labels, never errors: a bad stamp
//! only affects its own row.

use chrono::{Datelike, NaiveDate, NaiveDateTime};

/// Fixed event timestamp format, e.g. `15 March 2024 - 02:30 PM`.
const EVENT_DATETIME_FORMAT: &str = "%d %B %Y - %I:%M %p";

/// Parse an event timestamp. `None` when the string does not match the
/// fixed format.
#[must_use]
pub fn parse_event_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), EVENT_DATETIME_FORMAT).ok()
}

/// Relative "time ago" label for an event timestamp.
///
/// Buckets: under a minute `Just now`, under an hour `Nm ago`, under a day
/// `Nh ago`, otherwise `Nd ago`. Unparseable input yields `Unknown`.
#[must_use]
pub fn time_ago(datetime: &str, now: NaiveDateTime) -> String {
    let Some(then) = parse_event_datetime(datetime) else {
        return "Unknown".to_string();
    };

    let elapsed = now.signed_duration_since(then);
    let minutes = elapsed.num_minutes();

    if minutes < 1 {
        return "Just now".to_string();
    }
    if minutes < 60 {
        return format!("{minutes}m ago");
    }

    let hours = elapsed.num_hours();
    if hours < 24 {
        return format!("{hours}h ago");
    }

    format!("{}d ago", elapsed.num_days())
}

/// Canonical `Month YYYY` label for a date.
#[must_use]
pub fn month_label(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

/// Canonical label for the month `today` falls in.
#[must_use]
pub fn current_month_label(today: NaiveDate) -> String {
    month_label(today)
}

/// Parse a `Month YYYY` label into (year, month). `None` when the string is
/// not a full month name followed by a 4-digit year.
#[must_use]
pub fn parse_month_label(s: &str) -> Option<(i32, u32)> {
    let date = NaiveDate::parse_from_str(&format!("01 {}", s.trim()), "%d %B %Y").ok()?;
    Some((date.year(), date.month()))
}
