//! Output formatters for seismic events.
//!
//! Supports human-readable (with colors), JSON, and NDJSON formats.

use std::io::{self, Write};

use chrono::NaiveDateTime;

use crate::models::SeismicEvent;
use crate::timefmt::time_ago;

// ANSI color codes
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

// Magnitude-bucket colors, mirroring the dashboard legend
const GREEN: &str = "\x1b[92m"; // Minor: mag < 4.0
const YELLOW: &str = "\x1b[93m"; // Light: 4.0-4.9
const ORANGE: &str = "\x1b[38;5;208m"; // Moderate: 5.0-5.9
const RED: &str = "\x1b[91m"; // Strong: 6.0-6.9
const MAGENTA: &str = "\x1b[95m"; // Major: 7.0-7.9
const DARK_RED: &str = "\x1b[31m"; // Great: mag >= 8.0

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Human-readable terminal output (default)
    #[default]
    Human,
    /// JSON array
    Json,
    /// Newline-delimited JSON (one object per line)
    Ndjson,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            "ndjson" => Ok(Self::Ndjson),
            _ => Err(format!("unknown format: {s} (expected: human, json, ndjson)")),
        }
    }
}

/// Get the color code for a magnitude value.
fn magnitude_ansi(mag: f64) -> &'static str {
    if mag < 4.0 {
        GREEN
    } else if mag < 5.0 {
        YELLOW
    } else if mag < 6.0 {
        ORANGE
    } else if mag < 7.0 {
        RED
    } else if mag < 8.0 {
        MAGENTA
    } else {
        DARK_RED
    }
}

/// Get severity label for magnitude.
fn magnitude_label(mag: f64) -> &'static str {
    if mag < 4.0 {
        "MINOR"
    } else if mag < 5.0 {
        "LIGHT"
    } else if mag < 6.0 {
        "MODERATE"
    } else if mag < 7.0 {
        "STRONG"
    } else if mag < 8.0 {
        "MAJOR"
    } else {
        "GREAT"
    }
}

/// Write events in human-readable format with colors.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_human<W: Write>(
    writer: &mut W,
    events: &[SeismicEvent],
    now: NaiveDateTime,
) -> io::Result<()> {
    for event in events {
        let color = magnitude_ansi(event.magnitude);
        let label = magnitude_label(event.magnitude);
        let ago = time_ago(&event.datetime, now);
        let datetime = if event.datetime.is_empty() {
            "unknown"
        } else {
            event.datetime.as_str()
        };
        let location = if event.location.is_empty() {
            "Unknown location"
        } else {
            event.location.as_str()
        };

        writeln!(
            writer,
            "{color}{BOLD}M{mag:.1}{RESET} │ \
             {color}{label:8}{RESET} │ \
             {DIM}{depth:>5.0}km{RESET} │ \
             {datetime} │ \
             {location} {DIM}({ago}){RESET}",
            mag = event.magnitude,
            depth = event.depth,
        )?;
    }
    Ok(())
}

/// Write events as a JSON array.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json<W: Write>(writer: &mut W, events: &[SeismicEvent]) -> io::Result<()> {
    let json = serde_json::to_string_pretty(events)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{json}")
}

/// Write events as newline-delimited JSON.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_ndjson<W: Write>(writer: &mut W, events: &[SeismicEvent]) -> io::Result<()> {
    for event in events {
        let json = serde_json::to_string(event)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        writeln!(writer, "{json}")?;
    }
    Ok(())
}

/// Write events in the specified format.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_events<W: Write>(
    writer: &mut W,
    events: &[SeismicEvent],
    format: Format,
    now: NaiveDateTime,
) -> io::Result<()> {
    match format {
        Format::Human => write_human(writer, events, now),
        Format::Json => write_json(writer, events),
        Format::Ndjson => write_ndjson(writer, events),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timefmt::parse_event_datetime;

    #[test]
    fn test_format_parse() {
        assert_eq!("human".parse::<Format>().unwrap(), Format::Human);
        assert_eq!("json".parse::<Format>().unwrap(), Format::Json);
        assert_eq!("ndjson".parse::<Format>().unwrap(), Format::Ndjson);
        assert!("invalid".parse::<Format>().is_err());
    }

    #[test]
    fn test_magnitude_labels() {
        assert_eq!(magnitude_label(3.9), "MINOR");
        assert_eq!(magnitude_label(4.0), "LIGHT");
        assert_eq!(magnitude_label(5.5), "MODERATE");
        assert_eq!(magnitude_label(6.1), "STRONG");
        assert_eq!(magnitude_label(7.9), "MAJOR");
        assert_eq!(magnitude_label(8.2), "GREAT");
    }

    #[test]
    fn test_ndjson_one_line_per_event() {
        let events = vec![
            SeismicEvent {
                datetime: "15 March 2024 - 02:30 PM".into(),
                magnitude: 5.2,
                depth: 25.0,
                location: "Offshore Batangas".into(),
                longitude: 120.8,
                latitude: 13.7,
                month: "March 2024".into(),
            };
            3
        ];

        let mut buf = Vec::new();
        write_ndjson(&mut buf, &events).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.lines().all(|line| line.contains("\"magnitude\":5.2")));
    }

    #[test]
    fn test_human_output_includes_relative_time() {
        let events = vec![SeismicEvent {
            datetime: "15 March 2024 - 02:30 PM".into(),
            magnitude: 4.6,
            depth: 33.0,
            location: "Davao Oriental".into(),
            longitude: 126.6,
            latitude: 7.1,
            month: "March 2024".into(),
        }];
        let now = parse_event_datetime("15 March 2024 - 02:45 PM").unwrap();

        let mut buf = Vec::new();
        write_human(&mut buf, &events, now).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("M4.6"));
        assert!(text.contains("LIGHT"));
        assert!(text.contains("(15m ago)"));
    }
}
