//! Event list policy.
//!
//! Pure selection and state logic for the scrollable activity panel; the
//! server renders these states to HTML. Moderate-or-stronger events are
//! never hidden by truncation, so the displayed set is the head of the
//! collection plus every later feature at or above the pin threshold.

use chrono::NaiveDateTime;

use crate::map::magnitude_color;
use crate::models::{Feature, FeatureCollection};
use crate::timefmt::time_ago;

/// Head of the collection shown unconditionally, in arrival order.
pub const PRIMARY_COUNT: usize = 20;

/// Later features at or above this magnitude are always shown.
pub const PIN_MIN_MAGNITUDE: f64 = 4.0;

/// Rows in the pending skeleton.
pub const SKELETON_ROWS: usize = 8;

/// Panel heading for the tracked month.
#[must_use]
pub fn panel_title(is_current_month: bool) -> &'static str {
    if is_current_month {
        "Recent Earthquake Activity"
    } else {
        "Previous Earthquake Activity"
    }
}

/// One renderable row.
#[derive(Debug, Clone)]
pub struct ListEntry {
    /// Index of the feature in the source collection, for focus requests
    pub index: usize,
    /// Bucket color for the magnitude dot
    pub color: &'static str,
    pub magnitude: f64,
    pub depth: f64,
    pub location: String,
    pub datetime: String,
    pub time_ago: String,
}

/// Mutually exclusive visual states, in precedence order: error beats
/// pending beats empty.
#[derive(Debug, Clone)]
pub enum ListState {
    Error {
        message: String,
        hint: &'static str,
    },
    Pending {
        skeleton_rows: usize,
    },
    Empty,
    Ready {
        entries: Vec<ListEntry>,
        shown: usize,
        total: usize,
    },
}

/// Friendlier sub-message for known failure phrases.
#[must_use]
pub fn error_hint(message: &str) -> &'static str {
    if message.contains("Connection to earthquake.phivolcs.dost.gov.ph timed out") {
        "PHIVOLCS server is taking too long to respond. Please try again in a moment."
    } else if message.contains("Max retries exceeded") {
        "Unable to connect to PHIVOLCS data source. The server may be temporarily unavailable."
    } else {
        "There was an error fetching the latest earthquake data."
    }
}

/// Select the displayed subset with source indices attached.
#[must_use]
pub fn select_display(features: &[Feature]) -> Vec<(usize, &Feature)> {
    let mut selected: Vec<(usize, &Feature)> =
        features.iter().take(PRIMARY_COUNT).enumerate().collect();

    selected.extend(
        features
            .iter()
            .enumerate()
            .skip(PRIMARY_COUNT)
            .filter(|(_, f)| f.properties.magnitude >= PIN_MIN_MAGNITUDE),
    );

    selected
}

/// Resolve the panel state from the current collection and fetch flags.
#[must_use]
pub fn list_state(
    collection: &FeatureCollection,
    pending: bool,
    error: Option<&str>,
    now: NaiveDateTime,
) -> ListState {
    if let Some(message) = error {
        return ListState::Error {
            message: message.to_string(),
            hint: error_hint(message),
        };
    }
    if pending {
        return ListState::Pending {
            skeleton_rows: SKELETON_ROWS,
        };
    }
    if collection.is_empty() {
        return ListState::Empty;
    }

    let selected = select_display(&collection.features);
    let shown = selected.len();
    let entries = selected
        .into_iter()
        .map(|(index, feature)| {
            let props = &feature.properties;
            ListEntry {
                index,
                color: magnitude_color(props.magnitude),
                magnitude: props.magnitude,
                depth: props.depth,
                location: props.location.clone(),
                datetime: props.datetime.clone(),
                time_ago: time_ago(&props.datetime, now),
            }
        })
        .collect();

    ListState::Ready {
        entries,
        shown,
        total: collection.len(),
    }
}
