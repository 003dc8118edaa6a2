//! Data models for the PHIVOLCS seismic feed.
//!
//! The upstream API replies with a month of earthquake records under
//! `AllThisMonth`, or an `error` descriptor when the scrape failed. Records
//! are mapped one-to-one into GeoJSON point features for the map layer.

use serde::{Deserialize, Serialize};

/// A single earthquake record as delivered by the feed.
///
/// Deserialization is tolerant: a record with missing fields defaults them
/// instead of failing the whole payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeismicEvent {
    /// Event time, fixed format `DD Month YYYY - HH:MM AM/PM`
    #[serde(default)]
    pub datetime: String,

    /// Magnitude value
    #[serde(default)]
    pub magnitude: f64,

    /// Depth in kilometers
    #[serde(default)]
    pub depth: f64,

    /// Human-readable place description
    #[serde(default)]
    pub location: String,

    /// Longitude (degrees)
    #[serde(default)]
    pub longitude: f64,

    /// Latitude (degrees)
    #[serde(default)]
    pub latitude: f64,

    /// Month label the record belongs to, e.g. `March 2024`
    #[serde(default)]
    pub month: String,
}

/// Top-level feed response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeismicResponse {
    /// All events for the resolved month
    #[serde(rename = "AllThisMonth", default)]
    pub all_this_month: Option<Vec<SeismicEvent>>,

    /// Error descriptor reported by the feed itself
    #[serde(default)]
    pub error: Option<String>,
}

impl SeismicResponse {
    /// Events in the payload, empty when the field is absent.
    #[must_use]
    pub fn events(&self) -> &[SeismicEvent] {
        self.all_this_month.as_deref().unwrap_or(&[])
    }
}

/// Point geometry for a feature.
#[derive(Debug, Clone, Serialize)]
pub struct Geometry {
    /// Always "Point"
    #[serde(rename = "type")]
    pub type_: &'static str,

    /// Coordinates: [longitude, latitude]
    pub coordinates: [f64; 2],
}

/// Feature properties carried through to the map and list views.
#[derive(Debug, Clone, Serialize)]
pub struct Properties {
    pub datetime: String,
    pub magnitude: f64,
    pub depth: f64,
    pub location: String,
    pub month: String,
}

/// A geo-located seismic event prepared for map rendering.
#[derive(Debug, Clone, Serialize)]
pub struct Feature {
    /// Always "Feature"
    #[serde(rename = "type")]
    pub type_: &'static str,

    /// Point geometry
    pub geometry: Geometry,

    /// Event properties
    pub properties: Properties,
}

impl Feature {
    fn from_event(event: &SeismicEvent) -> Self {
        Self {
            type_: "Feature",
            geometry: Geometry {
                type_: "Point",
                coordinates: [event.longitude, event.latitude],
            },
            properties: Properties {
                datetime: event.datetime.clone(),
                magnitude: event.magnitude,
                depth: event.depth,
                location: event.location.clone(),
                month: event.month.clone(),
            },
        }
    }

    /// Get longitude (degrees).
    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.geometry.coordinates[0]
    }

    /// Get latitude (degrees).
    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.geometry.coordinates[1]
    }
}

/// Ordered feature sequence handed to the map layer and the list view.
///
/// Never absent: with no raw data it is empty, so consumers only ever check
/// emptiness.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureCollection {
    /// Always "FeatureCollection"
    #[serde(rename = "type")]
    pub type_: &'static str,

    /// Derived features, input order preserved
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    /// An empty collection.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            type_: "FeatureCollection",
            features: Vec::new(),
        }
    }

    /// Map raw events into features, preserving order.
    #[must_use]
    pub fn from_events(events: &[SeismicEvent]) -> Self {
        Self {
            type_: "FeatureCollection",
            features: events.iter().map(Feature::from_event).collect(),
        }
    }

    /// Number of features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether the collection holds no features.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl Default for FeatureCollection {
    fn default() -> Self {
        Self::empty()
    }
}
