//! Map view lifecycle and visual encoding.
//!
//! The mapping engine is an external collaborator consumed through the
//! `MapEngine` trait: the dashboard talks to a browser-side MapLibre map via
//! serialized engine operations, and tests talk to a recording double.
//! `MapView` owns the engine and the single shared popup for its mounted
//! lifetime and guards every operation on its lifecycle state.

use serde_json::{Value, json};

use crate::models::{Feature, FeatureCollection, Properties};

/// Map home view over the Philippines: center and zoom.
pub const MAP_CENTER: [f64; 2] = [123.8854, 10.3157];
pub const MAP_ZOOM: f64 = 4.5;

/// Identifier of the GeoJSON source backing the point layer.
pub const SOURCE_ID: &str = "earthquakes";

/// Identifier of the circle layer.
pub const LAYER_ID: &str = "earthquake-points";

/// Fly-to animation length in milliseconds.
pub const FLY_DURATION_MS: u32 = 1000;

/// Legend rows, one per magnitude bucket.
pub const LEGEND: [(&str, &str); 6] = [
    ("#2ECC71", "Minor, Less than 3.9"),
    ("#F1C40F", "Light, 4.0-4.9"),
    ("#E67E22", "Moderate, 5.0-5.9"),
    ("#E74C3C", "Strong, 6.0-6.9"),
    ("#8E44AD", "Major, 7.0-7.9"),
    ("#641E16", "Great, 8.0+"),
];

/// Fill color for a magnitude, 6 buckets matching the legend.
#[must_use]
pub fn magnitude_color(magnitude: f64) -> &'static str {
    if magnitude < 4.0 {
        "#2ECC71"
    } else if magnitude < 5.0 {
        "#F1C40F"
    } else if magnitude < 6.0 {
        "#E67E22"
    } else if magnitude < 7.0 {
        "#E74C3C"
    } else if magnitude < 8.0 {
        "#8E44AD"
    } else {
        "#641E16"
    }
}

/// Paint expressions for the circle layer.
///
/// Fill color is the bucketed magnitude scale; radius interpolates on both
/// magnitude and zoom so points stay visible without cluttering low zooms.
#[must_use]
pub fn circle_paint() -> Value {
    json!({
        "circle-color": [
            "step", ["get", "magnitude"],
            "#2ECC71",
            4.0, "#F1C40F",
            5.0, "#E67E22",
            6.0, "#E74C3C",
            7.0, "#8E44AD",
            8.0, "#641E16",
        ],
        "circle-radius": [
            "interpolate", ["linear"], ["zoom"],
            0, [
                "interpolate", ["linear"], ["get", "magnitude"],
                1, 0.5, 2, 1, 3, 1.5, 4, 2, 5, 2.5, 6, 3, 7, 3.5,
            ],
            8, [
                "interpolate", ["linear"], ["get", "magnitude"],
                1, 3, 2, 5, 3, 7, 4, 9, 5, 11, 6, 13, 7, 15,
            ],
            16, [
                "interpolate", ["linear"], ["get", "magnitude"],
                1, 8, 2, 12, 3, 16, 4, 20, 5, 24, 6, 28, 7, 32,
            ],
        ],
        "circle-opacity": 0.8,
        "circle-stroke-width": 0.7,
        "circle-stroke-color": "#ffffff",
    })
}

/// Popup card for one event. Missing fields render as `N/A`.
#[must_use]
pub fn popup_html(props: &Properties) -> String {
    fn text_or_na(s: &str) -> &str {
        if s.is_empty() { "N/A" } else { s }
    }
    fn num_or_na(v: f64) -> String {
        if v == 0.0 { "N/A".to_string() } else { format!("{v}") }
    }

    format!(
        r#"<div style="font-size:12px;line-height:1.2;max-width:250px;text-align:left">
  <div style="font-weight:600;margin-bottom:6px">Seismic Information</div>
  <div><b>Date:</b> {datetime}</div>
  <div><b>Magnitude:</b> {magnitude}</div>
  <div><b>Depth:</b> {depth}</div>
  <div><b>Location:</b> {location}</div>
  <div><b>Month:</b> {month}</div>
</div>"#,
        datetime = text_or_na(&props.datetime),
        magnitude = num_or_na(props.magnitude),
        depth = num_or_na(props.depth),
        location = text_or_na(&props.location),
        month = text_or_na(&props.month),
    )
}

/// Initial engine configuration.
#[derive(Debug, Clone)]
pub struct MapInit {
    pub center: [f64; 2],
    pub zoom: f64,
}

impl Default for MapInit {
    fn default() -> Self {
        Self {
            center: MAP_CENTER,
            zoom: MAP_ZOOM,
        }
    }
}

/// The consumed surface of the mapping collaborator.
pub trait MapEngine {
    /// Construct the map bound to its container.
    fn attach(&mut self, init: &MapInit);
    /// Register a GeoJSON source by identifier.
    fn add_source(&mut self, id: &str, data: &FeatureCollection);
    /// Register a circle layer over a source.
    fn add_layer(&mut self, id: &str, source_id: &str, paint: &Value);
    /// Remove a layer by identifier.
    fn remove_layer(&mut self, id: &str);
    /// Remove a source by identifier.
    fn remove_source(&mut self, id: &str);
    /// Attach the click handler scoped to a layer.
    fn bind_click(&mut self, layer_id: &str);
    /// Resize the render buffer to the container.
    fn resize(&mut self);
    /// Animated pan to a coordinate.
    fn fly_to(&mut self, center: [f64; 2], duration_ms: u32);
    /// Position and fill the shared popup.
    fn show_popup(&mut self, at: [f64; 2], html: &str);
    /// Close the shared popup.
    fn close_popup(&mut self);
    /// Release the map instance.
    fn detach(&mut self);
}

/// Lifecycle of the map view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Uninitialized,
    /// Engine constructed, style still loading
    Loading,
    /// Style loaded; layer and popup operations permitted
    Ready,
    Disposed,
}

/// Owner of the map engine and its single popup.
///
/// All operations outside `Ready` are no-ops rather than faults; `init` and
/// `dispose` are idempotent.
pub struct MapView<E: MapEngine> {
    engine: E,
    state: ViewState,
    layer_present: bool,
    popup_open: bool,
}

impl<E: MapEngine> MapView<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            state: ViewState::Uninitialized,
            layer_present: false,
            popup_open: false,
        }
    }

    #[must_use]
    pub fn state(&self) -> ViewState {
        self.state
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state == ViewState::Ready
    }

    /// Construct the engine. One construction per mount lifetime:
    /// re-entrant calls while an instance exists are no-ops.
    pub fn init(&mut self, init: &MapInit) {
        match self.state {
            ViewState::Uninitialized | ViewState::Disposed => {
                self.engine.attach(init);
                self.layer_present = false;
                self.popup_open = false;
                self.state = ViewState::Loading;
            }
            ViewState::Loading | ViewState::Ready => {}
        }
    }

    /// The engine reported its style fully loaded.
    pub fn style_ready(&mut self) {
        if self.state == ViewState::Loading {
            self.state = ViewState::Ready;
        }
    }

    /// Replace the point layer wholesale with a new collection.
    ///
    /// Remove-then-add sidesteps incremental-diff bugs in the engine's paint
    /// pipeline; updates arrive at most once per fetch, so the full redraw
    /// is cheap enough.
    pub fn sync_layer(&mut self, data: &FeatureCollection) {
        if self.state != ViewState::Ready {
            return;
        }

        if self.layer_present {
            self.engine.remove_layer(LAYER_ID);
            self.engine.remove_source(SOURCE_ID);
        }

        self.engine.add_source(SOURCE_ID, data);
        self.engine.add_layer(LAYER_ID, SOURCE_ID, &circle_paint());
        self.engine.bind_click(LAYER_ID);
        self.layer_present = true;
    }

    /// Reposition and refill the shared popup at a feature (map click path).
    pub fn show_popup_at(&mut self, feature: &Feature) {
        if self.state != ViewState::Ready {
            return;
        }
        let html = popup_html(&feature.properties);
        self.engine.show_popup(feature.geometry.coordinates, &html);
        self.popup_open = true;
    }

    /// Popup plus animated pan (list selection path).
    pub fn focus_feature(&mut self, feature: &Feature) {
        if self.state != ViewState::Ready {
            return;
        }
        self.show_popup_at(feature);
        self.engine.fly_to(feature.geometry.coordinates, FLY_DURATION_MS);
    }

    /// The user dismissed the popup on the engine side.
    pub fn popup_dismissed(&mut self) {
        self.popup_open = false;
    }

    /// Forward a container resize. Skipped, not queued, before the style
    /// has loaded.
    pub fn resize(&mut self) {
        if self.state == ViewState::Ready {
            self.engine.resize();
        }
    }

    /// Release the engine and popup and allow a later re-init. Idempotent.
    pub fn dispose(&mut self) {
        match self.state {
            ViewState::Uninitialized | ViewState::Disposed => {}
            ViewState::Loading | ViewState::Ready => {
                if self.popup_open {
                    self.engine.close_popup();
                    self.popup_open = false;
                }
                self.engine.detach();
                self.layer_present = false;
                self.state = ViewState::Disposed;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SeismicEvent;

    #[derive(Debug, PartialEq)]
    enum Op {
        Attach,
        AddSource(String, usize),
        AddLayer(String),
        RemoveLayer(String),
        RemoveSource(String),
        BindClick(String),
        Resize,
        FlyTo([f64; 2], u32),
        ShowPopup([f64; 2], String),
        ClosePopup,
        Detach,
    }

    /// Recording double for the mapping collaborator.
    #[derive(Default)]
    struct RecordingEngine {
        ops: Vec<Op>,
    }

    impl MapEngine for RecordingEngine {
        fn attach(&mut self, _init: &MapInit) {
            self.ops.push(Op::Attach);
        }
        fn add_source(&mut self, id: &str, data: &FeatureCollection) {
            self.ops.push(Op::AddSource(id.into(), data.len()));
        }
        fn add_layer(&mut self, id: &str, _source_id: &str, _paint: &Value) {
            self.ops.push(Op::AddLayer(id.into()));
        }
        fn remove_layer(&mut self, id: &str) {
            self.ops.push(Op::RemoveLayer(id.into()));
        }
        fn remove_source(&mut self, id: &str) {
            self.ops.push(Op::RemoveSource(id.into()));
        }
        fn bind_click(&mut self, layer_id: &str) {
            self.ops.push(Op::BindClick(layer_id.into()));
        }
        fn resize(&mut self) {
            self.ops.push(Op::Resize);
        }
        fn fly_to(&mut self, center: [f64; 2], duration_ms: u32) {
            self.ops.push(Op::FlyTo(center, duration_ms));
        }
        fn show_popup(&mut self, at: [f64; 2], html: &str) {
            self.ops.push(Op::ShowPopup(at, html.into()));
        }
        fn close_popup(&mut self) {
            self.ops.push(Op::ClosePopup);
        }
        fn detach(&mut self) {
            self.ops.push(Op::Detach);
        }
    }

    fn ready_view() -> MapView<RecordingEngine> {
        let mut view = MapView::new(RecordingEngine::default());
        view.init(&MapInit::default());
        view.style_ready();
        view
    }

    fn collection(n: usize) -> FeatureCollection {
        let events: Vec<SeismicEvent> = (0..n)
            .map(|i| SeismicEvent {
                datetime: "15 March 2024 - 02:30 PM".into(),
                magnitude: 4.0 + i as f64 * 0.1,
                depth: 10.0,
                location: format!("site {i}"),
                longitude: 121.0,
                latitude: 14.0,
                month: "March 2024".into(),
            })
            .collect();
        FeatureCollection::from_events(&events)
    }

    /// Net registrations after a sequence of ops: adds minus removes.
    fn registered(ops: &[Op]) -> (i32, i32) {
        let mut sources = 0;
        let mut layers = 0;
        for op in ops {
            match op {
                Op::AddSource(..) => sources += 1,
                Op::RemoveSource(_) => sources -= 1,
                Op::AddLayer(_) => layers += 1,
                Op::RemoveLayer(_) => layers -= 1,
                _ => {}
            }
        }
        (sources, layers)
    }

    #[test]
    fn test_init_constructs_once() {
        let mut view = MapView::new(RecordingEngine::default());
        view.init(&MapInit::default());
        view.init(&MapInit::default());

        let attaches = view.engine.ops.iter().filter(|op| **op == Op::Attach).count();
        assert_eq!(attaches, 1);
        assert_eq!(view.state(), ViewState::Loading);
    }

    #[test]
    fn test_operations_before_ready_are_noops() {
        let mut view = MapView::new(RecordingEngine::default());
        view.init(&MapInit::default());
        assert!(!view.is_ready());

        let fc = collection(3);
        view.sync_layer(&fc);
        view.show_popup_at(&fc.features[0]);
        view.focus_feature(&fc.features[0]);
        view.resize();

        assert_eq!(view.engine.ops, vec![Op::Attach]);
    }

    #[test]
    fn test_sync_layer_is_idempotent_replace() {
        let mut view = ready_view();
        let fc = collection(5);

        view.sync_layer(&fc);
        view.sync_layer(&fc);

        let (sources, layers) = registered(&view.engine.ops);
        assert_eq!(sources, 1);
        assert_eq!(layers, 1);

        // Replacement removes the layer before the source, the reverse of
        // registration order.
        let remove_layer = view
            .engine
            .ops
            .iter()
            .position(|op| matches!(op, Op::RemoveLayer(_)))
            .expect("layer removed on second sync");
        let remove_source = view
            .engine
            .ops
            .iter()
            .position(|op| matches!(op, Op::RemoveSource(_)))
            .expect("source removed on second sync");
        assert!(remove_layer < remove_source);
    }

    #[test]
    fn test_focus_feature_pans_with_popup() {
        let mut view = ready_view();
        let fc = collection(1);

        view.focus_feature(&fc.features[0]);

        assert!(view
            .engine
            .ops
            .iter()
            .any(|op| matches!(op, Op::ShowPopup(at, _) if at[0] == 121.0)));
        assert!(view
            .engine
            .ops
            .iter()
            .any(|op| matches!(op, Op::FlyTo(_, d) if *d == FLY_DURATION_MS)));
    }

    #[test]
    fn test_map_click_shows_popup_without_pan() {
        let mut view = ready_view();
        let fc = collection(1);

        view.show_popup_at(&fc.features[0]);

        assert!(!view.engine.ops.iter().any(|op| matches!(op, Op::FlyTo(..))));
    }

    #[test]
    fn test_resize_requires_loaded_style() {
        let mut view = MapView::new(RecordingEngine::default());
        view.init(&MapInit::default());
        view.resize();
        assert!(!view.engine.ops.iter().any(|op| *op == Op::Resize));

        view.style_ready();
        view.resize();
        assert!(view.engine.ops.iter().any(|op| *op == Op::Resize));
    }

    #[test]
    fn test_dispose_is_idempotent_and_reinitializable() {
        let mut view = ready_view();
        let fc = collection(1);
        view.show_popup_at(&fc.features[0]);

        view.dispose();
        view.dispose();

        let detaches = view.engine.ops.iter().filter(|op| **op == Op::Detach).count();
        assert_eq!(detaches, 1);
        assert!(view.engine.ops.iter().any(|op| *op == Op::ClosePopup));
        assert_eq!(view.state(), ViewState::Disposed);

        // Operations after dispose are no-ops.
        let before = view.engine.ops.len();
        view.sync_layer(&fc);
        assert_eq!(view.engine.ops.len(), before);

        // A future mount reconstructs cleanly.
        view.init(&MapInit::default());
        assert_eq!(view.state(), ViewState::Loading);
    }

    #[test]
    fn test_magnitude_color_buckets() {
        assert_eq!(magnitude_color(2.0), "#2ECC71");
        assert_eq!(magnitude_color(4.0), "#F1C40F");
        assert_eq!(magnitude_color(5.5), "#E67E22");
        assert_eq!(magnitude_color(6.9), "#E74C3C");
        assert_eq!(magnitude_color(7.2), "#8E44AD");
        assert_eq!(magnitude_color(8.0), "#641E16");
    }

    #[test]
    fn test_popup_html_missing_fields() {
        let props = Properties {
            datetime: String::new(),
            magnitude: 0.0,
            depth: 0.0,
            location: String::new(),
            month: String::new(),
        };
        let html = popup_html(&props);
        assert!(html.contains("<b>Date:</b> N/A"));
        assert!(html.contains("<b>Magnitude:</b> N/A"));
        assert!(html.contains("Seismic Information"));
    }

    #[test]
    fn test_circle_paint_shape() {
        let paint = circle_paint();
        assert_eq!(paint["circle-color"][0], "step");
        assert_eq!(paint["circle-radius"][0], "interpolate");
        assert_eq!(paint["circle-opacity"], 0.8);
    }
}
