//! Web server for the lindol dashboard.
//!
//! Provides the earthquake map dashboard using:
//! - Axum for HTTP server
//! - SSE (Server-Sent Events) for view synchronization
//! - MapLibre GL in the browser as the map-engine executor
//!
//! The server owns all view state: the data fetcher, the map view state
//! machine, the month picker and the list policy. The browser applies
//! map-engine operations it receives over SSE and swaps server-rendered
//! HTML fragments; user gestures come back as small POSTs.

use std::convert::Infallible;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{
        Html,
        sse::{Event, KeepAlive, Sse},
    },
    routing::{get, post},
};
use chrono::{Local, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::broadcast;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;

use crate::client::{DEFAULT_BASE_URL, SeismicClient};
use crate::fetcher::DataFetcher;
use crate::listview::{ListState, list_state, panel_title};
use crate::map::{LEGEND, MapEngine, MapInit, MapView};
use crate::models::FeatureCollection;
use crate::monthpicker::{MonthPicker, Selection};
use crate::timefmt::current_month_label;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub api_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            api_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// One SSE frame: event name plus payload (engine-op JSON or an HTML
/// fragment).
type Frame = (&'static str, String);

/// Bridges map-view operations onto the SSE channel.
///
/// The browser-side executor applies each operation to a MapLibre map.
/// Frames sent with no subscriber are dropped; a (re)connecting page
/// re-mounts and replays the state it needs.
struct SseEngine {
    tx: broadcast::Sender<Frame>,
}

impl SseEngine {
    fn send(&self, op: serde_json::Value) {
        let _ = self.tx.send(("map", op.to_string()));
    }
}

impl MapEngine for SseEngine {
    fn attach(&mut self, init: &MapInit) {
        self.send(json!({ "op": "attach", "center": init.center, "zoom": init.zoom }));
    }

    fn add_source(&mut self, id: &str, data: &FeatureCollection) {
        // The executor reports clicks by feature position, so each feature
        // carries its collection index across the bridge.
        let Ok(mut value) = serde_json::to_value(data) else {
            return;
        };
        if let Some(features) = value["features"].as_array_mut() {
            for (i, feature) in features.iter_mut().enumerate() {
                feature["properties"]["idx"] = json!(i);
            }
        }
        self.send(json!({ "op": "addSource", "id": id, "data": value }));
    }

    fn add_layer(&mut self, id: &str, source_id: &str, paint: &serde_json::Value) {
        self.send(json!({ "op": "addLayer", "id": id, "source": source_id, "paint": paint }));
    }

    fn remove_layer(&mut self, id: &str) {
        self.send(json!({ "op": "removeLayer", "id": id }));
    }

    fn remove_source(&mut self, id: &str) {
        self.send(json!({ "op": "removeSource", "id": id }));
    }

    fn bind_click(&mut self, layer_id: &str) {
        self.send(json!({ "op": "bindClick", "layer": layer_id }));
    }

    fn resize(&mut self) {
        self.send(json!({ "op": "resize" }));
    }

    fn fly_to(&mut self, center: [f64; 2], duration_ms: u32) {
        self.send(json!({ "op": "flyTo", "center": center, "duration": duration_ms }));
    }

    fn show_popup(&mut self, at: [f64; 2], html: &str) {
        self.send(json!({ "op": "showPopup", "at": at, "html": html }));
    }

    fn close_popup(&mut self) {
        self.send(json!({ "op": "closePopup" }));
    }

    fn detach(&mut self) {
        self.send(json!({ "op": "detach" }));
    }
}

/// Everything the dashboard displays.
struct Dashboard {
    map: MapView<SseEngine>,
    picker: MonthPicker,
    /// Pinned `Month YYYY` label; `None` tracks the current month
    month: Option<String>,
    /// Query identity component; bumped on manual refresh
    refresh_token: i64,
    features: FeatureCollection,
    pending: bool,
    error: Option<String>,
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Channel for broadcasting frames to SSE clients
    tx: broadcast::Sender<Frame>,
    dashboard: Arc<Mutex<Dashboard>>,
    /// Fetcher under its own lock so the network call never blocks view
    /// reads
    fetcher: Arc<Mutex<DataFetcher<SeismicClient>>>,
}

impl AppState {
    fn dashboard(&self) -> MutexGuard<'_, Dashboard> {
        self.dashboard.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn fetcher(&self) -> MutexGuard<'_, DataFetcher<SeismicClient>> {
        self.fetcher.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn broadcast_fragments(&self, dashboard: &Dashboard) {
        let today = Local::now().date_naive();
        let now = Local::now().naive_local();
        let _ = self.tx.send(("list", render_list_fragment(dashboard, now)));
        let _ = self.tx.send(("panel", render_panel_fragment(dashboard, today)));
        let _ = self.tx.send(("picker", render_picker_fragment(dashboard, today)));
    }
}

/// Create the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/stream", get(sse_handler))
        .route("/events/list", get(list_fragment_handler))
        .route("/picker", get(picker_fragment_handler))
        .route("/panel", get(panel_fragment_handler))
        .route("/engine/mounted", post(engine_mounted_handler))
        .route("/engine/ready", post(engine_ready_handler))
        .route("/engine/resize", post(engine_resize_handler))
        .route("/engine/popup-closed", post(popup_closed_handler))
        .route("/month", post(month_select_handler))
        .route("/refresh", post(refresh_handler))
        .route("/focus", post(focus_handler))
        .route("/click", post(click_handler))
        .route("/picker/year", post(year_nav_handler))
        .route("/legend", get(legend_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Start the web server.
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let (tx, _rx) = broadcast::channel::<Frame>(256);

    let client = SeismicClient::with_base_url(&config.api_url)?;
    let today = Local::now().date_naive();

    let state = AppState {
        tx: tx.clone(),
        dashboard: Arc::new(Mutex::new(Dashboard {
            map: MapView::new(SseEngine { tx }),
            picker: MonthPicker::new(today),
            month: None,
            refresh_token: 0,
            features: FeatureCollection::empty(),
            pending: false,
            error: None,
        })),
        fetcher: Arc::new(Mutex::new(DataFetcher::new(client))),
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("🌏 lindol dashboard starting at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Resolve the current query identity off the runtime and publish the
/// result.
///
/// The skeleton state is broadcast before the blocking fetch starts; the
/// map layer is untouched until the result lands, so previously displayed
/// points stay visible. A fetch whose identity was superseded while in
/// flight only ever filled its own cache slot and is not applied to the
/// live view.
fn spawn_fetch(state: &AppState) {
    let (month, token) = {
        let mut dashboard = state.dashboard();
        dashboard.pending = true;
        dashboard.error = None;
        state.broadcast_fragments(&dashboard);
        (dashboard.month.clone(), dashboard.refresh_token)
    };

    let app = state.clone();
    tokio::task::spawn_blocking(move || {
        let result = {
            let mut fetcher = app.fetcher();
            fetcher.resolve(month.as_deref(), token, Instant::now())
        };

        let mut dashboard = app.dashboard();
        if dashboard.month != month || dashboard.refresh_token != token {
            tracing::debug!("dropping superseded fetch result");
            return;
        }

        dashboard.features = FeatureCollection::from_events(&result.events);
        dashboard.error = result.error;
        dashboard.pending = false;

        let dash = &mut *dashboard;
        dash.map.sync_layer(&dash.features);

        app.broadcast_fragments(&dashboard);
    });
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Main page handler - serves the HTML shell.
async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// SSE stream handler for view synchronization.
async fn sse_handler(
    State(state): State<AppState>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let rx = state.tx.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok((event, data)) => Some(Ok(Event::default().event(event).data(data))),
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// The browser (re)mounted the page: rebuild the map engine and fetch.
async fn engine_mounted_handler(State(state): State<AppState>) -> StatusCode {
    {
        let mut dashboard = state.dashboard();
        dashboard.map.dispose();
        dashboard.map.init(&MapInit::default());
        if dashboard.error.is_some() {
            // A reload after a failure is the retry path: force a new
            // query identity so the cached error is not redisplayed.
            dashboard.refresh_token = now_millis();
        }
    }
    spawn_fetch(&state);
    StatusCode::NO_CONTENT
}

/// The engine reported its style loaded: sync whatever data we hold.
async fn engine_ready_handler(State(state): State<AppState>) -> StatusCode {
    let mut dashboard = state.dashboard();
    dashboard.map.style_ready();
    let dash = &mut *dashboard;
    dash.map.sync_layer(&dash.features);
    StatusCode::NO_CONTENT
}

/// Container size changed; forwarded only once the style is loaded.
async fn engine_resize_handler(State(state): State<AppState>) -> StatusCode {
    state.dashboard().map.resize();
    StatusCode::NO_CONTENT
}

/// The user dismissed the popup in the browser.
async fn popup_closed_handler(State(state): State<AppState>) -> StatusCode {
    state.dashboard().map.popup_dismissed();
    StatusCode::NO_CONTENT
}

#[derive(Debug, Deserialize)]
struct MonthPayload {
    /// 1-based month number in the displayed grid year
    month: u32,
}

/// Month grid selection.
async fn month_select_handler(
    State(state): State<AppState>,
    Json(payload): Json<MonthPayload>,
) -> StatusCode {
    let today = Local::now().date_naive();
    let selected = {
        let mut dashboard = state.dashboard();
        match dashboard.picker.select(payload.month, today) {
            Some(Selection::TrackCurrent) => {
                dashboard.month = None;
                // Tracking current again is a forced refresh.
                dashboard.refresh_token = now_millis();
                true
            }
            Some(Selection::Pinned(label)) => {
                dashboard.month = Some(label);
                true
            }
            None => {
                state.broadcast_fragments(&dashboard);
                false
            }
        }
    };

    if selected {
        spawn_fetch(&state);
    }
    StatusCode::NO_CONTENT
}

/// Manual refresh: clear any pinned month and force a current-month fetch.
async fn refresh_handler(State(state): State<AppState>) -> StatusCode {
    let today = Local::now().date_naive();
    {
        let mut dashboard = state.dashboard();
        dashboard.picker.clear(today);
        dashboard.month = None;
        dashboard.refresh_token = now_millis();
    }
    spawn_fetch(&state);
    StatusCode::NO_CONTENT
}

#[derive(Debug, Deserialize)]
struct IndexPayload {
    index: usize,
}

/// List selection: popup plus animated pan.
async fn focus_handler(
    State(state): State<AppState>,
    Json(payload): Json<IndexPayload>,
) -> StatusCode {
    let mut dashboard = state.dashboard();
    if let Some(feature) = dashboard.features.features.get(payload.index).cloned() {
        dashboard.map.focus_feature(&feature);
    }
    StatusCode::NO_CONTENT
}

/// Map click on a point: popup only.
async fn click_handler(
    State(state): State<AppState>,
    Json(payload): Json<IndexPayload>,
) -> StatusCode {
    let mut dashboard = state.dashboard();
    if let Some(feature) = dashboard.features.features.get(payload.index).cloned() {
        dashboard.map.show_popup_at(&feature);
    }
    StatusCode::NO_CONTENT
}

#[derive(Debug, Deserialize)]
struct YearNavPayload {
    dir: String,
}

/// Picker year navigation, clamped inside the picker model.
async fn year_nav_handler(
    State(state): State<AppState>,
    Json(payload): Json<YearNavPayload>,
) -> StatusCode {
    let today = Local::now().date_naive();
    let mut dashboard = state.dashboard();
    match payload.dir.as_str() {
        "prev" => dashboard.picker.prev_year(),
        "next" => dashboard.picker.next_year(today),
        _ => {}
    }
    state.broadcast_fragments(&dashboard);
    StatusCode::NO_CONTENT
}

/// Health check endpoint.
async fn health_handler() -> &'static str {
    "OK"
}

/// List fragment for initial page load.
async fn list_fragment_handler(State(state): State<AppState>) -> Html<String> {
    let dashboard = state.dashboard();
    Html(render_list_fragment(&dashboard, Local::now().naive_local()))
}

/// Picker fragment for initial page load.
async fn picker_fragment_handler(State(state): State<AppState>) -> Html<String> {
    let dashboard = state.dashboard();
    Html(render_picker_fragment(&dashboard, Local::now().date_naive()))
}

/// Panel header fragment for initial page load.
async fn panel_fragment_handler(State(state): State<AppState>) -> Html<String> {
    let dashboard = state.dashboard();
    Html(render_panel_fragment(&dashboard, Local::now().date_naive()))
}

// ============================================================================
// Fragment rendering
// ============================================================================

fn num_or_na(value: f64) -> String {
    if value == 0.0 {
        "N/A".to_string()
    } else {
        format!("{value}")
    }
}

fn text_or(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

/// Render the list panel body for the current view state.
fn render_list_fragment(dashboard: &Dashboard, now: NaiveDateTime) -> String {
    let state = list_state(
        &dashboard.features,
        dashboard.pending,
        dashboard.error.as_deref(),
        now,
    );

    match state {
        ListState::Error { message, hint } => format!(
            r#"<div class="error-state">
  <p class="error-title" title="{message}">Failed to load earthquake data</p>
  <p class="error-hint">{hint}</p>
  <button class="btn" onclick="location.reload()">&#8635; Try Again</button>
</div>"#
        ),
        ListState::Pending { skeleton_rows } => {
            let mut html = String::from(r#"<div class="skeleton-list">"#);
            for _ in 0..skeleton_rows {
                html.push_str(
                    r#"<div class="skeleton-row"><div class="skeleton-bar wide"></div><div class="skeleton-bar"></div></div>"#,
                );
            }
            html.push_str("</div>");
            html
        }
        ListState::Empty => {
            r#"<div class="empty-state"><p>No earthquake activity data available</p></div>"#
                .to_string()
        }
        ListState::Ready {
            entries,
            shown,
            total,
        } => {
            let mut html = String::from(r#"<div class="event-rows">"#);
            for entry in entries {
                html.push_str(&format!(
                    r#"<div class="event-row" onclick="focusEvent({index})">
  <div class="event-top">
    <span class="dot" style="background:{color}"></span>
    <span class="event-mag">M {magnitude}</span>
    <span class="event-depth">{depth} km deep</span>
    <span class="event-ago">{ago}</span>
  </div>
  <p class="event-loc">{location}</p>
  <p class="event-dt">{datetime}</p>
</div>"#,
                    index = entry.index,
                    color = entry.color,
                    magnitude = num_or_na(entry.magnitude),
                    depth = num_or_na(entry.depth),
                    ago = entry.time_ago,
                    location = text_or(&entry.location, "Unknown location"),
                    datetime = text_or(&entry.datetime, "Unknown time"),
                ));
            }
            html.push_str(&format!(
                r#"<p class="list-footer">Showing {shown} earthquakes of {total}</p></div>"#
            ));
            html
        }
    }
}

/// Render the list panel header: activity title plus the shown month.
fn render_panel_fragment(dashboard: &Dashboard, today: NaiveDate) -> String {
    let current_label = current_month_label(today);
    let is_current = match dashboard.month.as_deref() {
        None => true,
        Some(label) => label == current_label,
    };
    let shown_label = dashboard
        .month
        .clone()
        .unwrap_or(current_label);

    format!(
        r#"<h3 class="panel-title">{title}</h3>
<div class="panel-month">{shown_label}</div>"#,
        title = panel_title(is_current),
    )
}

/// Render the month picker with its refresh action.
fn render_picker_fragment(dashboard: &Dashboard, today: NaiveDate) -> String {
    let picker = &dashboard.picker;

    let prev_disabled = if picker.can_prev_year() { "" } else { " disabled" };
    let next_disabled = if picker.can_next_year(today) { "" } else { " disabled" };
    let refresh_disabled = if dashboard.pending { " disabled" } else { "" };

    let mut cells = String::new();
    for cell in picker.cells(today) {
        let selected = if cell.selected { " selected" } else { "" };
        let disabled = if cell.enabled { "" } else { " disabled" };
        cells.push_str(&format!(
            r#"<button class="picker-cell{selected}"{disabled} onclick="selectMonth({month})">{label}</button>"#,
            month = cell.month,
            label = cell.label,
        ));
    }

    format!(
        r#"<div class="picker-nav">
  <button class="nav-btn"{prev_disabled} onclick="yearNav('prev')">&lsaquo;</button>
  <span class="picker-year">{year}</span>
  <button class="nav-btn"{next_disabled} onclick="yearNav('next')">&rsaquo;</button>
  <button class="refresh-btn"{refresh_disabled} title="Refresh and go to current month" onclick="doRefresh()">&#8635;</button>
</div>
<div class="picker-grid">{cells}</div>"#,
        year = picker.year(),
    )
}

/// Render the static legend rows.
fn render_legend() -> String {
    LEGEND
        .iter()
        .map(|(color, label)| {
            format!(
                r#"<div class="legend-row"><span class="dot" style="background:{color}"></span><span>{label}</span></div>"#
            )
        })
        .collect()
}

// ============================================================================
// HTML Template (embedded for single-binary deployment)
// ============================================================================

const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>lindol — Philippines Earthquake Monitoring Map</title>

    <!-- MapLibre GL -->
    <link rel="stylesheet" href="https://unpkg.com/maplibre-gl@4.7.1/dist/maplibre-gl.css" />
    <script src="https://unpkg.com/maplibre-gl@4.7.1/dist/maplibre-gl.js"></script>

    <style>
        * { margin: 0; padding: 0; box-sizing: border-box; }

        :root {
            --border: #e2e8f0;
            --text: #0f172a;
            --text-muted: #64748b;
            --bg: #f8fafc;
            --card: #ffffff;
            --accent: #dc2626;
        }

        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
            background: var(--bg);
            color: var(--text);
            height: 100vh;
            display: flex;
            flex-direction: column;
            overflow: hidden;
        }

        .header {
            flex-shrink: 0;
            padding: 0.5rem 1.5rem;
            background: rgba(255, 255, 255, 0.9);
            border-bottom: 1px solid var(--border);
            backdrop-filter: blur(6px);
        }

        .header h1 { font-size: 1.05rem; font-weight: 600; }

        .header p {
            font-size: 0.75rem;
            color: var(--text-muted);
            line-height: 1.3;
        }

        .main {
            flex: 1;
            display: grid;
            grid-template-columns: 1fr 320px;
            gap: 0.5rem;
            padding: 0.5rem 1.5rem;
            min-height: 0;
        }

        .map-area { position: relative; min-height: 0; }

        #map {
            width: 100%;
            height: 100%;
            border-radius: 8px;
            border: 1px solid var(--border);
            background: #eef2f7;
        }

        .map-controls {
            position: absolute;
            top: 0.75rem;
            right: 0.75rem;
            z-index: 10;
        }

        #picker {
            background: var(--card);
            border: 1px solid var(--border);
            border-radius: 8px;
            box-shadow: 0 4px 12px rgba(15, 23, 42, 0.08);
            padding: 0.5rem;
            width: 220px;
        }

        .picker-nav {
            display: flex;
            align-items: center;
            gap: 0.4rem;
            padding-bottom: 0.4rem;
            border-bottom: 1px solid var(--border);
        }

        .picker-year { flex: 1; text-align: center; font-weight: 600; font-size: 0.85rem; }

        .nav-btn, .refresh-btn, .picker-cell, .btn {
            font: inherit;
            font-size: 0.75rem;
            border: 1px solid var(--border);
            background: var(--card);
            border-radius: 6px;
            padding: 0.25rem 0.5rem;
            cursor: pointer;
        }

        .nav-btn:hover:not(:disabled), .picker-cell:hover:not(:disabled) { background: var(--bg); }

        .nav-btn:disabled, .picker-cell:disabled, .refresh-btn:disabled {
            opacity: 0.4;
            cursor: default;
        }

        .refresh-btn { color: var(--accent); }

        .picker-grid {
            display: grid;
            grid-template-columns: repeat(3, 1fr);
            gap: 0.3rem;
            padding-top: 0.4rem;
        }

        .picker-cell.selected {
            background: var(--text);
            color: var(--card);
            border-color: var(--text);
        }

        .legend {
            position: absolute;
            bottom: 0.75rem;
            left: 0.75rem;
            z-index: 10;
            background: rgba(255, 255, 255, 0.85);
            border-radius: 6px;
            box-shadow: 0 4px 12px rgba(15, 23, 42, 0.12);
            padding: 0.6rem 0.75rem;
            font-size: 0.65rem;
        }

        .legend h4 { font-size: 0.75rem; margin-bottom: 0.35rem; }

        .legend-row { display: flex; align-items: center; gap: 0.4rem; margin-top: 0.15rem; }

        .dot {
            width: 9px;
            height: 9px;
            border-radius: 50%;
            display: inline-block;
            flex-shrink: 0;
        }

        .side-panel {
            display: flex;
            flex-direction: column;
            background: var(--card);
            border: 1px solid var(--border);
            border-radius: 8px;
            min-height: 0;
        }

        #panel-header {
            flex-shrink: 0;
            padding: 0.6rem 0.75rem;
            border-bottom: 1px solid var(--border);
        }

        .panel-title { font-size: 0.85rem; font-weight: 600; }

        .panel-month { font-size: 0.7rem; color: var(--text-muted); }

        #event-list { flex: 1; overflow-y: auto; min-height: 0; background: var(--bg); }

        .event-row {
            padding: 0.6rem 0.75rem;
            border-bottom: 1px solid var(--border);
            cursor: pointer;
            transition: background 0.15s;
        }

        .event-row:hover { background: #eef2f7; }

        .event-top { display: flex; align-items: center; gap: 0.45rem; }

        .event-mag { font-size: 0.8rem; font-weight: 600; }

        .event-depth { font-size: 0.7rem; color: var(--text-muted); }

        .event-ago { margin-left: auto; font-size: 0.65rem; color: var(--text-muted); }

        .event-loc { font-size: 0.72rem; margin-top: 0.25rem; white-space: pre-line; }

        .event-dt { font-size: 0.65rem; color: var(--text-muted); margin-top: 0.15rem; }

        .list-footer {
            text-align: center;
            padding: 0.5rem;
            font-size: 0.65rem;
            color: var(--text-muted);
        }

        .empty-state, .error-state { padding: 1.5rem 1rem; text-align: center; font-size: 0.8rem; }

        .error-title { color: var(--accent); font-weight: 600; margin-bottom: 0.4rem; }

        .error-hint { font-size: 0.7rem; color: var(--text-muted); margin-bottom: 0.75rem; }

        .skeleton-row { padding: 0.75rem; border-bottom: 1px solid var(--border); }

        .skeleton-bar {
            height: 0.6rem;
            border-radius: 4px;
            background: var(--border);
            margin-top: 0.35rem;
            animation: pulse 1.4s ease-in-out infinite;
            width: 60%;
        }

        .skeleton-bar.wide { width: 90%; }

        @keyframes pulse {
            0%, 100% { opacity: 1; }
            50% { opacity: 0.45; }
        }

        .footer {
            flex-shrink: 0;
            display: flex;
            justify-content: space-between;
            padding: 0.4rem 1.5rem;
            border-top: 1px solid var(--border);
            background: rgba(255, 255, 255, 0.9);
            font-size: 0.68rem;
            color: var(--text-muted);
        }

        .footer a { color: inherit; font-style: italic; }

        @media (max-width: 900px) {
            body { overflow-y: auto; }
            .main { grid-template-columns: 1fr; }
            .map-area { min-height: 400px; }
            .side-panel { min-height: 300px; }
        }
    </style>
</head>
<body>
    <header class="header">
        <h1>Philippines Earthquake Monitoring Map</h1>
        <p>Visualize earthquake events and their magnitudes across the Philippines using live data from PHIVOLCS.</p>
    </header>

    <main class="main">
        <div class="map-area">
            <div class="map-controls"><div id="picker"></div></div>
            <div class="legend" id="legend">
                <h4>Legend</h4>
            </div>
            <div id="map"></div>
        </div>

        <div class="side-panel">
            <div id="panel-header"></div>
            <div id="event-list"></div>
        </div>
    </main>

    <footer class="footer">
        <div>
            Data Source:
            <a href="https://earthquake.phivolcs.dost.gov.ph/" target="_blank" rel="noopener noreferrer">PHIVOLCS Earthquake Information</a>
        </div>
        <div>lindol v0.1.0</div>
    </footer>

    <script>
        let map = null;
        let popup = null;

        function post(path, body) {
            return fetch(path, {
                method: 'POST',
                headers: { 'Content-Type': 'application/json' },
                body: body ? JSON.stringify(body) : null,
            });
        }

        function onPointClick(e) {
            const feature = e.features && e.features[0];
            if (feature) post('/click', { index: feature.properties.idx });
        }

        function applyOp(op) {
            if (!map && op.op !== 'attach') return;
            switch (op.op) {
                case 'attach':
                    if (map) { map.remove(); }
                    map = new maplibregl.Map({
                        container: 'map',
                        style: 'https://demotiles.maplibre.org/style.json',
                        center: op.center,
                        zoom: op.zoom,
                    });
                    map.on('load', () => post('/engine/ready'));
                    break;
                case 'addSource':
                    map.addSource(op.id, { type: 'geojson', data: op.data, cluster: false });
                    break;
                case 'addLayer':
                    map.addLayer({ id: op.id, type: 'circle', source: op.source, paint: op.paint });
                    break;
                case 'removeLayer':
                    if (map.getLayer(op.id)) map.removeLayer(op.id);
                    break;
                case 'removeSource':
                    if (map.getSource(op.id)) map.removeSource(op.id);
                    break;
                case 'bindClick':
                    map.off('click', op.layer, onPointClick);
                    map.on('click', op.layer, onPointClick);
                    break;
                case 'resize':
                    if (map.isStyleLoaded()) map.resize();
                    break;
                case 'flyTo':
                    map.flyTo({ center: op.center, duration: op.duration });
                    break;
                case 'showPopup':
                    if (!popup) {
                        popup = new maplibregl.Popup({
                            closeButton: true,
                            closeOnClick: false,
                            closeOnMove: false,
                            focusAfterOpen: false,
                        });
                        popup.on('close', () => post('/engine/popup-closed'));
                    }
                    popup.setLngLat(op.at).setHTML(op.html).addTo(map);
                    break;
                case 'closePopup':
                    if (popup) popup.remove();
                    break;
                case 'detach':
                    if (popup) { popup.remove(); popup = null; }
                    map.remove();
                    map = null;
                    break;
            }
        }

        function selectMonth(month) { post('/month', { month }); }
        function yearNav(dir) { post('/picker/year', { dir }); }
        function focusEvent(index) { post('/focus', { index }); }
        function doRefresh() { post('/refresh'); }

        const es = new EventSource('/stream');
        es.addEventListener('map', (e) => applyOp(JSON.parse(e.data)));
        es.addEventListener('list', (e) => { document.getElementById('event-list').innerHTML = e.data; });
        es.addEventListener('picker', (e) => { document.getElementById('picker').innerHTML = e.data; });
        es.addEventListener('panel', (e) => { document.getElementById('panel-header').innerHTML = e.data; });

        new ResizeObserver(() => post('/engine/resize')).observe(document.getElementById('map'));

        function load(path, target) {
            return fetch(path).then((r) => r.text()).then((html) => {
                document.getElementById(target).innerHTML = html;
            });
        }

        fetch('/legend').then((r) => r.text()).then((html) => {
            document.getElementById('legend').insertAdjacentHTML('beforeend', html);
        });

        Promise.all([
            load('/events/list', 'event-list'),
            load('/picker', 'picker'),
            load('/panel', 'panel-header'),
        ]).then(() => post('/engine/mounted'));
    </script>
</body>
</html>
"##;

// The legend is static but rendered from the same table the paint
// expressions use.
async fn legend_handler() -> Html<String> {
    Html(render_legend())
}
