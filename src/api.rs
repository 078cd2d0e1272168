use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;

use crate::filter::CurrentEvent;
use crate::notify::ATTRIBUTION;
use crate::scheduler::EventReceiver;

const ICON: &str = "mdi:ambulance";

#[derive(Clone)]
pub struct AppState {
    pub name: String,
    pub events: EventReceiver,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/event", get(current_event))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Sensor-style view of the held event: `state` is the display string.
#[derive(Debug, Serialize)]
pub struct EventView {
    pub name: String,
    pub icon: &'static str,
    pub state: Option<String>,
    pub attributes: Option<EventAttributes>,
}

#[derive(Debug, Serialize)]
pub struct EventAttributes {
    pub latitude: f64,
    pub longitude: f64,
    pub distance: u64,
    pub time: String,
    pub capcode: Option<String>,
    pub region: Option<String>,
    pub region_name: Option<String>,
    pub discipline: Option<String>,
    pub link: Option<String>,
    pub attribution: &'static str,
}

impl EventView {
    pub fn from_event(name: &str, ev: Option<&CurrentEvent>) -> Self {
        Self {
            name: name.to_string(),
            icon: ICON,
            state: ev.map(|e| e.message.clone()),
            attributes: ev.map(|e| EventAttributes {
                latitude: e.latitude,
                longitude: e.longitude,
                distance: e.distance_m,
                time: e.timestamp.format("%Y-%m-%dT%H:%M:%S").to_string(),
                capcode: e.capcode.clone(),
                region: e.region.clone(),
                region_name: e.region_name.clone(),
                discipline: e.discipline.clone(),
                link: e.link.clone(),
                attribution: ATTRIBUTION,
            }),
        }
    }
}

async fn current_event(State(state): State<AppState>) -> Json<EventView> {
    let ev = state.events.borrow().clone();
    Json(EventView::from_event(&state.name, ev.as_ref()))
}
