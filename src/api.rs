use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::alerts::AlertRecord;
use crate::feeds::config::FeedConfig;
use crate::feeds::fetch::Fetcher;
use crate::feeds::fetch_all;
use crate::feeds::types::SeismicEvent;
use crate::filter::EventFilter;
use crate::history::AlertHistory;
use crate::stats::{summarize, FeedSummary};

#[derive(Clone)]
pub struct AppState {
    fetcher: Arc<dyn Fetcher>,
    feeds: Arc<FeedConfig>,
    history: Arc<AlertHistory>,
}

impl AppState {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        feeds: Arc<FeedConfig>,
        history: Arc<AlertHistory>,
    ) -> Self {
        Self {
            fetcher,
            feeds,
            history,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/earthquakes", get(list_earthquakes))
        .route("/earthquakes/{id}", get(get_earthquake))
        .route("/stats", get(stats))
        .route("/alerts/recent", get(recent_alerts))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Every read hits the upstream feeds live; nothing is cached between
/// requests, so clients always see the current feed contents.
async fn list_earthquakes(
    State(state): State<AppState>,
    Query(filter): Query<EventFilter>,
) -> Json<Vec<SeismicEvent>> {
    let events = fetch_all(state.fetcher.as_ref(), &state.feeds).await;
    Json(filter.apply(events))
}

#[derive(serde::Serialize)]
struct ErrorBody {
    error: String,
}

async fn get_earthquake(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SeismicEvent>, (StatusCode, Json<ErrorBody>)> {
    let events = fetch_all(state.fetcher.as_ref(), &state.feeds).await;
    match events.into_iter().find(|e| e.id == id) {
        Some(ev) => Ok(Json(ev)),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorBody {
                error: format!("no event with id '{id}'"),
            }),
        )),
    }
}

async fn stats(State(state): State<AppState>) -> Json<FeedSummary> {
    let events = fetch_all(state.fetcher.as_ref(), &state.feeds).await;
    Json(summarize(&events))
}

async fn recent_alerts(State(state): State<AppState>) -> Json<Vec<AlertRecord>> {
    let mut rows = state.history.snapshot_last_n(10);
    rows.reverse(); // newest first
    Json(rows)
}
