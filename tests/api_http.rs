// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - GET /earthquakes (plus query filters)
// - GET /earthquakes/{id}  (hit and miss)
// - GET /stats
// - GET /alerts/recent

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use seismic_watch::alerts::AlertRecord;
use seismic_watch::api::{create_router, AppState};
use seismic_watch::feeds::config::{FeedConfig, FeedSource};
use seismic_watch::feeds::fetch::StaticFetcher;
use seismic_watch::feeds::formats::FeedFormat;
use seismic_watch::history::AlertHistory;
use seismic_watch::stats::Severity;
use seismic_watch::SeismicEvent;

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

const USGS_ALL_DAY: &str = include_str!("fixtures/usgs_all_day.json");
const EMSC_QUERY: &str = include_str!("fixtures/emsc_query.json");
const IMD_QUERY: &str = include_str!("fixtures/imd_query.json");
const IRIS_EVENTS: &str = include_str!("fixtures/iris_events.txt");

/// Build the same Router the binary uses, backed by canned feed payloads.
fn test_router() -> (Router, Arc<AlertHistory>) {
    let fetcher = StaticFetcher::new()
        .with("https://feeds.test/usgs", USGS_ALL_DAY)
        .with("https://feeds.test/emsc", EMSC_QUERY)
        .with("https://feeds.test/imd", IMD_QUERY)
        .with("https://feeds.test/iris", IRIS_EVENTS);
    let entries = [
        ("USGS", "https://feeds.test/usgs", FeedFormat::GeoJson),
        ("EMSC", "https://feeds.test/emsc", FeedFormat::Emsc),
        ("IMD", "https://feeds.test/imd", FeedFormat::GeoJson),
        ("IRIS", "https://feeds.test/iris", FeedFormat::Pipe),
    ];
    let feeds = FeedConfig {
        sources: entries
            .into_iter()
            .map(|(tag, url, format)| FeedSource {
                tag: tag.to_string(),
                url: url.to_string(),
                format,
            })
            .collect(),
    };
    let history = Arc::new(AlertHistory::with_capacity(100));
    let state = AppState::new(Arc::new(fetcher), Arc::new(feeds), Arc::clone(&history));
    (create_router(state), history)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    let resp = app.oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    (status, bytes)
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let (app, _) = test_router();
    let (status, bytes) = get(app, "/health").await;
    assert_eq!(status, StatusCode::OK, "health should be 200");
    assert_eq!(String::from_utf8(bytes).expect("utf8").trim(), "ok");
}

#[tokio::test]
async fn api_earthquakes_returns_the_merged_batch() {
    let (app, _) = test_router();
    let (status, bytes) = get(app, "/earthquakes").await;
    assert_eq!(status, StatusCode::OK);

    let events: Vec<SeismicEvent> = serde_json::from_slice(&bytes).expect("parse events json");
    assert_eq!(events.len(), 12, "merged batch size");
    assert!(
        events.windows(2).all(|w| w[0].time >= w[1].time),
        "batch must be most-recent-first"
    );
}

#[tokio::test]
async fn api_earthquakes_source_filter_narrows_the_batch() {
    let (app, _) = test_router();
    let (status, bytes) = get(app, "/earthquakes?source=iris").await;
    assert_eq!(status, StatusCode::OK);

    let events: Vec<SeismicEvent> = serde_json::from_slice(&bytes).expect("parse events json");
    assert_eq!(events.len(), 4);
    assert!(events.iter().all(|e| e.source == "IRIS"));
}

#[tokio::test]
async fn api_earthquakes_magnitude_and_limit_compose() {
    let (app, _) = test_router();
    let (status, bytes) = get(app, "/earthquakes?min_magnitude=5&limit=2").await;
    assert_eq!(status, StatusCode::OK);

    let events: Vec<SeismicEvent> = serde_json::from_slice(&bytes).expect("parse events json");
    assert_eq!(events.len(), 2, "limit applies after the magnitude floor");
    assert!(events.iter().all(|e| e.magnitude >= 5.0));
}

#[tokio::test]
async fn api_earthquakes_place_filter_is_case_insensitive() {
    let (app, _) = test_router();
    let (status, bytes) = get(app, "/earthquakes?place=nepal").await;
    assert_eq!(status, StatusCode::OK);

    let events: Vec<SeismicEvent> = serde_json::from_slice(&bytes).expect("parse events json");
    assert_eq!(events.len(), 5);
    assert!(events
        .iter()
        .all(|e| e.place.to_lowercase().contains("nepal")));
}

#[tokio::test]
async fn api_earthquake_by_id_returns_the_collision_winner() {
    let (app, _) = test_router();
    let (status, bytes) = get(app, "/earthquakes/us7000l5dx").await;
    assert_eq!(status, StatusCode::OK);

    let ev: SeismicEvent = serde_json::from_slice(&bytes).expect("parse event json");
    assert_eq!(ev.id, "us7000l5dx");
    // The IMD window revises this event to 5.3 and is merged after USGS.
    assert_eq!(ev.magnitude, 5.3);
    assert_eq!(ev.source, "IMD");
}

#[tokio::test]
async fn api_earthquake_by_unknown_id_is_404_with_error_body() {
    let (app, _) = test_router();
    let (status, bytes) = get(app, "/earthquakes/definitely-not-real").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let v: Json = serde_json::from_slice(&bytes).expect("parse error json");
    assert!(v.get("error").is_some(), "missing 'error'");
}

#[tokio::test]
async fn api_stats_summarizes_the_live_batch() {
    let (app, _) = test_router();
    let (status, bytes) = get(app, "/stats").await;
    assert_eq!(status, StatusCode::OK);

    let v: Json = serde_json::from_slice(&bytes).expect("parse stats json");
    assert_eq!(v["total"], 12);
    assert_eq!(v["by_source"]["IRIS"], 4);
    assert_eq!(v["severity"]["strong"], 5);
    assert_eq!(v["severity"]["severe"], 0);
    assert_eq!(v["strongest"]["id"], "us7000l5er");
    // EMSC 20240101_0000001 and IRIS-1 tie for the newest timestamp.
    assert_eq!(v["latest_time"], 1_704_067_200_000_i64);
}

#[tokio::test]
async fn api_recent_alerts_lists_newest_first() {
    let (app, history) = test_router();
    for (id, mag) in [("first", 4.8), ("second", 6.2)] {
        history.push(AlertRecord {
            id: id.to_string(),
            magnitude: mag,
            place: "Nepal".to_string(),
            time: 1_700_000_000_000,
            source: "USGS".to_string(),
            severity: Severity::classify(mag),
            detected_at: Utc::now(),
        });
    }

    let (status, bytes) = get(app, "/alerts/recent").await;
    assert_eq!(status, StatusCode::OK);

    let alerts: Vec<AlertRecord> = serde_json::from_slice(&bytes).expect("parse alerts json");
    assert_eq!(alerts.len(), 2);
    assert_eq!(alerts[0].id, "second");
    assert_eq!(alerts[1].id, "first");
}

#[tokio::test]
async fn api_alerts_empty_history_is_an_empty_array() {
    let (app, _) = test_router();
    let (status, bytes) = get(app, "/alerts/recent").await;
    assert_eq!(status, StatusCode::OK);
    let alerts: Vec<AlertRecord> = serde_json::from_slice(&bytes).expect("parse alerts json");
    assert!(alerts.is_empty());
}
