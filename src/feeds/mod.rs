// src/feeds/mod.rs
pub mod config;
pub mod fetch;
pub mod formats;
pub mod poll;
pub mod types;

use std::collections::HashMap;

use anyhow::Result;
use futures::future::join_all;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;

use crate::feeds::config::{FeedConfig, FeedSource};
use crate::feeds::fetch::Fetcher;
use crate::feeds::types::SeismicEvent;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("feed_events_total", "Events parsed from upstream feeds.");
        describe_counter!("feed_fetch_errors_total", "Feed fetch/parse failures.");
        describe_counter!("feed_dedup_total", "Events dropped by id deduplication.");
        describe_histogram!("feed_parse_ms", "Feed payload parse time in milliseconds.");
        describe_gauge!(
            "feed_sources_ok",
            "Sources that contributed to the last aggregation."
        );
    });
}

async fn fetch_source(fetcher: &dyn Fetcher, src: &FeedSource) -> Result<Vec<SeismicEvent>> {
    let body = fetcher.fetch(&src.url).await?;
    src.format.parse(&src.tag, &body)
}

/// Fetch every configured feed concurrently and merge the results.
///
/// Settle-and-collect: all sources run to completion regardless of
/// individual failures; a failed source is logged, counted, and contributes
/// zero records. The merged output holds at most one record per id and is
/// sorted most-recent-first. The call itself never fails. An empty result
/// can mean a quiet day or that every source was down; telemetry carries
/// the difference.
pub async fn fetch_all(fetcher: &dyn Fetcher, cfg: &FeedConfig) -> Vec<SeismicEvent> {
    ensure_metrics_described();

    let fetches = cfg.sources.iter().map(|src| async move {
        match fetch_source(fetcher, src).await {
            Ok(events) => {
                tracing::debug!(source = %src.tag, count = events.len(), "feed fetched");
                Some(events)
            }
            Err(e) => {
                tracing::warn!(error = ?e, source = %src.tag, "feed failed");
                counter!("feed_fetch_errors_total").increment(1);
                None
            }
        }
    });

    // join_all keeps input order, which keeps the dedup winner deterministic.
    let settled = join_all(fetches).await;
    let sources_ok = settled.iter().filter(|r| r.is_some()).count();
    gauge!("feed_sources_ok").set(sources_ok as f64);

    let merged: Vec<SeismicEvent> = settled.into_iter().flatten().flatten().collect();
    dedup_and_sort(merged)
}

/// Collapse id collisions (the later record wins) and order by `time`
/// descending.
///
/// Keyed on the raw `id`, not `(source, id)`, matching the merge this
/// replaces: ids are only unique per source, so when two feeds reuse one id
/// the record from the feed listed later in the config silently replaces the
/// earlier one.
pub fn dedup_and_sort(events: Vec<SeismicEvent>) -> Vec<SeismicEvent> {
    let before = events.len();
    let mut by_id: HashMap<String, SeismicEvent> = HashMap::with_capacity(before);
    for ev in events {
        by_id.insert(ev.id.clone(), ev);
    }
    let dropped = before - by_id.len();
    if dropped > 0 {
        counter!("feed_dedup_total").increment(dropped as u64);
    }

    let mut out: Vec<SeismicEvent> = by_id.into_values().collect();
    out.sort_by(|a, b| b.time.cmp(&a.time));
    out
}
