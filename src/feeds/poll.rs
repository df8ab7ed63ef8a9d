// src/feeds/poll.rs
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use metrics::{counter, gauge};
use tokio::task::JoinHandle;

use crate::alerts::AlertTracker;
use crate::feeds::config::FeedConfig;
use crate::feeds::fetch::Fetcher;
use crate::feeds::fetch_all;
use crate::history::AlertHistory;

/// Background poll cadence. Env override: `QUAKE_POLL_INTERVAL_SECS`.
#[derive(Debug, Clone, Copy)]
pub struct PollerCfg {
    pub interval_secs: u64,
}

impl Default for PollerCfg {
    fn default() -> Self {
        Self { interval_secs: 300 }
    }
}

impl PollerCfg {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(v) = std::env::var("QUAKE_POLL_INTERVAL_SECS") {
            match v.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => cfg.interval_secs = secs,
                _ => tracing::warn!(value = %v, "invalid QUAKE_POLL_INTERVAL_SECS, using default"),
            }
        }
        cfg
    }
}

/// Spawn the periodic aggregation task.
///
/// Each tick re-fetches every feed, runs the alert scan over the merged
/// batch, and records any alerts. The task never exits on its own; errors
/// inside a tick are absorbed by `fetch_all`.
pub fn spawn_poller(
    cfg: PollerCfg,
    feeds: Arc<FeedConfig>,
    fetcher: Arc<dyn Fetcher>,
    mut tracker: AlertTracker,
    history: Arc<AlertHistory>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(cfg.interval_secs));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        tracing::info!(interval_secs = cfg.interval_secs, "poller started");

        loop {
            ticker.tick().await;
            let events = fetch_all(fetcher.as_ref(), &feeds).await;
            let alerts = tracker.scan(&events, Utc::now());
            for alert in &alerts {
                history.push(alert.clone());
            }

            counter!("poll_runs_total").increment(1);
            gauge!("poll_last_run_ts").set(Utc::now().timestamp() as f64);
            tracing::info!(
                target: "poll",
                events = events.len(),
                alerts = alerts.len(),
                "poll tick"
            );
        }
    })
}
