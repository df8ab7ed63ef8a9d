// src/alerts.rs
use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};

use crate::feeds::types::SeismicEvent;
use crate::stats::Severity;

/// When to raise an alert. Env overrides: `QUAKE_ALERT_MIN_MAGNITUDE`,
/// `QUAKE_ALERT_COOLDOWN_SECS`.
#[derive(Debug, Clone, Copy)]
pub struct AlertPolicy {
    /// Inclusive magnitude floor for alerting.
    pub min_magnitude: f64,
    /// Minimum gap between alerts from the same source.
    pub cooldown_secs: i64,
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self {
            min_magnitude: 4.5,
            cooldown_secs: 600,
        }
    }
}

impl AlertPolicy {
    pub fn from_env() -> Self {
        let mut policy = Self::default();
        if let Ok(v) = std::env::var("QUAKE_ALERT_MIN_MAGNITUDE") {
            match v.trim().parse::<f64>() {
                Ok(m) if m.is_finite() => policy.min_magnitude = m,
                _ => tracing::warn!(value = %v, "invalid QUAKE_ALERT_MIN_MAGNITUDE, using default"),
            }
        }
        if let Ok(v) = std::env::var("QUAKE_ALERT_COOLDOWN_SECS") {
            match v.trim().parse::<i64>() {
                Ok(s) if s >= 0 => policy.cooldown_secs = s,
                _ => tracing::warn!(value = %v, "invalid QUAKE_ALERT_COOLDOWN_SECS, using default"),
            }
        }
        policy
    }
}

/// One raised alert, kept in the in-memory history and served on
/// `/alerts/recent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub id: String,
    pub magnitude: f64,
    pub place: String,
    pub time: i64,
    pub source: String,
    pub severity: Severity,
    pub detected_at: DateTime<Utc>,
}

/// Stateful alert scanner fed one merged batch per poll tick.
///
/// The first batch only primes the seen set; alerting starts with the
/// second, so a restart does not replay the whole feed window as "new".
/// Per-source cooldown keeps an aftershock sequence from firing on every
/// tick, but a severity escalation inside the window still passes.
pub struct AlertTracker {
    policy: AlertPolicy,
    primed: bool,
    seen: HashSet<String>,
    last_alert: HashMap<String, (DateTime<Utc>, Severity)>,
}

impl AlertTracker {
    pub fn new(policy: AlertPolicy) -> Self {
        Self {
            policy,
            primed: false,
            seen: HashSet::new(),
            last_alert: HashMap::new(),
        }
    }

    pub fn scan(&mut self, events: &[SeismicEvent], now: DateTime<Utc>) -> Vec<AlertRecord> {
        let current: HashSet<String> = events.iter().map(|e| e.id.clone()).collect();

        if !self.primed {
            self.primed = true;
            self.seen = current;
            return Vec::new();
        }

        let mut raised = Vec::new();
        for ev in events {
            if ev.magnitude < self.policy.min_magnitude || self.seen.contains(&ev.id) {
                continue;
            }
            let severity = Severity::classify(ev.magnitude);
            if !self.cooldown_allows(&ev.source, severity, now) {
                counter!("alerts_suppressed_total").increment(1);
                tracing::debug!(id = %ev.id, source = %ev.source, "alert suppressed by cooldown");
                continue;
            }

            self.last_alert.insert(ev.source.clone(), (now, severity));
            counter!("alerts_emitted_total").increment(1);
            tracing::warn!(
                target: "alerts",
                id = %ev.id,
                magnitude = ev.magnitude,
                place = %ev.place,
                source = %ev.source,
                severity = severity.as_str(),
                "new significant earthquake"
            );
            raised.push(AlertRecord {
                id: ev.id.clone(),
                magnitude: ev.magnitude,
                place: ev.place.clone(),
                time: ev.time,
                source: ev.source.clone(),
                severity,
                detected_at: now,
            });
        }

        self.seen = current;
        raised
    }

    fn cooldown_allows(&self, source: &str, severity: Severity, now: DateTime<Utc>) -> bool {
        match self.last_alert.get(source) {
            None => true,
            Some((at, last_severity)) => {
                let elapsed = now.signed_duration_since(*at);
                elapsed >= Duration::seconds(self.policy.cooldown_secs) || severity > *last_severity
            }
        }
    }
}
