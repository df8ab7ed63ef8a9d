// src/stats.rs
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::feeds::types::SeismicEvent;

/// Magnitude band, from strongest to mildest: >= 7.0 Severe, >= 5.0 Strong,
/// >= 3.0 Light, below that Minor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Minor,
    Light,
    Strong,
    Severe,
}

impl Severity {
    pub fn classify(magnitude: f64) -> Self {
        if magnitude >= 7.0 {
            Severity::Severe
        } else if magnitude >= 5.0 {
            Severity::Strong
        } else if magnitude >= 3.0 {
            Severity::Light
        } else {
            Severity::Minor
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Minor => "minor",
            Severity::Light => "light",
            Severity::Strong => "strong",
            Severity::Severe => "severe",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub minor: usize,
    pub light: usize,
    pub strong: usize,
    pub severe: usize,
}

impl SeverityCounts {
    fn bump(&mut self, severity: Severity) {
        match severity {
            Severity::Minor => self.minor += 1,
            Severity::Light => self.light += 1,
            Severity::Strong => self.strong += 1,
            Severity::Severe => self.severe += 1,
        }
    }
}

/// Aggregate view of one merged batch, served on `/stats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedSummary {
    pub total: usize,
    pub by_source: BTreeMap<String, usize>,
    pub severity: SeverityCounts,
    pub average_magnitude: f64,
    pub strongest: Option<SeismicEvent>,
    pub latest_time: Option<i64>,
}

pub fn summarize(events: &[SeismicEvent]) -> FeedSummary {
    let mut by_source: BTreeMap<String, usize> = BTreeMap::new();
    let mut severity = SeverityCounts::default();
    let mut mag_sum = 0.0;
    let mut strongest: Option<&SeismicEvent> = None;
    let mut latest_time: Option<i64> = None;

    for ev in events {
        *by_source.entry(ev.source.clone()).or_insert(0) += 1;
        severity.bump(Severity::classify(ev.magnitude));
        mag_sum += ev.magnitude;
        let stronger = strongest
            .map(|s| ev.magnitude.total_cmp(&s.magnitude).is_gt())
            .unwrap_or(true);
        if stronger {
            strongest = Some(ev);
        }
        latest_time = Some(latest_time.map_or(ev.time, |t| t.max(ev.time)));
    }

    let average_magnitude = if events.is_empty() {
        0.0
    } else {
        mag_sum / events.len() as f64
    };

    FeedSummary {
        total: events.len(),
        by_source,
        severity,
        average_magnitude,
        strongest: strongest.cloned(),
        latest_time,
    }
}
