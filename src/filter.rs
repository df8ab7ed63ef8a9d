// src/filter.rs
use serde::Deserialize;

use crate::feeds::types::SeismicEvent;

/// Query-string filter for `/earthquakes`. All fields optional; an empty
/// filter passes everything through.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventFilter {
    /// Source tag, matched case-insensitively. `"all"` means no filter.
    pub source: Option<String>,
    /// Case-insensitive substring of the place description.
    pub place: Option<String>,
    /// Inclusive magnitude floor.
    pub min_magnitude: Option<f64>,
    /// Keep at most this many records (applied after the other filters).
    pub limit: Option<usize>,
}

impl EventFilter {
    pub fn matches(&self, ev: &SeismicEvent) -> bool {
        if let Some(src) = &self.source {
            if !src.eq_ignore_ascii_case("all") && !src.eq_ignore_ascii_case(&ev.source) {
                return false;
            }
        }
        if let Some(place) = &self.place {
            if !ev.place.to_lowercase().contains(&place.to_lowercase()) {
                return false;
            }
        }
        if let Some(min) = self.min_magnitude {
            if ev.magnitude < min {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, events: Vec<SeismicEvent>) -> Vec<SeismicEvent> {
        let mut kept: Vec<SeismicEvent> = events.into_iter().filter(|e| self.matches(e)).collect();
        if let Some(limit) = self.limit {
            kept.truncate(limit);
        }
        kept
    }
}
