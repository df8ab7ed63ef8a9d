// src/feeds/types.rs

/// One earthquake observation in the common shape every feed maps into.
///
/// `id` is unique within its originating feed only; two feeds may describe
/// the same physical event under different ids, or unrelated events under
/// the same id. Records are plain values: built fresh on every aggregation
/// pass, never cached or persisted.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct SeismicEvent {
    pub id: String,
    /// Richter-like magnitude; upstream bounds are not enforced.
    pub magnitude: f64,
    /// Human-readable location; empty when the feed carries none.
    #[serde(default)]
    pub place: String,
    /// Occurrence time (not ingestion time), epoch milliseconds UTC.
    pub time: i64,
    pub latitude: f64,
    pub longitude: f64,
    /// Depth in km. `None` when the upstream record omits the third
    /// coordinate; negative values pass through untouched.
    pub depth: Option<f64>,
    /// Origin feed tag, e.g. "USGS", "EMSC", "IMD", "IRIS".
    pub source: String,
}
