// src/feeds/formats/mod.rs
pub mod emsc;
pub mod geojson;
pub mod pipe;

use anyhow::Result;

use crate::feeds::types::SeismicEvent;

/// Payload format of a configured feed, keying the parser strategy.
///
/// Keyed on the payload shape rather than the source tag, so several sources
/// can share one parser: IMD publishes through the same FDSN GeoJSON endpoint
/// family as USGS and differs only in its tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFormat {
    /// USGS-style GeoJSON feature collection: numeric epoch-ms `time`,
    /// id on the feature itself.
    GeoJson,
    /// EMSC portal JSON: id at `properties.unid`, place at
    /// `properties.flynn_region`, ISO-8601 `time`.
    Emsc,
    /// Newline-delimited pipe-separated text, `#` lines skipped.
    Pipe,
}

impl FeedFormat {
    /// Case-insensitive lookup used by config loading. `None` for format
    /// names this build does not know; the caller skips the entry instead of
    /// failing, so config files may list sources ahead of parser support.
    pub fn lookup(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "geojson" => Some(FeedFormat::GeoJson),
            "emsc" => Some(FeedFormat::Emsc),
            "pipe" => Some(FeedFormat::Pipe),
            _ => None,
        }
    }

    /// Config-file spelling of the format.
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedFormat::GeoJson => "geojson",
            FeedFormat::Emsc => "emsc",
            FeedFormat::Pipe => "pipe",
        }
    }

    /// Parse one raw payload into events tagged with `tag`.
    ///
    /// A structural parse failure fails the whole batch for this source; the
    /// aggregator absorbs that like any transport failure. Individual records
    /// missing a required field are skipped, never defaulted.
    pub fn parse(self, tag: &str, body: &str) -> Result<Vec<SeismicEvent>> {
        match self {
            FeedFormat::GeoJson => geojson::parse(tag, body),
            FeedFormat::Emsc => emsc::parse(tag, body),
            FeedFormat::Pipe => pipe::parse(tag, body),
        }
    }
}

/// Parse an ISO-8601 timestamp into epoch milliseconds.
///
/// Accepts offset-carrying forms ("2023-11-05T10:43:12.4Z") and bare
/// wall-clock forms ("2024-01-01T00:00:00"). Bare forms are read as UTC so a
/// record's time never depends on the host zone.
pub(crate) fn iso_to_epoch_ms(ts: &str) -> Option<i64> {
    let ts = ts.trim();
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(ts) {
        return Some(dt.timestamp_millis());
    }
    chrono::NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.and_utc().timestamp_millis())
}
