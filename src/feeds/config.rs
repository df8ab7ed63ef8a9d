// src/feeds/config.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::feeds::formats::FeedFormat;

const ENV_PATH: &str = "QUAKE_FEEDS_PATH";

/// One configured upstream feed: display tag, endpoint, payload format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSource {
    pub tag: String,
    pub url: String,
    pub format: FeedFormat,
}

/// Ordered feed table.
///
/// Order matters: the aggregator's last-write-wins dedup follows this order,
/// so a later entry shadows an earlier one when both report the same id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedConfig {
    pub sources: Vec<FeedSource>,
}

/// File shape before format names are resolved. Kept separate from
/// `FeedSource` so an unknown format string degrades to a skipped entry
/// instead of failing the whole load.
#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    sources: Vec<RawSource>,
}

#[derive(Debug, Deserialize)]
struct RawSource {
    tag: String,
    url: String,
    format: String,
}

impl FeedConfig {
    /// Load the feed table from an explicit path. Supports TOML or JSON.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading feed table from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        parse_config(&content, ext.as_str())
    }

    /// Load the feed table using env var + fallbacks:
    /// 1) $QUAKE_FEEDS_PATH
    /// 2) config/feeds.toml
    /// 3) config/feeds.json
    /// 4) built-in production seed
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            } else {
                return Err(anyhow!("QUAKE_FEEDS_PATH points to non-existent path"));
            }
        }
        let toml_p = PathBuf::from("config/feeds.toml");
        if toml_p.exists() {
            return Self::load_from(&toml_p);
        }
        let json_p = PathBuf::from("config/feeds.json");
        if json_p.exists() {
            return Self::load_from(&json_p);
        }
        Ok(Self::default_seed())
    }

    /// The four production feeds, in merge order.
    pub fn default_seed() -> Self {
        let sources = [
            (
                "USGS",
                "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_day.geojson",
                FeedFormat::GeoJson,
            ),
            (
                "EMSC",
                "https://www.seismicportal.eu/fdsnws/event/1/query?format=json&limit=100",
                FeedFormat::Emsc,
            ),
            (
                "IMD",
                "https://earthquake.usgs.gov/fdsnws/event/1/query?format=geojson&starttime=2024-01-01&limit=100&minlatitude=8.4&maxlatitude=37.6&minlongitude=68.7&maxlongitude=97.25",
                FeedFormat::GeoJson,
            ),
            (
                "IRIS",
                "https://service.iris.edu/fdsnws/event/1/query?format=text&limit=100",
                FeedFormat::Pipe,
            ),
        ]
        .into_iter()
        .map(|(tag, url, format)| FeedSource {
            tag: tag.to_string(),
            url: url.to_string(),
            format,
        })
        .collect();

        Self { sources }
    }
}

fn parse_config(s: &str, hint_ext: &str) -> Result<FeedConfig> {
    // Try TOML first unless the content is obviously a JSON document.
    let try_toml = hint_ext == "toml" || !s.trim_start().starts_with('{');
    if try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    if let Ok(v) = parse_json(s) {
        return Ok(v);
    }
    if !try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    Err(anyhow!("unsupported feed table format"))
}

fn parse_toml(s: &str) -> Result<FeedConfig> {
    let raw: RawConfig = toml::from_str(s)?;
    Ok(resolve(raw))
}

fn parse_json(s: &str) -> Result<FeedConfig> {
    let raw: RawConfig = serde_json::from_str(s)?;
    Ok(resolve(raw))
}

/// Resolve format names and drop unusable entries, preserving file order.
fn resolve(raw: RawConfig) -> FeedConfig {
    let mut sources = Vec::with_capacity(raw.sources.len());
    for entry in raw.sources {
        let tag = entry.tag.trim().to_string();
        if tag.is_empty() || entry.url.trim().is_empty() {
            tracing::warn!(url = %entry.url, "feed entry without tag or url skipped");
            continue;
        }
        match FeedFormat::lookup(&entry.format) {
            Some(format) => sources.push(FeedSource {
                tag,
                url: entry.url.trim().to_string(),
                format,
            }),
            None => {
                tracing::warn!(tag = %tag, format = %entry.format, "unknown feed format skipped");
            }
        }
    }
    FeedConfig { sources }
}
