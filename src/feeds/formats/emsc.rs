// src/feeds/formats/emsc.rs
//
// EMSC seismic-portal JSON. Same feature-collection skeleton as the USGS
// shape but with its own property names: the unique id sits at
// `properties.unid`, the region name at `properties.flynn_region`, and
// `time` is an ISO-8601 string instead of epoch milliseconds.

use anyhow::{Context, Result};
use metrics::{counter, histogram};
use serde::Deserialize;

use crate::feeds::formats::iso_to_epoch_ms;
use crate::feeds::types::SeismicEvent;

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    properties: Option<Properties>,
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct Properties {
    unid: Option<String>,
    mag: Option<f64>,
    flynn_region: Option<String>,
    /// ISO-8601 string, e.g. "2023-11-05T10:43:00.0Z".
    time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(default)]
    coordinates: Vec<f64>,
}

pub fn parse(tag: &str, body: &str) -> Result<Vec<SeismicEvent>> {
    let t0 = std::time::Instant::now();
    let fc: FeatureCollection =
        serde_json::from_str(body).with_context(|| format!("parsing {tag} portal payload"))?;

    let mut out = Vec::with_capacity(fc.features.len());
    for feature in fc.features {
        let (props, geom) = match (feature.properties, feature.geometry) {
            (Some(p), Some(g)) => (p, g),
            _ => continue,
        };
        let (id, magnitude) = match (props.unid, props.mag) {
            (Some(id), Some(mag)) => (id, mag),
            _ => continue,
        };
        // An unparseable timestamp makes the record unusable for recency
        // sorting; skip it rather than invent a time.
        let time = match props.time.as_deref().and_then(iso_to_epoch_ms) {
            Some(t) => t,
            None => continue,
        };
        let (longitude, latitude) = match (geom.coordinates.first(), geom.coordinates.get(1)) {
            (Some(&lon), Some(&lat)) => (lon, lat),
            _ => continue,
        };

        out.push(SeismicEvent {
            id,
            magnitude,
            place: props.flynn_region.unwrap_or_default(),
            time,
            latitude,
            longitude,
            depth: geom.coordinates.get(2).copied(),
            source: tag.to_string(),
        });
    }

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("feed_parse_ms").record(ms);
    counter!("feed_events_total").increment(out.len() as u64);
    Ok(out)
}
