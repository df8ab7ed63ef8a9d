// src/feeds/formats/geojson.rs
//
// USGS-shape GeoJSON feature collections. Also serves the IMD window feed,
// which comes from the same FDSN endpoint family under a different tag.

use anyhow::{Context, Result};
use metrics::{counter, histogram};
use serde::Deserialize;

use crate::feeds::types::SeismicEvent;

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    id: Option<String>,
    properties: Option<Properties>,
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct Properties {
    mag: Option<f64>,
    place: Option<String>,
    /// Epoch milliseconds, already numeric in this shape.
    time: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    /// `[longitude, latitude, depth_km]`; depth may be absent.
    #[serde(default)]
    coordinates: Vec<f64>,
}

pub fn parse(tag: &str, body: &str) -> Result<Vec<SeismicEvent>> {
    let t0 = std::time::Instant::now();
    let fc: FeatureCollection =
        serde_json::from_str(body).with_context(|| format!("parsing {tag} geojson payload"))?;

    let mut out = Vec::with_capacity(fc.features.len());
    for feature in fc.features {
        let (props, geom) = match (feature.properties, feature.geometry) {
            (Some(p), Some(g)) => (p, g),
            _ => continue,
        };
        // id, magnitude and time are required; a feature missing any of them
        // is unusable downstream and is skipped whole.
        let (id, magnitude, time) = match (feature.id, props.mag, props.time) {
            (Some(id), Some(mag), Some(time)) => (id, mag, time),
            _ => continue,
        };
        let (longitude, latitude) = match (geom.coordinates.first(), geom.coordinates.get(1)) {
            (Some(&lon), Some(&lat)) => (lon, lat),
            _ => continue,
        };

        out.push(SeismicEvent {
            id,
            magnitude,
            place: props.place.unwrap_or_default(),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_are_lon_lat_depth() {
        let body = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "id": "us1234",
                "properties": { "mag": 4.1, "place": "Hindu Kush", "time": 1700000000000 },
                "geometry": { "type": "Point", "coordinates": [70.5, 36.2, 110.0] }
            }]
        }"#;
        let events = parse("USGS", body).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].longitude, 70.5);
        assert_eq!(events[0].latitude, 36.2);
        assert_eq!(events[0].depth, Some(110.0));
        assert_eq!(events[0].source, "USGS");
    }

    #[test]
    fn two_element_coordinates_leave_depth_none() {
        let body = r#"{"features":[{"id":"x1","properties":{"mag":3.0,"time":1},"geometry":{"coordinates":[80.0,20.0]}}]}"#;
        let events = parse("USGS", body).unwrap();
        assert_eq!(events[0].depth, None);
        assert_eq!(events[0].place, "");
    }

    #[test]
    fn features_missing_required_fields_are_skipped() {
        let body = r#"{"features":[
            {"id":"ok","properties":{"mag":2.5,"time":5},"geometry":{"coordinates":[1.0,2.0,3.0]}},
            {"properties":{"mag":9.9,"time":5},"geometry":{"coordinates":[1.0,2.0]}},
            {"id":"no-mag","properties":{"time":5},"geometry":{"coordinates":[1.0,2.0]}},
            {"id":"no-geom","properties":{"mag":1.0,"time":5}}
        ]}"#;
        let events = parse("USGS", body).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "ok");
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(parse("USGS", "<html>offline</html>").is_err());
    }
}
