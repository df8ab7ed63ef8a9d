// src/feeds/formats/pipe.rs
//
// Newline-delimited, pipe-separated event text (the FDSN text service
// flavor IRIS publishes). Positional fields per line:
//
//   timestamp | latitude | longitude | depth_km | magnitude | <ignored> | place
//
// Lines starting with `#` are headers/comments. The format carries no native
// record id, so a synthetic `"<tag>-<line index>"` id is assigned; indices
// count every line of the payload (including skipped ones) so ids stay
// stable when a header line is present.

use anyhow::Result;
use metrics::{counter, histogram};

use crate::feeds::formats::iso_to_epoch_ms;
use crate::feeds::types::SeismicEvent;

pub fn parse(tag: &str, body: &str) -> Result<Vec<SeismicEvent>> {
    let t0 = std::time::Instant::now();

    let mut out = Vec::new();
    for (idx, raw) in body.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split('|').map(str::trim).collect();
        if fields.len() < 5 {
            tracing::debug!(source = %tag, line = idx, "short pipe record skipped");
            continue;
        }

        let time = match iso_to_epoch_ms(fields[0]) {
            Some(t) => t,
            None => continue,
        };
        let (latitude, longitude, magnitude) = match (
            fields[1].parse::<f64>(),
            fields[2].parse::<f64>(),
            fields[4].parse::<f64>(),
        ) {
            (Ok(lat), Ok(lon), Ok(mag)) => (lat, lon, mag),
            _ => continue,
        };

        out.push(SeismicEvent {
            id: format!("{tag}-{idx}"),
            magnitude,
            place: fields.get(6).map(|s| s.to_string()).unwrap_or_default(),
            time,
            latitude,
            longitude,
            depth: fields[3].parse::<f64>().ok(),
            source: tag.to_string(),
        });
    }

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("feed_parse_ms").record(ms);
    counter!("feed_events_total").increment(out.len() as u64);
    Ok(out)
}
