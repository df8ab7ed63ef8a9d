// src/feeds/fetch.rs
use std::collections::HashMap;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, PRAGMA};

/// Retrieves one raw feed payload by URL.
///
/// The seam between the aggregator and the network: production wires in
/// [`HttpFetcher`], tests substitute canned payloads and simulated outages
/// without opening sockets.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Live HTTP fetcher over a shared `reqwest` client.
///
/// Every request carries explicit `Cache-Control: no-cache` and
/// `Pragma: no-cache` headers: a poll must reach the origin feed rather
/// than an intermediary cache, or repeated polls would re-serve stale
/// observations. A non-2xx status counts as a failed fetch.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .send()
            .await
            .with_context(|| format!("GET {url}"))?
            .error_for_status()
            .with_context(|| format!("GET {url} status"))?;
        resp.text()
            .await
            .with_context(|| format!("reading body from {url}"))
    }
}

// --- Test helper ---

/// Canned fetcher keyed by URL. URLs without a payload fail like a dead
/// endpoint, which is how tests simulate a partial outage.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    bodies: HashMap<String, String>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, body: &str) -> Self {
        self.bodies.insert(url.to_string(), body.to_string());
        self
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.bodies
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow!("no canned payload for {url}"))
    }
}
