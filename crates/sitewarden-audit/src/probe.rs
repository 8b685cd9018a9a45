//! Outbound HTTP probe client.
//!
//! Two underlying clients: a probe client that issues HEAD requests without
//! following redirects (a 3xx is the probe's answer), and a fetch client
//! that follows a bounded redirect chain for full-page GETs. Both carry the
//! same short per-request timeout so a single hung request cannot stall an
//! audit run.

use sitewarden_core::{WardenError, WardenResult};
use std::collections::HashMap;
use std::time::{Duration, Instant};

const MAX_BODY_SIZE: usize = 5 * 1024 * 1024; // 5MB

/// The outcome of one existence probe.
#[derive(Debug, Clone)]
pub struct Probe {
    /// Response status code.
    pub status: u16,
    /// Round-trip latency in milliseconds.
    pub latency_ms: u64,
    /// Response headers, lowercased names.
    pub headers: HashMap<String, String>,
}

impl Probe {
    /// Whether the probe answered with a 2xx status.
    pub fn is_healthy(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether the probe answered with a 3xx status.
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }

    /// First present header among `names`, if any.
    pub fn header_among(&self, names: &[&str]) -> Option<&str> {
        names
            .iter()
            .find_map(|name| self.headers.get(*name).map(String::as_str))
    }
}

/// A fetched page with body and headers.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Response status code.
    pub status: u16,
    /// Response body, UTF-8 lossy.
    pub body: String,
    /// Response headers, lowercased names.
    pub headers: HashMap<String, String>,
}

/// HTTP client wrapper shared by all audit sub-checks.
pub struct ProbeClient {
    probe: reqwest::Client,
    fetch: reqwest::Client,
}

impl ProbeClient {
    /// Builds a probe client with the given per-request timeout.
    pub fn new(timeout: Duration) -> WardenResult<Self> {
        let probe = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| WardenError::Http(format!("failed to build probe client: {e}")))?;
        let fetch = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| WardenError::Http(format!("failed to build fetch client: {e}")))?;
        Ok(Self { probe, fetch })
    }

    /// Issues a HEAD existence probe. No body is downloaded.
    pub async fn probe(&self, url: &str) -> WardenResult<Probe> {
        let start = Instant::now();
        let response = self
            .probe
            .head(url)
            .send()
            .await
            .map_err(|e| WardenError::Http(format!("probe {url}: {e}")))?;
        let latency_ms = start.elapsed().as_millis() as u64;
        Ok(Probe {
            status: response.status().as_u16(),
            latency_ms,
            headers: harvest_headers(response.headers()),
        })
    }

    /// Fetches a page body with a bounded redirect chain.
    pub async fn fetch(&self, url: &str) -> WardenResult<FetchedPage> {
        let response = self
            .fetch
            .get(url)
            .send()
            .await
            .map_err(|e| WardenError::Http(format!("fetch {url}: {e}")))?;
        let status = response.status().as_u16();
        let headers = harvest_headers(response.headers());
        let bytes = response
            .bytes()
            .await
            .map_err(|e| WardenError::Http(format!("read body {url}: {e}")))?;
        if bytes.len() > MAX_BODY_SIZE {
            return Err(WardenError::Http(format!(
                "response too large: {} bytes (max {})",
                bytes.len(),
                MAX_BODY_SIZE
            )));
        }
        Ok(FetchedPage {
            status,
            body: String::from_utf8_lossy(&bytes).into_owned(),
            headers,
        })
    }
}

fn harvest_headers(headers: &reqwest::header::HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .filter_map(|(k, v)| {
            v.to_str()
                .ok()
                .map(|val| (k.as_str().to_lowercase(), val.to_string()))
        })
        .collect()
}
