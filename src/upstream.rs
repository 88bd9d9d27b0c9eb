//! Upstream Client
//!
//! The third-party API the proxy sits in front of.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

/// Endpoint serving search results.
pub const SEARCH_ENDPOINT: &str = "163_search";

/// Endpoint serving track details.
pub const DETAIL_ENDPOINT: &str = "163_music";

// == Upstream Error ==
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// Connection, timeout or body decoding failure
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Upstream answered with a non-2xx status
    #[error("upstream returned status {0}")]
    Status(u16),
}

pub type UpstreamFuture<'a> = Pin<Box<dyn Future<Output = Result<Value, UpstreamError>> + Send + 'a>>;

// == Upstream Trait ==
/// Something that can answer a GET on `endpoint` with a JSON document.
pub trait Upstream: Send + Sync {
    fn fetch(&self, endpoint: &'static str, query: Vec<(String, String)>) -> UpstreamFuture<'_>;
}

// == HTTP Upstream ==
/// Upstream reached over HTTP with reqwest.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    client: reqwest::Client,
    base_url: String,
}

impl HttpUpstream {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Upstream for HttpUpstream {
    fn fetch(&self, endpoint: &'static str, query: Vec<(String, String)>) -> UpstreamFuture<'_> {
        Box::pin(async move {
            let url = format!("{}/{}", self.base_url, endpoint);
            let response = self.client.get(&url).query(&query).send().await?;

            let status = response.status();
            if !status.is_success() {
                return Err(UpstreamError::Status(status.as_u16()));
            }

            Ok(response.json::<Value>().await?)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let upstream = HttpUpstream::new("http://localhost:9/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(upstream.base_url(), "http://localhost:9/api");
    }

    #[test]
    fn test_status_error_message() {
        assert_eq!(
            UpstreamError::Status(503).to_string(),
            "upstream returned status 503"
        );
    }
}
