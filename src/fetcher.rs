//! Blocking HTTP fetch used by stream adapters and catalog sync jobs.
//!
//! Ordinary network failures come back as a [`FetchError`] value so callers can
//! degrade (offline snapshot, skipped page) instead of aborting their tier.

use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(4);

const USER_AGENT: &str = concat!("radio-sync/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{url} unreachable: {reason}")]
    Unreachable { url: String, reason: String },

    #[error("{url} answered with HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    pub timeout: Duration,
}

/// Per-call overrides on top of a caller's defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOptions {
    pub url: Option<String>,
    pub timeout: Option<Duration>,
}

impl FetchOptions {
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            timeout: None,
        }
    }

    /// Fill unset options from the defaults and build the request.
    pub fn resolve(self, default_url: Option<&str>, default_timeout: Duration) -> Result<FetchRequest, FetchError> {
        let url = self
            .url
            .or_else(|| default_url.map(str::to_string))
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| FetchError::InvalidRequest("no URL configured".to_string()))?;
        Ok(FetchRequest {
            url,
            timeout: self.timeout.unwrap_or(default_timeout),
        })
    }
}

pub trait HttpFetcher: Send + Sync {
    fn fetch(&self, request: &FetchRequest) -> Result<Vec<u8>, FetchError>;
}

pub struct ReqwestFetcher {
    client: reqwest::blocking::Client,
}

impl ReqwestFetcher {
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

impl HttpFetcher for ReqwestFetcher {
    fn fetch(&self, request: &FetchRequest) -> Result<Vec<u8>, FetchError> {
        let unreachable = |e: reqwest::Error| FetchError::Unreachable {
            url: request.url.clone(),
            reason: e.to_string(),
        };

        let response = self
            .client
            .get(&request.url)
            .timeout(request.timeout)
            .send()
            .map_err(unreachable)?;

        if !response.status().is_success() {
            return Err(FetchError::HttpStatus {
                url: request.url.clone(),
                status: response.status().as_u16(),
            });
        }

        let body = response.bytes().map_err(unreachable)?;
        Ok(body.to_vec())
    }
}
