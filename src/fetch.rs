//! # HTTP Plumbing for Remote Services
//!
//! Both remote collaborators (the ISS position service and the sunrise/sunset
//! service) are plain JSON-over-HTTP GET endpoints. This module holds what they
//! share: the error type, a client wrapper with timeout and retry policy, and
//! strict UTC timestamp parsing.
//!
//! ## Retry Policy
//!
//! - **Retried**: transport failures (connect, timeout, reset) and 5xx responses
//! - **Not retried**: 4xx responses, malformed JSON, provider-reported failures
//! - **Pause**: fixed delay between attempts, no backoff
//!
//! ## Error Handling
//!
//! All failures propagate through [`FetchError`]. The caller never substitutes
//! defaults for missing data; a failed fetch ends the run before the phase
//! evaluator is invoked.

use crate::config::ServiceConfig;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while talking to a remote service.
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request failed (network, timeout, or protocol error)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("{service} responded with HTTP {status}")]
    Status {
        service: &'static str,
        status: StatusCode,
    },

    /// Server answered 200 but the payload reports a failure
    #[error("{service} reported failure: {detail}")]
    Service {
        service: &'static str,
        detail: String,
    },

    /// Body is not the JSON shape we expect
    #[error("malformed response from {service}: {source}")]
    Decode {
        service: &'static str,
        source: serde_json::Error,
    },

    #[error("timestamp {0} is out of range")]
    Timestamp(i64),

    #[error("no calendar day adjacent to {0}")]
    Calendar(NaiveDate),

    #[error("cannot parse instant `{value}`: {source}")]
    Instant {
        value: String,
        source: chrono::ParseError,
    },

    #[error("instant `{0}` is not UTC")]
    NonUtc(String),
}

impl FetchError {
    fn is_retryable(&self) -> bool {
        match self {
            FetchError::Http(e) => !e.is_builder(),
            FetchError::Status { status, .. } => status.is_server_error(),
            _ => false,
        }
    }
}

/// Shared `reqwest` client plus the retry policy from [`ServiceConfig`].
#[derive(Clone, Debug)]
pub struct ServiceClient {
    client: Client,
    retry_attempts: u32,
    retry_delay: Duration,
}

impl ServiceClient {
    pub fn new(config: &ServiceConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            retry_attempts: config.retry_attempts,
            retry_delay: config.retry_delay(),
        })
    }

    /// GET `url` with `query` and decode the JSON body into `T`.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        service: &'static str,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        let mut attempt = 0;
        let body = loop {
            match self.get_text(service, url, query).await {
                Ok(body) => break body,
                Err(e) if e.is_retryable() && attempt < self.retry_attempts => {
                    attempt += 1;
                    tracing::warn!(
                        "{} request failed: {} (retry {}/{})",
                        service,
                        e,
                        attempt,
                        self.retry_attempts
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        };

        serde_json::from_str(&body).map_err(|source| FetchError::Decode { service, source })
    }

    async fn get_text(
        &self,
        service: &'static str,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<String, FetchError> {
        tracing::debug!("GET {} {:?}", url, query);

        let response = self.client.get(url).query(query).send().await?;
        let status = response.status();
        tracing::debug!("{} responded with {}", service, status);

        if !status.is_success() {
            return Err(FetchError::Status { service, status });
        }
        Ok(response.text().await?)
    }
}

/// Parse an RFC 3339 instant whose offset must be zero.
///
/// `Z` and `+00:00` are accepted; any other offset is rejected rather than
/// stripped.
///
/// # Example
/// ```
/// use iss_observer_lib::fetch::parse_utc_instant;
///
/// assert!(parse_utc_instant("2024-01-02T07:00:00+00:00").is_ok());
/// assert!(parse_utc_instant("2024-01-02T07:00:00+01:00").is_err());
/// ```
pub fn parse_utc_instant(value: &str) -> Result<DateTime<Utc>, FetchError> {
    let parsed = DateTime::parse_from_rfc3339(value.trim()).map_err(|source| {
        FetchError::Instant {
            value: value.to_string(),
            source,
        }
    })?;

    if parsed.offset().local_minus_utc() != 0 {
        return Err(FetchError::NonUtc(value.to_string()));
    }

    Ok(parsed.with_timezone(&Utc))
}
