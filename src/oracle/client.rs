//! HTTP client shared foundation
//!
//! Wraps reqwest with a request timeout, a tool User-Agent, and
//! exponential-backoff retries for transient failures and rate limiting.

use crate::error::OracleError;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Timeout applied to every request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// User-Agent header sent to the registry
const USER_AGENT: &str = concat!("phpup/", env!("CARGO_PKG_VERSION"));

/// Maximum number of retry attempts
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (in milliseconds)
const BASE_DELAY_MS: u64 = 250;

/// HTTP client wrapper with retry logic
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    max_retries: u32,
}

impl HttpClient {
    /// Create a client with default settings
    pub fn new() -> Result<Self, OracleError> {
        Self::with_config(REQUEST_TIMEOUT, USER_AGENT)
    }

    /// Create a client with custom timeout and User-Agent
    pub fn with_config(timeout: Duration, user_agent: &str) -> Result<Self, OracleError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| {
                OracleError::network("", format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            max_retries: MAX_RETRIES,
        })
    }

    /// Set the maximum number of retries
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// GET a JSON document, retrying transient failures with exponential
    /// backoff
    pub async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        package: &str,
    ) -> Result<T, OracleError> {
        let mut last_error = None;
        let mut delay = BASE_DELAY_MS;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                tokio::time::sleep(Duration::from_millis(delay)).await;
                delay *= 2;
            }

            let response = match self.client.get(url).send().await {
                Ok(response) => response,
                Err(e) => {
                    last_error = Some(if e.is_timeout() {
                        OracleError::Timeout {
                            package: package.to_string(),
                        }
                    } else {
                        OracleError::network(package, e.to_string())
                    });
                    continue;
                }
            };

            match response.status() {
                StatusCode::TOO_MANY_REQUESTS => {
                    last_error = Some(OracleError::RateLimited {
                        package: package.to_string(),
                    });
                    continue;
                }
                StatusCode::NOT_FOUND => {
                    // Definitive; retrying cannot help
                    return Err(OracleError::not_found(package));
                }
                status if !status.is_success() => {
                    return Err(OracleError::network(package, format!("HTTP {}", status)));
                }
                _ => {}
            }

            match response.json::<T>().await {
                Ok(parsed) => return Ok(parsed),
                Err(e) => {
                    last_error = Some(OracleError::invalid_response(
                        package,
                        format!("failed to parse JSON: {}", e),
                    ));
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| OracleError::network(package, "unknown error".to_string())))
    }
}
