//! HTTP fetch primitives for deterministic verification.
//!
//! The hallucination checker depends on a [`Fetcher`] rather than this
//! module's [`DefaultFetcher`] directly, so tests can supply a pure,
//! in-memory implementation.

use sentrykit_core::error::NetworkError;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5_000);
const DEFAULT_RETRIES: u32 = 2;
const USER_AGENT: &str = "sentrykit/0.1.0";

/// Fetches the text body of a URL. Implemented by [`DefaultFetcher`]
/// for real network calls, and by any `Fn(&str) -> Result<String,
/// NetworkError>` closure for tests.
pub trait Fetcher {
    /// Fetch `url` and return its decoded body, or a [`NetworkError`].
    fn fetch(&self, url: &str) -> Result<String, NetworkError>;
}

impl<F> Fetcher for F
where
    F: Fn(&str) -> Result<String, NetworkError>,
{
    fn fetch(&self, url: &str) -> Result<String, NetworkError> {
        self(url)
    }
}

/// Fetches over HTTP(S) using a blocking client, retrying transient
/// failures with a short linear backoff.
pub struct DefaultFetcher {
    client: reqwest::blocking::Client,
    timeout: Duration,
    retries: u32,
}

impl DefaultFetcher {
    /// Build a fetcher with the default 5s timeout and 2 retries.
    #[must_use]
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Build a fetcher with a caller-supplied timeout.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: reqwest::blocking::Client::builder()
                .user_agent(USER_AGENT)
                .timeout(timeout)
                .build()
                .expect("reqwest client configuration is static and valid"),
            timeout,
            retries: DEFAULT_RETRIES,
        }
    }
}

impl Default for DefaultFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher for DefaultFetcher {
    fn fetch(&self, url: &str) -> Result<String, NetworkError> {
        let _ = self.timeout;
        let mut last_error: Option<String> = None;
        for attempt in 0..=self.retries {
            match self.client.get(url).send().and_then(reqwest::blocking::Response::error_for_status) {
                Ok(response) => match response.bytes() {
                    Ok(bytes) => return Ok(String::from_utf8_lossy(&bytes).into_owned()),
                    Err(err) => last_error = Some(err.to_string()),
                },
                Err(err) => last_error = Some(err.to_string()),
            }
            tracing::warn!(
                url,
                attempt,
                error = last_error.as_deref().unwrap_or(""),
                "web_fetch_failed"
            );
            if attempt < self.retries {
                std::thread::sleep(Duration::from_millis((200 * (attempt + 1)).into()));
            }
        }
        Err(NetworkError {
            url: url.to_string(),
            message: format!("Failed to fetch {url}: {}", last_error.unwrap_or_default()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_satisfies_fetcher_trait() {
        let fetcher = |url: &str| -> Result<String, NetworkError> { Ok(format!("body for {url}")) };
        assert_eq!(fetcher.fetch("https://example.com").unwrap(), "body for https://example.com");
    }

    #[test]
    fn closure_can_surface_network_errors() {
        let fetcher = |url: &str| -> Result<String, NetworkError> {
            Err(NetworkError { url: url.to_string(), message: "boom".to_string() })
        };
        assert!(fetcher.fetch("https://example.com").is_err());
    }
}
