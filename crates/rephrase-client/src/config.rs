use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::ClientError;

/// Default server location used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
/// Longest input the server accepts, in characters.
pub const DEFAULT_MAX_INPUT_CHARS: usize = 1000;

/// Configuration for the rephrase client.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Base URL of the rephrase server.
    ///
    /// Useful for proxies or local test servers.
    pub base_url: String,
    /// Timeout for establishing the connection.
    pub connect_timeout: Duration,
    /// Optional timeout for the whole request, stream included.
    ///
    /// Unset by default because the event stream is long-lived.
    pub request_timeout: Option<Duration>,
    /// Inputs longer than this (in characters) are rejected before sending.
    pub max_input_chars: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
        }
    }
}

impl ClientConfig {
    /// Creates a config pointing at `base_url` with default limits.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Builds a config from the environment.
    ///
    /// - `REPHRASE_BASE_URL`: server base URL (default `http://localhost:8000`).
    /// - `REPHRASE_CONNECT_TIMEOUT_SECS`: connect timeout in seconds (default 10).
    /// - `REPHRASE_REQUEST_TIMEOUT_SECS`: optional whole-request timeout.
    /// - `REPHRASE_MAX_INPUT_CHARS`: input limit (default 1000).
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ClientError> {
        let mut config = Self::default();
        if let Some(base_url) = lookup("REPHRASE_BASE_URL").filter(|v| !v.trim().is_empty()) {
            config.base_url = base_url.trim().to_string();
        }
        if let Some(secs) = parse_number(&lookup, "REPHRASE_CONNECT_TIMEOUT_SECS")? {
            config.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_number(&lookup, "REPHRASE_REQUEST_TIMEOUT_SECS")? {
            config.request_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(limit) = parse_number(&lookup, "REPHRASE_MAX_INPUT_CHARS")? {
            config.max_input_chars = limit;
        }
        Ok(config)
    }

    /// Overrides the server base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets a timeout for the whole request.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Overrides the input length limit.
    pub fn max_input_chars(mut self, limit: usize) -> Self {
        self.max_input_chars = limit;
        self
    }

    pub(crate) fn rephrase_url(&self) -> String {
        format!("{}/api/rephrase", self.base_url.trim_end_matches('/'))
    }

    pub(crate) fn health_url(&self) -> String {
        format!("{}/health", self.base_url.trim_end_matches('/'))
    }
}

fn parse_number<N>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<N>, ClientError>
where
    N: FromStr,
    N::Err: fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<N>()
            .map(Some)
            .map_err(|e| ClientError::Config(format!("invalid {key}={raw:?}: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_env_is_empty() {
        let config = ClientConfig::from_lookup(lookup_from(&[])).expect("config");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.max_input_chars, 1000);
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert!(config.request_timeout.is_none());
    }

    #[test]
    fn env_overrides_are_parsed() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("REPHRASE_BASE_URL", "http://example.test:9000/"),
            ("REPHRASE_REQUEST_TIMEOUT_SECS", "30"),
            ("REPHRASE_MAX_INPUT_CHARS", "50"),
        ]))
        .expect("config");
        assert_eq!(
            config.rephrase_url(),
            "http://example.test:9000/api/rephrase"
        );
        assert_eq!(config.health_url(), "http://example.test:9000/health");
        assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.max_input_chars, 50);
    }

    #[test]
    fn invalid_number_is_config_error() {
        let err = ClientConfig::from_lookup(lookup_from(&[(
            "REPHRASE_CONNECT_TIMEOUT_SECS",
            "soon",
        )]))
        .expect_err("should fail");
        assert!(
            matches!(err, ClientError::Config(message) if message.contains("REPHRASE_CONNECT_TIMEOUT_SECS"))
        );
    }

    #[test]
    fn input_limit_beyond_usize_is_config_error() {
        let too_big = format!("{}0", usize::MAX);
        let err = ClientConfig::from_lookup(lookup_from(&[(
            "REPHRASE_MAX_INPUT_CHARS",
            too_big.as_str(),
        )]))
        .expect_err("should fail");
        assert!(
            matches!(err, ClientError::Config(message) if message.contains("REPHRASE_MAX_INPUT_CHARS"))
        );
    }
}
