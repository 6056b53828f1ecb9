use futures::StreamExt as _;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::debug;

use crate::config::ClientConfig;
use crate::errors::{ClientError, DEFAULT_REQUEST_FAILURE, TransportError};
use crate::transport::{ByteStream, HealthStatus, RephraseRequest, StreamHandle, Transport};

const EVENT_STREAM: &str = "text/event-stream";

/// [`Transport`] over HTTP using `reqwest`.
pub struct HttpTransport {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpTransport {
    /// Creates a transport from explicit configuration.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        if config.base_url.trim().is_empty() {
            return Err(ClientError::Config("base_url must not be empty".into()));
        }
        let mut builder = reqwest::Client::builder().connect_timeout(config.connect_timeout);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Returns the configuration this transport was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn open(&self, request: &RephraseRequest) -> Result<StreamHandle, TransportError> {
        let url = self.config.rephrase_url();
        debug!(%url, chars = request.text.chars().count(), "opening rephrase stream");
        let response = self
            .client
            .post(&url)
            .header(ACCEPT, EVENT_STREAM)
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| TransportError::io(format!("rephrase request failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::status(status.as_u16(), error_detail(&body)));
        }

        let body: ByteStream = Box::pin(response.bytes_stream().map(|chunk| {
            chunk.map_err(|e| TransportError::io(format!("stream read failed: {e}")))
        }));
        Ok(StreamHandle::new(body))
    }

    async fn health(&self) -> Result<HealthStatus, TransportError> {
        let response = self
            .client
            .get(self.config.health_url())
            .send()
            .await
            .map_err(|e| TransportError::io(format!("health request failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::status(status.as_u16(), error_detail(&body)));
        }
        response
            .json::<HealthStatus>()
            .await
            .map_err(|e| TransportError::io(format!("invalid health response: {e}")))
    }
}

/// Extracts the `detail` text from a rejection body.
///
/// Falls back to a generic message when the body is not JSON or has no
/// string `detail`.
pub fn error_detail(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("detail")
                .and_then(|v| v.as_str())
                .map(ToOwned::to_owned)
        })
        .unwrap_or_else(|| DEFAULT_REQUEST_FAILURE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_detail_reads_detail_field() {
        assert_eq!(
            error_detail(r#"{"detail":"API Error: Something went wrong"}"#),
            "API Error: Something went wrong"
        );
    }

    #[test]
    fn error_detail_falls_back_for_unusable_bodies() {
        for body in ["", "<html>502</html>", r#"{"error":"x"}"#, r#"{"detail":[1]}"#] {
            assert_eq!(error_detail(body), DEFAULT_REQUEST_FAILURE, "body {body:?}");
        }
    }

    #[test]
    fn request_body_is_text_object() {
        let body = serde_json::to_value(RephraseRequest {
            text: "hi there".into(),
        })
        .expect("json");
        assert_eq!(body, serde_json::json!({"text": "hi there"}));
    }

    #[test]
    fn empty_base_url_is_rejected() {
        let err = HttpTransport::new(ClientConfig::new("  ")).err();
        assert!(matches!(err, Some(ClientError::Config(_))));
    }

    #[tokio::test]
    async fn env_gated_smoke_stream_if_server_configured() {
        let Ok(base_url) = std::env::var("REPHRASE_SMOKE_URL") else {
            eprintln!("skipping rephrase smoke test (REPHRASE_SMOKE_URL missing)");
            return;
        };
        let transport = HttpTransport::new(ClientConfig::new(base_url)).expect("transport");
        let health = transport.health().await.expect("health");
        assert_eq!(health.status, "ok");

        let mut session = crate::Session::default();
        let state = session
            .run(&transport, "Please send the report by Friday.")
            .await
            .expect("run");
        assert!(state.is_terminal(), "unexpected state {state:?}");
    }
}
