use std::sync::Arc;

use crate::config::ClientConfig;
use crate::errors::ClientError;
use crate::http::HttpTransport;
use crate::session::{Session, SessionState};
use crate::transport::{HealthStatus, Transport};

/// Entry point for creating and running rephrase sessions.
#[derive(Clone)]
pub struct RephraseClient {
    transport: Arc<dyn Transport>,
    config: ClientConfig,
}

impl RephraseClient {
    /// Creates a client talking HTTP to `config.base_url`.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let transport = HttpTransport::new(config.clone())?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Creates a client from `REPHRASE_*` environment variables.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Creates a client over a custom transport.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self { transport, config }
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Creates a fresh idle session using the configured input limit.
    pub fn session(&self) -> Session {
        Session::new(self.config.max_input_chars)
    }

    /// Runs `session` against this client's transport.
    pub async fn run(&self, session: &mut Session, input: &str) -> Result<SessionState, ClientError> {
        session.run(self.transport.as_ref(), input).await
    }

    /// Queries the server health endpoint.
    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        Ok(self.transport.health().await?)
    }
}
