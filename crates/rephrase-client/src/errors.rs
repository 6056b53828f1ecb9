/// Fallback failure text when a rejected request carries no usable `detail`.
pub const DEFAULT_REQUEST_FAILURE: &str = "An error occurred while processing your request.";

/// Failures reported by a [`Transport`](crate::transport::Transport) while
/// opening or reading the event stream.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Server answered with a non-success status.
    #[error("request rejected (status {status}): {message}")]
    Status { status: u16, message: String },
    /// Connection could not be established or the stream read failed.
    #[error("transport error: {message}")]
    Io { message: String },
}

impl TransportError {
    /// Creates a status rejection error.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// Creates an I/O level error.
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Returns the human-readable message for this error.
    pub fn message(&self) -> &str {
        match self {
            Self::Status { message, .. } | Self::Io { message } => message,
        }
    }
}

/// A frame payload that is not well-formed JSON.
#[derive(Debug, thiserror::Error)]
#[error("malformed stream data: {source}")]
pub struct DecodeError {
    /// Raw payload that failed to parse.
    pub payload: String,
    #[source]
    pub source: serde_json::Error,
}

/// Terminal failure captured by a session in the `Failed` state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionFailure {
    /// Pre-flight failure: rejected request, connect error, or no body stream.
    #[error("connection failure: {message}")]
    Connection { message: String },
    /// A frame payload could not be parsed.
    #[error("protocol failure: {message}")]
    Protocol { message: String },
    /// The server sent an in-band error event.
    #[error("application failure: {message}")]
    Application { message: String },
    /// Reading the stream failed after it was established.
    #[error("transport failure: {message}")]
    Transport { message: String },
}

impl SessionFailure {
    /// Returns the message carried by this failure, without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Connection { message }
            | Self::Protocol { message }
            | Self::Application { message }
            | Self::Transport { message } => message,
        }
    }
}

impl From<DecodeError> for SessionFailure {
    fn from(value: DecodeError) -> Self {
        Self::Protocol {
            message: value.to_string(),
        }
    }
}

/// Errors returned from the client API itself, before or instead of a
/// session run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// Invalid client configuration.
    #[error("config error: {0}")]
    Config(String),
    /// Invalid input passed to a session.
    #[error("validation error: {0}")]
    Validation(String),
    /// The session already left `Idle`; create a new one to retry.
    #[error("session {0} was already started")]
    AlreadyStarted(uuid::Uuid),
    /// A request outside the event stream (for example the health check) failed.
    #[error(transparent)]
    Transport(TransportError),
}

impl From<TransportError> for ClientError {
    fn from(value: TransportError) -> Self {
        ClientError::Transport(value)
    }
}
