use std::pin::Pin;

use futures::StreamExt as _;

use crate::cancel::CancellationToken;
use crate::errors::TransportError;

/// Ordered byte fragments of an open event stream.
pub type ByteStream =
    Pin<Box<dyn futures::Stream<Item = Result<bytes::Bytes, TransportError>> + Send + 'static>>;

/// Body sent to the rephrase endpoint.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RephraseRequest {
    /// Text to rephrase.
    pub text: String,
}

/// Answer of the server's health endpoint.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HealthStatus {
    /// `ok` when the server is up.
    pub status: String,
    /// Free-form server message.
    pub message: String,
}

/// Successful pre-flight response.
pub struct StreamHandle {
    /// Response body, or `None` when the server produced no readable stream.
    pub body: Option<ByteStream>,
}

impl StreamHandle {
    /// Wraps an open body stream.
    pub fn new(body: ByteStream) -> Self {
        Self { body: Some(body) }
    }

    /// A success response without a readable body.
    pub fn empty() -> Self {
        Self { body: None }
    }
}

/// Opens the event stream for one request.
///
/// Implementations return `Err(TransportError::Status { .. })` for a
/// non-success answer, with the server's `detail` text as the message.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Sends the request and returns the response stream.
    async fn open(&self, request: &RephraseRequest) -> Result<StreamHandle, TransportError>;

    /// Queries server health. Transports without a health endpoint report an error.
    async fn health(&self) -> Result<HealthStatus, TransportError> {
        Err(TransportError::io("health check not supported by this transport"))
    }
}

/// Result of one cancellable read.
#[derive(Debug)]
pub enum ReadOutcome {
    /// Next fragment.
    Data(bytes::Bytes),
    /// The server closed the stream.
    End,
    /// The token fired before or while waiting.
    Cancelled,
    /// The read itself failed.
    Failed(TransportError),
}

/// Waits for the next fragment unless `token` is cancelled first.
///
/// Cancellation wins when both are ready, so no fragment is handed out after
/// cancellation has been observed.
pub async fn read_next(stream: &mut ByteStream, token: &CancellationToken) -> ReadOutcome {
    tokio::select! {
        biased;
        _ = token.cancelled() => ReadOutcome::Cancelled,
        next = stream.next() => match next {
            Some(Ok(chunk)) => ReadOutcome::Data(chunk),
            Some(Err(err)) => ReadOutcome::Failed(err),
            None => ReadOutcome::End,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use std::time::Duration;

    fn byte_stream(items: Vec<Result<&'static str, TransportError>>) -> ByteStream {
        Box::pin(stream::iter(items.into_iter().map(|item| {
            item.map(|text| bytes::Bytes::from_static(text.as_bytes()))
        })))
    }

    #[tokio::test]
    async fn reads_data_then_end() {
        let token = CancellationToken::new();
        let mut stream = byte_stream(vec![Ok("data: {}\n\n")]);
        assert!(matches!(
            read_next(&mut stream, &token).await,
            ReadOutcome::Data(chunk) if &chunk[..] == b"data: {}\n\n"
        ));
        assert!(matches!(read_next(&mut stream, &token).await, ReadOutcome::End));
    }

    #[tokio::test]
    async fn read_errors_are_reported_as_failed() {
        let token = CancellationToken::new();
        let mut stream = byte_stream(vec![Err(TransportError::io("reset"))]);
        assert!(matches!(
            read_next(&mut stream, &token).await,
            ReadOutcome::Failed(TransportError::Io { .. })
        ));
    }

    #[tokio::test]
    async fn cancellation_wins_over_ready_data() {
        let token = CancellationToken::new();
        token.cancel();
        let mut stream = byte_stream(vec![Ok("data: {}\n\n")]);
        assert!(matches!(
            read_next(&mut stream, &token).await,
            ReadOutcome::Cancelled
        ));
    }

    #[tokio::test]
    async fn cancellation_unblocks_pending_read() {
        let token = CancellationToken::new();
        let mut stream: ByteStream = Box::pin(stream::pending());
        let canceller = {
            let token = token.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                token.cancel();
            })
        };
        let outcome = tokio::time::timeout(Duration::from_secs(1), read_next(&mut stream, &token))
            .await
            .expect("read unblocked");
        assert!(matches!(outcome, ReadOutcome::Cancelled));
        canceller.await.expect("join");
    }
}
