use tokio::sync::watch;
use tracing::{debug, trace, warn};

use crate::accumulator::{Accumulator, OutputSnapshot};
use crate::cancel::CancellationToken;
use crate::config::DEFAULT_MAX_INPUT_CHARS;
use crate::errors::{ClientError, SessionFailure};
use crate::event::{self, Event};
use crate::sse::FrameAssembler;
use crate::transport::{ReadOutcome, RephraseRequest, StreamHandle, Transport, read_next};

const NO_STREAM_MESSAGE: &str = "response carried no readable stream";

/// Lifecycle of a [`Session`].
///
/// `Completed`, `Cancelled` and `Failed` are final.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Created, not started.
    Idle,
    /// Reading the event stream.
    Streaming,
    /// The server closed the stream without reporting an error.
    Completed,
    /// The cancellation token fired.
    Cancelled,
    /// The run stopped on a failure.
    Failed(SessionFailure),
}

impl SessionState {
    /// Returns true for `Completed`, `Cancelled` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed(_))
    }

    /// Returns the failure, if the session failed.
    pub fn failure(&self) -> Option<&SessionFailure> {
        match self {
            Self::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

/// One rephrase run: a single request, its event stream, and the outputs
/// accumulated from it.
///
/// A session runs at most once. Retrying means creating a new session.
pub struct Session {
    session_id: uuid::Uuid,
    max_input_chars: usize,
    state: SessionState,
    assembler: FrameAssembler,
    outputs: Accumulator,
    deltas_applied: u64,
    token: CancellationToken,
    updates: watch::Sender<OutputSnapshot>,
    states: watch::Sender<SessionState>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_INPUT_CHARS)
    }
}

impl Session {
    /// Creates an idle session that accepts inputs up to `max_input_chars`.
    pub fn new(max_input_chars: usize) -> Self {
        let (updates, _rx) = watch::channel(Accumulator::new());
        let (states, _rx) = watch::channel(SessionState::Idle);
        Self {
            session_id: uuid::Uuid::new_v4(),
            max_input_chars,
            state: SessionState::Idle,
            assembler: FrameAssembler::new(),
            outputs: Accumulator::new(),
            deltas_applied: 0,
            token: CancellationToken::new(),
            updates,
            states,
        }
    }

    /// Returns the session id used in logs.
    pub fn id(&self) -> uuid::Uuid {
        self.session_id
    }

    /// Returns the current state.
    ///
    /// [`run`](Self::run) borrows the session mutably until it returns, so
    /// this only ever shows `Idle` or a terminal state. Use
    /// [`watch_state`](Self::watch_state) to follow a run in progress.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Returns the outputs accumulated so far.
    pub fn outputs(&self) -> &Accumulator {
        &self.outputs
    }

    /// Number of content deltas applied so far.
    pub fn deltas_applied(&self) -> u64 {
        self.deltas_applied
    }

    /// Returns a handle that cancels this session.
    pub fn cancel_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Subscribes to output snapshots, published after every applied delta.
    pub fn subscribe(&self) -> watch::Receiver<OutputSnapshot> {
        self.updates.subscribe()
    }

    /// Subscribes to state transitions, including `Streaming`.
    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.states.subscribe()
    }

    /// Sends `input` through `transport` and consumes the event stream until
    /// it ends, fails, or is cancelled. Returns the terminal state.
    ///
    /// Invalid input is rejected with [`ClientError::Validation`] and leaves
    /// the session idle. Outputs applied before a failure or cancellation
    /// stay readable through [`outputs`](Self::outputs).
    pub async fn run<T: Transport + ?Sized>(
        &mut self,
        transport: &T,
        input: &str,
    ) -> Result<SessionState, ClientError> {
        if self.state != SessionState::Idle {
            return Err(ClientError::AlreadyStarted(self.session_id));
        }
        self.validate(input)?;

        self.outputs.clear();
        self.updates.send_replace(Accumulator::new());
        self.set_state(SessionState::Streaming);
        debug!(session_id = %self.session_id, "session streaming");

        let terminal = self.stream(transport, input).await;

        if let Some(tail) = std::mem::take(&mut self.assembler).finish() {
            debug!(session_id = %self.session_id, bytes = tail.len(), "discarding unterminated frame");
        }
        match &terminal {
            SessionState::Failed(failure) => {
                warn!(session_id = %self.session_id, deltas = self.deltas_applied, %failure, "session failed");
            }
            state => {
                debug!(session_id = %self.session_id, deltas = self.deltas_applied, ?state, "session finished");
            }
        }
        self.set_state(terminal.clone());
        Ok(terminal)
    }

    fn set_state(&mut self, state: SessionState) {
        self.state = state.clone();
        self.states.send_replace(state);
    }

    fn validate(&self, input: &str) -> Result<(), ClientError> {
        if input.trim().is_empty() {
            return Err(ClientError::Validation(
                "text input must not be empty".into(),
            ));
        }
        let chars = input.chars().count();
        if chars > self.max_input_chars {
            return Err(ClientError::Validation(format!(
                "text input too long ({chars} characters, max {})",
                self.max_input_chars
            )));
        }
        Ok(())
    }

    // The body stream is owned by this frame and dropped on every return.
    async fn stream<T: Transport + ?Sized>(&mut self, transport: &T, input: &str) -> SessionState {
        let request = RephraseRequest {
            text: input.to_string(),
        };
        let opened = tokio::select! {
            biased;
            _ = self.token.cancelled() => return SessionState::Cancelled,
            opened = transport.open(&request) => opened,
        };
        let mut body = match opened {
            Ok(StreamHandle { body: Some(body) }) => body,
            Ok(StreamHandle { body: None }) => {
                return SessionState::Failed(SessionFailure::Connection {
                    message: NO_STREAM_MESSAGE.to_string(),
                });
            }
            Err(err) => {
                return SessionState::Failed(SessionFailure::Connection {
                    message: err.message().to_string(),
                });
            }
        };

        loop {
            let chunk = match read_next(&mut body, &self.token).await {
                ReadOutcome::Data(chunk) => chunk,
                ReadOutcome::End => return SessionState::Completed,
                ReadOutcome::Cancelled => return SessionState::Cancelled,
                ReadOutcome::Failed(err) => {
                    return SessionState::Failed(SessionFailure::Transport {
                        message: err.message().to_string(),
                    });
                }
            };
            // Frames already in hand are dispatched even if the token fires
            // meanwhile; cancellation is observed at the next read.
            for frame in self.assembler.feed(&chunk) {
                match event::decode(&frame) {
                    Ok(Event::Content { style, content }) => self.apply(&style, &content),
                    Ok(Event::Noop(heartbeat)) => {
                        trace!(session_id = %self.session_id, ?heartbeat, "no-op frame");
                    }
                    Ok(Event::Error { message }) => {
                        return SessionState::Failed(SessionFailure::Application { message });
                    }
                    Err(err) => {
                        debug!(session_id = %self.session_id, payload = %err.payload, "undecodable frame");
                        return SessionState::Failed(err.into());
                    }
                }
            }
        }
    }

    fn apply(&mut self, style: &str, delta: &str) {
        self.outputs.apply(style, delta);
        self.deltas_applied = self.deltas_applied.saturating_add(1);
        trace!(session_id = %self.session_id, style, seq = self.deltas_applied, "content delta");
        self.updates.send_modify(|snapshot| snapshot.apply(style, delta));
    }
}
