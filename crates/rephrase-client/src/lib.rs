//! Streaming client for the multi-style rephrase service.
//!
//! The server answers one request with a server-sent-events stream of
//! `data: {json}` frames. Each content frame carries a text delta for one
//! named style; the client reassembles frames from arbitrary network chunks,
//! decodes them, and accumulates one text per style until the stream ends,
//! fails, or is cancelled.
//!
//! ```no_run
//! use rephrase_client::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), ClientError> {
//! let client = RephraseClient::from_env()?;
//! let mut session = client.session();
//! let state = client.run(&mut session, "send me the file asap").await?;
//!
//! for (style, text) in session.outputs().iter() {
//!     println!("{style}: {text}");
//! }
//! if let SessionState::Failed(failure) = state {
//!     eprintln!("{}", failure.message());
//! }
//! # Ok(())
//! # }
//! ```

/// Per-style output accumulation and the known style catalogue.
pub mod accumulator;
/// Shared cancellation handle.
pub mod cancel;
/// Client entry point.
pub mod client;
/// Client configuration and environment loading.
pub mod config;
/// Error types.
pub mod errors;
/// Frame payload decoding.
pub mod event;
/// HTTP transport.
pub mod http;
/// Common imports for typical usage.
pub mod prelude;
/// Session state machine and read loop.
pub mod session;
/// Frame reassembly from stream fragments.
pub mod sse;
/// Transport contract and the cancellable read primitive.
pub mod transport;

pub use accumulator::{Accumulator, KNOWN_STYLES, OutputSnapshot, style_title};
pub use cancel::CancellationToken;
pub use client::RephraseClient;
pub use config::ClientConfig;
pub use errors::{ClientError, DecodeError, SessionFailure, TransportError};
pub use event::{Event, Heartbeat, decode};
pub use http::HttpTransport;
pub use session::{Session, SessionState};
pub use sse::{Frame, FrameAssembler};
pub use transport::{ByteStream, HealthStatus, RephraseRequest, StreamHandle, Transport};
