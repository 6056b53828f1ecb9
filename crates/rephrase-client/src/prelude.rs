//! Common imports for typical client usage.
pub use crate::{
    Accumulator, CancellationToken, ClientConfig, ClientError, RephraseClient, Session,
    SessionFailure, SessionState,
};
