//! Wall Backend Traits
//!
//! The engine talks to the wall server through two narrow operations:
//! list-since (consumed by the sync client) and submit (consumed by the
//! submit client). Everything behind them (storage, sanitization, the reveal
//! gate) belongs to the backend.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::entry::{Entry, EntryId, SubmitRequest};

/// Failure talking to a wall backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The request never completed (connect, timeout, I/O)
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with something we cannot read
    #[error("unexpected response: {0}")]
    Decode(String),

    /// The server answered `ok: false` to a list request
    #[error("server reported failure: {0}")]
    Server(String),

    /// The server refused a submission (validation)
    #[error("{0}")]
    Rejected(String),
}

/// Wall backend trait
///
/// Implement this to connect the engine to a different server.
#[async_trait]
pub trait WallBackend: Send + Sync {
    /// Get the backend name (e.g., "http", "memory")
    fn name(&self) -> &str;

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;

    /// Visible entries with `id > cursor`, ascending by id
    ///
    /// A cursor of 0 means "everything currently visible".
    async fn list_since(&self, cursor: u64) -> Result<Vec<Entry>, BackendError>;

    /// Submit a new entry, returning its id
    ///
    /// The entry shows up in `list_since` only once the reveal gate admits it.
    async fn submit(&self, request: &SubmitRequest) -> Result<EntryId, BackendError>;
}

#[async_trait]
impl<B: WallBackend + ?Sized> WallBackend for Arc<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn health_check(&self) -> bool {
        (**self).health_check().await
    }

    async fn list_since(&self, cursor: u64) -> Result<Vec<Entry>, BackendError> {
        (**self).list_since(cursor).await
    }

    async fn submit(&self, request: &SubmitRequest) -> Result<EntryId, BackendError> {
        (**self).submit(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            BackendError::Rejected("Name and text are required".into()).to_string(),
            "Name and text are required"
        );
        assert_eq!(
            BackendError::Transport("connection refused".into()).to_string(),
            "transport error: connection refused"
        );
    }
}
