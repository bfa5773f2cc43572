//! Submit Client
//!
//! Sends a new entry to the wall server. Accepted entries are not shown
//! right away; they arrive on the wall through a later poll like everyone
//! else's.

use thiserror::Error;

use crate::backend::{BackendError, WallBackend};
use crate::entry::{EntryId, SubmitRequest};

/// Why a submission failed
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubmitError {
    /// The server refused the entry; the message is meant for the user
    #[error("{0}")]
    Rejected(String),

    /// The request never completed or the answer was unreadable
    #[error("could not reach the wall: {0}")]
    Network(String),
}

impl From<BackendError> for SubmitError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Rejected(msg) | BackendError::Server(msg) => Self::Rejected(msg),
            BackendError::Transport(msg) | BackendError::Decode(msg) => Self::Network(msg),
        }
    }
}

/// Thin wrapper over a backend's submit operation
pub struct SubmitClient<B: ?Sized> {
    backend: std::sync::Arc<B>,
}

impl<B: ?Sized> Clone for SubmitClient<B> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
        }
    }
}

impl<B: WallBackend + ?Sized> SubmitClient<B> {
    /// Wrap a backend
    pub fn new(backend: std::sync::Arc<B>) -> Self {
        Self { backend }
    }

    /// Submit an entry; `defer` holds it back until the next reveal time
    pub async fn submit(
        &self,
        name: &str,
        text: &str,
        defer: bool,
    ) -> Result<EntryId, SubmitError> {
        let request = SubmitRequest::new(name, text, defer);
        match self.backend.submit(&request).await {
            Ok(id) => {
                tracing::info!(%id, deferred = defer, backend = self.backend.name(), "Entry submitted");
                Ok(id)
            }
            Err(err) => {
                let err = SubmitError::from(err);
                tracing::warn!(error = %err, "Submission failed");
                Err(err)
            }
        }
    }
}
