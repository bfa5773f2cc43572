//! HTTP Backend Implementation
//!
//! Talks to the wall server's JSON API:
//!
//! - `GET /api/wishes[?since=N]` - list-since
//! - `POST /api/wish` - submit
//!
//! Both endpoints always answer with a JSON body carrying an `ok` flag, even
//! for validation failures (HTTP 400), so the body is decoded before the
//! status is considered.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::traits::{BackendError, WallBackend};
use crate::config::ServerConfig;
use crate::entry::{Entry, EntryId, ListResponse, SubmitRequest, SubmitResponse};

/// HTTP client for the wall server
#[derive(Clone)]
pub struct HttpBackend {
    /// Base URL, without trailing slash
    base_url: String,
    /// HTTP client
    http_client: reqwest::Client,
}

impl HttpBackend {
    /// Create a backend from server settings
    pub fn new(config: &ServerConfig) -> Result<Self, BackendError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| BackendError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            base_url: config.base_url(),
            http_client,
        })
    }

    /// Base URL this backend talks to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// List endpoint URL for a cursor
    fn list_url(&self, cursor: u64) -> String {
        if cursor > 0 {
            format!("{}/api/wishes?since={}", self.base_url, cursor)
        } else {
            format!("{}/api/wishes", self.base_url)
        }
    }

    /// Submit endpoint URL
    fn submit_url(&self) -> String {
        format!("{}/api/wish", self.base_url)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BackendError> {
        response.json::<T>().await.map_err(|e| {
            if e.is_decode() {
                BackendError::Decode(e.to_string())
            } else {
                BackendError::Transport(e.to_string())
            }
        })
    }
}

#[async_trait]
impl WallBackend for HttpBackend {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn health_check(&self) -> bool {
        self.http_client
            .get(self.list_url(u64::MAX))
            .send()
            .await
            .is_ok()
    }

    async fn list_since(&self, cursor: u64) -> Result<Vec<Entry>, BackendError> {
        let url = self.list_url(cursor);
        tracing::trace!(%url, "Listing entries");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let body: ListResponse = Self::decode(response).await?;
        if !body.ok {
            return Err(BackendError::Server(
                body.error.unwrap_or_else(|| "ok=false".to_string()),
            ));
        }
        Ok(body.items)
    }

    async fn submit(&self, request: &SubmitRequest) -> Result<EntryId, BackendError> {
        let response = self
            .http_client
            .post(self.submit_url())
            .json(request)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let body: SubmitResponse = Self::decode(response).await?;
        match (body.ok, body.id) {
            (true, Some(id)) => Ok(id),
            (true, None) => Err(BackendError::Decode("accepted without an id".to_string())),
            (false, _) => Err(BackendError::Rejected(
                body.error.unwrap_or_else(|| "submission rejected".to_string()),
            )),
        }
    }
}
