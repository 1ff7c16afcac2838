use crate::models::ConnectionOutcome;
use crate::services::postgres::{RelationshipStore, StoreError};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors from the connection request coordinator
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// Retry-safe; the caller applies no local state change.
    #[error("Transient network error: {0}")]
    Transient(#[from] reqwest::Error),

    /// The pair was already resolved by the other party between request and
    /// response; the caller must refetch and reconcile.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Coordinator rejected request: {0}")]
    Rejected(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

impl From<StoreError> for CoordinatorError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(msg) => CoordinatorError::NotFound(msg),
            StoreError::Conflict(msg) => CoordinatorError::Conflict(msg),
            other => CoordinatorError::Rejected(other.to_string()),
        }
    }
}

/// Wire form of a connection request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionRequest {
    #[serde(rename = "requesterId")]
    pub requester_id: String,
    #[serde(rename = "targetId")]
    pub target_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ResolutionBody {
    result: ConnectionOutcome,
}

/// HTTP client adapter for a remotely deployed coordinator
///
/// Used when the mutual-connection check runs in a separate service; this
/// core only consumes its `{ result: connected | pending }` contract.
pub struct HttpCoordinator {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl HttpCoordinator {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            api_key,
            client,
        }
    }

    /// Resolve a connection request against the remote coordinator.
    pub async fn resolve(
        &self,
        request: &ConnectionRequest,
    ) -> Result<ConnectionOutcome, CoordinatorError> {
        let url = format!(
            "{}/connection-requests",
            self.base_url.trim_end_matches('/')
        );

        tracing::debug!(
            "Submitting connection request {} -> {} to {}",
            request.requester_id,
            request.target_id,
            url
        );

        let mut builder = self.client.post(&url).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.header("X-Orbit-Key", key);
        }

        let response = builder.send().await?;

        match response.status() {
            status if status.is_success() => {
                let body: ResolutionBody = response.json().await.map_err(|e| {
                    CoordinatorError::InvalidResponse(format!(
                        "Failed to parse coordinator response: {}",
                        e
                    ))
                })?;
                Ok(body.result)
            }
            StatusCode::CONFLICT => Err(CoordinatorError::Conflict(format!(
                "pair {} / {} already resolved",
                request.requester_id, request.target_id
            ))),
            StatusCode::NOT_FOUND => Err(CoordinatorError::NotFound(format!(
                "no relationship record {} -> {}",
                request.requester_id, request.target_id
            ))),
            status => {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unable to read body".to_string());
                Err(CoordinatorError::Rejected(format!("{}: {}", status, body)))
            }
        }
    }
}

/// Dispatch between the in-process Postgres resolver and the remote adapter.
pub enum CoordinatorService {
    /// Single-transaction resolution against the local relationship store.
    Local(Arc<RelationshipStore>),
    /// Remote coordinator deployment behind HTTP.
    Remote(HttpCoordinator),
}

impl CoordinatorService {
    pub async fn resolve(
        &self,
        request: &ConnectionRequest,
    ) -> Result<ConnectionOutcome, CoordinatorError> {
        match self {
            CoordinatorService::Local(store) => {
                let outcome = store
                    .resolve_connection_request(
                        &request.requester_id,
                        &request.target_id,
                        chrono::Utc::now(),
                    )
                    .await?;
                Ok(outcome)
            }
            CoordinatorService::Remote(http) => http.resolve(request).await,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, CoordinatorService::Local(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ConnectionRequest {
        ConnectionRequest {
            requester_id: "alice".to_string(),
            target_id: "bob".to_string(),
            message: Some("hello".to_string()),
        }
    }

    #[tokio::test]
    async fn test_remote_connected_result() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/connection-requests")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"result":"connected"}"#)
            .create_async()
            .await;

        let coordinator = HttpCoordinator::new(server.url(), None);
        let outcome = coordinator.resolve(&request()).await.unwrap();

        assert_eq!(outcome, ConnectionOutcome::Connected);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_remote_pending_result() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/connection-requests")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"result":"pending"}"#)
            .create_async()
            .await;

        let coordinator = HttpCoordinator::new(server.url(), None);
        let outcome = coordinator.resolve(&request()).await.unwrap();

        assert_eq!(outcome, ConnectionOutcome::Pending);
    }

    #[tokio::test]
    async fn test_remote_conflict_maps_to_conflict_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/connection-requests")
            .with_status(409)
            .create_async()
            .await;

        let coordinator = HttpCoordinator::new(server.url(), None);
        let err = coordinator.resolve(&request()).await.unwrap_err();

        assert!(matches!(err, CoordinatorError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_remote_not_found_maps_to_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/connection-requests")
            .with_status(404)
            .create_async()
            .await;

        let coordinator = HttpCoordinator::new(server.url(), None);
        let err = coordinator.resolve(&request()).await.unwrap_err();

        assert!(matches!(err, CoordinatorError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_remote_garbage_body_is_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/connection-requests")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let coordinator = HttpCoordinator::new(server.url(), None);
        let err = coordinator.resolve(&request()).await.unwrap_err();

        assert!(matches!(err, CoordinatorError::InvalidResponse(_)));
    }
}
