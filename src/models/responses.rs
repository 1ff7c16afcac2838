use crate::models::domain::{ConnectionOutcome, QueueEntry, RelationshipRecord, RelationshipStatus};
use serde::{Deserialize, Serialize};

/// Response for the queue build endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildQueueResponse {
    #[serde(rename = "ownerId")]
    pub owner_id: String,
    pub entries: Vec<QueueEntry>,
    /// Real (non-placeholder) candidates in `entries`.
    #[serde(rename = "realCount")]
    pub real_count: usize,
    /// Cursor into the filtered list, clamped after this build.
    pub cursor: usize,
    /// Records reclaimed by the pre-read sweep.
    #[serde(rename = "sweptCount")]
    pub swept_count: u64,
}

/// Response for a lifecycle action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipActionResponse {
    pub success: bool,
    /// False when the record was already resolved (missing row or lost a
    /// conditional-write race); treated as a no-op rather than an error.
    pub applied: bool,
    #[serde(rename = "newStatus")]
    pub new_status: Option<RelationshipStatus>,
    #[serde(rename = "actionId")]
    pub action_id: String,
}

/// Response for a connection request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionRequestResponse {
    pub result: ConnectionOutcome,
}

/// Response for the relationship listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListRelationshipsResponse {
    #[serde(rename = "ownerId")]
    pub owner_id: String,
    pub records: Vec<RelationshipRecord>,
    pub count: usize,
}

/// Which prompts fire for the submitted session state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDecisionResponse {
    #[serde(rename = "showSharePrompt")]
    pub show_share_prompt: bool,
    #[serde(rename = "showFreshStartBanner")]
    pub show_fresh_start_banner: bool,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
