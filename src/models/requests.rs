use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to build the recommendation queue for an owner.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BuildQueueRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "owner_id", rename = "ownerId")]
    pub owner_id: String,
    /// One-shot deep-link focus target; consumed by this build, never stored.
    #[serde(default, alias = "focus_counterpart_id", rename = "focusCounterpartId")]
    pub focus_counterpart_id: Option<String>,
    #[serde(default, alias = "cursor", rename = "cursor")]
    pub cursor: usize,
}

/// Request to apply a lifecycle action (defer, reject, remove).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RelationshipActionRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "owner_id", rename = "ownerId")]
    pub owner_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "counterpart_id", rename = "counterpartId")]
    pub counterpart_id: String,
    #[serde(alias = "action", rename = "action")]
    pub action: String,
}

/// Request to send a connection request through the Coordinator.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ConnectionRequestBody {
    #[validate(length(min = 1))]
    #[serde(alias = "requester_id", rename = "requesterId")]
    pub requester_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "target_id", rename = "targetId")]
    pub target_id: String,
    #[serde(default, alias = "message", rename = "message")]
    pub message: Option<String>,
}

/// Session prompt state submitted for evaluation.
///
/// The engagement counter and last-shown guards live with the UI session; the
/// service evaluates gating as a pure function over what the client submits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptStateRequest {
    #[serde(alias = "engagement_count", rename = "engagementCount")]
    pub engagement_count: u32,
    #[serde(default, alias = "share_prompt_shown_once", rename = "sharePromptShownOnce")]
    pub share_prompt_shown_once: bool,
    /// ISO week of the last recurring share prompt, as [year, week].
    #[serde(default, alias = "last_share_week", rename = "lastShareWeek")]
    pub last_share_week: Option<(i32, u32)>,
    #[serde(default, alias = "last_fresh_start_date", rename = "lastFreshStartDate")]
    pub last_fresh_start_date: Option<chrono::NaiveDate>,
}
