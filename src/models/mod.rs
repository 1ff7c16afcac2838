// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    ConnectionOutcome, ExclusionSets, PlaceholderVariant, QueueCandidate, QueueEntry,
    RelationshipAction, RelationshipRecord, RelationshipStatus,
};
pub use requests::{
    BuildQueueRequest, ConnectionRequestBody, PromptStateRequest, RelationshipActionRequest,
};
pub use responses::{
    BuildQueueResponse, ConnectionRequestResponse, ErrorResponse, HealthResponse,
    ListRelationshipsResponse, PromptDecisionResponse, RelationshipActionResponse,
};
