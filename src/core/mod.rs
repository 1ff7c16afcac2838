// Core lifecycle and queue logic exports
pub mod prompts;
pub mod queue;
pub mod sweeper;
pub mod transitions;

pub use prompts::{evaluate as evaluate_prompts, PromptDecision, PromptState};
pub use queue::{
    build_queue, clamp_cursor, promote_focus, QueueView, MAX_REAL_CANDIDATES, MIN_VISIBLE_ENTRIES,
};
pub use sweeper::{classify_expiry, sweep_snapshot, Expiry, PENDING_TTL_DAYS, PERHAPS_TTL_DAYS};
pub use transitions::{apply, expiry_target, Transition, TransitionError};
