use crate::models::{RelationshipAction, RelationshipRecord, RelationshipStatus};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors from the transition table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("illegal transition: {action:?} from {from:?}")]
    Illegal {
        from: RelationshipStatus,
        action: RelationshipAction,
    },

    #[error("{status:?} is terminal")]
    Terminal { status: RelationshipStatus },
}

/// Side effect a transition applies to the record's temporal fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionEffect {
    None,
    /// `defer`: stamp `perhaps_since = now`, overwriting any prior value.
    SetPerhapsSince,
    /// `request`: stamp `pending_since = now`, overwriting any prior value.
    SetPendingSince,
    /// `remove`: record who hid the relationship.
    SetHiddenBy,
}

/// A validated transition: target status plus its side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub to: RelationshipStatus,
    pub effect: TransitionEffect,
}

/// The canonical transition table.
///
/// Every user-driven status change goes through here; anything the table does
/// not name is rejected. Sweep expiry has its own entry point below because
/// it is not a user action; coordinator results are applied by the store.
pub fn apply(
    from: RelationshipStatus,
    action: RelationshipAction,
) -> Result<Transition, TransitionError> {
    if from.is_terminal() {
        return Err(TransitionError::Terminal { status: from });
    }

    use RelationshipAction::*;
    use RelationshipStatus::*;

    let transition = match (from, action) {
        (Recommended, Defer) => Transition {
            to: Perhaps,
            effect: TransitionEffect::SetPerhapsSince,
        },
        (Recommended, Reject) => Transition {
            to: Passed,
            effect: TransitionEffect::None,
        },
        (Recommended, Request) | (Perhaps, Request) => Transition {
            to: Pending,
            effect: TransitionEffect::SetPendingSince,
        },
        (Saved, Remove) | (Connected, Remove) => Transition {
            to: Removed,
            effect: TransitionEffect::SetHiddenBy,
        },
        _ => return Err(TransitionError::Illegal { from, action }),
    };

    Ok(transition)
}

/// Sweep expiry target: temporal statuses fall back to `recommended`.
pub fn expiry_target(status: RelationshipStatus) -> Option<RelationshipStatus> {
    match status {
        RelationshipStatus::Pending | RelationshipStatus::Perhaps => {
            Some(RelationshipStatus::Recommended)
        }
        _ => None,
    }
}

impl Transition {
    /// Apply this transition to an in-memory record, maintaining the invariant
    /// that only `pending`/`perhaps` carry their `*_since` timestamp.
    pub fn apply_to(
        &self,
        record: &mut RelationshipRecord,
        now: DateTime<Utc>,
        actor_id: &str,
    ) {
        record.status = self.to;
        record.pending_since = None;
        record.perhaps_since = None;
        match self.effect {
            TransitionEffect::SetPerhapsSince => record.perhaps_since = Some(now),
            TransitionEffect::SetPendingSince => record.pending_since = Some(now),
            TransitionEffect::SetHiddenBy => {
                record.hidden_by_user_id = Some(actor_id.to_string())
            }
            TransitionEffect::None => {}
        }
        record.updated_at = now;
    }
}
