use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Lifecycle status of a relationship record.
///
/// `passed` and `removed` are terminal: no code path returns a record to any
/// other status once either is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "relationship_status", rename_all = "lowercase")]
pub enum RelationshipStatus {
    Recommended,
    Perhaps,
    Pending,
    Saved,
    Connected,
    Passed,
    Removed,
}

impl RelationshipStatus {
    /// Terminal statuses never transition again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RelationshipStatus::Passed | RelationshipStatus::Removed)
    }

    /// Statuses that carry a `*_since` timestamp and are reclaimed by the sweeper.
    pub fn is_temporal(&self) -> bool {
        matches!(self, RelationshipStatus::Pending | RelationshipStatus::Perhaps)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipStatus::Recommended => "recommended",
            RelationshipStatus::Perhaps => "perhaps",
            RelationshipStatus::Pending => "pending",
            RelationshipStatus::Saved => "saved",
            RelationshipStatus::Connected => "connected",
            RelationshipStatus::Passed => "passed",
            RelationshipStatus::Removed => "removed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "recommended" => Some(RelationshipStatus::Recommended),
            "perhaps" => Some(RelationshipStatus::Perhaps),
            "pending" => Some(RelationshipStatus::Pending),
            "saved" => Some(RelationshipStatus::Saved),
            "connected" => Some(RelationshipStatus::Connected),
            "passed" => Some(RelationshipStatus::Passed),
            "removed" => Some(RelationshipStatus::Removed),
            _ => None,
        }
    }
}

/// One relationship record per ordered (owner, counterpart) pair.
///
/// Records are created with status `recommended` by the external scoring
/// service; this core only mutates them. Mutuality is stored as a coordinated
/// pair of `connected` rows on both sides, never as a duplicate row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RelationshipRecord {
    #[serde(rename = "ownerId")]
    pub owner_id: String,
    #[serde(rename = "counterpartId")]
    pub counterpart_id: String,
    pub status: RelationshipStatus,
    #[serde(rename = "compatibilityScore")]
    pub compatibility_score: i16,
    #[serde(rename = "pendingSince", default)]
    pub pending_since: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(rename = "perhapsSince", default)]
    pub perhaps_since: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(rename = "hiddenByUserId", default)]
    pub hidden_by_user_id: Option<String>,
    #[serde(rename = "updatedAt")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// User action against a relationship record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipAction {
    Defer,
    Reject,
    Request,
    Remove,
}

/// Outcome of a connection request resolved by the Coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionOutcome {
    Connected,
    Pending,
}

/// Counterpart id-sets used to filter the recommendation queue.
///
/// Derived wholesale from every authoritative fetch; the cached copy is an
/// accelerator only and degrades to empty sets when missing or corrupt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExclusionSets {
    pub passed: HashSet<String>,
    pub saved: HashSet<String>,
    pub pending: HashSet<String>,
}

impl ExclusionSets {
    /// True when the counterpart must not appear in the queue.
    pub fn contains(&self, counterpart_id: &str) -> bool {
        self.passed.contains(counterpart_id)
            || self.saved.contains(counterpart_id)
            || self.pending.contains(counterpart_id)
    }

    /// Rebuild the sets from an authoritative record snapshot.
    pub fn from_records(records: &[RelationshipRecord]) -> Self {
        let mut sets = ExclusionSets::default();
        for record in records {
            match record.status {
                RelationshipStatus::Passed => {
                    sets.passed.insert(record.counterpart_id.clone());
                }
                RelationshipStatus::Saved | RelationshipStatus::Connected => {
                    sets.saved.insert(record.counterpart_id.clone());
                }
                RelationshipStatus::Pending => {
                    sets.pending.insert(record.counterpart_id.clone());
                }
                _ => {}
            }
        }
        sets
    }
}

/// Placeholder variant shown when the queue has too few real candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlaceholderVariant {
    /// Zero real candidates: prompt the user to complete their profile.
    CompleteProfile,
    /// One or two real candidates: more are on the way.
    MoreComing,
}

/// A real candidate entry in the built queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueCandidate {
    #[serde(rename = "counterpartId")]
    pub counterpart_id: String,
    #[serde(rename = "compatibilityScore")]
    pub compatibility_score: i16,
}

/// Entry in the rendered recommendation queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum QueueEntry {
    Candidate(QueueCandidate),
    Placeholder { variant: PlaceholderVariant },
}

impl QueueEntry {
    pub fn is_candidate(&self) -> bool {
        matches!(self, QueueEntry::Candidate(_))
    }

    pub fn counterpart_id(&self) -> Option<&str> {
        match self {
            QueueEntry::Candidate(c) => Some(&c.counterpart_id),
            QueueEntry::Placeholder { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(cp: &str, status: RelationshipStatus) -> RelationshipRecord {
        RelationshipRecord {
            owner_id: "owner".to_string(),
            counterpart_id: cp.to_string(),
            status,
            compatibility_score: 50,
            pending_since: None,
            perhaps_since: None,
            hidden_by_user_id: None,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(RelationshipStatus::Passed.is_terminal());
        assert!(RelationshipStatus::Removed.is_terminal());
        assert!(!RelationshipStatus::Connected.is_terminal());
        assert!(!RelationshipStatus::Recommended.is_terminal());
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            RelationshipStatus::Recommended,
            RelationshipStatus::Perhaps,
            RelationshipStatus::Pending,
            RelationshipStatus::Saved,
            RelationshipStatus::Connected,
            RelationshipStatus::Passed,
            RelationshipStatus::Removed,
        ] {
            assert_eq!(RelationshipStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(RelationshipStatus::parse("bogus"), None);
    }

    #[test]
    fn test_exclusion_sets_from_records() {
        let records = vec![
            record("a", RelationshipStatus::Passed),
            record("b", RelationshipStatus::Saved),
            record("c", RelationshipStatus::Connected),
            record("d", RelationshipStatus::Pending),
            record("e", RelationshipStatus::Recommended),
        ];

        let sets = ExclusionSets::from_records(&records);

        assert!(sets.contains("a"));
        assert!(sets.contains("b"));
        assert!(sets.contains("c"));
        assert!(sets.contains("d"));
        assert!(!sets.contains("e"));
    }
}
