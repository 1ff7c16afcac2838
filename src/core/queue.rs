use crate::models::{
    ExclusionSets, PlaceholderVariant, QueueCandidate, QueueEntry, RelationshipRecord,
    RelationshipStatus,
};

/// At most this many real candidates are shown per build.
pub const MAX_REAL_CANDIDATES: usize = 5;

/// The queue is padded with placeholders up to this length.
pub const MIN_VISIBLE_ENTRIES: usize = 3;

/// Result of a queue build.
#[derive(Debug, Clone)]
pub struct QueueView {
    pub entries: Vec<QueueEntry>,
    pub real_count: usize,
}

/// Build the recommendation queue from an immutable record snapshot.
///
/// # Pipeline Stages
/// 1. Filter out counterparts in the passed/saved/pending exclusion sets
/// 2. Stable sort by compatibility score descending (ties keep fetch order)
/// 3. Priority reorder: the deep-link focus target, if present, moves to front
/// 4. Truncate to at most 5 real candidates
/// 5. Pad with placeholders to exactly 3 entries when fewer than 3 remain
///
/// The function is pure: it never mutates while iterating and is re-invoked
/// wholesale after any state-changing action rather than patched in place.
pub fn build_queue(
    records: &[RelationshipRecord],
    exclusions: &ExclusionSets,
    focus_counterpart_id: Option<&str>,
) -> QueueView {
    // Stage 1: only recommended records survive filtering
    let mut candidates: Vec<&RelationshipRecord> = records
        .iter()
        .filter(|r| r.status == RelationshipStatus::Recommended)
        .filter(|r| !exclusions.contains(&r.counterpart_id))
        .collect();

    // Stage 2: stable sort keeps server order on score ties
    candidates.sort_by(|a, b| b.compatibility_score.cmp(&a.compatibility_score));

    // Stage 3: focus target surfaces at index 0 before truncation so a
    // deep-linked candidate is never cut by the cap
    if let Some(focus) = focus_counterpart_id {
        promote_focus(&mut candidates, |r| r.counterpart_id == focus);
    }

    // Stage 4
    candidates.truncate(MAX_REAL_CANDIDATES);
    let real_count = candidates.len();

    let mut entries: Vec<QueueEntry> = candidates
        .into_iter()
        .map(|r| {
            QueueEntry::Candidate(QueueCandidate {
                counterpart_id: r.counterpart_id.clone(),
                compatibility_score: r.compatibility_score,
            })
        })
        .collect();

    // Stage 5: placeholders never count toward the real-candidate cap
    if real_count < MIN_VISIBLE_ENTRIES {
        let variant = if real_count == 0 {
            PlaceholderVariant::CompleteProfile
        } else {
            PlaceholderVariant::MoreComing
        };
        while entries.len() < MIN_VISIBLE_ENTRIES {
            entries.push(QueueEntry::Placeholder { variant });
        }
    }

    QueueView { entries, real_count }
}

/// Move the first item matching the predicate to the front of the list.
///
/// Used for the deep-link focus target in both the recommendation queue and
/// the saved-bucket listing; order of the remaining items is preserved.
pub fn promote_focus<T>(items: &mut Vec<T>, is_focus: impl Fn(&T) -> bool) {
    if let Some(pos) = items.iter().position(|item| is_focus(item)) {
        let focused = items.remove(pos);
        items.insert(0, focused);
    }
}

/// Clamp a navigation cursor against the freshly filtered list.
///
/// An out-of-bounds cursor resets to 0; otherwise it is left unchanged so the
/// next item slides naturally into the focal position after a removal.
#[inline]
pub fn clamp_cursor(cursor: usize, filtered_len: usize) -> usize {
    if cursor >= filtered_len {
        0
    } else {
        cursor
    }
}
