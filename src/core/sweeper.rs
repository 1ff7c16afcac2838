use crate::core::transitions;
use crate::models::{RelationshipRecord, RelationshipStatus};
use chrono::{DateTime, Duration, Utc};

/// A `pending` request lapses back to `recommended` after 10 days.
pub const PENDING_TTL_DAYS: i64 = 10;

/// A `perhaps` deferral lapses back to `recommended` after 7 days.
pub const PERHAPS_TTL_DAYS: i64 = 7;

/// Which temporal state a record has outlived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    PendingLapsed,
    PerhapsLapsed,
}

/// Classify whether a record's temporal state has expired at `now`.
///
/// All comparisons use UTC. A record in a temporal status with a missing
/// timestamp violates the data invariant and is left alone rather than
/// guessed at.
#[inline]
pub fn classify_expiry(record: &RelationshipRecord, now: DateTime<Utc>) -> Option<Expiry> {
    if !record.status.is_temporal() {
        return None;
    }

    let (since, ttl, lapse) = if record.status == RelationshipStatus::Pending {
        (record.pending_since, PENDING_TTL_DAYS, Expiry::PendingLapsed)
    } else {
        (record.perhaps_since, PERHAPS_TTL_DAYS, Expiry::PerhapsLapsed)
    };

    let since = since?;
    (now - since > Duration::days(ttl)).then_some(lapse)
}

/// Apply expiry to an in-memory snapshot, returning how many records lapsed.
///
/// The store performs the same rewrite as conditional SQL updates; this
/// mirror exists so the queue can be built from an already-fetched snapshot
/// when a sweep write fails, and for tests.
pub fn sweep_snapshot(records: &mut [RelationshipRecord], now: DateTime<Utc>) -> usize {
    let mut swept = 0;
    for record in records.iter_mut() {
        if classify_expiry(record, now).is_none() {
            continue;
        }
        if let Some(target) = transitions::expiry_target(record.status) {
            record.status = target;
            record.pending_since = None;
            record.perhaps_since = None;
            record.updated_at = now;
            swept += 1;
        }
    }
    swept
}
