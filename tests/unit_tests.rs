// Unit tests for Orbit Relate

use chrono::{Duration, Utc};
use orbit_relate::core::{
    queue::{build_queue, clamp_cursor, MAX_REAL_CANDIDATES, MIN_VISIBLE_ENTRIES},
    sweeper::{classify_expiry, sweep_snapshot, Expiry},
    transitions,
};
use orbit_relate::models::{
    ExclusionSets, PlaceholderVariant, QueueEntry, RelationshipAction, RelationshipRecord,
    RelationshipStatus,
};

fn record(cp: &str, status: RelationshipStatus, score: i16) -> RelationshipRecord {
    RelationshipRecord {
        owner_id: "owner".to_string(),
        counterpart_id: cp.to_string(),
        status,
        compatibility_score: score,
        pending_since: None,
        perhaps_since: None,
        hidden_by_user_id: None,
        updated_at: Utc::now(),
    }
}

fn pending_record(cp: &str, score: i16, days_ago: i64) -> RelationshipRecord {
    let mut r = record(cp, RelationshipStatus::Pending, score);
    r.pending_since = Some(Utc::now() - Duration::days(days_ago));
    r
}

fn queue_ids(entries: &[QueueEntry]) -> Vec<&str> {
    entries.iter().filter_map(|e| e.counterpart_id()).collect()
}

#[test]
fn test_stale_pending_lapses_on_sweep() {
    let now = Utc::now();
    let r = pending_record("b", 60, 11);
    assert_eq!(classify_expiry(&r, now), Some(Expiry::PendingLapsed));

    let fresh = pending_record("c", 60, 10);
    assert_eq!(classify_expiry(&fresh, now), None);
}

#[test]
fn test_stale_perhaps_lapses_on_sweep() {
    let now = Utc::now();
    let mut r = record("b", RelationshipStatus::Perhaps, 60);
    r.perhaps_since = Some(now - Duration::days(8));
    assert_eq!(classify_expiry(&r, now), Some(Expiry::PerhapsLapsed));
}

#[test]
fn test_queue_never_contains_excluded_counterparts() {
    let records: Vec<_> = (0..10)
        .map(|i| record(&format!("cp{}", i), RelationshipStatus::Recommended, 90 - i as i16))
        .collect();

    let mut exclusions = ExclusionSets::default();
    exclusions.passed.insert("cp0".to_string());
    exclusions.saved.insert("cp1".to_string());
    exclusions.pending.insert("cp2".to_string());

    let view = build_queue(&records, &exclusions, None);

    for id in queue_ids(&view.entries) {
        assert!(!exclusions.contains(id), "excluded id {} appeared in queue", id);
    }
}

#[test]
fn test_queue_scores_are_non_increasing() {
    let records = vec![
        record("a", RelationshipStatus::Recommended, 10),
        record("b", RelationshipStatus::Recommended, 99),
        record("c", RelationshipStatus::Recommended, 55),
        record("d", RelationshipStatus::Recommended, 55),
        record("e", RelationshipStatus::Recommended, 72),
    ];

    let view = build_queue(&records, &ExclusionSets::default(), None);

    let scores: Vec<i16> = view
        .entries
        .iter()
        .filter_map(|e| match e {
            QueueEntry::Candidate(c) => Some(c.compatibility_score),
            QueueEntry::Placeholder { .. } => None,
        })
        .collect();

    for pair in scores.windows(2) {
        assert!(pair[0] >= pair[1], "scores must be non-increasing: {:?}", scores);
    }
}

#[test]
fn test_queue_pads_to_three_and_caps_at_five() {
    // One real candidate: padded to exactly three entries
    let one = vec![record("a", RelationshipStatus::Recommended, 50)];
    let view = build_queue(&one, &ExclusionSets::default(), None);
    assert_eq!(view.real_count, 1);
    assert_eq!(view.entries.len(), MIN_VISIBLE_ENTRIES);

    // Ten real candidates: capped at five, no padding
    let many: Vec<_> = (0..10)
        .map(|i| record(&format!("cp{}", i), RelationshipStatus::Recommended, i as i16))
        .collect();
    let view = build_queue(&many, &ExclusionSets::default(), None);
    assert_eq!(view.real_count, MAX_REAL_CANDIDATES);
    assert_eq!(view.entries.len(), MAX_REAL_CANDIDATES);
}

#[test]
fn test_scenario_a_sweep_then_full_queue() {
    // Owner has B(recommended, 90), C(recommended, 70),
    // D(pending, pendingSince 11 days ago, 60)
    let mut records = vec![
        record("B", RelationshipStatus::Recommended, 90),
        record("C", RelationshipStatus::Recommended, 70),
        pending_record("D", 60, 11),
    ];

    let swept = sweep_snapshot(&mut records, Utc::now());
    assert_eq!(swept, 1);
    assert_eq!(records[2].status, RelationshipStatus::Recommended);
    assert_eq!(records[2].pending_since, None);

    // Exclusion sets derived after the sweep no longer hold D
    let exclusions = ExclusionSets::from_records(&records);
    let view = build_queue(&records, &exclusions, None);

    assert_eq!(queue_ids(&view.entries), vec!["B", "C", "D"]);
    assert_eq!(view.real_count, 3);
    assert!(view.entries.iter().all(|e| e.is_candidate()), "no padding expected");
}

#[test]
fn test_scenario_b_empty_owner_gets_three_placeholders() {
    let view = build_queue(&[], &ExclusionSets::default(), None);

    assert_eq!(view.real_count, 0);
    assert_eq!(view.entries.len(), 3);
    for entry in &view.entries {
        assert!(matches!(
            entry,
            QueueEntry::Placeholder {
                variant: PlaceholderVariant::CompleteProfile
            }
        ));
    }
}

#[test]
fn test_scenario_d_deferral_hides_then_reappears() {
    let now = Utc::now();
    let mut records = vec![
        record("X", RelationshipStatus::Recommended, 80),
        record("Y", RelationshipStatus::Recommended, 60),
    ];

    // Owner defers X
    let t = transitions::apply(RelationshipStatus::Recommended, RelationshipAction::Defer).unwrap();
    t.apply_to(&mut records[0], now, "owner");
    assert_eq!(records[0].status, RelationshipStatus::Perhaps);

    // X stays out of every build while deferred
    for day in [0, 3, 6] {
        let mut snapshot = records.clone();
        let at = now + Duration::days(day);
        sweep_snapshot(&mut snapshot, at);
        let exclusions = ExclusionSets::from_records(&snapshot);
        let view = build_queue(&snapshot, &exclusions, None);
        assert!(
            !queue_ids(&view.entries).contains(&"X"),
            "deferred candidate visible on day {}",
            day
        );
    }

    // After 7 days the sweep brings X back automatically
    let mut snapshot = records.clone();
    let later = now + Duration::days(8);
    let swept = sweep_snapshot(&mut snapshot, later);
    assert_eq!(swept, 1);

    let exclusions = ExclusionSets::from_records(&snapshot);
    let view = build_queue(&snapshot, &exclusions, None);
    assert_eq!(queue_ids(&view.entries), vec!["X", "Y"]);
}

#[test]
fn test_cursor_resets_when_focal_record_removed() {
    let records: Vec<_> = (0..4)
        .map(|i| record(&format!("cp{}", i), RelationshipStatus::Recommended, 90 - i as i16))
        .collect();

    let view = build_queue(&records, &ExclusionSets::default(), None);
    assert_eq!(view.real_count, 4);

    // Cursor on the last entry; removing that record shrinks the list
    let cursor = 3;
    assert_eq!(clamp_cursor(cursor, view.real_count), 3);

    let shrunk: Vec<_> = records[..3].to_vec();
    let view = build_queue(&shrunk, &ExclusionSets::default(), None);
    assert_eq!(clamp_cursor(cursor, view.real_count), 0);

    // A cursor still in bounds is left alone so the next item slides in
    assert_eq!(clamp_cursor(1, view.real_count), 1);
}
