mod common;

use common::{enrich, raw_event};
use referral_core::config::{ScoringWeights, StaffWeights};
use referral_core::record::RawEvent;
use referral_core::scoring::{
    compute_influence_scores, compute_referrer_metrics, compute_staff_multipliers,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn with_staff(referrer: &str, date: &str, account_id: &str, staff: &str) -> RawEvent {
    RawEvent {
        staff_name: Some(staff.to_string()),
        ..raw_event(referrer, date, account_id)
    }
}

/// Two scored referrers plus one sentinel row:
///   ALICE A -- 3 events weekly (2 bursts), 3 accounts, staff ONE
///   BOB B   -- 1 event, 1 account, staff TWO
///   UNKNOWN -- 1 event, staff TWO
fn sample_events() -> Vec<referral_core::record::EnrichedEvent> {
    enrich(vec![
        with_staff("ALICE A", "2025-01-01", "A1", "STAFF ONE"),
        with_staff("ALICE A", "2025-01-08", "A2", "STAFF ONE"),
        with_staff("ALICE A", "2025-01-15", "A3", "STAFF ONE"),
        with_staff("BOB B", "2025-01-20", "B1", "STAFF TWO"),
        RawEvent {
            referrer_name: None,
            ..with_staff("unused", "2025-01-21", "U1", "STAFF TWO")
        },
    ])
}

// ── Referrer aggregation ─────────────────────────────────────────────────────

/// The sentinel referrer never receives a metrics row.
#[test]
fn sentinel_referrer_is_excluded() {
    let metrics = compute_referrer_metrics(&sample_events());
    assert_eq!(metrics.len(), 2);
    assert!(metrics.iter().all(|m| !m.referrer.is_sentinel()));
}

#[test]
fn referrer_aggregates_are_correct() {
    let metrics = compute_referrer_metrics(&sample_events());
    let alice = &metrics[0];
    assert_eq!(alice.referrer.as_str(), "ALICE A");
    assert_eq!(alice.total_events, 3);
    assert_eq!(alice.unique_accounts, 3);
    assert_eq!(alice.active_days, 15, "inclusive span of 2025-01-01..15");
    assert_eq!(alice.burst_count, 2);
    assert_eq!(alice.avg_gap_days, Some(7.0));
    assert_eq!(alice.channels_used, 1);
    assert_eq!(alice.branches_used, 1);
    assert_eq!(alice.first_event, Some(common::date(2025, 1, 1)));
    assert_eq!(alice.last_event, Some(common::date(2025, 1, 15)));
    assert_eq!(alice.network_count, 1);
}

/// Single-event referrers have no mean gap.
#[test]
fn single_event_referrer_has_no_avg_gap() {
    let metrics = compute_referrer_metrics(&sample_events());
    let bob = &metrics[1];
    assert_eq!(bob.referrer.as_str(), "BOB B");
    assert_eq!(bob.total_events, 1);
    assert_eq!(bob.avg_gap_days, None);
    assert_eq!(bob.active_days, 1);
}

/// An all-sentinel input yields an empty table, not an error.
#[test]
fn all_sentinel_input_yields_empty_table() {
    let events = enrich(vec![
        RawEvent {
            referrer_name: None,
            ..raw_event("unused", "2025-01-01", "H1")
        },
        RawEvent {
            referrer_name: Some("  ".into()),
            ..raw_event("unused", "2025-01-02", "H2")
        },
    ]);
    assert!(compute_referrer_metrics(&events).is_empty());
}

// ── Influence scores ─────────────────────────────────────────────────────────

/// With two referrers the stronger one pins 100.0 and the weaker 0.0
/// after the composite min-max; hand-computed from the component math.
#[test]
fn influence_scores_span_the_scale() {
    let mut metrics = compute_referrer_metrics(&sample_events());
    compute_influence_scores(&mut metrics, &ScoringWeights::default());
    assert_eq!(metrics[0].influence_score, 100.0, "ALICE dominates");
    assert_eq!(metrics[1].influence_score, 0.0, "BOB trails on everything");
}

#[test]
fn influence_scores_stay_in_range() {
    let mut metrics = compute_referrer_metrics(&sample_events());
    compute_influence_scores(&mut metrics, &ScoringWeights::default());
    for m in &metrics {
        assert!(
            (0.0..=100.0).contains(&m.influence_score),
            "score out of range: {}",
            m.influence_score
        );
        assert!(!m.influence_score.is_nan());
    }
}

/// A lone referrer hits the constant-series rule on every component:
/// each normalizes to 0.5, so the final score is exactly 50.0 -- never 0.
#[test]
fn lone_referrer_scores_fifty() {
    let events = enrich(vec![
        raw_event("ALICE A", "2025-01-01", "H1"),
        raw_event("ALICE A", "2025-01-08", "H2"),
    ]);
    let mut metrics = compute_referrer_metrics(&events);
    compute_influence_scores(&mut metrics, &ScoringWeights::default());
    assert_eq!(metrics[0].influence_score, 50.0);
}

/// Identical referrers are a constant series on every component; all of
/// them score 50.0.
#[test]
fn identical_referrers_all_score_fifty() {
    let events = enrich(vec![
        raw_event("ALICE A", "2025-01-01", "A1"),
        raw_event("ALICE A", "2025-01-08", "A2"),
        raw_event("BOB B", "2025-01-01", "B1"),
        raw_event("BOB B", "2025-01-08", "B2"),
    ]);
    let mut metrics = compute_referrer_metrics(&events);
    compute_influence_scores(&mut metrics, &ScoringWeights::default());
    assert!(metrics.iter().all(|m| m.influence_score == 50.0));
}

#[test]
fn empty_metrics_scoring_is_a_noop() {
    let mut metrics = Vec::new();
    compute_influence_scores(&mut metrics, &ScoringWeights::default());
    assert!(metrics.is_empty());
}

// ── Staff multipliers ────────────────────────────────────────────────────────

/// The unassigned-staff sentinel never receives a metrics row.
#[test]
fn sentinel_staff_is_excluded() {
    let events = enrich(vec![
        with_staff("ALICE A", "2025-01-01", "A1", "STAFF ONE"),
        RawEvent {
            staff_name: None,
            ..raw_event("ALICE A", "2025-01-08", "A2")
        },
    ]);
    let mut metrics = compute_referrer_metrics(&events);
    compute_influence_scores(&mut metrics, &ScoringWeights::default());
    let staff = compute_staff_multipliers(&events, &metrics, &StaffWeights::default());
    assert_eq!(staff.len(), 1);
    assert_eq!(staff[0].staff.as_str(), "STAFF ONE");
}

/// A sentinel referrer has no score row; the fill-on-missing lookup
/// contributes 0 to the staff mean instead of failing.
#[test]
fn missing_referrer_score_fills_zero() {
    let events = sample_events();
    let mut metrics = compute_referrer_metrics(&events);
    compute_influence_scores(&mut metrics, &ScoringWeights::default());
    let staff = compute_staff_multipliers(&events, &metrics, &StaffWeights::default());

    let one = staff.iter().find(|s| s.staff.as_str() == "STAFF ONE").unwrap();
    let two = staff.iter().find(|s| s.staff.as_str() == "STAFF TWO").unwrap();

    assert_eq!(one.events_processed, 3);
    assert_eq!(one.unique_referrers, 1);
    assert_eq!(one.avg_referrer_score, 100.0, "ALICE's score");

    // TWO handled BOB (0.0) and the sentinel (filled 0.0).
    assert_eq!(two.events_processed, 2);
    assert_eq!(two.unique_referrers, 2);
    assert_eq!(two.avg_referrer_score, 0.0);
}

/// Hand-computed multiplier: quality minmax [1, 0], reach minmax [0, 1],
/// weights 0.6/0.4 -> 60.0 and 40.0.
#[test]
fn multiplier_combines_quality_and_reach() {
    let events = sample_events();
    let mut metrics = compute_referrer_metrics(&events);
    compute_influence_scores(&mut metrics, &ScoringWeights::default());
    let staff = compute_staff_multipliers(&events, &metrics, &StaffWeights::default());

    let one = staff.iter().find(|s| s.staff.as_str() == "STAFF ONE").unwrap();
    let two = staff.iter().find(|s| s.staff.as_str() == "STAFF TWO").unwrap();
    assert_eq!(one.multiplier_score, 60.0);
    assert_eq!(two.multiplier_score, 40.0);
}

#[test]
fn multiplier_scores_stay_in_range() {
    let events = sample_events();
    let mut metrics = compute_referrer_metrics(&events);
    compute_influence_scores(&mut metrics, &ScoringWeights::default());
    for s in compute_staff_multipliers(&events, &metrics, &StaffWeights::default()) {
        assert!((0.0..=100.0).contains(&s.multiplier_score));
        assert!(!s.multiplier_score.is_nan());
    }
}

/// No scored referrers means no staff table.
#[test]
fn staff_table_empty_without_referrer_metrics() {
    let events = enrich(vec![RawEvent {
        referrer_name: None,
        ..raw_event("unused", "2025-01-01", "H1")
    }]);
    let staff = compute_staff_multipliers(&events, &[], &StaffWeights::default());
    assert!(staff.is_empty());
}
