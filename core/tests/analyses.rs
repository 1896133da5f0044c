mod common;

use common::{enrich, raw_event};
use referral_core::analyses::{self, AnalysisContext};
use referral_core::config::{ReferralConfig, ScoringWeights, StaffWeights};
use referral_core::record::{EnrichedEvent, RawEvent};
use referral_core::scoring::{
    compute_influence_scores, compute_referrer_metrics, compute_staff_multipliers,
    ReferrerMetrics, StaffMetrics,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

struct Fixture {
    events: Vec<EnrichedEvent>,
    referrer_metrics: Vec<ReferrerMetrics>,
    staff_metrics: Vec<StaffMetrics>,
    config: ReferralConfig,
}

impl Fixture {
    fn new(raw: Vec<RawEvent>, config: ReferralConfig) -> Self {
        let events = common::enrich_with(raw, &config);
        let mut referrer_metrics = compute_referrer_metrics(&events);
        compute_influence_scores(&mut referrer_metrics, &ScoringWeights::default());
        let staff_metrics =
            compute_staff_multipliers(&events, &referrer_metrics, &StaffWeights::default());
        Self {
            events,
            referrer_metrics,
            staff_metrics,
            config,
        }
    }

    fn ctx(&self) -> AnalysisContext<'_> {
        AnalysisContext {
            events: &self.events,
            referrer_metrics: &self.referrer_metrics,
            staff_metrics: &self.staff_metrics,
            config: &self.config,
        }
    }
}

/// Four referrers anchored on a 2025-12-01 maximum date:
///   ALICE -- 6 weekly events Jan..Feb, 6 accounts (dormant, high-value)
///   BOB   -- 2 events Jan/Mar 59 days apart, 2 accounts (dormant, weak)
///   CAROL -- 4 events early Nov, bursts (active, newly appeared)
///   DAVE  -- 3 events late Nov, bursts (active, newly appeared)
fn seasonal_dataset() -> Vec<RawEvent> {
    vec![
        raw_event("ALICE ADAMS", "2025-01-06", "A1"),
        raw_event("ALICE ADAMS", "2025-01-13", "A2"),
        raw_event("ALICE ADAMS", "2025-01-20", "A3"),
        raw_event("ALICE ADAMS", "2025-01-27", "A4"),
        raw_event("ALICE ADAMS", "2025-02-03", "A5"),
        raw_event("ALICE ADAMS", "2025-02-10", "A6"),
        raw_event("BOB BAKER", "2025-01-01", "B1"),
        raw_event("BOB BAKER", "2025-03-01", "B2"),
        raw_event("CAROL CLAY", "2025-11-01", "C1"),
        raw_event("CAROL CLAY", "2025-11-05", "C2"),
        raw_event("CAROL CLAY", "2025-11-10", "C3"),
        raw_event("CAROL CLAY", "2025-11-15", "C4"),
        raw_event("DAVE DEAN", "2025-11-20", "D1"),
        raw_event("DAVE DEAN", "2025-11-27", "D2"),
        raw_event("DAVE DEAN", "2025-12-01", "D3"),
    ]
}

// ── Top referrers ────────────────────────────────────────────────────────────

/// Single-event referrers are excluded by definition, not by score.
#[test]
fn top_referrers_excludes_single_event_referrers() {
    let fixture = Fixture::new(
        vec![
            raw_event("REPEAT", "2025-01-01", "R1"),
            raw_event("REPEAT", "2025-01-08", "R2"),
            raw_event("ONETIME", "2025-01-05", "O1"),
        ],
        ReferralConfig::default_test(),
    );
    let top = analyses::top_referrers(&fixture.ctx());
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].referrer.as_str(), "REPEAT");
}

#[test]
fn top_referrers_ranked_and_truncated() {
    let mut config = ReferralConfig::default_test();
    config.top_n_referrers = 2;
    let fixture = Fixture::new(seasonal_dataset(), config);
    let top = analyses::top_referrers(&fixture.ctx());
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].referrer.as_str(), "ALICE ADAMS");
    assert!(
        top[0].influence_score >= top[1].influence_score,
        "ranking must be descending"
    );
}

// ── Emerging referrers ───────────────────────────────────────────────────────

/// Emerging requires BOTH a recent first event and enough bursts.
#[test]
fn emerging_requires_recency_and_bursts() {
    let fixture = Fixture::new(seasonal_dataset(), ReferralConfig::default_test());
    let emerging = analyses::emerging_referrers(&fixture.ctx());
    let names: Vec<&str> = emerging.iter().map(|r| r.referrer.as_str()).collect();
    // ALICE and BOB appeared in January, far outside the 180-day window.
    assert!(!names.contains(&"ALICE ADAMS"));
    assert!(!names.contains(&"BOB BAKER"));
    // CAROL and DAVE are new and bursting.
    assert!(names.contains(&"CAROL CLAY"));
    assert!(names.contains(&"DAVE DEAN"));
}

#[test]
fn emerging_respects_min_burst_count() {
    let mut config = ReferralConfig::default_test();
    config.emerging_min_burst_count = 3;
    let fixture = Fixture::new(seasonal_dataset(), config);
    let emerging = analyses::emerging_referrers(&fixture.ctx());
    let names: Vec<&str> = emerging.iter().map(|r| r.referrer.as_str()).collect();
    assert!(names.contains(&"CAROL CLAY"), "3 bursts");
    assert!(!names.contains(&"DAVE DEAN"), "only 2 bursts");
}

// ── Dormant high-value referrers ─────────────────────────────────────────────

/// Dormant requires silence past the dormancy window AND high value --
/// the absolute account threshold or a top-quartile score.
#[test]
fn dormant_requires_both_dormancy_and_value() {
    let fixture = Fixture::new(seasonal_dataset(), ReferralConfig::default_test());
    let dormant = analyses::dormant_referrers(&fixture.ctx());
    let names: Vec<&str> = dormant.iter().map(|r| r.referrer.as_str()).collect();
    // ALICE: last event 2025-02-10, 6 unique accounts >= 5.
    assert!(names.contains(&"ALICE ADAMS"));
    // BOB is dormant but neither threshold nor top quartile.
    assert!(!names.contains(&"BOB BAKER"));
    // CAROL and DAVE are active.
    assert!(!names.contains(&"CAROL CLAY"));
    assert!(!names.contains(&"DAVE DEAN"));
}

#[test]
fn dormant_reports_days_dormant() {
    let fixture = Fixture::new(seasonal_dataset(), ReferralConfig::default_test());
    let dormant = analyses::dormant_referrers(&fixture.ctx());
    let alice = dormant
        .iter()
        .find(|r| r.referrer.as_str() == "ALICE ADAMS")
        .unwrap();
    assert_eq!(alice.last_event, common::date(2025, 2, 10));
    assert_eq!(
        alice.days_dormant,
        (common::date(2025, 12, 1) - common::date(2025, 2, 10)).num_days()
    );
    assert!(alice.days_dormant > fixture.config.dormancy_days);
}

/// With fewer than 4 scored referrers the quartile floor is 0, so any
/// dormant referrer qualifies.
#[test]
fn dormant_quartile_floor_relaxes_on_small_tables() {
    let fixture = Fixture::new(
        vec![
            raw_event("OLD GUY", "2025-01-01", "O1"),
            raw_event("OLD GUY", "2025-01-08", "O2"),
            raw_event("FRESH", "2025-12-01", "F1"),
            raw_event("FRESH", "2025-12-02", "F2"),
        ],
        ReferralConfig::default_test(),
    );
    let dormant = analyses::dormant_referrers(&fixture.ctx());
    assert_eq!(dormant.len(), 1);
    assert_eq!(dormant[0].referrer.as_str(), "OLD GUY");
}

// ── One-time vs repeat ───────────────────────────────────────────────────────

#[test]
fn onetime_vs_repeat_splits_and_totals() {
    let fixture = Fixture::new(
        vec![
            raw_event("REPEAT", "2025-01-01", "R1"),
            raw_event("REPEAT", "2025-01-08", "R2"),
            raw_event("SOLO ONE", "2025-01-05", "S1"),
            raw_event("SOLO TWO", "2025-01-06", "S2"),
        ],
        ReferralConfig::default_test(),
    );
    let rows = analyses::onetime_vs_repeat(&fixture.ctx());
    assert_eq!(rows.len(), 3);

    let onetime = &rows[0];
    assert_eq!(onetime.category, "One-time");
    assert_eq!(onetime.count, 2);
    assert_eq!(onetime.pct_of_total, 66.7);

    let repeat = &rows[1];
    assert_eq!(repeat.category, "Repeat");
    assert_eq!(repeat.count, 1);
    assert_eq!(repeat.pct_of_total, 33.3);

    let total = &rows[2];
    assert_eq!(total.category, "Grand Total");
    assert_eq!(total.count, 3);
    assert_eq!(total.pct_of_total, 100.0);
}

#[test]
fn onetime_vs_repeat_omits_empty_categories() {
    let fixture = Fixture::new(
        vec![
            raw_event("REPEAT", "2025-01-01", "R1"),
            raw_event("REPEAT", "2025-01-08", "R2"),
        ],
        ReferralConfig::default_test(),
    );
    let rows = analyses::onetime_vs_repeat(&fixture.ctx());
    let categories: Vec<&str> = rows.iter().map(|r| r.category).collect();
    assert_eq!(categories, vec!["Repeat", "Grand Total"]);
}

// ── Staff multipliers ────────────────────────────────────────────────────────

#[test]
fn staff_table_is_ranked_descending() {
    let mut raw = seasonal_dataset();
    for (i, event) in raw.iter_mut().enumerate() {
        event.staff_name = Some(if i % 3 == 0 { "ANNA OPS" } else { "BEN OPS" }.to_string());
    }
    let fixture = Fixture::new(raw, ReferralConfig::default_test());
    let rows = analyses::staff_multipliers(&fixture.ctx());
    assert_eq!(rows.len(), 2);
    assert!(rows[0].multiplier_score >= rows[1].multiplier_score);
}

// ── Branch density ───────────────────────────────────────────────────────────

/// Branch density measures referrer quality per branch and skips the
/// unknown-branch sentinel.
#[test]
fn branch_density_excludes_unknown_and_averages_scores() {
    let raw = vec![
        RawEvent {
            branch_id: Some("001".into()),
            ..raw_event("ALICE ADAMS", "2025-01-01", "A1")
        },
        RawEvent {
            branch_id: Some("001".into()),
            ..raw_event("ALICE ADAMS", "2025-01-08", "A2")
        },
        RawEvent {
            branch_id: Some("002".into()),
            referral_code: None,
            ..raw_event("BOB BAKER", "2025-01-05", "B1")
        },
        RawEvent {
            branch_id: None,
            ..raw_event("CAROL CLAY", "2025-01-06", "C1")
        },
    ];
    let fixture = Fixture::new(raw, ReferralConfig::default_test());
    let rows = analyses::branch_density(&fixture.ctx());
    let branches: Vec<&str> = rows.iter().map(|r| r.branch.as_str()).collect();
    assert!(!branches.contains(&"UNKNOWN"));
    assert_eq!(rows.len(), 2);

    let b001 = rows.iter().find(|r| r.branch == "001").unwrap();
    assert_eq!(b001.total_events, 2);
    assert_eq!(b001.unique_referrers, 1);
    assert_eq!(b001.top_referrer.as_str(), "ALICE ADAMS");
    assert_eq!(b001.standard_pct, 100.0, "both rows are Standard type");

    let b002 = rows.iter().find(|r| r.branch == "002").unwrap();
    assert_eq!(b002.standard_pct, 0.0, "manual code is not Standard");
}

// ── Code health ──────────────────────────────────────────────────────────────

#[test]
fn code_health_distribution_and_known_share() {
    let raw = vec![
        raw_event("A", "2025-01-01", "H1"),
        raw_event("A", "2025-01-08", "H2"),
        RawEvent {
            referral_code: None,
            ..raw_event("B", "2025-01-05", "H3")
        },
        RawEvent {
            referral_code: Some("UNKNOWN_XYZ".into()),
            ..raw_event("C", "2025-01-06", "H4")
        },
    ];
    let fixture = Fixture::new(raw, ReferralConfig::default_test());
    let report = analyses::code_health(&fixture.ctx());

    assert_eq!(report.rows[0].channel, "BRANCH_STANDARD", "sorted by count");
    assert_eq!(report.rows[0].count, 2);
    assert_eq!(report.rows[0].pct_of_total, 50.0);

    let total_pct: f64 = report.rows.iter().map(|r| r.pct_of_total).sum();
    assert!((total_pct - 100.0).abs() < 0.5);

    // 3 of 4 rows are not Low reliability.
    assert_eq!(report.known_code_pct, 75.0);
}

// ── Overview ─────────────────────────────────────────────────────────────────

#[test]
fn overview_headline_counts() {
    let fixture = Fixture::new(seasonal_dataset(), ReferralConfig::default_test());
    let kpis = analyses::overview(&fixture.ctx());
    assert_eq!(kpis.total_events, 15);
    assert_eq!(kpis.unique_referrers, 4);
    assert_eq!(kpis.unique_accounts, 15);
    assert_eq!(kpis.repeat_referrer_pct, 100.0);
    assert_eq!(kpis.most_active_branch.as_deref(), Some("001"));
    assert_eq!(kpis.dominant_channel.as_deref(), Some("BRANCH_STANDARD"));
    assert_eq!(kpis.manual_pct, 0.0);
    assert!(kpis.avg_gap_days.is_some());
    assert!(kpis.burst_pct > 0.0);
}

/// Empty metric tables produce zeroed KPIs, not errors.
#[test]
fn overview_survives_sentinel_only_input() {
    let events = enrich(vec![RawEvent {
        referrer_name: None,
        ..raw_event("unused", "2025-01-01", "H1")
    }]);
    let config = ReferralConfig::default_test();
    let ctx = AnalysisContext {
        events: &events,
        referrer_metrics: &[],
        staff_metrics: &[],
        config: &config,
    };
    let kpis = analyses::overview(&ctx);
    assert_eq!(kpis.total_events, 1);
    assert_eq!(kpis.unique_referrers, 0);
    assert_eq!(kpis.top_referrer_score, 0.0);
    assert_eq!(kpis.median_influence_score, 0.0);
    assert!(kpis.top_staff.is_none());
}

// ── Bundle ───────────────────────────────────────────────────────────────────

/// run_all produces every table from one context.
#[test]
fn run_all_populates_the_bundle() {
    let fixture = Fixture::new(seasonal_dataset(), ReferralConfig::default_test());
    let bundle = analyses::run_all(&fixture.ctx());
    assert!(!bundle.top_referrers.is_empty());
    assert!(!bundle.onetime_vs_repeat.is_empty());
    assert!(!bundle.code_health.rows.is_empty());
    assert_eq!(bundle.overview.total_events, 15);
}
