//! Derived analysis tables computed from the three core artifacts.
//!
//! Each analysis is a pure function over the pipeline outputs with a
//! defined empty-input result -- an empty group produces an empty table,
//! never an error. The registry runs them in a fixed order.

mod branch_density;
mod code_health;
mod dormant;
mod emerging;
mod onetime_repeat;
mod overview;
mod staff;
mod top_referrers;

pub use branch_density::{branch_density, BranchDensityRow};
pub use code_health::{code_health, CodeHealthReport, CodeMixRow};
pub use dormant::{dormant_referrers, DormantReferrerRow};
pub use emerging::{emerging_referrers, EmergingReferrerRow};
pub use onetime_repeat::{onetime_vs_repeat, RepeatCategoryRow};
pub use overview::{overview, OverviewKpis};
pub use staff::{staff_multipliers, StaffMultiplierRow};
pub use top_referrers::{top_referrers, TopReferrerRow};

use crate::config::ReferralConfig;
use crate::record::EnrichedEvent;
use crate::scoring::{ReferrerMetrics, StaffMetrics};
use serde::Serialize;

/// Bundles the pipeline artifacts every analysis reads.
pub struct AnalysisContext<'a> {
    pub events: &'a [EnrichedEvent],
    pub referrer_metrics: &'a [ReferrerMetrics],
    pub staff_metrics: &'a [StaffMetrics],
    pub config: &'a ReferralConfig,
}

/// All eight analysis tables for one run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisBundle {
    pub top_referrers: Vec<TopReferrerRow>,
    pub emerging_referrers: Vec<EmergingReferrerRow>,
    pub dormant_referrers: Vec<DormantReferrerRow>,
    pub onetime_vs_repeat: Vec<RepeatCategoryRow>,
    pub staff_multipliers: Vec<StaffMultiplierRow>,
    pub branch_density: Vec<BranchDensityRow>,
    pub code_health: CodeHealthReport,
    pub overview: OverviewKpis,
}

/// Run every analysis in registry order. Overview runs last since it
/// summarizes across the other artifacts' inputs.
pub fn run_all(ctx: &AnalysisContext) -> AnalysisBundle {
    let bundle = AnalysisBundle {
        top_referrers: top_referrers(ctx),
        emerging_referrers: emerging_referrers(ctx),
        dormant_referrers: dormant_referrers(ctx),
        onetime_vs_repeat: onetime_vs_repeat(ctx),
        staff_multipliers: staff_multipliers(ctx),
        branch_density: branch_density(ctx),
        code_health: code_health(ctx),
        overview: overview(ctx),
    };
    log::info!(
        "Analyses: {} top, {} emerging, {} dormant, {} staff, {} branches",
        bundle.top_referrers.len(),
        bundle.emerging_referrers.len(),
        bundle.dormant_referrers.len(),
        bundle.staff_multipliers.len(),
        bundle.branch_density.len(),
    );
    bundle
}

/// Percentage rounded to one decimal place; 0 on a zero denominator.
pub(crate) fn pct(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    crate::scoring::round1(100.0 * numerator as f64 / denominator as f64)
}

/// Latest resolved issue date across the whole event set.
pub(crate) fn latest_date(events: &[EnrichedEvent]) -> Option<chrono::NaiveDate> {
    events.iter().filter_map(|e| e.event.issue_date).max()
}
