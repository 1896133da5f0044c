//! Staff multiplier ranking -- processing reach, not influence.

use super::AnalysisContext;
use crate::scoring::round1;
use crate::types::StaffId;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct StaffMultiplierRow {
    pub staff: StaffId,
    pub multiplier_score: f64,
    pub events_processed: u64,
    pub unique_referrers: u64,
    pub avg_referrer_score: f64,
    pub unique_branches: u64,
}

/// Staff ranked by multiplier score descending.
pub fn staff_multipliers(ctx: &AnalysisContext) -> Vec<StaffMultiplierRow> {
    let mut rows: Vec<StaffMultiplierRow> = ctx
        .staff_metrics
        .iter()
        .map(|s| StaffMultiplierRow {
            staff: s.staff.clone(),
            multiplier_score: s.multiplier_score,
            events_processed: s.events_processed,
            unique_referrers: s.unique_referrers,
            avg_referrer_score: round1(s.avg_referrer_score),
            unique_branches: s.unique_branches,
        })
        .collect();

    rows.sort_by(|a, b| b.multiplier_score.total_cmp(&a.multiplier_score));
    rows
}
