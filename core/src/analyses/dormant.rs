//! Historically high-value referrers that have gone quiet.

use super::{latest_date, AnalysisContext};
use crate::types::ReferrerId;
use chrono::{Duration, NaiveDate};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct DormantReferrerRow {
    pub referrer: ReferrerId,
    pub historical_score: f64,
    pub total_events: u64,
    pub unique_accounts: u64,
    pub last_event: NaiveDate,
    pub days_dormant: i64,
}

/// Referrers with no event in the last `dormancy_days` that were
/// high-value: at least `high_value_min_referrals` unique accounts OR an
/// influence score at or above the 75th percentile of all scored
/// referrers. With fewer than 4 scored referrers the percentile floor is
/// 0, so every dormant referrer qualifies.
pub fn dormant_referrers(ctx: &AnalysisContext) -> Vec<DormantReferrerRow> {
    let max_date = match latest_date(ctx.events) {
        Some(date) => date,
        None => return Vec::new(),
    };
    let cutoff = max_date - Duration::days(ctx.config.dormancy_days);

    let score_floor = if ctx.referrer_metrics.len() >= 4 {
        let mut scores: Vec<f64> = ctx
            .referrer_metrics
            .iter()
            .map(|m| m.influence_score)
            .collect();
        scores.sort_by(f64::total_cmp);
        quantile75(&scores)
    } else {
        0.0
    };

    let mut rows: Vec<DormantReferrerRow> = ctx
        .referrer_metrics
        .iter()
        .filter(|m| {
            m.unique_accounts >= ctx.config.high_value_min_referrals
                || m.influence_score >= score_floor
        })
        .filter_map(|m| {
            let last = m.last_event.filter(|&d| d < cutoff)?;
            Some(DormantReferrerRow {
                referrer: m.referrer.clone(),
                historical_score: m.influence_score,
                total_events: m.total_events,
                unique_accounts: m.unique_accounts,
                last_event: last,
                days_dormant: (max_date - last).num_days(),
            })
        })
        .collect();

    rows.sort_by(|a, b| b.historical_score.total_cmp(&a.historical_score));
    rows
}

/// 75th percentile with linear interpolation over an ascending-sorted,
/// non-empty slice.
fn quantile75(sorted: &[f64]) -> f64 {
    let position = (sorted.len() - 1) as f64 * 0.75;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (position - lower as f64)
}
