//! New and accelerating referrers.

use super::{latest_date, AnalysisContext};
use crate::types::ReferrerId;
use chrono::{Duration, NaiveDate};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct EmergingReferrerRow {
    pub referrer: ReferrerId,
    pub influence_score: f64,
    pub burst_count: u64,
    pub active_days: i64,
    pub first_event: NaiveDate,
    pub last_event: NaiveDate,
    pub total_events: u64,
}

/// Referrers that are new AND accelerating: first event within the
/// emerging lookback window of the latest observed date, and at least
/// the configured burst count. Empty when no row resolves a date.
pub fn emerging_referrers(ctx: &AnalysisContext) -> Vec<EmergingReferrerRow> {
    let max_date = match latest_date(ctx.events) {
        Some(date) => date,
        None => return Vec::new(),
    };
    let cutoff = max_date - Duration::days(ctx.config.emerging_lookback_days);

    let mut rows: Vec<EmergingReferrerRow> = ctx
        .referrer_metrics
        .iter()
        .filter(|m| m.burst_count >= ctx.config.emerging_min_burst_count)
        .filter_map(|m| {
            let first = m.first_event.filter(|&d| d >= cutoff)?;
            Some(EmergingReferrerRow {
                referrer: m.referrer.clone(),
                influence_score: m.influence_score,
                burst_count: m.burst_count,
                active_days: m.active_days,
                first_event: first,
                last_event: m.last_event.unwrap_or(first),
                total_events: m.total_events,
            })
        })
        .collect();

    rows.sort_by(|a, b| b.influence_score.total_cmp(&a.influence_score));
    rows
}
