//! Influence-ranked referrer table.

use super::AnalysisContext;
use crate::types::ReferrerId;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct TopReferrerRow {
    pub referrer: ReferrerId,
    pub influence_score: f64,
    pub unique_accounts: u64,
    pub total_events: u64,
    pub burst_count: u64,
    pub channels_used: u64,
    pub branches_used: u64,
    pub max_network_size: u32,
    pub active_days: i64,
}

/// The top N referrers ranked by influence score.
///
/// Single-event referrers are excluded by definition, not by score: the
/// table covers demonstrated repeat behavior only.
pub fn top_referrers(ctx: &AnalysisContext) -> Vec<TopReferrerRow> {
    let mut repeat: Vec<_> = ctx
        .referrer_metrics
        .iter()
        .filter(|m| m.total_events > 1)
        .collect();
    // Stable sort: equal scores keep the metric table's id order.
    repeat.sort_by(|a, b| b.influence_score.total_cmp(&a.influence_score));

    repeat
        .into_iter()
        .take(ctx.config.top_n_referrers)
        .map(|m| TopReferrerRow {
            referrer: m.referrer.clone(),
            influence_score: m.influence_score,
            unique_accounts: m.unique_accounts,
            total_events: m.total_events,
            burst_count: m.burst_count,
            channels_used: m.channels_used,
            branches_used: m.branches_used,
            max_network_size: m.max_network_size,
            active_days: m.active_days,
        })
        .collect()
}
