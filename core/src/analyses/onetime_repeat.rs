//! One-time vs repeat referrer comparison.

use super::{pct, AnalysisContext};
use crate::scoring::{round1, ReferrerMetrics};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct RepeatCategoryRow {
    pub category: &'static str,
    pub count: u64,
    pub pct_of_total: f64,
    pub avg_unique_accounts: f64,
    pub avg_influence_score: f64,
    pub avg_active_days: f64,
}

/// Compare one-time (exactly one event) against repeat (two or more)
/// referrers, with a grand-total row. Categories with no members are
/// omitted.
pub fn onetime_vs_repeat(ctx: &AnalysisContext) -> Vec<RepeatCategoryRow> {
    let metrics = ctx.referrer_metrics;
    if metrics.is_empty() {
        return Vec::new();
    }

    let onetime: Vec<&ReferrerMetrics> =
        metrics.iter().filter(|m| m.total_events < 2).collect();
    let repeat: Vec<&ReferrerMetrics> =
        metrics.iter().filter(|m| m.total_events >= 2).collect();
    let total = metrics.len() as u64;

    let mut rows = Vec::new();
    for (category, members) in [("One-time", onetime), ("Repeat", repeat)] {
        if members.is_empty() {
            continue;
        }
        rows.push(category_row(category, &members, total));
    }
    rows.push(category_row(
        "Grand Total",
        &metrics.iter().collect::<Vec<_>>(),
        total,
    ));
    rows
}

fn category_row(
    category: &'static str,
    members: &[&ReferrerMetrics],
    total: u64,
) -> RepeatCategoryRow {
    let n = members.len() as f64;
    RepeatCategoryRow {
        category,
        count: members.len() as u64,
        pct_of_total: pct(members.len() as u64, total),
        avg_unique_accounts: round1(members.iter().map(|m| m.unique_accounts as f64).sum::<f64>() / n),
        avg_influence_score: round1(members.iter().map(|m| m.influence_score).sum::<f64>() / n),
        avg_active_days: round1(members.iter().map(|m| m.active_days as f64).sum::<f64>() / n),
    }
}
