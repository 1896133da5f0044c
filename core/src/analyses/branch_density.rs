//! Branch-level influence density.
//!
//! Measures referrer quality routed through each branch, not branch
//! production volume.

use super::{pct, AnalysisContext};
use crate::classifier::ReferralType;
use crate::record::EnrichedEvent;
use crate::scoring::round1;
use crate::types::{ReferrerId, UNKNOWN};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

#[derive(Debug, Clone, Serialize)]
pub struct BranchDensityRow {
    pub branch: String,
    pub total_events: u64,
    pub unique_referrers: u64,
    pub avg_influence_score: f64,
    pub top_referrer: ReferrerId,
    pub standard_pct: f64,
}

/// Per-branch referrer quality, excluding the unknown-branch sentinel.
/// The per-row referrer score lookup fills 0 for referrers without a
/// score row (the sentinel case).
pub fn branch_density(ctx: &AnalysisContext) -> Vec<BranchDensityRow> {
    if ctx.referrer_metrics.is_empty() {
        return Vec::new();
    }

    let influence: HashMap<&ReferrerId, f64> = ctx
        .referrer_metrics
        .iter()
        .map(|m| (&m.referrer, m.influence_score))
        .collect();

    let mut groups: BTreeMap<&str, Vec<&EnrichedEvent>> = BTreeMap::new();
    for event in ctx.events {
        if event.branch_code != UNKNOWN {
            groups.entry(&event.branch_code).or_default().push(event);
        }
    }

    let mut rows: Vec<BranchDensityRow> = groups
        .into_iter()
        .map(|(branch, events)| {
            let referrers: BTreeSet<&ReferrerId> = events.iter().map(|e| &e.referrer).collect();

            let mut score_sum = 0.0;
            let mut best_score = f64::NEG_INFINITY;
            let mut top_referrer = &events[0].referrer;
            for event in &events {
                let score = influence.get(&event.referrer).copied().unwrap_or(0.0);
                score_sum += score;
                // Strict comparison: the first row attaining the maximum wins.
                if score > best_score {
                    best_score = score;
                    top_referrer = &event.referrer;
                }
            }

            let standard = events
                .iter()
                .filter(|e| e.referral_type == ReferralType::Standard)
                .count() as u64;

            BranchDensityRow {
                branch: branch.to_string(),
                total_events: events.len() as u64,
                unique_referrers: referrers.len() as u64,
                avg_influence_score: round1(score_sum / events.len() as f64),
                top_referrer: top_referrer.clone(),
                standard_pct: pct(standard, events.len() as u64),
            }
        })
        .collect();

    rows.sort_by(|a, b| b.avg_influence_score.total_cmp(&a.avg_influence_score));
    rows
}
