//! Referral code health -- distribution by channel, type, reliability.

use super::{pct, AnalysisContext};
use crate::classifier::{ReferralType, Reliability};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
pub struct CodeMixRow {
    pub channel: String,
    pub referral_type: ReferralType,
    pub reliability: Reliability,
    pub count: u64,
    pub pct_of_total: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CodeHealthReport {
    pub rows: Vec<CodeMixRow>,
    /// Share of events whose reliability tier is not Low.
    pub known_code_pct: f64,
}

/// Distribution of events over (channel, type, reliability), sorted by
/// count descending with channel name breaking ties.
pub fn code_health(ctx: &AnalysisContext) -> CodeHealthReport {
    let mut counts: BTreeMap<(&str, ReferralType, Reliability), u64> = BTreeMap::new();
    for event in ctx.events {
        *counts
            .entry((&event.channel, event.referral_type, event.reliability))
            .or_default() += 1;
    }

    let total = ctx.events.len() as u64;
    let known = ctx
        .events
        .iter()
        .filter(|e| e.reliability != Reliability::Low)
        .count() as u64;

    let mut rows: Vec<CodeMixRow> = counts
        .into_iter()
        .map(|((channel, referral_type, reliability), count)| CodeMixRow {
            channel: channel.to_string(),
            referral_type,
            reliability,
            count,
            pct_of_total: pct(count, total),
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.channel.cmp(&b.channel)));

    CodeHealthReport {
        rows,
        known_code_pct: pct(known, total),
    }
}
