//! Headline KPIs across all pipeline layers.

use super::{pct, AnalysisContext};
use crate::classifier::ReferralType;
use crate::scoring::round1;
use crate::types::{ReferrerId, StaffId};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Serialize)]
pub struct OverviewKpis {
    pub total_events: u64,
    pub unique_referrers: u64,
    pub unique_accounts: u64,
    pub repeat_referrer_pct: f64,
    pub avg_events_per_referrer: f64,
    pub top_referrer_score: f64,
    pub median_influence_score: f64,
    /// Mean inter-event gap across all rows with one; `None` when no row
    /// carries a gap.
    pub avg_gap_days: Option<f64>,
    pub burst_pct: f64,
    pub top_staff: Option<StaffId>,
    pub most_active_branch: Option<String>,
    pub dominant_channel: Option<String>,
    pub manual_pct: f64,
    pub exception_pct: f64,
    /// Mean of each referrer's largest network, sentinel included;
    /// `None` on an empty event set.
    pub avg_network_size: Option<f64>,
}

pub fn overview(ctx: &AnalysisContext) -> OverviewKpis {
    let events = ctx.events;
    let metrics = ctx.referrer_metrics;
    let total = events.len() as u64;

    let unique_accounts: BTreeSet<&str> =
        events.iter().map(|e| e.event.account_id.as_str()).collect();

    let (repeat_pct, avg_events, top_score, median_score) = if metrics.is_empty() {
        (0.0, 0.0, 0.0, 0.0)
    } else {
        let repeat = metrics.iter().filter(|m| m.total_events >= 2).count() as u64;
        let mut scores: Vec<f64> = metrics.iter().map(|m| m.influence_score).collect();
        scores.sort_by(f64::total_cmp);
        (
            pct(repeat, metrics.len() as u64),
            round1(
                metrics.iter().map(|m| m.total_events as f64).sum::<f64>() / metrics.len() as f64,
            ),
            scores[scores.len() - 1],
            round1(median(&scores)),
        )
    };

    let gaps: Vec<i64> = events.iter().filter_map(|e| e.gap_days).collect();
    let avg_gap_days = if gaps.is_empty() {
        None
    } else {
        Some(round1(gaps.iter().sum::<i64>() as f64 / gaps.len() as f64))
    };

    let bursts = events.iter().filter(|e| e.is_burst == Some(true)).count() as u64;

    let top_staff = ctx
        .staff_metrics
        .iter()
        .reduce(|best, s| {
            if s.multiplier_score > best.multiplier_score {
                s
            } else {
                best
            }
        })
        .map(|s| s.staff.clone());

    let manual = events
        .iter()
        .filter(|e| e.referral_type == ReferralType::Manual)
        .count() as u64;
    let exception = events
        .iter()
        .filter(|e| e.referral_type == ReferralType::Exception)
        .count() as u64;

    // Mean over referrers (sentinel included) of their largest network.
    let mut max_networks: BTreeMap<&ReferrerId, u32> = BTreeMap::new();
    for event in events {
        let entry = max_networks.entry(&event.referrer).or_default();
        *entry = (*entry).max(event.network_size);
    }
    let avg_network_size = if max_networks.is_empty() {
        None
    } else {
        Some(round1(
            max_networks.values().map(|&v| v as f64).sum::<f64>() / max_networks.len() as f64,
        ))
    };

    OverviewKpis {
        total_events: total,
        unique_referrers: metrics.len() as u64,
        unique_accounts: unique_accounts.len() as u64,
        repeat_referrer_pct: repeat_pct,
        avg_events_per_referrer: avg_events,
        top_referrer_score: top_score,
        median_influence_score: median_score,
        avg_gap_days,
        burst_pct: pct(bursts, total),
        top_staff,
        most_active_branch: most_frequent(events.iter().map(|e| e.branch_code.as_str())),
        dominant_channel: most_frequent(events.iter().map(|e| e.channel.as_str())),
        manual_pct: pct(manual, total),
        exception_pct: pct(exception, total),
        avg_network_size,
    }
}

/// Median of an ascending-sorted, non-empty slice.
fn median(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Most frequent value; ties resolve to the lexicographically smallest
/// so the result is independent of input order.
fn most_frequent<'a>(values: impl Iterator<Item = &'a str>) -> Option<String> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }
    let mut best: Option<(&str, u64)> = None;
    for (value, count) in counts {
        if best.is_none_or(|(_, n)| count > n) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value.to_string())
}
