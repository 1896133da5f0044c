//! Stage 6: influence scoring and staff multiplier computation.
//!
//! RULES:
//!   - The referrer sentinel and the staff sentinel never receive a
//!     metrics row; their volume still shows up in coverage tallies.
//!   - Scores are always defined once computed -- every numeric edge case
//!     (constant component, missing gap, missing lookup) resolves to a
//!     documented fallback, never to NaN or an error.
//!   - Metric tables are sorted by entity id so identical inputs yield
//!     identical tables.

use crate::config::{ScoringWeights, StaffWeights};
use crate::record::EnrichedEvent;
use crate::types::{ReferrerId, StaffId};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Aggregated metrics for one referrer. `influence_score` is 0 until
/// compute_influence_scores runs over the whole table.
#[derive(Debug, Clone, Serialize)]
pub struct ReferrerMetrics {
    pub referrer: ReferrerId,
    pub total_events: u64,
    pub unique_accounts: u64,
    /// Days between first and last dated event, inclusive; 0 when no row
    /// resolves a date.
    pub active_days: i64,
    pub burst_count: u64,
    /// Mean inter-event gap in days; `None` for single-event referrers.
    pub avg_gap_days: Option<f64>,
    pub channels_used: u64,
    pub branches_used: u64,
    pub first_event: Option<NaiveDate>,
    pub last_event: Option<NaiveDate>,
    pub network_count: u64,
    pub max_network_size: u32,
    pub influence_score: f64,
}

/// Aggregated metrics for one staff identity.
#[derive(Debug, Clone, Serialize)]
pub struct StaffMetrics {
    pub staff: StaffId,
    pub events_processed: u64,
    pub unique_referrers: u64,
    pub unique_branches: u64,
    /// Mean influence score over the distinct referrers this staff member
    /// processed; referrers without a score row contribute 0.
    pub avg_referrer_score: f64,
    pub multiplier_score: f64,
}

/// Aggregate per-referrer metrics, excluding the referrer sentinel.
/// Returns an empty table when every row carries the sentinel.
pub fn compute_referrer_metrics(events: &[EnrichedEvent]) -> Vec<ReferrerMetrics> {
    let mut groups: BTreeMap<&ReferrerId, Vec<&EnrichedEvent>> = BTreeMap::new();
    for event in events {
        if !event.referrer.is_sentinel() {
            groups.entry(&event.referrer).or_default().push(event);
        }
    }

    groups
        .into_iter()
        .map(|(referrer, rows)| {
            let unique_accounts: BTreeSet<&str> =
                rows.iter().map(|r| r.event.account_id.as_str()).collect();
            let channels: BTreeSet<&str> = rows.iter().map(|r| r.channel.as_str()).collect();
            let branches: BTreeSet<&str> = rows.iter().map(|r| r.branch_code.as_str()).collect();
            let networks: BTreeSet<&str> = rows.iter().map(|r| r.network_id.as_str()).collect();

            let first_event = rows.iter().filter_map(|r| r.event.issue_date).min();
            let last_event = rows.iter().filter_map(|r| r.event.issue_date).max();
            let active_days = match (first_event, last_event) {
                (Some(first), Some(last)) => (last - first).num_days() + 1,
                _ => 0,
            };

            let gaps: Vec<i64> = rows.iter().filter_map(|r| r.gap_days).collect();
            let avg_gap_days = if gaps.is_empty() {
                None
            } else {
                Some(gaps.iter().sum::<i64>() as f64 / gaps.len() as f64)
            };

            ReferrerMetrics {
                referrer: referrer.clone(),
                total_events: rows.len() as u64,
                unique_accounts: unique_accounts.len() as u64,
                active_days,
                burst_count: rows.iter().filter(|r| r.is_burst == Some(true)).count() as u64,
                avg_gap_days,
                channels_used: channels.len() as u64,
                branches_used: branches.len() as u64,
                first_event,
                last_event,
                network_count: networks.len() as u64,
                max_network_size: rows.iter().map(|r| r.network_size).max().unwrap_or(0),
                influence_score: 0.0,
            }
        })
        .collect()
}

/// Compute the weighted composite influence score over the whole metrics
/// table, in place.
///
/// Each component is min-max normalized across all referrers (constant
/// components normalize to 0.5 everywhere), combined by the configured
/// weights, and the composite is min-max normalized again, scaled to
/// [0, 100], and rounded to one decimal place. The velocity component is
/// the reciprocal of (mean gap + 1), with a missing mean gap treated as
/// 0 -- a single-event referrer contributes maximal velocity.
pub fn compute_influence_scores(metrics: &mut [ReferrerMetrics], weights: &ScoringWeights) {
    if metrics.is_empty() {
        return;
    }

    log::info!(
        "Scoring weights: accounts={:.2} burst={:.2} channels={:.2} velocity={:.2} longevity={:.2}",
        weights.unique_accounts,
        weights.burst_count,
        weights.channels_used,
        weights.velocity,
        weights.longevity,
    );

    let accounts = safe_minmax(&collect(metrics, |m| m.unique_accounts as f64));
    let bursts = safe_minmax(&collect(metrics, |m| m.burst_count as f64));
    let channels = safe_minmax(&collect(metrics, |m| m.channels_used as f64));
    let velocity = safe_minmax(&collect(metrics, |m| {
        1.0 / (m.avg_gap_days.unwrap_or(0.0) + 1.0)
    }));
    let longevity = safe_minmax(&collect(metrics, |m| m.active_days as f64));

    let composite: Vec<f64> = (0..metrics.len())
        .map(|i| {
            weights.unique_accounts * accounts[i]
                + weights.burst_count * bursts[i]
                + weights.channels_used * channels[i]
                + weights.velocity * velocity[i]
                + weights.longevity * longevity[i]
        })
        .collect();

    for (metric, score) in metrics.iter_mut().zip(safe_minmax(&composite)) {
        metric.influence_score = round1(score * 100.0);
    }
}

/// Aggregate per-staff metrics and compute multiplier scores, excluding
/// the staff sentinel. Returns an empty table when no staff is assigned
/// anywhere or when no referrer was scored.
pub fn compute_staff_multipliers(
    events: &[EnrichedEvent],
    referrer_metrics: &[ReferrerMetrics],
    weights: &StaffWeights,
) -> Vec<StaffMetrics> {
    if referrer_metrics.is_empty() {
        return Vec::new();
    }

    let influence: HashMap<&ReferrerId, f64> = referrer_metrics
        .iter()
        .map(|m| (&m.referrer, m.influence_score))
        .collect();

    let mut groups: BTreeMap<&StaffId, Vec<&EnrichedEvent>> = BTreeMap::new();
    for event in events {
        if !event.staff.is_sentinel() {
            groups.entry(&event.staff).or_default().push(event);
        }
    }

    let mut staff: Vec<StaffMetrics> = groups
        .into_iter()
        .map(|(id, rows)| {
            // Distinct referrers handled, sentinel included: a sentinel
            // referrer has no score row and contributes 0 to the mean
            // through the fill-on-missing lookup.
            let referrers: BTreeSet<&ReferrerId> = rows.iter().map(|r| &r.referrer).collect();
            let branches: BTreeSet<&str> = rows.iter().map(|r| r.branch_code.as_str()).collect();

            let score_sum: f64 = referrers
                .iter()
                .map(|r| influence.get(*r).copied().unwrap_or(0.0))
                .sum();
            let avg_referrer_score = score_sum / referrers.len() as f64;

            StaffMetrics {
                staff: id.clone(),
                events_processed: rows.len() as u64,
                unique_referrers: referrers.len() as u64,
                unique_branches: branches.len() as u64,
                avg_referrer_score,
                multiplier_score: 0.0,
            }
        })
        .collect();

    if staff.is_empty() {
        return staff;
    }

    let quality = safe_minmax(&staff.iter().map(|s| s.avg_referrer_score).collect::<Vec<_>>());
    let reach = safe_minmax(
        &staff
            .iter()
            .map(|s| s.unique_referrers as f64)
            .collect::<Vec<_>>(),
    );

    for (i, member) in staff.iter_mut().enumerate() {
        let combined = weights.avg_referrer_score * quality[i] + weights.unique_referrers * reach[i];
        member.multiplier_score = round1(combined * 100.0);
    }

    staff
}

fn collect(metrics: &[ReferrerMetrics], f: impl Fn(&ReferrerMetrics) -> f64) -> Vec<f64> {
    metrics.iter().map(f).collect()
}

/// Min-max normalize to [0, 1]. A constant input (max equals min, the
/// single-element case included) yields 0.5 for every element rather
/// than 0, so a degenerate component can't zero the composite.
pub(crate) fn safe_minmax(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max - min == 0.0 {
        return vec![0.5; values.len()];
    }
    values.iter().map(|v| (v - min) / (max - min)).collect()
}

/// Round to one decimal place.
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
