//! Stage 4: temporal signal extraction.
//!
//! Operates only on rows with a resolved date; rows without one keep
//! `None` in every temporal field. Within each referrer group, rows are
//! ordered by (issue date, original row index) before gap computation so
//! date ties resolve deterministically. Derived values are written back
//! to rows in their original positions; the enriched sequence itself is
//! never reordered.

use crate::config::ReferralConfig;
use crate::record::EnrichedEvent;
use crate::types::ReferrerId;
use std::collections::HashMap;

/// Compute inter-event gaps, burst flags, recency, and the
/// newly-appeared flag for every dated row.
pub fn add_temporal_signals(events: &mut [EnrichedEvent], config: &ReferralConfig) {
    let max_date = match events.iter().filter_map(|e| e.event.issue_date).max() {
        Some(date) => date,
        // No row resolves a date: every temporal field stays None.
        None => return,
    };

    let mut groups: HashMap<ReferrerId, Vec<usize>> = HashMap::new();
    for (idx, event) in events.iter().enumerate() {
        if event.event.issue_date.is_some() {
            groups.entry(event.referrer.clone()).or_default().push(idx);
        }
    }

    for indices in groups.values_mut() {
        // Indices arrive in original order; the stable sort keeps that
        // order for equal dates.
        indices.sort_by_key(|&i| events[i].event.issue_date);

        let mut newly_appeared = false;
        let mut prev_date: Option<chrono::NaiveDate> = None;
        for &i in indices.iter() {
            let Some(date) = events[i].event.issue_date else {
                continue;
            };
            if prev_date.is_none() {
                // First dated event of the group decides the flag.
                newly_appeared =
                    (max_date - date).num_days() <= config.emerging_lookback_days;
            }
            let gap = prev_date.map(|prev| (date - prev).num_days());

            events[i].gap_days = gap;
            events[i].is_burst =
                Some(matches!(gap, Some(g) if (0..=config.burst_window_days).contains(&g)));
            events[i].days_since_latest = Some((max_date - date).num_days());
            events[i].is_new_referrer = Some(newly_appeared);

            prev_date = Some(date);
        }
    }
}
