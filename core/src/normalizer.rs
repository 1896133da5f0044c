//! Stage 2: entity normalization.
//!
//! Canonicalizes referrer, account-holder, and staff names plus branch
//! identifiers, and derives surnames. Missing values map to per-role
//! sentinels so every row carries exactly one referrer identity and one
//! staff identity downstream.

use crate::classifier::{ReferralType, Reliability};
use crate::config::ReferralConfig;
use crate::record::{EnrichedEvent, ReferralEvent};
use crate::types::{ReferrerId, StaffId, UNASSIGNED, UNKNOWN};
use std::collections::HashMap;

/// Generational suffixes skipped during surname extraction.
pub const NAME_SUFFIXES: [&str; 6] = ["JR", "SR", "II", "III", "IV", "V"];

/// Normalize every entity on every row, seeding the enriched row that the
/// remaining stages fill in.
pub fn normalize_entities(events: Vec<ReferralEvent>, config: &ReferralConfig) -> Vec<EnrichedEvent> {
    // Alias matching is case-insensitive exact; uppercase both sides once.
    let aliases: HashMap<String, String> = config
        .name_aliases
        .iter()
        .map(|(raw, canonical)| (raw.to_uppercase(), canonical.to_uppercase()))
        .collect();

    events
        .into_iter()
        .map(|event| {
            let referrer = normalize_name(event.referrer_name.as_deref(), &aliases, UNKNOWN);
            let account_holder =
                normalize_name(event.account_holder_name.as_deref(), &aliases, UNKNOWN);
            let staff = normalize_name(event.staff_name.as_deref(), &aliases, UNASSIGNED);

            let branch_code = normalize_branch(event.branch_id.as_deref());
            let branch_label = config
                .branch_mapping
                .as_ref()
                .and_then(|mapping| mapping.get(&branch_code))
                .cloned()
                .unwrap_or_else(|| branch_code.clone());

            let referrer_surname = extract_surname(&referrer);
            let account_surname = extract_surname(&account_holder);

            EnrichedEvent {
                event,
                referrer: ReferrerId(referrer),
                account_holder,
                staff: StaffId(staff),
                branch_code,
                branch_label,
                referrer_surname,
                account_surname,
                channel: String::new(),
                referral_type: ReferralType::Manual,
                reliability: Reliability::Medium,
                gap_days: None,
                is_burst: None,
                days_since_latest: None,
                is_new_referrer: None,
                network_id: String::new(),
                network_size: 0,
            }
        })
        .collect()
}

/// Trim, collapse internal whitespace, uppercase, then apply the alias
/// table. Empty or missing values map to the role's sentinel.
pub fn normalize_name(raw: Option<&str>, aliases: &HashMap<String, String>, sentinel: &str) -> String {
    let trimmed = raw.map(str::trim).unwrap_or("");
    if trimmed.is_empty() {
        return sentinel.to_string();
    }
    let collapsed = trimmed
        .to_uppercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    aliases.get(&collapsed).cloned().unwrap_or(collapsed)
}

fn normalize_branch(raw: Option<&str>) -> String {
    let trimmed = raw.map(str::trim).unwrap_or("");
    if trimmed.is_empty() {
        return UNKNOWN.to_string();
    }
    trimmed.to_uppercase()
}

/// Extract the surname from a normalized name.
///
/// Single-token names (the sentinel included) use the full token. A
/// trailing generational suffix is skipped in favor of the preceding
/// token, provided at least three tokens exist.
pub fn extract_surname(name: &str) -> String {
    let parts: Vec<&str> = name.split_whitespace().collect();
    match parts.len() {
        0 => name.to_string(),
        1 => parts[0].to_string(),
        n => {
            let last = parts[n - 1];
            if n > 2 && NAME_SUFFIXES.contains(&last) {
                parts[n - 2].to_string()
            } else {
                last.to_string()
            }
        }
    }
}
