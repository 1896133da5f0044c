//! Shared builders for the integration tests.

#![allow(dead_code)]

use chrono::NaiveDate;
use referral_core::classifier::decode_referral_codes;
use referral_core::config::ReferralConfig;
use referral_core::network::infer_networks;
use referral_core::normalizer::normalize_entities;
use referral_core::record::{EnrichedEvent, RawEvent};
use referral_core::temporal::add_temporal_signals;
use referral_core::validator::validate_records;

/// Run date used by every test: later than all sample dates so nothing
/// is flagged as future unless a test wants it to be.
pub fn run_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Fully populated raw event; tweak individual fields on the returned
/// value where a test needs a defect.
pub fn raw_event(referrer: &str, issue_date: &str, account_id: &str) -> RawEvent {
    RawEvent {
        referrer_name: Some(referrer.to_string()),
        issue_date: Some(issue_date.to_string()),
        referral_code: Some("150A001".to_string()),
        staff_name: Some("SARAH MANAGER".to_string()),
        branch_id: Some("001".to_string()),
        account_holder_name: Some("EMMA JONES".to_string()),
        account_id: Some(account_id.to_string()),
        certification_id: Some(format!("CERT-{account_id}")),
    }
}

/// Run stages 1-5 (everything before scoring) with the given config.
pub fn enrich_with(raw: Vec<RawEvent>, config: &ReferralConfig) -> Vec<EnrichedEvent> {
    let (validated, _warnings) = validate_records(raw, run_date()).unwrap();
    let mut events = normalize_entities(validated, config);
    decode_referral_codes(&mut events, config);
    add_temporal_signals(&mut events, config);
    infer_networks(&mut events);
    events
}

/// Run stages 1-5 with the default test config.
pub fn enrich(raw: Vec<RawEvent>) -> Vec<EnrichedEvent> {
    enrich_with(raw, &ReferralConfig::default_test())
}
