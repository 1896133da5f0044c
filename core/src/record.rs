//! The input contract and the enriched row.
//!
//! RULE: Raw field values are retained unmodified for audit. Every stage
//! appends derived fields; none rewrites an earlier stage's output.

use crate::classifier::{ReferralType, Reliability};
use crate::types::{ReferrerId, StaffId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One raw referral-tracking row, as handed over by the record-loading
/// collaborator. All eight fields are optional at this point; validation
/// decides which absences are fatal. Unknown extra fields are ignored and
/// common column-name variants are resolved through serde aliases.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawEvent {
    #[serde(default, alias = "referrer")]
    pub referrer_name: Option<String>,
    #[serde(default, alias = "date")]
    pub issue_date: Option<String>,
    #[serde(default, alias = "code")]
    pub referral_code: Option<String>,
    #[serde(default, alias = "staff", alias = "purchase_manager")]
    pub staff_name: Option<String>,
    #[serde(default, alias = "branch")]
    pub branch_id: Option<String>,
    #[serde(default, alias = "account_holder", alias = "new_account")]
    pub account_holder_name: Option<String>,
    #[serde(default, alias = "mrdb_account_hash", alias = "account_hash")]
    pub account_id: Option<String>,
    #[serde(default, alias = "cert_id", alias = "certificate_id")]
    pub certification_id: Option<String>,
}

/// A validated event. The account id is guaranteed present; the issue
/// date is `None` when the raw value was missing or failed to parse.
/// The raw date string is kept alongside the parsed value.
#[derive(Debug, Clone, Serialize)]
pub struct ReferralEvent {
    pub account_id: String,
    pub issue_date: Option<NaiveDate>,
    pub issue_date_raw: Option<String>,
    pub referrer_name: Option<String>,
    pub referral_code: Option<String>,
    pub staff_name: Option<String>,
    pub branch_id: Option<String>,
    pub account_holder_name: Option<String>,
    pub certification_id: Option<String>,
}

/// A validated event plus every derived column.
///
/// Stage ownership of the derived fields:
///   - normalizer:  referrer, account_holder, staff, branch_code,
///                  branch_label, referrer_surname, account_surname
///   - classifier:  channel, referral_type, reliability
///   - temporal:    gap_days, is_burst, days_since_latest, is_new_referrer
///                  (all `None` on rows without a resolved date)
///   - network:     network_id, network_size
///
/// The pipeline runs the stages in that order; each fills only its own
/// fields.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedEvent {
    pub event: ReferralEvent,

    pub referrer: ReferrerId,
    pub account_holder: String,
    pub staff: StaffId,
    pub branch_code: String,
    pub branch_label: String,
    pub referrer_surname: String,
    pub account_surname: String,

    pub channel: String,
    pub referral_type: ReferralType,
    pub reliability: Reliability,

    pub gap_days: Option<i64>,
    pub is_burst: Option<bool>,
    pub days_since_latest: Option<i64>,
    pub is_new_referrer: Option<bool>,

    pub network_id: String,
    pub network_size: u32,
}
