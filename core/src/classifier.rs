//! Stage 3: referral code classification.
//!
//! Classification is ordered and first-match-wins:
//!   1. missing, blank, or a case-insensitive "none" literal -> MANUAL
//!   2. longest configured prefix match (declaration order on ties)
//!   3. case-insensitive "EMAIL" substring -> EMAIL
//!   4. otherwise OTHER
//!
//! The classifier is pure: for a fixed rule list the result depends only
//! on the code string, never on map iteration order.

use crate::config::{PrefixRule, ReferralConfig};
use crate::record::EnrichedEvent;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const CHANNEL_MANUAL: &str = "MANUAL";
pub const CHANNEL_EMAIL: &str = "EMAIL";
pub const CHANNEL_OTHER: &str = "OTHER";

/// Coarse referral type derived from the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ReferralType {
    Standard,
    Manual,
    Exception,
}

impl ReferralType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::Manual => "Manual",
            Self::Exception => "Exception",
        }
    }

    /// Fixed type-to-reliability lookup.
    pub fn reliability(&self) -> Reliability {
        match self {
            Self::Standard => Reliability::High,
            Self::Manual => Reliability::Medium,
            Self::Exception => Reliability::Low,
        }
    }
}

impl fmt::Display for ReferralType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reliability tier of a referral code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Reliability {
    High,
    Medium,
    Low,
}

impl Reliability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl fmt::Display for Reliability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify every row's referral code into channel, type, and
/// reliability.
pub fn decode_referral_codes(events: &mut [EnrichedEvent], config: &ReferralConfig) {
    let rules = config.sorted_prefix_rules();
    for event in events {
        let channel = classify_channel(event.event.referral_code.as_deref(), &rules);
        event.referral_type = channel_type(&channel);
        event.reliability = event.referral_type.reliability();
        event.channel = channel;
    }
}

/// Classify a single referral code into a channel. `rules` must already
/// be in matching order (see ReferralConfig::sorted_prefix_rules).
pub fn classify_channel(code: Option<&str>, rules: &[&PrefixRule]) -> String {
    let raw = code.map(str::trim).unwrap_or("");
    if raw.is_empty() || raw.eq_ignore_ascii_case("none") {
        return CHANNEL_MANUAL.to_string();
    }
    let upper = raw.to_uppercase();
    for rule in rules {
        if upper.starts_with(&rule.prefix.to_uppercase()) {
            return rule.channel.clone();
        }
    }
    if upper.contains(CHANNEL_EMAIL) {
        return CHANNEL_EMAIL.to_string();
    }
    CHANNEL_OTHER.to_string()
}

/// Map a channel to its coarse type. Known standard channels map to
/// Standard; any channel outside the fixed lookup (custom configured
/// channels included) is an Exception.
pub fn channel_type(channel: &str) -> ReferralType {
    match channel {
        "BRANCH_STANDARD" | "DIGITAL_PROCESS" | CHANNEL_EMAIL => ReferralType::Standard,
        CHANNEL_MANUAL => ReferralType::Manual,
        _ => ReferralType::Exception,
    }
}
