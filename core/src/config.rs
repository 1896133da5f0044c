//! Pipeline configuration.
//!
//! RULES:
//!   - Weight sets are validated once, at construction time, never per row.
//!   - A config value is immutable for the duration of a run; no stage may
//!     alter weights or thresholds mid-run.
//!   - In tests, use ReferralConfig::default_test().

use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Floating tolerance for weight-sum validation.
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Component weights for the composite influence score.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub unique_accounts: f64,
    pub burst_count: f64,
    pub channels_used: f64,
    pub velocity: f64,
    pub longevity: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            unique_accounts: 0.35,
            burst_count: 0.25,
            channels_used: 0.20,
            velocity: 0.10,
            longevity: 0.10,
        }
    }
}

impl ScoringWeights {
    pub fn sum(&self) -> f64 {
        self.unique_accounts + self.burst_count + self.channels_used + self.velocity + self.longevity
    }

    pub fn validate(&self) -> EngineResult<()> {
        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(EngineError::InvalidWeights {
                name: "scoring_weights",
                sum,
            });
        }
        Ok(())
    }
}

/// Component weights for the staff multiplier score.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StaffWeights {
    pub avg_referrer_score: f64,
    pub unique_referrers: f64,
}

impl Default for StaffWeights {
    fn default() -> Self {
        Self {
            avg_referrer_score: 0.60,
            unique_referrers: 0.40,
        }
    }
}

impl StaffWeights {
    pub fn sum(&self) -> f64 {
        self.avg_referrer_score + self.unique_referrers
    }

    pub fn validate(&self) -> EngineResult<()> {
        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(EngineError::InvalidWeights {
                name: "staff_weights",
                sum,
            });
        }
        Ok(())
    }
}

/// One referral-code prefix rule. Rules are declared as an ordered list:
/// longer prefixes always win, and declaration order breaks length ties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrefixRule {
    pub prefix: String,
    pub channel: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferralConfig {
    pub scoring_weights: ScoringWeights,
    pub staff_weights: StaffWeights,
    pub burst_window_days: i64,
    pub dormancy_days: i64,
    pub high_value_min_referrals: u64,
    pub emerging_min_burst_count: u64,
    pub emerging_lookback_days: i64,
    pub top_n_referrers: usize,
    /// Raw-name to canonical-name alias table, matched case-insensitively
    /// after whitespace normalization.
    pub name_aliases: HashMap<String, String>,
    /// Optional branch-code to label table; unmapped codes fall back to
    /// the raw code.
    pub branch_mapping: Option<HashMap<String, String>>,
    pub code_prefix_map: Vec<PrefixRule>,
}

impl Default for ReferralConfig {
    fn default() -> Self {
        Self {
            scoring_weights: ScoringWeights::default(),
            staff_weights: StaffWeights::default(),
            burst_window_days: 14,
            dormancy_days: 180,
            high_value_min_referrals: 5,
            emerging_min_burst_count: 2,
            emerging_lookback_days: 180,
            top_n_referrers: 25,
            name_aliases: HashMap::new(),
            branch_mapping: None,
            code_prefix_map: vec![
                PrefixRule {
                    prefix: "150A".into(),
                    channel: "BRANCH_STANDARD".into(),
                },
                PrefixRule {
                    prefix: "120A".into(),
                    channel: "BRANCH_STANDARD".into(),
                },
                PrefixRule {
                    prefix: "080A".into(),
                    channel: "BRANCH_STANDARD".into(),
                },
                PrefixRule {
                    prefix: "PC".into(),
                    channel: "DIGITAL_PROCESS".into(),
                },
            ],
        }
    }
}

impl ReferralConfig {
    /// Load from a JSON file. Fields absent from the file keep their
    /// defaults. Fails fast on an invalid weight set, before any scoring
    /// can run.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: ReferralConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate structural invariants. Called by load() and again by the
    /// pipeline before stage 1, so programmatically built configs get the
    /// same fail-fast behavior as file-loaded ones.
    pub fn validate(&self) -> EngineResult<()> {
        self.scoring_weights.validate()?;
        self.staff_weights.validate()?;
        Ok(())
    }

    /// Config with defaults for use in unit tests.
    pub fn default_test() -> Self {
        Self::default()
    }

    /// Prefix rules in matching order: longest prefix first, declaration
    /// order on equal lengths (stable sort).
    pub fn sorted_prefix_rules(&self) -> Vec<&PrefixRule> {
        let mut rules: Vec<&PrefixRule> = self.code_prefix_map.iter().collect();
        rules.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
        rules
    }
}
