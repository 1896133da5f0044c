//! Shared identity types used across every pipeline stage.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The canonical run identifier.
pub type RunId = String;

/// Sentinel identity substituted for a missing referrer or account holder.
pub const UNKNOWN: &str = "UNKNOWN";

/// Sentinel identity substituted for a missing staff assignment.
pub const UNASSIGNED: &str = "UNASSIGNED";

/// Canonical referrer identity produced by the normalizer.
///
/// This is the join key for the temporal, network, and scoring stages.
/// It is computed exactly once and threaded through every stage so the
/// normalization rules are applied in a single place.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferrerId(pub String);

impl ReferrerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the null-referrer sentinel. Sentinel rows are counted in
    /// coverage tallies but excluded from ranked scoring.
    pub fn is_sentinel(&self) -> bool {
        self.0 == UNKNOWN
    }
}

impl fmt::Display for ReferrerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonical staff identity produced by the normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaffId(pub String);

impl StaffId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the unassigned-staff sentinel.
    pub fn is_sentinel(&self) -> bool {
        self.0 == UNASSIGNED
    }
}

impl fmt::Display for StaffId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
