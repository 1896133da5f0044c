//! Stage 1: record validation against the required-field contract.
//!
//! RULES:
//!   - A row without an account id is dropped, never silently repaired.
//!   - An input where no row carries an account id is fatal.
//!   - Every other defect is a warning: the row is kept and the affected
//!     field is left undefined.
//!   - Warnings are collected and returned alongside the validated set so
//!     operators can audit data quality without losing the run.

use crate::error::{EngineError, EngineResult};
use crate::record::{RawEvent, ReferralEvent};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Accepted issue-date formats, tried in order.
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// One aggregate data-quality warning. Each variant carries the number of
/// affected rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValidationWarning {
    /// Rows dropped for lack of an account id.
    MissingAccountId { rows: usize },
    /// Rows kept without a certification id. Never affects scoring.
    MissingCertificationId { rows: usize },
    /// Rows whose issue date was missing or failed to parse; they are
    /// excluded from temporal analysis, not dropped.
    UnresolvedDate { rows: usize },
    /// Rows dated after the run date. Kept as-is.
    FutureDate { rows: usize },
    /// Rows sharing an (account id, certification id) pair. Duplicates
    /// are legitimate distinct events and are kept.
    DuplicateKeyPair { rows: usize },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingAccountId { rows } => {
                write!(f, "dropped {rows} rows with no account id")
            }
            Self::MissingCertificationId { rows } => {
                write!(f, "{rows} rows have no certification id")
            }
            Self::UnresolvedDate { rows } => write!(
                f,
                "{rows} rows have an unresolved issue date (excluded from temporal analysis)"
            ),
            Self::FutureDate { rows } => write!(f, "{rows} rows have a future issue date"),
            Self::DuplicateKeyPair { rows } => write!(
                f,
                "{rows} rows share a duplicate account id + certification id pair"
            ),
        }
    }
}

/// Validate the raw event set.
///
/// `run_date` is the date the pipeline runs on; it only feeds the
/// future-date warning, never a metric, so metric tables stay identical
/// across runs on the same input.
///
/// Returns the validated events (input order preserved) plus all
/// collected warnings, or `EngineError::NoUsableKey` when no row carries
/// an account id.
pub fn validate_records(
    raw: Vec<RawEvent>,
    run_date: NaiveDate,
) -> EngineResult<(Vec<ReferralEvent>, Vec<ValidationWarning>)> {
    let mut events = Vec::with_capacity(raw.len());
    let mut dropped = 0usize;
    let mut missing_cert = 0usize;
    let mut unresolved_dates = 0usize;
    let mut future_dates = 0usize;

    for row in raw {
        let account_id = match non_blank(row.account_id) {
            Some(id) => id,
            None => {
                dropped += 1;
                continue;
            }
        };

        let issue_date = row.issue_date.as_deref().and_then(parse_date);
        if issue_date.is_none() {
            unresolved_dates += 1;
        }
        if issue_date.is_some_and(|d| d > run_date) {
            future_dates += 1;
        }

        let certification_id = non_blank(row.certification_id);
        if certification_id.is_none() {
            missing_cert += 1;
        }

        events.push(ReferralEvent {
            account_id,
            issue_date,
            issue_date_raw: row.issue_date,
            referrer_name: row.referrer_name,
            referral_code: row.referral_code,
            staff_name: row.staff_name,
            branch_id: row.branch_id,
            account_holder_name: row.account_holder_name,
            certification_id,
        });
    }

    if events.is_empty() {
        return Err(EngineError::NoUsableKey);
    }

    let mut warnings = Vec::new();
    if dropped > 0 {
        warnings.push(ValidationWarning::MissingAccountId { rows: dropped });
    }
    if missing_cert > 0 {
        warnings.push(ValidationWarning::MissingCertificationId { rows: missing_cert });
    }
    if unresolved_dates > 0 {
        warnings.push(ValidationWarning::UnresolvedDate {
            rows: unresolved_dates,
        });
    }
    if future_dates > 0 {
        warnings.push(ValidationWarning::FutureDate { rows: future_dates });
    }

    let duplicate_rows = count_duplicate_pairs(&events);
    if duplicate_rows > 0 {
        warnings.push(ValidationWarning::DuplicateKeyPair {
            rows: duplicate_rows,
        });
    }

    for warning in &warnings {
        log::warn!("{warning}");
    }

    Ok((events, warnings))
}

/// Count every row that shares its (account id, certification id) pair
/// with at least one other row.
fn count_duplicate_pairs(events: &[ReferralEvent]) -> usize {
    let mut pair_counts: HashMap<(&str, Option<&str>), usize> = HashMap::new();
    for event in events {
        *pair_counts
            .entry((&event.account_id, event.certification_id.as_deref()))
            .or_default() += 1;
    }
    pair_counts.values().filter(|&&n| n > 1).sum()
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
