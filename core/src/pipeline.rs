//! The pipeline orchestrator.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Record validation
//!   2. Entity normalization
//!   3. Code classification
//!   4. Temporal signals
//!   5. Network inference
//!   6. Influence scoring + staff multipliers
//!   7. Analysis tables
//!
//! RULES:
//!   - Each stage consumes the previous stage's output and appends
//!     derived fields; earlier semantics are never mutated.
//!   - The configuration is immutable for the duration of a run.
//!   - All three artifacts are produced together or not at all; there is
//!     no partial-success state.

use crate::analyses::{self, AnalysisBundle, AnalysisContext};
use crate::classifier::decode_referral_codes;
use crate::config::ReferralConfig;
use crate::error::EngineResult;
use crate::network::infer_networks;
use crate::normalizer::normalize_entities;
use crate::record::{EnrichedEvent, RawEvent};
use crate::scoring::{
    compute_influence_scores, compute_referrer_metrics, compute_staff_multipliers,
    ReferrerMetrics, StaffMetrics,
};
use crate::temporal::add_temporal_signals;
use crate::validator::{validate_records, ValidationWarning};
use chrono::NaiveDate;

/// Everything one pipeline run produces.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub enriched: Vec<EnrichedEvent>,
    pub referrer_metrics: Vec<ReferrerMetrics>,
    pub staff_metrics: Vec<StaffMetrics>,
    pub analyses: AnalysisBundle,
    pub warnings: Vec<ValidationWarning>,
}

/// Execute the full pipeline over a raw event set.
///
/// `run_date` feeds only the future-date warning; metric tables depend
/// solely on the input and the configuration, so two runs over identical
/// inputs produce identical tables.
pub fn run_pipeline(
    raw: Vec<RawEvent>,
    config: &ReferralConfig,
    run_date: NaiveDate,
) -> EngineResult<PipelineResult> {
    // Weight sets fail here, before any stage runs.
    config.validate()?;

    log::info!("[1/7] Validating {} raw records...", raw.len());
    let (validated, warnings) = validate_records(raw, run_date)?;
    log::info!(
        "Validated {} records ({} warnings)",
        validated.len(),
        warnings.len()
    );

    log::info!("[2/7] Normalizing entities...");
    let mut events = normalize_entities(validated, config);

    log::info!("[3/7] Classifying referral codes...");
    decode_referral_codes(&mut events, config);

    log::info!("[4/7] Computing temporal signals...");
    add_temporal_signals(&mut events, config);

    log::info!("[5/7] Inferring referral networks...");
    infer_networks(&mut events);

    log::info!("[6/7] Computing influence scores...");
    let mut referrer_metrics = compute_referrer_metrics(&events);
    compute_influence_scores(&mut referrer_metrics, &config.scoring_weights);
    let staff_metrics = compute_staff_multipliers(&events, &referrer_metrics, &config.staff_weights);
    log::info!(
        "Scored {} referrers, {} staff members",
        referrer_metrics.len(),
        staff_metrics.len()
    );

    log::info!("[7/7] Running analyses...");
    let bundle = analyses::run_all(&AnalysisContext {
        events: &events,
        referrer_metrics: &referrer_metrics,
        staff_metrics: &staff_metrics,
        config,
    });

    Ok(PipelineResult {
        enriched: events,
        referrer_metrics,
        staff_metrics,
        analyses: bundle,
        warnings,
    })
}
