//! referral-runner: headless pipeline runner for the referral
//! intelligence engine.
//!
//! Usage:
//!   referral-runner --data events.json --config config.json --db out.db
//!   referral-runner --sample 200 --seed 42 --db out.db

mod sample;

use anyhow::Result;
use referral_core::{
    config::ReferralConfig, pipeline::run_pipeline, record::RawEvent, store::ReferralStore,
};
use std::env;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let config = match str_arg(&args, "--config") {
        Some(path) => ReferralConfig::load(path)?,
        None => ReferralConfig::default(),
    };

    let raw: Vec<RawEvent> = match str_arg(&args, "--data") {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
            serde_json::from_str(&content)?
        }
        None => {
            let count = parse_arg(&args, "--sample", 50usize);
            let seed = parse_arg(&args, "--seed", 42u64);
            println!("No --data file given; generating {count} sample events (seed {seed})");
            sample::generate_events(count, seed)
        }
    };

    let run_date = chrono::Local::now().date_naive();
    let result = run_pipeline(raw, &config, run_date)?;

    let store = match str_arg(&args, "--db") {
        Some(path) => ReferralStore::open(path)?,
        None => ReferralStore::in_memory()?,
    };
    store.migrate()?;

    let run_id = uuid::Uuid::new_v4().to_string();
    store.insert_run(&run_id, run_date, result.enriched.len())?;
    store.save_result(&run_id, &result)?;

    print_summary(&store, &run_id, &result)?;
    Ok(())
}

fn print_summary(
    store: &ReferralStore,
    run_id: &str,
    result: &referral_core::pipeline::PipelineResult,
) -> Result<()> {
    println!("=== RUN SUMMARY ===");
    println!("  run_id:        {run_id}");
    println!("  events:        {}", result.enriched.len());
    println!("  referrers:     {}", result.referrer_metrics.len());
    println!("  staff:         {}", result.staff_metrics.len());
    println!("  warnings:      {}", result.warnings.len());

    if let Some((referrer, score)) = store.top_referrer(run_id)? {
        println!("  top referrer:  {referrer} (influence {score:.1})");
    }
    if let Some((staff, score)) = store.top_staff(run_id)? {
        println!("  top staff:     {staff} (multiplier {score:.1})");
    }

    for warning in &result.warnings {
        println!("  warning: {warning}");
    }
    Ok(())
}

fn str_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr>(args: &[String], flag: &str, default: T) -> T {
    str_arg(args, flag)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
