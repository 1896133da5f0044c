//! Deterministic sample-data generation for demos and smoke runs.
//!
//! RULE: Same seed, same events. All randomness flows through a single
//! PCG stream seeded from the --seed argument; nothing here touches a
//! platform RNG.

use chrono::NaiveDate;
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;
use referral_core::record::RawEvent;

const REFERRERS: [&str; 8] = [
    "JOHN SMITH",
    "JANE DOE",
    "BOB WILSON",
    "ALICE BROWN",
    "TOM JONES",
    "MARY CLARK",
    "DAVID HALL",
    "SARAH KING",
];

/// Weights biased toward repeat referrers so bursts and networks show up
/// in small samples.
const REFERRER_WEIGHTS: [f64; 8] = [0.25, 0.20, 0.15, 0.10, 0.10, 0.08, 0.07, 0.05];

const STAFF: [&str; 3] = ["SARAH MANAGER", "MIKE HANDLER", "LISA PROCESSOR"];

const BRANCHES: [&str; 3] = ["001", "002", "003"];

const HOLDER_FIRST: [&str; 8] = [
    "EMMA", "LIAM", "OLIVIA", "NOAH", "AVA", "LUCAS", "MIA", "ETHAN",
];

const HOLDER_LAST: [&str; 6] = ["SMITH", "JONES", "GARCIA", "CHEN", "PATEL", "NGUYEN"];

/// Mixed code pool: branch prefixes, digital, blanks, an email tag, and
/// one unknown so every channel appears.
const CODES: [Option<&str>; 8] = [
    Some("150A001"),
    Some("120A002"),
    Some("PC100"),
    None,
    Some("EMAIL_Q1"),
    Some("080A003"),
    None,
    Some("UNKNOWN_XYZ"),
];

/// Generate `count` raw events: weekly dates from a fixed start, weighted
/// referrer pool, and holder names drawn from small curated lists so
/// surname-sharing households emerge.
pub fn generate_events(count: usize, seed: u64) -> Vec<RawEvent> {
    let mut rng = Pcg64Mcg::seed_from_u64(seed);
    let start = NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid start date");

    (0..count)
        .map(|i| {
            let referrer = weighted_choice(&mut rng, &REFERRERS, &REFERRER_WEIGHTS);
            let holder = format!(
                "{} {}",
                HOLDER_FIRST[below(&mut rng, HOLDER_FIRST.len())],
                HOLDER_LAST[below(&mut rng, HOLDER_LAST.len())],
            );
            let date = start + chrono::Duration::days(7 * i as i64);

            RawEvent {
                referrer_name: Some(referrer.to_string()),
                issue_date: Some(date.to_string()),
                referral_code: CODES[below(&mut rng, CODES.len())].map(str::to_string),
                staff_name: Some(STAFF[below(&mut rng, STAFF.len())].to_string()),
                branch_id: Some(BRANCHES[below(&mut rng, BRANCHES.len())].to_string()),
                account_holder_name: Some(holder),
                account_id: Some(format!("HASH_{i:04}")),
                certification_id: Some(format!("CERT_{i:04}")),
            }
        })
        .collect()
}

fn below(rng: &mut Pcg64Mcg, n: usize) -> usize {
    (rng.next_u64() % n as u64) as usize
}

fn next_f64(rng: &mut Pcg64Mcg) -> f64 {
    (rng.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
}

fn weighted_choice<'a>(rng: &mut Pcg64Mcg, values: &[&'a str], weights: &[f64]) -> &'a str {
    let roll = next_f64(rng);
    let mut cumulative = 0.0;
    for (value, weight) in values.iter().zip(weights) {
        cumulative += weight;
        if roll < cumulative {
            return value;
        }
    }
    values[values.len() - 1]
}
