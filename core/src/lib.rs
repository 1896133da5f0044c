//! referral-core — the referral intelligence engine.
//!
//! A deterministic, single-pass batch transform over raw referral-tracking
//! records. Six stages run in fixed order (validation, normalization, code
//! classification, temporal signals, network inference, scoring) and
//! produce an enriched event sequence plus per-referrer and per-staff
//! metric tables, followed by the derived analysis tables.
//!
//! The engine does no I/O inside the stages and holds no state between
//! runs; loading records and persisting outputs belong to the caller (see
//! `store` for the SQLite sink the runner uses).

pub mod analyses;
pub mod classifier;
pub mod config;
pub mod error;
pub mod network;
pub mod normalizer;
pub mod pipeline;
pub mod record;
pub mod scoring;
pub mod store;
pub mod temporal;
pub mod types;
pub mod validator;
