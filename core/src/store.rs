//! SQLite output store.
//!
//! RULE: Only store.rs talks to the database. The pipeline itself does
//! no I/O; the runner hands a finished PipelineResult to the store once
//! the run has completed.

use crate::error::EngineResult;
use crate::pipeline::PipelineResult;
use crate::types::RunId;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

pub struct ReferralStore {
    conn: Connection,
}

impl ReferralStore {
    pub fn open(path: &str) -> EngineResult<Self> {
        let conn = Connection::open(path)?;
        // WAL only applies to real files; :memory: ignores it.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> EngineResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply the schema.
    pub fn migrate(&self) -> EngineResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_foundation.sql"))?;
        Ok(())
    }

    pub fn insert_run(
        &self,
        run_id: &str,
        run_date: NaiveDate,
        event_count: usize,
    ) -> EngineResult<()> {
        self.conn.execute(
            "INSERT INTO runs (run_id, run_date, engine_ver, event_count)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                run_id,
                run_date.to_string(),
                env!("CARGO_PKG_VERSION"),
                event_count as i64
            ],
        )?;
        Ok(())
    }

    /// Persist all three artifacts plus the warning list in a single
    /// transaction -- the stored run is all-or-nothing, like the pipeline
    /// itself.
    pub fn save_result(&self, run_id: &RunId, result: &PipelineResult) -> EngineResult<()> {
        let tx = self.conn.unchecked_transaction()?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO referral_events (
                     run_id, account_id, certification_id, issue_date,
                     referrer, account_holder, staff, branch_code, branch_label,
                     referrer_surname, account_surname,
                     channel, referral_type, reliability,
                     gap_days, is_burst, days_since_latest, is_new_referrer,
                     network_id, network_size
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                           ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)",
            )?;
            for row in &result.enriched {
                stmt.execute(params![
                    run_id,
                    row.event.account_id,
                    row.event.certification_id,
                    row.event.issue_date.map(|d| d.to_string()),
                    row.referrer.as_str(),
                    row.account_holder,
                    row.staff.as_str(),
                    row.branch_code,
                    row.branch_label,
                    row.referrer_surname,
                    row.account_surname,
                    row.channel,
                    row.referral_type.as_str(),
                    row.reliability.as_str(),
                    row.gap_days,
                    row.is_burst,
                    row.days_since_latest,
                    row.is_new_referrer,
                    row.network_id,
                    row.network_size,
                ])?;
            }
        }

        {
            let mut stmt = tx.prepare(
                "INSERT INTO referrer_metrics (
                     run_id, referrer, total_events, unique_accounts, active_days,
                     burst_count, avg_gap_days, channels_used, branches_used,
                     first_event, last_event, network_count, max_network_size,
                     influence_score
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            )?;
            for m in &result.referrer_metrics {
                stmt.execute(params![
                    run_id,
                    m.referrer.as_str(),
                    m.total_events as i64,
                    m.unique_accounts as i64,
                    m.active_days,
                    m.burst_count as i64,
                    m.avg_gap_days,
                    m.channels_used as i64,
                    m.branches_used as i64,
                    m.first_event.map(|d| d.to_string()),
                    m.last_event.map(|d| d.to_string()),
                    m.network_count as i64,
                    m.max_network_size,
                    m.influence_score,
                ])?;
            }
        }

        {
            let mut stmt = tx.prepare(
                "INSERT INTO staff_metrics (
                     run_id, staff, events_processed, unique_referrers,
                     unique_branches, avg_referrer_score, multiplier_score
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for s in &result.staff_metrics {
                stmt.execute(params![
                    run_id,
                    s.staff.as_str(),
                    s.events_processed as i64,
                    s.unique_referrers as i64,
                    s.unique_branches as i64,
                    s.avg_referrer_score,
                    s.multiplier_score,
                ])?;
            }
        }

        {
            let mut stmt =
                tx.prepare("INSERT INTO run_warnings (run_id, warning) VALUES (?1, ?2)")?;
            for warning in &result.warnings {
                stmt.execute(params![run_id, warning.to_string()])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    pub fn event_count(&self, run_id: &str) -> EngineResult<i64> {
        self.count("referral_events", run_id)
    }

    pub fn referrer_metric_count(&self, run_id: &str) -> EngineResult<i64> {
        self.count("referrer_metrics", run_id)
    }

    pub fn staff_metric_count(&self, run_id: &str) -> EngineResult<i64> {
        self.count("staff_metrics", run_id)
    }

    pub fn warning_count(&self, run_id: &str) -> EngineResult<i64> {
        self.count("run_warnings", run_id)
    }

    /// Highest-scoring referrer of a run, for summaries.
    pub fn top_referrer(&self, run_id: &str) -> EngineResult<Option<(String, f64)>> {
        let row = self
            .conn
            .query_row(
                "SELECT referrer, influence_score FROM referrer_metrics
                 WHERE run_id = ?1
                 ORDER BY influence_score DESC, referrer ASC LIMIT 1",
                params![run_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        Ok(row)
    }

    /// Highest-multiplier staff member of a run, for summaries.
    pub fn top_staff(&self, run_id: &str) -> EngineResult<Option<(String, f64)>> {
        let row = self
            .conn
            .query_row(
                "SELECT staff, multiplier_score FROM staff_metrics
                 WHERE run_id = ?1
                 ORDER BY multiplier_score DESC, staff ASC LIMIT 1",
                params![run_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        Ok(row)
    }

    fn count(&self, table: &str, run_id: &str) -> EngineResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {table} WHERE run_id = ?1");
        let n = self.conn.query_row(&sql, params![run_id], |row| row.get(0))?;
        Ok(n)
    }
}
