//! SQLite calibration backend

use super::record::CalibrationRecord;
use super::traits::{
    validate_scenario_name, CalibrationError, CalibrationResult, CalibrationStore, OpenStore,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// SQLite-backed calibration store
///
/// A single `calibrations` table keyed by scenario name. Thread-safe via
/// an internal mutex on the connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    fn init_schema(conn: &Connection) -> CalibrationResult<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS calibrations (
                scenario TEXT PRIMARY KEY,
                successes INTEGER NOT NULL,
                trials INTEGER NOT NULL,
                updated_at TEXT NOT NULL
            );

            PRAGMA journal_mode = WAL;
            "#,
        )?;
        Ok(())
    }

    /// Create an in-memory store (for tests)
    pub fn open_in_memory() -> CalibrationResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> CalibrationResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| CalibrationError::LockPoisoned)
    }

    /// When the record for a scenario was last written
    pub fn updated_at(&self, scenario: &str) -> CalibrationResult<Option<DateTime<Utc>>> {
        validate_scenario_name(scenario)?;
        let conn = self.conn()?;
        let stamp: Option<String> = conn
            .query_row(
                "SELECT updated_at FROM calibrations WHERE scenario = ?1",
                params![scenario],
                |row| row.get(0),
            )
            .optional()?;

        stamp
            .map(|s| {
                DateTime::parse_from_rfc3339(&s)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|e| CalibrationError::DateParse(e.to_string()))
            })
            .transpose()
    }
}

fn corrupt(scenario: &str, reason: impl Into<String>) -> CalibrationError {
    CalibrationError::CorruptRecord {
        scenario: scenario.to_string(),
        reason: reason.into(),
    }
}

fn to_sql_count(value: u64) -> CalibrationResult<i64> {
    i64::try_from(value)
        .map_err(|_| CalibrationError::InvalidRecord(format!("count {} out of range", value)))
}

impl OpenStore for SqliteStore {
    fn open(path: impl AsRef<Path>) -> CalibrationResult<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl CalibrationStore for SqliteStore {
    fn load(&self, scenario: &str) -> CalibrationResult<Option<CalibrationRecord>> {
        validate_scenario_name(scenario)?;
        let conn = self.conn()?;
        let row: Option<(i64, i64)> = conn
            .query_row(
                "SELECT successes, trials FROM calibrations WHERE scenario = ?1",
                params![scenario],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((successes, trials)) = row else {
            return Ok(None);
        };
        let successes =
            u64::try_from(successes).map_err(|_| corrupt(scenario, "negative success count"))?;
        let trials = u64::try_from(trials).map_err(|_| corrupt(scenario, "negative trial count"))?;
        CalibrationRecord::new(successes, trials)
            .map(Some)
            .map_err(|e| corrupt(scenario, e.to_string()))
    }

    fn save(&self, scenario: &str, record: &CalibrationRecord) -> CalibrationResult<()> {
        validate_scenario_name(scenario)?;
        let successes = to_sql_count(record.successes)?;
        let trials = to_sql_count(record.trials)?;
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO calibrations (scenario, successes, trials, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(scenario) DO UPDATE SET
                successes = excluded.successes,
                trials = excluded.trials,
                updated_at = excluded.updated_at
            "#,
            params![scenario, successes, trials, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn list(&self) -> CalibrationResult<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT scenario FROM calibrations ORDER BY scenario")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(names)
    }
}
