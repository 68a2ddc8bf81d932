//! SQLite prediction store

use std::fs;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::logic::features::round2;
use crate::logic::model::{PerformanceCategory, PredictionResult};
use super::types::{HistoryError, PerformanceSummary, StoredPrediction};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS predictions (
        prediction_id     INTEGER PRIMARY KEY AUTOINCREMENT,
        student_id        INTEGER NOT NULL,
        semester          INTEGER NOT NULL,
        prediction_result TEXT    NOT NULL,
        prediction_score  REAL    NOT NULL,
        method            TEXT    NOT NULL,
        generated_at      TEXT    NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_predictions_student
        ON predictions (student_id, semester);
";

const SELECT_COLUMNS: &str =
    "prediction_id, student_id, semester, prediction_result, prediction_score, method, generated_at";

/// Raw row before category/method/timestamp parsing
struct RawPrediction {
    prediction_id: i64,
    student_id: i64,
    semester: u32,
    category: String,
    score: f64,
    method: String,
    generated_at: String,
}

impl RawPrediction {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            prediction_id: row.get(0)?,
            student_id: row.get(1)?,
            semester: row.get(2)?,
            category: row.get(3)?,
            score: row.get(4)?,
            method: row.get(5)?,
            generated_at: row.get(6)?,
        })
    }

    fn parse(self) -> Result<StoredPrediction, HistoryError> {
        let corrupt = |reason: String| HistoryError::Corrupt {
            prediction_id: self.prediction_id,
            reason,
        };

        let category = self.category.parse().map_err(&corrupt)?;
        let method = self.method.parse().map_err(&corrupt)?;
        let generated_at = DateTime::parse_from_rfc3339(&self.generated_at)
            .map_err(|e| corrupt(format!("bad timestamp '{}': {}", self.generated_at, e)))?
            .with_timezone(&Utc);

        Ok(StoredPrediction {
            prediction_id: self.prediction_id,
            student_id: self.student_id,
            semester: self.semester,
            category,
            score: self.score,
            method,
            generated_at,
        })
    }
}

pub struct HistoryStore {
    conn: Connection,
}

impl HistoryStore {
    /// Open (or create) the history database
    pub fn open(path: &Path) -> Result<Self, HistoryError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, HistoryError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, HistoryError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Store a prediction, stamped now
    pub fn record(&self, student_id: i64, semester: u32, result: &PredictionResult) -> Result<i64, HistoryError> {
        self.record_at(student_id, semester, result, Utc::now())
    }

    pub fn record_at(
        &self,
        student_id: i64,
        semester: u32,
        result: &PredictionResult,
        generated_at: DateTime<Utc>,
    ) -> Result<i64, HistoryError> {
        self.conn.execute(
            "INSERT INTO predictions (student_id, semester, prediction_result, prediction_score, method, generated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                student_id,
                semester,
                result.category.as_str(),
                result.score,
                result.method.as_str(),
                generated_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        log::debug!(
            "Stored prediction {} for student {} semester {}: {:.2} ({})",
            id,
            student_id,
            semester,
            result.score,
            result.category
        );
        Ok(id)
    }

    /// All predictions of a student, by semester then time
    pub fn for_student(&self, student_id: i64) -> Result<Vec<StoredPrediction>, HistoryError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM predictions
             WHERE student_id = ?1
             ORDER BY semester ASC, generated_at ASC, prediction_id ASC",
            SELECT_COLUMNS
        ))?;

        let rows = stmt.query_map(params![student_id], RawPrediction::from_row)?;

        let mut predictions = Vec::new();
        for row in rows {
            predictions.push(row?.parse()?);
        }
        Ok(predictions)
    }

    /// Most recently generated prediction of a student
    pub fn latest(&self, student_id: i64) -> Result<Option<StoredPrediction>, HistoryError> {
        let raw = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM predictions
                     WHERE student_id = ?1
                     ORDER BY generated_at DESC, prediction_id DESC
                     LIMIT 1",
                    SELECT_COLUMNS
                ),
                params![student_id],
                RawPrediction::from_row,
            )
            .optional()?;

        raw.map(RawPrediction::parse).transpose()
    }

    pub fn has_prediction(&self, student_id: i64, semester: u32) -> Result<bool, HistoryError> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM predictions WHERE student_id = ?1 AND semester = ?2)",
            params![student_id, semester],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Score average and category distribution across every stored prediction
    pub fn summary(&self) -> Result<PerformanceSummary, HistoryError> {
        let (total, average): (i64, Option<f64>) = self.conn.query_row(
            "SELECT COUNT(*), AVG(prediction_score) FROM predictions",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let mut summary = PerformanceSummary {
            total_predictions: total.max(0) as u64,
            average_score: round2(average.unwrap_or(0.0)),
            ..Default::default()
        };

        let mut stmt = self
            .conn
            .prepare("SELECT prediction_result, COUNT(*) FROM predictions GROUP BY prediction_result")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?;

        for row in rows {
            let (label, count) = row?;
            let count = count.max(0) as u64;
            match label.parse::<PerformanceCategory>() {
                Ok(PerformanceCategory::GoodPerformance) => summary.good += count,
                Ok(PerformanceCategory::AveragePerformance) => summary.average += count,
                Ok(PerformanceCategory::AtRiskPerformance) => summary.at_risk += count,
                Err(e) => log::warn!("Skipping {} predictions: {}", count, e),
            }
        }

        Ok(summary)
    }
}
