//! Prediction Service
//!
//! Aggregator → engine → history store, the path a host takes for
//! "predict this student's term".

use std::collections::BTreeMap;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logic::features::{
    aggregate_term, AggregateError, ExtracurricularCounts, SubjectRecord, TermAverages,
};
use crate::logic::history::{HistoryError, HistoryStore, PerformanceSummary, StoredPrediction};
use crate::logic::model::{PredictionEngine, PredictionResult};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Semester {semester}: {source}")]
    Aggregate {
        semester: u32,
        #[source]
        source: AggregateError,
    },

    #[error(transparent)]
    History(#[from] HistoryError),
}

impl ServiceError {
    /// The term had no subject records
    pub fn is_no_records(&self) -> bool {
        matches!(self, ServiceError::Aggregate { source: AggregateError::NoRecords, .. })
    }
}

/// Prediction for one student-term plus the inputs behind it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermPrediction {
    pub student_id: i64,
    pub semester: u32,
    pub result: PredictionResult,
    /// Rounded to 2 decimals
    pub averages: TermAverages,
    pub extracurricular: ExtracurricularCounts,
    /// History row id, `None` if persisting failed
    pub prediction_id: Option<i64>,
}

pub struct PredictionService<'a> {
    engine: &'a PredictionEngine,
    store: Mutex<HistoryStore>,
}

impl<'a> PredictionService<'a> {
    pub fn new(engine: &'a PredictionEngine, store: HistoryStore) -> Self {
        Self {
            engine,
            store: Mutex::new(store),
        }
    }

    /// Aggregate, predict, store. A storage failure is logged, not returned.
    pub fn predict_term(
        &self,
        student_id: i64,
        semester: u32,
        records: &[SubjectRecord],
        counts: ExtracurricularCounts,
    ) -> Result<TermPrediction, ServiceError> {
        let averages = aggregate_term(records)
            .map_err(|source| ServiceError::Aggregate { semester, source })?;

        let result = self.engine.predict(&averages.into_features(counts));

        let prediction_id = match self.store.lock().record(student_id, semester, &result) {
            Ok(id) => Some(id),
            Err(e) => {
                log::error!(
                    "Error saving prediction for student {} semester {}: {}",
                    student_id,
                    semester,
                    e
                );
                None
            }
        };

        Ok(TermPrediction {
            student_id,
            semester,
            result,
            averages: averages.rounded(),
            extracurricular: counts,
            prediction_id,
        })
    }

    /// Predict every term that has records but no stored prediction, then
    /// return the student's full history.
    pub fn backfill(
        &self,
        student_id: i64,
        terms: &BTreeMap<u32, Vec<SubjectRecord>>,
        counts: ExtracurricularCounts,
    ) -> Result<Vec<StoredPrediction>, ServiceError> {
        for (&semester, records) in terms {
            if records.is_empty() || self.store.lock().has_prediction(student_id, semester)? {
                continue;
            }

            match self.predict_term(student_id, semester, records, counts) {
                Ok(term) => log::info!(
                    "Backfilled student {} semester {}: {:.2} ({})",
                    student_id,
                    semester,
                    term.result.score,
                    term.result.category
                ),
                Err(e) => log::warn!("Skipping backfill for student {}: {}", student_id, e),
            }
        }

        self.history(student_id)
    }

    pub fn history(&self, student_id: i64) -> Result<Vec<StoredPrediction>, ServiceError> {
        Ok(self.store.lock().for_student(student_id)?)
    }

    pub fn latest(&self, student_id: i64) -> Result<Option<StoredPrediction>, ServiceError> {
        Ok(self.store.lock().latest(student_id)?)
    }

    pub fn summary(&self) -> Result<PerformanceSummary, ServiceError> {
        Ok(self.store.lock().summary()?)
    }
}
