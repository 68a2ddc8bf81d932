//! Feature Aggregator
//!
//! Collapses the subject records of one student-term into a single
//! `FeatureVector`. Pure functions, no engine dependency.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::record::{ExtracurricularCounts, SubjectRecord};
use super::validate::ValidationError;
use super::vector::FeatureVector;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AggregateError {
    /// Zero subject records for the term
    #[error("No marks found for this term")]
    NoRecords,

    #[error("Invalid record for subject '{subject}': {source}")]
    Invalid {
        subject: String,
        #[source]
        source: ValidationError,
    },
}

/// Unweighted per-field means across a term's subjects
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TermAverages {
    pub marks_obtained: f64,
    pub attendance_percentage: f64,
    pub internal_marks: f64,
    pub assignment_score: f64,
    pub subject_count: usize,
}

impl TermAverages {
    pub fn into_features(self, counts: ExtracurricularCounts) -> FeatureVector {
        FeatureVector::new(
            self.marks_obtained,
            self.attendance_percentage,
            self.internal_marks,
            self.assignment_score,
            counts.certifications,
            counts.competitions,
        )
    }

    /// Copy with every mean rounded to 2 decimals, for display
    pub fn rounded(&self) -> Self {
        Self {
            marks_obtained: round2(self.marks_obtained),
            attendance_percentage: round2(self.attendance_percentage),
            internal_marks: round2(self.internal_marks),
            assignment_score: round2(self.assignment_score),
            subject_count: self.subject_count,
        }
    }
}

/// Average the four academic fields over all records.
pub fn aggregate_term(records: &[SubjectRecord]) -> Result<TermAverages, AggregateError> {
    if records.is_empty() {
        return Err(AggregateError::NoRecords);
    }

    for record in records {
        record.validate().map_err(|source| AggregateError::Invalid {
            subject: record.subject.clone(),
            source,
        })?;
    }

    Ok(TermAverages {
        marks_obtained: mean_of(records, |r| r.marks_obtained),
        attendance_percentage: mean_of(records, |r| r.attendance_percentage),
        internal_marks: mean_of(records, |r| r.internal_marks),
        assignment_score: mean_of(records, |r| r.assignment_score),
        subject_count: records.len(),
    })
}

/// Aggregate a term and attach the student's extracurricular counts
pub fn build_feature_vector(
    records: &[SubjectRecord],
    counts: ExtracurricularCounts,
) -> Result<FeatureVector, AggregateError> {
    aggregate_term(records).map(|averages| averages.into_features(counts))
}

/// Values are summed in sorted order so the mean does not depend on record order.
fn mean_of(records: &[SubjectRecord], field: impl Fn(&SubjectRecord) -> f64) -> f64 {
    let mut values: Vec<f64> = records.iter().map(field).collect();
    values.sort_by(f64::total_cmp);
    values.iter().sum::<f64>() / values.len() as f64
}

/// Two decimals, exact ties to even (45.125 → 45.12)
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
