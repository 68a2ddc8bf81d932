//! Training dataset
//!
//! One row per historical student-term: the six features plus the observed
//! `performance_score`. Read from CSV with a header row; columns are matched
//! by name, extra columns are ignored.

use std::fs;
use std::path::Path;

use csv::{Position, ReaderBuilder, Trim};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::logic::features::layout::{FEATURE_COUNT, FEATURE_LAYOUT, LABEL_NAME, SCORE_MAX, SCORE_MIN};
use crate::logic::features::FeatureVector;
use super::error::TrainingError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSample {
    pub features: FeatureVector,
    pub performance_score: f64,
}

impl TrainingSample {
    pub fn new(features: FeatureVector, performance_score: f64) -> Self {
        Self { features, performance_score }
    }
}

/// Check ranges and build the `(x, y)` matrices used for fitting
pub fn to_matrices(samples: &[TrainingSample]) -> Result<(Array2<f64>, Array1<f64>), TrainingError> {
    if samples.is_empty() {
        return Err(TrainingError::EmptyDataset);
    }

    let mut x = Array2::<f64>::zeros((samples.len(), FEATURE_COUNT));
    let mut y = Array1::<f64>::zeros(samples.len());

    for (index, sample) in samples.iter().enumerate() {
        sample
            .features
            .validate()
            .map_err(|source| TrainingError::InvalidSample { index, source })?;

        let label = sample.performance_score;
        if !(SCORE_MIN..=SCORE_MAX).contains(&label) {
            return Err(TrainingError::LabelOutOfRange { index, value: label });
        }

        for (j, value) in sample.features.as_array().into_iter().enumerate() {
            x[[index, j]] = value;
        }
        y[index] = label;
    }

    Ok((x, y))
}

/// Load a CSV training file
pub fn load_csv(path: &Path) -> Result<Vec<TrainingSample>, TrainingError> {
    let content = fs::read_to_string(path)?;
    parse_csv(&content)
}

/// One CSV row, looked up by header name. Extra columns are ignored.
#[derive(Debug, Deserialize)]
struct CsvRow {
    marks_obtained: f64,
    attendance_percentage: f64,
    internal_marks: f64,
    assignment_score: f64,
    certifications: f64,
    competitions: f64,
    performance_score: f64,
}

fn csv_line(position: Option<&Position>) -> usize {
    position.map_or(0, |p| p.line() as usize)
}

/// Parse CSV text. A leading UTF-8 BOM and quoted fields are accepted.
pub fn parse_csv(content: &str) -> Result<Vec<TrainingSample>, TrainingError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| TrainingError::MalformedRow {
            line: csv_line(e.position()).max(1),
            reason: e.to_string(),
        })?
        .clone();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(TrainingError::EmptyDataset);
    }

    for name in FEATURE_LAYOUT.iter().chain(std::iter::once(&LABEL_NAME)) {
        if !headers.iter().any(|h| h == *name) {
            return Err(TrainingError::MissingColumn(name.to_string()));
        }
    }

    let mut samples = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| TrainingError::MalformedRow {
            line: csv_line(e.position()),
            reason: e.to_string(),
        })?;
        let line = csv_line(record.position());

        let row: CsvRow = record
            .deserialize(Some(&headers))
            .map_err(|e| TrainingError::MalformedRow {
                line,
                reason: e.to_string(),
            })?;

        let number = |value: f64, column: &str| -> Result<f64, TrainingError> {
            if value.is_finite() {
                Ok(value)
            } else {
                Err(TrainingError::MalformedRow {
                    line,
                    reason: format!("'{}' is not a number in column '{}'", value, column),
                })
            }
        };

        let count = |value: f64, column: &str| -> Result<u32, TrainingError> {
            if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > f64::from(u32::MAX) {
                return Err(TrainingError::MalformedRow {
                    line,
                    reason: format!("'{}' is not a count in column '{}'", value, column),
                });
            }
            Ok(value as u32)
        };

        let features = FeatureVector::new(
            number(row.marks_obtained, "marks_obtained")?,
            number(row.attendance_percentage, "attendance_percentage")?,
            number(row.internal_marks, "internal_marks")?,
            number(row.assignment_score, "assignment_score")?,
            count(row.certifications, "certifications")?,
            count(row.competitions, "competitions")?,
        );

        samples.push(TrainingSample::new(features, number(row.performance_score, LABEL_NAME)?));
    }

    if samples.is_empty() {
        return Err(TrainingError::EmptyDataset);
    }

    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "marks_obtained,attendance_percentage,internal_marks,assignment_score,certifications,competitions,performance_score";

    #[test]
    fn test_parse_csv() {
        let csv = format!("{}\n80,90,40,18,2,1,76.3\n55.5,60,25,10,0,0,52\n", HEADER);
        let samples = parse_csv(&csv).unwrap();

        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].features, FeatureVector::new(80.0, 90.0, 40.0, 18.0, 2, 1));
        assert_eq!(samples[0].performance_score, 76.3);
        assert_eq!(samples[1].features.marks_obtained, 55.5);
    }

    #[test]
    fn test_column_order_and_extras_ignored() {
        let csv = "student_id,performance_score,competitions,certifications,assignment_score,internal_marks,attendance_percentage,marks_obtained\n\
                   17,70,1,2.0,15,35,85,72\n";
        let samples = parse_csv(csv).unwrap();

        assert_eq!(samples[0].features, FeatureVector::new(72.0, 85.0, 35.0, 15.0, 2, 1));
        assert_eq!(samples[0].performance_score, 70.0);
    }

    #[test]
    fn test_byte_order_mark_skipped() {
        let csv = format!("\u{feff}{}\n80,90,40,18,2,1,76.3\n", HEADER);
        let samples = parse_csv(&csv).unwrap();

        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].features.marks_obtained, 80.0);
    }

    #[test]
    fn test_quoted_fields() {
        let csv = format!(
            "student_name,{}\n\"Doe, Jane\",\"80\",90,40,18,2,1,76.3\n",
            HEADER
        );
        let samples = parse_csv(&csv).unwrap();

        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].features, FeatureVector::new(80.0, 90.0, 40.0, 18.0, 2, 1));
        assert_eq!(samples[0].performance_score, 76.3);
    }

    #[test]
    fn test_missing_column() {
        let csv = "marks_obtained,attendance_percentage,internal_marks,assignment_score,certifications,performance_score\n\
                   80,90,40,18,2,76\n";
        match parse_csv(csv) {
            Err(TrainingError::MissingColumn(name)) => assert_eq!(name, "competitions"),
            other => panic!("Expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_rows() {
        let csv = format!("{}\n80,90,40,18,2,1\n", HEADER);
        assert!(matches!(parse_csv(&csv), Err(TrainingError::MalformedRow { line: 2, .. })));

        let csv = format!("{}\n80,ninety,40,18,2,1,70\n", HEADER);
        assert!(matches!(parse_csv(&csv), Err(TrainingError::MalformedRow { line: 2, .. })));

        let csv = format!("{}\n80,90,40,18,1.5,1,70\n", HEADER);
        assert!(matches!(parse_csv(&csv), Err(TrainingError::MalformedRow { .. })));
    }

    #[test]
    fn test_empty_inputs() {
        assert!(matches!(parse_csv(""), Err(TrainingError::EmptyDataset)));
        assert!(matches!(parse_csv(HEADER), Err(TrainingError::EmptyDataset)));
        assert!(matches!(to_matrices(&[]), Err(TrainingError::EmptyDataset)));
    }

    #[test]
    fn test_to_matrices_validates() {
        let bad_feature = TrainingSample::new(FeatureVector::new(120.0, 90.0, 40.0, 18.0, 0, 0), 80.0);
        assert!(matches!(
            to_matrices(&[bad_feature]),
            Err(TrainingError::InvalidSample { index: 0, .. })
        ));

        let bad_label = TrainingSample::new(FeatureVector::new(80.0, 90.0, 40.0, 18.0, 0, 0), 101.0);
        assert!(matches!(
            to_matrices(&[bad_label]),
            Err(TrainingError::LabelOutOfRange { index: 0, .. })
        ));
    }

    #[test]
    fn test_to_matrices_layout() {
        let sample = TrainingSample::new(FeatureVector::new(80.0, 90.0, 40.0, 18.0, 2, 1), 76.3);
        let (x, y) = to_matrices(&[sample]).unwrap();

        assert_eq!(x.shape(), &[1, FEATURE_COUNT]);
        assert_eq!(x.row(0).to_vec(), vec![80.0, 90.0, 40.0, 18.0, 2.0, 1.0]);
        assert_eq!(y[0], 76.3);
    }
}
