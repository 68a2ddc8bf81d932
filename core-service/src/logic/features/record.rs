use serde::{Deserialize, Serialize};

use super::layout::{ASSIGNMENT_MAX, ATTENDANCE_MAX, INTERNAL_MAX, MARKS_MAX};
use super::validate::{check_range, ValidationError};

/// One marks entry for a subject in a term
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectRecord {
    pub subject: String,
    pub marks_obtained: f64,
    pub attendance_percentage: f64,
    pub internal_marks: f64,
    pub assignment_score: f64,
}

impl SubjectRecord {
    pub fn new(
        subject: impl Into<String>,
        marks_obtained: f64,
        attendance_percentage: f64,
        internal_marks: f64,
        assignment_score: f64,
    ) -> Self {
        Self {
            subject: subject.into(),
            marks_obtained,
            attendance_percentage,
            internal_marks,
            assignment_score,
        }
    }

    /// Same ranges as marks entry
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_range("marks_obtained", self.marks_obtained, 0.0, MARKS_MAX)?;
        check_range("attendance_percentage", self.attendance_percentage, 0.0, ATTENDANCE_MAX)?;
        check_range("internal_marks", self.internal_marks, 0.0, INTERNAL_MAX)?;
        check_range("assignment_score", self.assignment_score, 0.0, ASSIGNMENT_MAX)?;
        Ok(())
    }
}

/// Extracurricular record counts for a student.
///
/// These are student-wide, not per term: every term's prediction sees the
/// same counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtracurricularCounts {
    pub certifications: u32,
    pub competitions: u32,
}

impl ExtracurricularCounts {
    pub fn new(certifications: u32, competitions: u32) -> Self {
        Self { certifications, competitions }
    }

    /// Cardinalities of the student's certification and competition records
    pub fn from_records<C, K>(certifications: &[C], competitions: &[K]) -> Self {
        Self {
            certifications: u32::try_from(certifications.len()).unwrap_or(u32::MAX),
            competitions: u32::try_from(competitions.len()).unwrap_or(u32::MAX),
        }
    }
}
