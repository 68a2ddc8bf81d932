//! Feature Vector - Core data structure for model input
//!
//! Named fields for the six features, with conversion to the ordered
//! array defined by `layout.rs`.

use serde::{Deserialize, Serialize};

use super::layout::{
    ASSIGNMENT_MAX, ATTENDANCE_MAX, FEATURE_COUNT, FEATURE_LAYOUT, INTERNAL_MAX, MARKS_MAX,
};
use super::validate::{check_range, ValidationError};

// ============================================================================
// FEATURE VECTOR
// ============================================================================

/// The six-field numeric input to a prediction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Academic score, 0-100
    pub marks_obtained: f64,
    /// Attendance, 0-100
    pub attendance_percentage: f64,
    /// Internal exam marks, 0-50
    pub internal_marks: f64,
    /// Assignment score, 0-20
    pub assignment_score: f64,
    /// Certification count
    pub certifications: u32,
    /// Competition participation count
    pub competitions: u32,
}

impl FeatureVector {
    pub fn new(
        marks_obtained: f64,
        attendance_percentage: f64,
        internal_marks: f64,
        assignment_score: f64,
        certifications: u32,
        competitions: u32,
    ) -> Self {
        Self {
            marks_obtained,
            attendance_percentage,
            internal_marks,
            assignment_score,
            certifications,
            competitions,
        }
    }

    /// Values in FEATURE_LAYOUT order
    pub fn as_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.marks_obtained,
            self.attendance_percentage,
            self.internal_marks,
            self.assignment_score,
            f64::from(self.certifications),
            f64::from(self.competitions),
        ]
    }

    /// Check every academic field against its documented range
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_range("marks_obtained", self.marks_obtained, 0.0, MARKS_MAX)?;
        check_range("attendance_percentage", self.attendance_percentage, 0.0, ATTENDANCE_MAX)?;
        check_range("internal_marks", self.internal_marks, 0.0, INTERNAL_MAX)?;
        check_range("assignment_score", self.assignment_score, 0.0, ASSIGNMENT_MAX)?;
        Ok(())
    }

    /// Convert to JSON-serializable format for logging
    pub fn to_log_entry(&self) -> serde_json::Value {
        serde_json::json!({
            "named_values": FEATURE_LAYOUT.iter()
                .zip(self.as_array().iter())
                .map(|(name, value)| (name.to_string(), *value))
                .collect::<std::collections::BTreeMap<_, _>>(),
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_array_order() {
        let v = FeatureVector::new(80.0, 90.0, 40.0, 18.0, 2, 1);
        assert_eq!(v.as_array(), [80.0, 90.0, 40.0, 18.0, 2.0, 1.0]);
    }

    #[test]
    fn test_validate_bounds() {
        assert!(FeatureVector::new(100.0, 100.0, 50.0, 20.0, 0, 0).validate().is_ok());
        assert!(FeatureVector::new(0.0, 0.0, 0.0, 0.0, 9, 9).validate().is_ok());

        let err = FeatureVector::new(80.0, 90.0, 51.0, 18.0, 0, 0).validate().unwrap_err();
        assert_eq!(err.field, "internal_marks");

        let err = FeatureVector::new(80.0, 90.0, 40.0, 21.0, 0, 0).validate().unwrap_err();
        assert_eq!(err.field, "assignment_score");
    }

    #[test]
    fn test_to_log_entry() {
        let v = FeatureVector::new(80.0, 90.0, 40.0, 18.0, 2, 1);
        let log = v.to_log_entry();
        assert_eq!(log["named_values"]["marks_obtained"], 80.0);
        assert_eq!(log["named_values"]["certifications"], 2.0);
    }
}
