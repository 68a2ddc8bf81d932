//! Feature Layout - Centralized Feature Definition
//!
//! **This file controls the feature schema**
//!
//! ## Rules:
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION
//!
//! Persisted model artifacts carry the version and the layout hash, so a
//! model trained against a different layout is rejected at load time.

use crc32fast::Hasher;

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Feature names in exact order they appear in the model input
pub const FEATURE_LAYOUT: &[&str] = &[
    // === Academic (0-3) ===
    "marks_obtained",        // 0: Final marks, 0-100
    "attendance_percentage", // 1: Attendance, 0-100
    "internal_marks",        // 2: Internal exam marks, 0-50
    "assignment_score",      // 3: Assignment score, 0-20

    // === Extracurricular (4-5) ===
    "certifications",        // 4: Certification count
    "competitions",          // 5: Competition participation count
];

/// Total number of features. Must match FEATURE_LAYOUT.len()
pub const FEATURE_COUNT: usize = 6;

/// Label column of the training dataset
pub const LABEL_NAME: &str = "performance_score";

// ============================================================================
// VALUE RANGES
// ============================================================================

pub const MARKS_MAX: f64 = 100.0;
pub const ATTENDANCE_MAX: f64 = 100.0;
pub const INTERNAL_MAX: f64 = 50.0;
pub const ASSIGNMENT_MAX: f64 = 20.0;

/// Performance score range (label and prediction output)
pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 100.0;

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// Compute CRC32 hash of the feature layout
pub fn compute_layout_hash() -> u32 {
    let mut hasher = Hasher::new();

    hasher.update(&[FEATURE_VERSION]);

    for name in FEATURE_LAYOUT {
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
    }

    hasher.finalize()
}

/// Get layout hash
pub fn layout_hash() -> u32 {
    compute_layout_hash()
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Error when feature layout doesn't match expected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Feature layout mismatch: expected v{expected_version} (hash: {expected_hash:08x}), got v{actual_version} (hash: {actual_hash:08x})")]
pub struct LayoutMismatchError {
    pub expected_version: u8,
    pub expected_hash: u32,
    pub actual_version: u8,
    pub actual_hash: u32,
}

/// Validate that persisted data matches current layout
pub fn validate_layout(incoming_version: u8, incoming_hash: u32) -> Result<(), LayoutMismatchError> {
    let current_hash = layout_hash();

    if incoming_version != FEATURE_VERSION || incoming_hash != current_hash {
        return Err(LayoutMismatchError {
            expected_version: FEATURE_VERSION,
            expected_hash: current_hash,
            actual_version: incoming_version,
            actual_hash: incoming_hash,
        });
    }

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
