//! Rule-Based Scoring Formula & Weights
//!
//! Fixed contract used whenever no trained model is available.
//! Weights and caps are not tunable.

use crate::logic::features::layout::{ASSIGNMENT_MAX, INTERNAL_MAX, SCORE_MAX, SCORE_MIN};
use crate::logic::features::FeatureVector;

// ============================================================================
// ACADEMIC SUB-WEIGHTS (sum to 1.0)
// ============================================================================

pub const MARKS_WEIGHT: f64 = 0.40;
pub const ATTENDANCE_WEIGHT: f64 = 0.30;
pub const INTERNAL_WEIGHT: f64 = 0.20;
pub const ASSIGNMENT_WEIGHT: f64 = 0.10;

// ============================================================================
// ACADEMIC / EXTRACURRICULAR SPLIT
// ============================================================================

pub const ACADEMIC_SHARE: f64 = 0.90;
pub const EXTRACURRICULAR_SHARE: f64 = 0.10;

// ============================================================================
// EXTRACURRICULAR BONUS (max 10 points)
// ============================================================================

pub const CERTIFICATION_POINTS: u32 = 2;
pub const CERTIFICATION_CAP: u32 = 6;
pub const COMPETITION_POINTS: u32 = 3;
pub const COMPETITION_CAP: u32 = 4;

/// Intermediate values of the rule-based formula
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleBreakdown {
    pub academic: f64,
    pub certification_bonus: u32,
    pub competition_bonus: u32,
    /// Unrounded, clamped to [0, 100]
    pub score: f64,
}

impl RuleBreakdown {
    pub fn extracurricular(&self) -> u32 {
        self.certification_bonus + self.competition_bonus
    }
}

/// Academic component on a 0-100 scale
pub fn academic_score(features: &FeatureVector) -> f64 {
    features.marks_obtained * MARKS_WEIGHT
        + features.attendance_percentage * ATTENDANCE_WEIGHT
        + (features.internal_marks / INTERNAL_MAX) * 100.0 * INTERNAL_WEIGHT
        + (features.assignment_score / ASSIGNMENT_MAX) * 100.0 * ASSIGNMENT_WEIGHT
}

pub fn certification_bonus(certifications: u32) -> u32 {
    certifications.saturating_mul(CERTIFICATION_POINTS).min(CERTIFICATION_CAP)
}

pub fn competition_bonus(competitions: u32) -> u32 {
    competitions.saturating_mul(COMPETITION_POINTS).min(COMPETITION_CAP)
}

pub fn evaluate(features: &FeatureVector) -> RuleBreakdown {
    let academic = academic_score(features);
    let certification_bonus = certification_bonus(features.certifications);
    let competition_bonus = competition_bonus(features.competitions);
    let extracurricular = f64::from(certification_bonus + competition_bonus);

    let score = (academic * ACADEMIC_SHARE + extracurricular * EXTRACURRICULAR_SHARE)
        .clamp(SCORE_MIN, SCORE_MAX);

    RuleBreakdown {
        academic,
        certification_bonus,
        competition_bonus,
        score,
    }
}

/// Unrounded rule-based score in [0, 100]
pub fn rule_based_score(features: &FeatureVector) -> f64 {
    evaluate(features).score
}
