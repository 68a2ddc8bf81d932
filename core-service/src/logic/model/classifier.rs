//! Performance Classifier
//!
//! Score → category. Same boundaries for trained and rule-based scores.

use serde::{Deserialize, Serialize};

// ============================================================================
// THRESHOLDS
// ============================================================================

/// At or above this score = Good
pub const GOOD_THRESHOLD: f64 = 75.0;

/// At or above this score (and below GOOD) = Average, below = At-Risk
pub const AVERAGE_THRESHOLD: f64 = 50.0;

// ============================================================================
// CATEGORY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PerformanceCategory {
    GoodPerformance,
    AveragePerformance,
    AtRiskPerformance,
}

impl PerformanceCategory {
    pub const ALL: [PerformanceCategory; 3] = [
        PerformanceCategory::GoodPerformance,
        PerformanceCategory::AveragePerformance,
        PerformanceCategory::AtRiskPerformance,
    ];

    /// Label stored in history and shown to users
    pub fn as_str(&self) -> &'static str {
        match self {
            PerformanceCategory::GoodPerformance => "Good Performance",
            PerformanceCategory::AveragePerformance => "Average Performance",
            PerformanceCategory::AtRiskPerformance => "At-Risk Performance",
        }
    }
}

impl std::fmt::Display for PerformanceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PerformanceCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PerformanceCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("Unknown performance category: {}", s))
    }
}

/// Evaluated top-down, lower bound of each band inclusive.
pub fn classify(score: f64) -> PerformanceCategory {
    if score >= GOOD_THRESHOLD {
        PerformanceCategory::GoodPerformance
    } else if score >= AVERAGE_THRESHOLD {
        PerformanceCategory::AveragePerformance
    } else {
        PerformanceCategory::AtRiskPerformance
    }
}
