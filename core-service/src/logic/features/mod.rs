//! Features Module - Feature definition and aggregation
//!
//! - `layout` - ordered feature names, version, layout hash
//! - `vector` - the six-field `FeatureVector`
//! - `record` - subject records and extracurricular counts
//! - `aggregate` - term-level reduction into a `FeatureVector`

pub mod layout;
pub mod vector;
pub mod record;
pub mod aggregate;
pub mod validate;


// Re-export common types
pub use layout::{FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION, layout_hash};
pub use vector::FeatureVector;
pub use record::{ExtracurricularCounts, SubjectRecord};
pub use aggregate::{aggregate_term, build_feature_vector, AggregateError, TermAverages};
pub use validate::ValidationError;

pub(crate) use aggregate::round2;
