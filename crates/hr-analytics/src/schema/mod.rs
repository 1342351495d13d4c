//! Schema validation and score normalization.
//!
//! Everything that maps raw CSV columns onto the analysis schema lives here:
//! binding resolution against the loaded table, and the fixed ordinal scale
//! that turns performance labels into numeric scores.

mod resolver;
mod scale;

pub use resolver::{BoundColumn, ColumnResolution, ColumnResolver, require_columns};
pub use scale::{
    LabelShare, NormalizationSummary, PERFORMANCE_SCALE, ScoreNormalizer, UnmappedLabel,
    score_for, top_label,
};
