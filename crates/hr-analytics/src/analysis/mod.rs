//! Statistical analyses over the employee table.
//!
//! Each submodule implements one family of analyses and exposes plain
//! functions taking a `DataFrame` plus column names. All of them degrade
//! gracefully: a missing column or an undersized group becomes a recoverable
//! error the pipeline records as a skip.

mod contingency;
mod correlation;
mod groups;
mod outliers;
pub mod stats;
mod tenure;

pub use contingency::{ChiSquareResult, ContingencyTable, chi_square, crosstab};
pub use correlation::{CorrelationMatrix, CorrelationResult, correlation_matrix, pearson_between};
pub use groups::{AnovaResult, GroupStat, group_means, one_way_anova};
pub use outliers::{
    CategoryBreakdown, CategoryShare, NumericSummary, OutlierBounds, OutlierReport, iqr_bounds,
    outlier_mask, outlier_report,
};
pub use tenure::{TenureBucket, TenureReport, TenureStats, tenure_series, tenure_vs_score};

/// Alpha level shared by every significance test in the pipeline.
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;
