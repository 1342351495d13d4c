//! Serializable result types for the analysis run report.
//!
//! Component modules own their local result structs; this module owns the
//! wrappers that stitch them into the single report the pipeline returns and
//! the writer serializes.

use serde::{Deserialize, Serialize};

use crate::analysis::{
    AnovaResult, ChiSquareResult, ContingencyTable, CorrelationMatrix, CorrelationResult,
    GroupStat, OutlierReport, TenureReport,
};
use crate::error::AnalysisError;
use crate::recommend::{DepartmentAggregate, RecommendationReport};
use crate::schema::{BoundColumn, NormalizationSummary};

/// Shape of the loaded table and how the configured bindings resolved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatasetSummary {
    pub rows: usize,
    pub columns: usize,
    pub bound_columns: Vec<BoundColumn>,
}

/// Named correlation pairs plus the full matrix over the numeric columns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CorrelationSection {
    pub pairs: Vec<CorrelationResult>,
    pub matrix: Option<CorrelationMatrix>,
}

/// One categorical column cross-tabulated against the performance label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssociationResult {
    pub table: ContingencyTable,
    /// Row-percentage view of the table, rounded to two decimals.
    pub row_percentages: Vec<Vec<f64>>,
    /// `None` when the test was skipped for this table.
    pub chi_square: Option<ChiSquareResult>,
}

/// Group means of one numeric column across one categorical column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupComparison {
    pub value_column: String,
    pub group_column: String,
    pub groups: Vec<GroupStat>,
    /// `None` when the ANOVA was skipped for this comparison.
    pub anova: Option<AnovaResult>,
}

/// A recorded skip: which analysis, the error code, and the human reason.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkippedAnalysis {
    pub analysis: String,
    pub code: String,
    pub reason: String,
}

impl SkippedAnalysis {
    pub fn from_error(analysis: impl Into<String>, error: &AnalysisError) -> Self {
        Self {
            analysis: analysis.into(),
            code: error.error_code().to_string(),
            reason: error.to_string(),
        }
    }
}

/// Complete result of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisReport {
    /// RFC 3339 timestamp of report generation.
    pub generated_at: String,
    pub dataset: DatasetSummary,
    /// `None` when the performance column was absent.
    pub normalization: Option<NormalizationSummary>,
    pub correlations: CorrelationSection,
    pub associations: Vec<AssociationResult>,
    pub group_comparisons: Vec<GroupComparison>,
    pub outliers: Option<OutlierReport>,
    pub tenure: Option<TenureReport>,
    pub departments: Vec<DepartmentAggregate>,
    pub recommendations: RecommendationReport,
    /// Every analysis that could not run, in pipeline order.
    pub skipped: Vec<SkippedAnalysis>,
}
