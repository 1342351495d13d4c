//! HR Employee Records Analysis Library
//!
//! A statistical analysis and recommendation pipeline for HR employee records,
//! built with Rust and Polars.
//!
//! # Overview
//!
//! This library takes a tabular export of employee records and produces a
//! structured report covering:
//!
//! - **Score Normalization**: Maps ordinal performance labels onto a numeric scale
//! - **Correlation Analysis**: Pearson coefficients between performance and survey metrics
//! - **Association Tests**: Contingency tables with chi-square tests against the performance label
//! - **Group Comparisons**: Per-group means with one-way ANOVA significance tests
//! - **Outlier Detection**: IQR fences over normalized scores, with outlier profiling
//! - **Tenure Analysis**: Hire-date parsing and score-by-tenure breakdowns
//! - **Recommendations**: Department benchmark flags and top-performer profiles
//!
//! Analyses degrade gracefully: a missing column or an undersized group is
//! recorded as a skipped analysis in the report rather than failing the run.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use hr_analytics::{AnalysisPipeline, ReportWriter, render_summary};
//! use polars::prelude::*;
//!
//! // Load data
//! let df = CsvReadOptions::default()
//!     .try_into_reader_with_file_path(Some("hr_records.csv".into()))?
//!     .finish()?;
//!
//! // Run every analysis with the default column bindings
//! let report = AnalysisPipeline::with_defaults().analyze(&df)?;
//!
//! println!("{}", render_summary(&report));
//! ReportWriter::new("reports").write_report(&report, "hr_records")?;
//! ```
//!
//! # Configuration
//!
//! Use [`PipelineConfig`] to rebind columns or tune the analysis:
//!
//! ```rust,ignore
//! use hr_analytics::{AnalysisPipeline, PipelineConfig};
//! use chrono::NaiveDate;
//!
//! let config = PipelineConfig::builder()
//!     .performance_column("Rating")           // Ordinal performance label
//!     .engagement_column("EngagementScore")
//!     .date_column("HireDate")
//!     .iqr_multiplier(3.0)                    // Wider outlier fences
//!     .reference_date(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
//!     .build()?;
//!
//! let report = AnalysisPipeline::new(config)?.analyze(&df)?;
//! ```

pub mod analysis;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod recommend;
pub mod reporting;
pub mod schema;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use analysis::{
    AnovaResult, ChiSquareResult, ContingencyTable, CorrelationMatrix, CorrelationResult,
    GroupStat, OutlierBounds, OutlierReport, SIGNIFICANCE_LEVEL, TenureBucket, TenureReport,
};
pub use config::{ColumnBindings, ConfigValidationError, PipelineConfig, PipelineConfigBuilder};
pub use error::{AnalysisError, Result as AnalysisResult, ResultExt};
pub use pipeline::{AnalysisPipeline, AnalysisPipelineBuilder};
pub use recommend::{
    DepartmentAggregate, DepartmentFlag, DepartmentFlags, RecommendationReport,
    TopPerformerSummary,
};
pub use reporting::{ReportWriter, render_summary};
pub use schema::{
    BoundColumn, ColumnResolution, ColumnResolver, NormalizationSummary, PERFORMANCE_SCALE,
    ScoreNormalizer,
};
pub use types::{
    AnalysisReport, AssociationResult, CorrelationSection, DatasetSummary, GroupComparison,
    SkippedAnalysis,
};
pub use utils::{frequency_counts, is_numeric_dtype, is_temporal_dtype, mode, numeric_values};
