//! Pipeline orchestration.
//!
//! [`AnalysisPipeline::analyze`] runs every analysis section in a fixed
//! order over one table. Sections never abort the run when their inputs are
//! missing or degenerate: each such condition is logged, recorded in the
//! report's skip list, and the pipeline moves on. Only real failures (I/O,
//! malformed frames) propagate as errors.

use std::time::Instant;

use chrono::{Local, NaiveDate};
use polars::prelude::*;
use tracing::{debug, info, warn};

use crate::analysis;
use crate::config::PipelineConfig;
use crate::error::{AnalysisError, Result};
use crate::recommend;
use crate::schema::{ColumnResolver, ScoreNormalizer};
use crate::types::{
    AnalysisReport, AssociationResult, CorrelationSection, DatasetSummary, GroupComparison,
    SkippedAnalysis,
};

/// Statistical analysis pipeline over one employee table.
///
/// The pipeline is configured once and can analyze any number of tables;
/// it holds no per-run state.
#[derive(Debug)]
pub struct AnalysisPipeline {
    config: PipelineConfig,
}

static_assertions::assert_impl_all!(AnalysisPipeline: Send);

/// Builder for [`AnalysisPipeline`].
pub struct AnalysisPipelineBuilder {
    config: PipelineConfig,
}

impl AnalysisPipelineBuilder {
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Pin the reference date used for tenure computation.
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.config.reference_date = Some(date);
        self
    }

    /// Override the IQR fence multiplier.
    pub fn with_iqr_multiplier(mut self, multiplier: f64) -> Self {
        self.config.iqr_multiplier = multiplier;
        self
    }

    /// Validate the configuration and build the pipeline.
    pub fn build(self) -> Result<AnalysisPipeline> {
        AnalysisPipeline::new(self.config)
    }
}

impl Default for AnalysisPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn record_skip(
    skipped: &mut Vec<SkippedAnalysis>,
    analysis: impl Into<String>,
    err: AnalysisError,
) -> Result<()> {
    if !err.is_recoverable() {
        return Err(err);
    }
    let analysis = analysis.into();
    warn!("Skipping {analysis}: {err}");
    skipped.push(SkippedAnalysis::from_error(analysis, &err));
    Ok(())
}

impl AnalysisPipeline {
    pub fn builder() -> AnalysisPipelineBuilder {
        AnalysisPipelineBuilder::new()
    }

    /// Build a pipeline after validating the configuration.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|err| AnalysisError::InvalidConfig(err.to_string()))?;
        Ok(Self { config })
    }

    /// Pipeline over the default column bindings.
    pub fn with_defaults() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every analysis section over the table and assemble the report.
    pub fn analyze(&self, df: &DataFrame) -> Result<AnalysisReport> {
        let started = Instant::now();
        info!(
            "Starting analysis over {} rows x {} columns",
            df.height(),
            df.width()
        );

        let bindings = &self.config.columns;
        let mut skipped: Vec<SkippedAnalysis> = Vec::new();

        let resolution = ColumnResolver::new(bindings).resolve(df);
        for missing in resolution.missing() {
            warn!(
                "Binding '{}' -> column '{}' not found in table; dependent analyses will be skipped",
                missing.field, missing.column
            );
        }
        let dataset = DatasetSummary {
            rows: df.height(),
            columns: df.width(),
            bound_columns: resolution.columns.clone(),
        };

        let mut working = df.clone();

        // Score normalization feeds every score-based section below.
        let normalizer = ScoreNormalizer::new(&bindings.performance, &self.config.score_column);
        let normalization = match normalizer.normalize(&working) {
            Ok((series, summary)) => {
                working.with_column(series)?;
                debug!(
                    "Mapped {} of {} performance labels onto the numeric scale",
                    summary.mapped_count, summary.total_rows
                );
                Some(summary)
            }
            Err(err) => {
                record_skip(&mut skipped, "score normalization", err)?;
                None
            }
        };

        // Named correlation pairs. Attempted unconditionally: a missing
        // column surfaces as a recorded skip through the normal error path.
        let mut pairs = Vec::new();
        let candidate_pairs = [
            (
                self.config.score_column.as_str(),
                bindings.engagement.as_str(),
            ),
            (bindings.engagement.as_str(), bindings.satisfaction.as_str()),
            (
                bindings.special_projects.as_str(),
                bindings.satisfaction.as_str(),
            ),
        ];
        for (column_a, column_b) in candidate_pairs {
            match analysis::pearson_between(&working, column_a, column_b) {
                Ok(result) => pairs.push(result),
                Err(err) => {
                    record_skip(&mut skipped, format!("correlation ({column_a} vs {column_b})"), err)?;
                }
            }
        }

        let matrix_columns: Vec<&str> = bindings
            .numeric_fields()
            .into_iter()
            .filter(|c| resolution.has(c))
            .collect();
        let matrix = if matrix_columns.len() < 2 {
            record_skip(
                &mut skipped,
                "correlation matrix",
                AnalysisError::InsufficientData {
                    analysis: "correlation matrix".to_string(),
                    reason: format!(
                        "only {} of the numeric columns are present, need at least 2",
                        matrix_columns.len()
                    ),
                },
            )?;
            None
        } else {
            Some(analysis::correlation_matrix(&working, &matrix_columns)?)
        };

        // Cross-tabulations of each categorical column against the raw
        // performance label.
        let mut associations = Vec::new();
        if resolution.has(&bindings.performance) {
            for categorical in bindings.categorical_fields() {
                if !resolution.has(categorical) {
                    record_skip(
                        &mut skipped,
                        format!("association ({categorical} x {})", bindings.performance),
                        AnalysisError::MissingColumn(categorical.to_string()),
                    )?;
                    continue;
                }
                let table = analysis::crosstab(&working, categorical, &bindings.performance)?;
                let chi_square = match analysis::chi_square(&table) {
                    Ok(result) => Some(result),
                    Err(err) => {
                        record_skip(
                            &mut skipped,
                            format!("chi-square ({categorical} x {})", bindings.performance),
                            err,
                        )?;
                        None
                    }
                };
                associations.push(AssociationResult {
                    row_percentages: table.row_percentages(),
                    table,
                    chi_square,
                });
            }
        } else {
            record_skip(
                &mut skipped,
                "categorical associations",
                AnalysisError::MissingColumn(bindings.performance.clone()),
            )?;
        }

        // Group means + ANOVA: every numeric column against the performance
        // label, plus the two department comparisons the aggregates build on.
        let mut comparison_specs: Vec<(&str, &str)> = bindings
            .numeric_fields()
            .into_iter()
            .map(|numeric| (numeric, bindings.performance.as_str()))
            .collect();
        comparison_specs.push((bindings.engagement.as_str(), bindings.department.as_str()));
        comparison_specs.push((bindings.satisfaction.as_str(), bindings.department.as_str()));

        let mut group_comparisons = Vec::new();
        for (value_column, group_column) in comparison_specs {
            let absent: Vec<&str> = [value_column, group_column]
                .into_iter()
                .filter(|c| !resolution.has(c))
                .collect();
            if !absent.is_empty() {
                record_skip(
                    &mut skipped,
                    format!("group means ({value_column} by {group_column})"),
                    AnalysisError::MissingColumn(absent.join(", ")),
                )?;
                continue;
            }
            let groups = analysis::group_means(&working, value_column, group_column)?;
            let anova = match analysis::one_way_anova(&working, value_column, group_column) {
                Ok(result) => Some(result),
                Err(err) => {
                    record_skip(
                        &mut skipped,
                        format!("ANOVA ({value_column} by {group_column})"),
                        err,
                    )?;
                    None
                }
            };
            group_comparisons.push(GroupComparison {
                value_column: value_column.to_string(),
                group_column: group_column.to_string(),
                groups,
                anova,
            });
        }

        // Outlier detection on the normalized scores.
        let numeric_profile: Vec<&str> = [bindings.engagement.as_str(), bindings.satisfaction.as_str()]
            .into_iter()
            .filter(|c| resolution.has(c))
            .collect();
        let categorical_profile: Vec<&str> = [
            bindings.department.as_str(),
            bindings.position.as_str(),
            bindings.employment_status.as_str(),
        ]
        .into_iter()
        .filter(|c| resolution.has(c))
        .collect();
        let outliers = match analysis::outlier_report(
            &working,
            &self.config.score_column,
            self.config.iqr_multiplier,
            &numeric_profile,
            &categorical_profile,
        ) {
            Ok(report) => Some(report),
            Err(err) => {
                record_skip(&mut skipped, "outlier detection", err)?;
                None
            }
        };

        // Tenure derivation anchors on the configured reference date so two
        // runs over the same file agree.
        let reference_date = self
            .config
            .reference_date
            .unwrap_or_else(|| Local::now().date_naive());
        let tenure = match analysis::tenure_series(
            &working,
            &bindings.hire_date,
            &self.config.tenure_column,
            reference_date,
        ) {
            Ok((series, stats)) => {
                working.with_column(series)?;
                let buckets = match analysis::tenure_vs_score(
                    &working,
                    &self.config.tenure_column,
                    &self.config.score_column,
                ) {
                    Ok(buckets) => buckets,
                    Err(err) => {
                        record_skip(&mut skipped, "tenure vs performance", err)?;
                        Vec::new()
                    }
                };
                Some(analysis::TenureReport {
                    hire_date_column: bindings.hire_date.clone(),
                    tenure_column: self.config.tenure_column.clone(),
                    reference_date,
                    valid_count: stats.valid_count,
                    unparseable_count: stats.unparseable_count,
                    null_count: stats.null_count,
                    mean_tenure_years: stats.mean_tenure_years,
                    buckets,
                })
            }
            Err(err) => {
                record_skip(&mut skipped, "tenure analysis", err)?;
                None
            }
        };

        let departments = match recommend::department_aggregates(&working, bindings) {
            Ok(aggregates) => aggregates,
            Err(err) => {
                record_skip(&mut skipped, "department aggregates", err)?;
                Vec::new()
            }
        };
        let top_performers = match recommend::top_performer_summary(&working, bindings) {
            Ok(summary) => Some(summary),
            Err(err) => {
                record_skip(&mut skipped, "top performer profile", err)?;
                None
            }
        };
        let recommendations = recommend::RecommendationReport::assemble(
            top_performers,
            recommend::department_flags(&departments),
        );

        let report = AnalysisReport {
            generated_at: Local::now().to_rfc3339(),
            dataset,
            normalization,
            correlations: CorrelationSection { pairs, matrix },
            associations,
            group_comparisons,
            outliers,
            tenure,
            departments,
            recommendations,
            skipped,
        };
        info!(
            "Analysis complete in {:?} ({} section(s) skipped)",
            started.elapsed(),
            report.skipped.len()
        );
        Ok(report)
    }
}
