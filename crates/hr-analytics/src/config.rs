//! Configuration types for the HR analysis pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Column-name bindings for the logical employee-record schema.
///
/// Dataset exports drift across versions (renamed headers, localized
/// labels), so every analysis resolves its input columns through these
/// bindings instead of hard-coded literals. Defaults match the reference
/// HR dataset headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnBindings {
    /// Ordinal performance label column.
    pub performance: String,
    /// Engagement survey score column (continuous).
    pub engagement: String,
    /// Employee satisfaction score column (continuous).
    pub satisfaction: String,
    /// Absence count column (integer).
    pub absences: String,
    /// Late-days count column (integer).
    pub days_late: String,
    /// Special-projects count column (integer).
    pub special_projects: String,
    /// Department column (categorical).
    pub department: String,
    /// Position column (categorical).
    pub position: String,
    /// Employment status column (categorical).
    pub employment_status: String,
    /// Gender column (categorical).
    pub gender: String,
    /// Hire-date column (date or date-like string).
    pub hire_date: String,
}

impl Default for ColumnBindings {
    fn default() -> Self {
        Self {
            performance: "PerformanceScore".to_string(),
            engagement: "EngagementSurvey".to_string(),
            satisfaction: "EmpSatisfaction".to_string(),
            absences: "Absences".to_string(),
            days_late: "DaysLateLast30".to_string(),
            special_projects: "SpecialProjectsCount".to_string(),
            department: "Department".to_string(),
            position: "Position".to_string(),
            employment_status: "EmploymentStatus".to_string(),
            gender: "Gender".to_string(),
            hire_date: "DateofHire".to_string(),
        }
    }
}

impl ColumnBindings {
    /// All bindings as `(logical_field, bound_column)` pairs, in schema order.
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("performance", self.performance.as_str()),
            ("engagement", self.engagement.as_str()),
            ("satisfaction", self.satisfaction.as_str()),
            ("absences", self.absences.as_str()),
            ("days_late", self.days_late.as_str()),
            ("special_projects", self.special_projects.as_str()),
            ("department", self.department.as_str()),
            ("position", self.position.as_str()),
            ("employment_status", self.employment_status.as_str()),
            ("gender", self.gender.as_str()),
            ("hire_date", self.hire_date.as_str()),
        ]
    }

    /// The continuous/count columns that feed the correlation matrix.
    pub fn numeric_fields(&self) -> Vec<&str> {
        vec![
            self.engagement.as_str(),
            self.satisfaction.as_str(),
            self.special_projects.as_str(),
            self.days_late.as_str(),
            self.absences.as_str(),
        ]
    }

    /// The categorical columns cross-tabulated against the performance label.
    pub fn categorical_fields(&self) -> Vec<&str> {
        vec![
            self.department.as_str(),
            self.position.as_str(),
            self.employment_status.as_str(),
            self.gender.as_str(),
        ]
    }
}

/// Configuration for the analysis pipeline.
///
/// Use [`PipelineConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use hr_analytics::config::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .performance_column("Performance Score")
///     .iqr_multiplier(3.0)
///     .build();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Column-name bindings for the logical schema.
    pub columns: ColumnBindings,

    /// Name of the derived numeric performance score column.
    /// Default: "PerformanceScoreNumeric"
    pub score_column: String,

    /// Name of the derived tenure column (years since hire).
    /// Default: "TenureYears"
    pub tenure_column: String,

    /// Multiplier applied to the IQR when computing outlier bounds.
    /// Default: 1.5
    pub iqr_multiplier: f64,

    /// Anchor date for tenure computation.
    /// If None, the current local date is used. Set this for
    /// reproducible runs.
    /// Default: None
    pub reference_date: Option<NaiveDate>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            columns: ColumnBindings::default(),
            score_column: "PerformanceScoreNumeric".to_string(),
            tenure_column: "TenureYears".to_string(),
            iqr_multiplier: 1.5,
            reference_date: None,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(self.iqr_multiplier.is_finite() && self.iqr_multiplier > 0.0) {
            return Err(ConfigValidationError::InvalidIqrMultiplier(
                self.iqr_multiplier,
            ));
        }

        for (field, column) in self.columns.fields() {
            if column.trim().is_empty() {
                return Err(ConfigValidationError::EmptyBinding { field });
            }
        }

        for (field, name) in [
            ("score_column", self.score_column.as_str()),
            ("tenure_column", self.tenure_column.as_str()),
        ] {
            if name.trim().is_empty() {
                return Err(ConfigValidationError::EmptyBinding { field });
            }
            if self.columns.fields().iter().any(|(_, col)| *col == name) {
                return Err(ConfigValidationError::DerivedColumnCollision {
                    name: name.to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid IQR multiplier: {0} (must be a positive finite number)")]
    InvalidIqrMultiplier(f64),

    #[error("Column binding '{field}' must not be empty")]
    EmptyBinding { field: &'static str },

    #[error("Derived column '{name}' collides with a bound input column")]
    DerivedColumnCollision { name: String },
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    columns: Option<ColumnBindings>,
    performance_column: Option<String>,
    engagement_column: Option<String>,
    date_column: Option<String>,
    score_column: Option<String>,
    tenure_column: Option<String>,
    iqr_multiplier: Option<f64>,
    reference_date: Option<NaiveDate>,
}

impl PipelineConfigBuilder {
    /// Replace the full set of column bindings.
    pub fn columns(mut self, columns: ColumnBindings) -> Self {
        self.columns = Some(columns);
        self
    }

    /// Override the performance label column binding.
    pub fn performance_column(mut self, column: impl Into<String>) -> Self {
        self.performance_column = Some(column.into());
        self
    }

    /// Override the engagement score column binding.
    pub fn engagement_column(mut self, column: impl Into<String>) -> Self {
        self.engagement_column = Some(column.into());
        self
    }

    /// Override the hire-date column binding.
    pub fn date_column(mut self, column: impl Into<String>) -> Self {
        self.date_column = Some(column.into());
        self
    }

    /// Set the derived numeric score column name.
    pub fn score_column(mut self, name: impl Into<String>) -> Self {
        self.score_column = Some(name.into());
        self
    }

    /// Set the derived tenure column name.
    pub fn tenure_column(mut self, name: impl Into<String>) -> Self {
        self.tenure_column = Some(name.into());
        self
    }

    /// Set the IQR multiplier for outlier bounds.
    ///
    /// # Arguments
    /// * `multiplier` - Positive finite value (e.g., 1.5 for the Tukey fences)
    pub fn iqr_multiplier(mut self, multiplier: f64) -> Self {
        self.iqr_multiplier = Some(multiplier);
        self
    }

    /// Pin the anchor date used for tenure computation.
    pub fn reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let mut columns = self.columns.unwrap_or_default();
        if let Some(performance) = self.performance_column {
            columns.performance = performance;
        }
        if let Some(engagement) = self.engagement_column {
            columns.engagement = engagement;
        }
        if let Some(hire_date) = self.date_column {
            columns.hire_date = hire_date;
        }

        let config = PipelineConfig {
            columns,
            score_column: self
                .score_column
                .unwrap_or_else(|| "PerformanceScoreNumeric".to_string()),
            tenure_column: self
                .tenure_column
                .unwrap_or_else(|| "TenureYears".to_string()),
            iqr_multiplier: self.iqr_multiplier.unwrap_or(1.5),
            reference_date: self.reference_date,
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.columns.performance, "PerformanceScore");
        assert_eq!(config.columns.gender, "Gender");
        assert_eq!(config.score_column, "PerformanceScoreNumeric");
        assert_eq!(config.tenure_column, "TenureYears");
        assert_eq!(config.iqr_multiplier, 1.5);
        assert!(config.reference_date.is_none());
    }

    #[test]
    fn test_builder_defaults() {
        let config = PipelineConfig::builder().build().unwrap();
        assert_eq!(config.columns, ColumnBindings::default());
        assert_eq!(config.iqr_multiplier, 1.5);
    }

    #[test]
    fn test_builder_custom_values() {
        let config = PipelineConfig::builder()
            .performance_column("Performance Score")
            .engagement_column("Engagement")
            .date_column("Hired")
            .iqr_multiplier(3.0)
            .reference_date(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap())
            .build()
            .unwrap();

        assert_eq!(config.columns.performance, "Performance Score");
        assert_eq!(config.columns.engagement, "Engagement");
        assert_eq!(config.columns.hire_date, "Hired");
        assert_eq!(config.iqr_multiplier, 3.0);
        assert_eq!(
            config.reference_date,
            Some(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap())
        );
        // untouched bindings keep their defaults
        assert_eq!(config.columns.department, "Department");
    }

    #[test]
    fn test_validation_invalid_multiplier() {
        let result = PipelineConfig::builder().iqr_multiplier(0.0).build();

        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidIqrMultiplier(_)
        ));

        let result = PipelineConfig::builder().iqr_multiplier(f64::NAN).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_empty_binding() {
        let result = PipelineConfig::builder().performance_column("  ").build();

        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::EmptyBinding {
                field: "performance"
            }
        ));
    }

    #[test]
    fn test_validation_derived_collision() {
        let result = PipelineConfig::builder()
            .score_column("EngagementSurvey")
            .build();

        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::DerivedColumnCollision { .. }
        ));
    }

    #[test]
    fn test_config_serialization() {
        let config = PipelineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: PipelineConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config.columns, deserialized.columns);
        assert_eq!(config.score_column, deserialized.score_column);
        assert_eq!(config.iqr_multiplier, deserialized.iqr_multiplier);
    }

    #[test]
    fn test_pipeline_config_from_json() {
        let json = r#"{
            "columns": {
                "performance": "Performance Score",
                "engagement": "Engagement",
                "satisfaction": "Satisfaction",
                "absences": "Absences",
                "days_late": "LateDays",
                "special_projects": "Projects",
                "department": "Dept",
                "position": "Role",
                "employment_status": "Status",
                "gender": "Gender",
                "hire_date": "HireDate"
            },
            "score_column": "ScoreNumeric",
            "tenure_column": "Tenure",
            "iqr_multiplier": 2.0,
            "reference_date": "2024-06-30"
        }"#;

        let config: PipelineConfig =
            serde_json::from_str(json).expect("Should deserialize from JSON");

        assert_eq!(config.columns.performance, "Performance Score");
        assert_eq!(config.columns.department, "Dept");
        assert_eq!(config.score_column, "ScoreNumeric");
        assert_eq!(config.iqr_multiplier, 2.0);
        assert_eq!(
            config.reference_date,
            Some(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap())
        );
        assert!(config.validate().is_ok());
    }
}
