//! Column binding resolution.
//!
//! The resolver checks every configured column binding against the loaded
//! table exactly once, at pipeline entry. Downstream analyses consult the
//! resolution instead of probing the schema themselves, so a missing column
//! turns into a recorded skip rather than a panic deep inside a computation.

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::ColumnBindings;
use crate::error::{AnalysisError, Result};

/// One logical field binding checked against the table schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoundColumn {
    /// Logical field name (e.g. `engagement`).
    pub field: String,
    /// The column the field is bound to (e.g. `EngagementSurvey`).
    pub column: String,
    /// Whether the column exists in the table.
    pub present: bool,
    /// Null count for present columns, zero otherwise.
    pub null_count: usize,
}

/// Result of resolving all configured bindings against a table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColumnResolution {
    pub columns: Vec<BoundColumn>,
}

impl ColumnResolution {
    /// True when every binding resolved to an existing column.
    pub fn is_complete(&self) -> bool {
        self.columns.iter().all(|c| c.present)
    }

    /// Bindings whose column is absent from the table.
    pub fn missing(&self) -> Vec<&BoundColumn> {
        self.columns.iter().filter(|c| !c.present).collect()
    }

    /// Whether a concrete column name resolved as present.
    pub fn has(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c.present && c.column == column)
    }
}

/// Validates configured column bindings against a loaded table.
pub struct ColumnResolver<'a> {
    bindings: &'a ColumnBindings,
}

impl<'a> ColumnResolver<'a> {
    pub fn new(bindings: &'a ColumnBindings) -> Self {
        Self { bindings }
    }

    /// Check every binding against the table schema.
    ///
    /// Never fails: absent columns are reported in the resolution, not
    /// raised as errors.
    pub fn resolve(&self, df: &DataFrame) -> ColumnResolution {
        let columns = self
            .bindings
            .fields()
            .into_iter()
            .map(|(field, column)| match df.column(column) {
                Ok(col) => BoundColumn {
                    field: field.to_string(),
                    column: column.to_string(),
                    present: true,
                    null_count: col.null_count(),
                },
                Err(_) => BoundColumn {
                    field: field.to_string(),
                    column: column.to_string(),
                    present: false,
                    null_count: 0,
                },
            })
            .collect();
        ColumnResolution { columns }
    }
}

/// Require that every listed column exists in the table.
///
/// Returns a single [`AnalysisError::MissingColumn`] naming all absent
/// columns, so a skip diagnostic carries the full list.
pub fn require_columns(df: &DataFrame, columns: &[&str]) -> Result<()> {
    let missing: Vec<&str> = columns
        .iter()
        .copied()
        .filter(|c| df.column(c).is_err())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(AnalysisError::MissingColumn(missing.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_df() -> DataFrame {
        df![
            "PerformanceScore" => [Some("Exceeds"), None, Some("PIP")],
            "EngagementSurvey" => [4.2, 3.1, 2.0],
            "Department" => ["Sales", "IT/IS", "Sales"],
        ]
        .unwrap()
    }

    // ==================== resolution tests ====================

    #[test]
    fn test_resolution_reports_presence_and_nulls() {
        let bindings = ColumnBindings::default();
        let df = sample_df();
        let resolution = ColumnResolver::new(&bindings).resolve(&df);

        assert!(!resolution.is_complete());
        assert!(resolution.has("PerformanceScore"));
        assert!(resolution.has("Department"));
        assert!(!resolution.has("Absences"));

        let performance = resolution
            .columns
            .iter()
            .find(|c| c.field == "performance")
            .unwrap();
        assert!(performance.present);
        assert_eq!(performance.null_count, 1);
    }

    #[test]
    fn test_resolution_lists_missing_bindings() {
        let bindings = ColumnBindings::default();
        let df = sample_df();
        let resolution = ColumnResolver::new(&bindings).resolve(&df);

        let missing: Vec<&str> = resolution
            .missing()
            .iter()
            .map(|c| c.column.as_str())
            .collect();
        assert!(missing.contains(&"Absences"));
        assert!(missing.contains(&"DateofHire"));
        assert!(!missing.contains(&"EngagementSurvey"));
    }

    #[test]
    fn test_resolution_complete_when_all_present() {
        let bindings = ColumnBindings {
            performance: "PerformanceScore".into(),
            engagement: "EngagementSurvey".into(),
            satisfaction: "EngagementSurvey".into(),
            absences: "EngagementSurvey".into(),
            days_late: "EngagementSurvey".into(),
            special_projects: "EngagementSurvey".into(),
            department: "Department".into(),
            position: "Department".into(),
            employment_status: "Department".into(),
            gender: "Department".into(),
            hire_date: "Department".into(),
        };
        let df = sample_df();
        let resolution = ColumnResolver::new(&bindings).resolve(&df);
        assert!(resolution.is_complete());
        assert!(resolution.missing().is_empty());
    }

    // ==================== require_columns tests ====================

    #[test]
    fn test_require_columns_ok() {
        let df = sample_df();
        assert!(require_columns(&df, &["PerformanceScore", "Department"]).is_ok());
    }

    #[test]
    fn test_require_columns_names_all_missing() {
        let df = sample_df();
        let err = require_columns(&df, &["PerformanceScore", "Absences", "DateofHire"]).unwrap_err();
        match err {
            AnalysisError::MissingColumn(names) => {
                assert_eq!(names, "Absences, DateofHire");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
