//! Pairwise Pearson correlations between numeric columns.
//!
//! Null handling is pairwise: a record is dropped for a given pair only when
//! either side of that pair is null, so each coefficient uses as much data as
//! the two columns jointly allow.

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::stats;
use crate::error::Result;
use crate::utils::numeric_values;

/// Correlation between two named columns.
///
/// `coefficient` is `None` when the pair is not computable: fewer than two
/// valid pairs or zero variance on either side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CorrelationResult {
    pub column_a: String,
    pub column_b: String,
    pub coefficient: Option<f64>,
    /// Number of records where both columns were non-null.
    pub sample_size: usize,
}

/// Square correlation matrix over a set of numeric columns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Row-major coefficients; `None` marks a non-computable cell.
    pub values: Vec<Vec<Option<f64>>>,
}

fn paired(xs: &[Option<f64>], ys: &[Option<f64>]) -> (Vec<f64>, Vec<f64>) {
    xs.iter()
        .zip(ys)
        .filter_map(|(x, y)| x.zip(*y))
        .unzip()
}

/// Pearson correlation between two columns with pairwise null dropping.
pub fn pearson_between(df: &DataFrame, column_a: &str, column_b: &str) -> Result<CorrelationResult> {
    let xs = numeric_values(df, column_a)?;
    let ys = numeric_values(df, column_b)?;
    let (xv, yv) = paired(&xs, &ys);
    Ok(CorrelationResult {
        column_a: column_a.to_string(),
        column_b: column_b.to_string(),
        coefficient: stats::pearson(&xv, &yv),
        sample_size: xv.len(),
    })
}

/// Full correlation matrix over the given columns.
///
/// Every cell is computed with pairwise dropping, so sample sizes differ
/// between cells when nulls are unevenly distributed.
pub fn correlation_matrix(df: &DataFrame, columns: &[&str]) -> Result<CorrelationMatrix> {
    let extracted: Vec<Vec<Option<f64>>> = columns
        .iter()
        .map(|c| numeric_values(df, c))
        .collect::<Result<_>>()?;

    let mut values = Vec::with_capacity(columns.len());
    for row in &extracted {
        let mut row_values = Vec::with_capacity(columns.len());
        for col in &extracted {
            let (xv, yv) = paired(row, col);
            row_values.push(stats::pearson(&xv, &yv));
        }
        values.push(row_values);
    }

    Ok(CorrelationMatrix {
        columns: columns.iter().map(|c| c.to_string()).collect(),
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;

    fn sample_df() -> DataFrame {
        df![
            "a" => [Some(1.0), Some(2.0), None, Some(4.0), Some(5.0)],
            "b" => [Some(2.0), Some(4.0), Some(1.0), None, Some(10.0)],
            "flat" => [3.0, 3.0, 3.0, 3.0, 3.0],
        ]
        .unwrap()
    }

    // ==================== pair tests ====================

    #[test]
    fn test_pairwise_null_dropping() {
        let df = sample_df();
        let result = pearson_between(&df, "a", "b").unwrap();
        // rows 2 and 3 drop, leaving (1,2), (2,4), (5,10)
        assert_eq!(result.sample_size, 3);
        let r = result.coefficient.unwrap();
        assert!((r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_variance_is_not_computable() {
        let df = sample_df();
        let result = pearson_between(&df, "a", "flat").unwrap();
        assert_eq!(result.coefficient, None);
        assert_eq!(result.sample_size, 4);
    }

    #[test]
    fn test_missing_column_is_error() {
        let df = sample_df();
        let err = pearson_between(&df, "a", "nope").unwrap_err();
        assert!(matches!(err, AnalysisError::MissingColumn(_)));
    }

    // ==================== matrix tests ====================

    #[test]
    fn test_matrix_shape_and_diagonal() {
        let df = sample_df();
        let matrix = correlation_matrix(&df, &["a", "b"]).unwrap();
        assert_eq!(matrix.columns, vec!["a", "b"]);
        assert_eq!(matrix.values.len(), 2);
        assert_eq!(matrix.values[0].len(), 2);
        assert!((matrix.values[0][0].unwrap() - 1.0).abs() < 1e-12);
        assert!((matrix.values[1][1].unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_matrix_is_symmetric() {
        let df = sample_df();
        let matrix = correlation_matrix(&df, &["a", "b"]).unwrap();
        let ab = matrix.values[0][1].unwrap();
        let ba = matrix.values[1][0].unwrap();
        assert!((ab - ba).abs() < 1e-12);
    }

    #[test]
    fn test_matrix_flat_column_yields_none_cells() {
        let df = sample_df();
        let matrix = correlation_matrix(&df, &["a", "flat"]).unwrap();
        assert_eq!(matrix.values[0][1], None);
        assert_eq!(matrix.values[1][0], None);
        assert_eq!(matrix.values[1][1], None);
    }
}
