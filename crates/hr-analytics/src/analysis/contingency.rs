//! Cross-tabulation of categorical columns and the chi-square independence
//! test.
//!
//! Tables keep their categories in first-seen record order rather than
//! sorted, so two runs over the same file always produce the same layout and
//! the table reads in the order the data introduced the categories.

use std::collections::HashMap;

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::analysis::SIGNIFICANCE_LEVEL;
use crate::error::{AnalysisError, Result};
use crate::utils::string_values;

/// Counts of category pairs between two columns.
///
/// Records where either side is null are excluded, so every marginal total
/// is positive by construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContingencyTable {
    pub row_column: String,
    pub col_column: String,
    /// Row categories in first-seen order.
    pub rows: Vec<String>,
    /// Column categories in first-seen order.
    pub cols: Vec<String>,
    /// `counts[i][j]` pairs `rows[i]` with `cols[j]`.
    pub counts: Vec<Vec<u64>>,
}

impl ContingencyTable {
    pub fn row_totals(&self) -> Vec<u64> {
        self.counts.iter().map(|row| row.iter().sum()).collect()
    }

    pub fn col_totals(&self) -> Vec<u64> {
        let mut totals = vec![0u64; self.cols.len()];
        for row in &self.counts {
            for (total, count) in totals.iter_mut().zip(row) {
                *total += count;
            }
        }
        totals
    }

    pub fn grand_total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    /// Each count as a percentage of its row total, rounded to two decimals.
    pub fn row_percentages(&self) -> Vec<Vec<f64>> {
        self.counts
            .iter()
            .map(|row| {
                let total: u64 = row.iter().sum();
                row.iter()
                    .map(|count| {
                        if total == 0 {
                            0.0
                        } else {
                            (*count as f64 / total as f64 * 10_000.0).round() / 100.0
                        }
                    })
                    .collect()
            })
            .collect()
    }
}

/// Pearson chi-square test of independence over a contingency table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChiSquareResult {
    pub statistic: f64,
    pub p_value: f64,
    pub degrees_of_freedom: usize,
    /// True when the Yates continuity correction was applied (2x2 tables).
    pub yates_correction: bool,
    pub significant: bool,
}

/// Build the contingency table between two categorical columns.
pub fn crosstab(df: &DataFrame, row_column: &str, col_column: &str) -> Result<ContingencyTable> {
    let row_values = string_values(df, row_column)?;
    let col_values = string_values(df, col_column)?;

    let mut rows: Vec<String> = Vec::new();
    let mut cols: Vec<String> = Vec::new();
    let mut row_index: HashMap<String, usize> = HashMap::new();
    let mut col_index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<Vec<u64>> = Vec::new();

    for (row_value, col_value) in row_values.into_iter().zip(col_values) {
        let (Some(row_value), Some(col_value)) = (row_value, col_value) else {
            continue;
        };

        let ri = match row_index.get(&row_value) {
            Some(&i) => i,
            None => {
                let i = rows.len();
                rows.push(row_value.clone());
                row_index.insert(row_value, i);
                counts.push(vec![0; cols.len()]);
                i
            }
        };
        let ci = match col_index.get(&col_value) {
            Some(&i) => i,
            None => {
                let i = cols.len();
                cols.push(col_value.clone());
                col_index.insert(col_value, i);
                for row in &mut counts {
                    row.push(0);
                }
                i
            }
        };
        counts[ri][ci] += 1;
    }

    Ok(ContingencyTable {
        row_column: row_column.to_string(),
        col_column: col_column.to_string(),
        rows,
        cols,
        counts,
    })
}

/// Chi-square independence test with the Yates continuity correction on
/// 2x2 tables.
///
/// Tables smaller than 2x2 have no degrees of freedom to test and yield
/// [`AnalysisError::InsufficientData`].
pub fn chi_square(table: &ContingencyTable) -> Result<ChiSquareResult> {
    let n_rows = table.rows.len();
    let n_cols = table.cols.len();
    if n_rows < 2 || n_cols < 2 {
        return Err(AnalysisError::InsufficientData {
            analysis: format!("chi-square ({} x {})", table.row_column, table.col_column),
            reason: format!("table is {n_rows}x{n_cols}, need at least 2x2"),
        });
    }

    let grand = table.grand_total();
    if grand == 0 {
        return Err(AnalysisError::InsufficientData {
            analysis: format!("chi-square ({} x {})", table.row_column, table.col_column),
            reason: "table has no observations".to_string(),
        });
    }

    let row_totals = table.row_totals();
    let col_totals = table.col_totals();
    // Crosstab never produces empty marginals, but hand-built tables can;
    // a zero marginal would make an expected count zero.
    if row_totals.contains(&0) || col_totals.contains(&0) {
        return Err(AnalysisError::InsufficientData {
            analysis: format!("chi-square ({} x {})", table.row_column, table.col_column),
            reason: "table has an empty row or column".to_string(),
        });
    }
    let degrees_of_freedom = (n_rows - 1) * (n_cols - 1);
    let yates_correction = degrees_of_freedom == 1;

    let mut statistic = 0.0;
    for (i, row) in table.counts.iter().enumerate() {
        for (j, &observed) in row.iter().enumerate() {
            let expected = row_totals[i] as f64 * col_totals[j] as f64 / grand as f64;
            let observed = observed as f64;
            let deviation = if yates_correction {
                ((observed - expected).abs() - 0.5).max(0.0)
            } else {
                observed - expected
            };
            statistic += deviation * deviation / expected;
        }
    }

    let dist = ChiSquared::new(degrees_of_freedom as f64).map_err(|_| {
        AnalysisError::InsufficientData {
            analysis: format!("chi-square ({} x {})", table.row_column, table.col_column),
            reason: "invalid degrees of freedom".to_string(),
        }
    })?;
    let p_value = 1.0 - dist.cdf(statistic);

    Ok(ChiSquareResult {
        statistic,
        p_value,
        degrees_of_freedom,
        yates_correction,
        significant: p_value < SIGNIFICANCE_LEVEL,
    })
}
