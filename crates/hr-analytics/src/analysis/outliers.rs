//! IQR-based outlier detection on the normalized score column.
//!
//! Bounds are the classic Tukey fences: `[Q1 - m*IQR, Q3 + m*IQR]` with a
//! configurable multiplier. Missing scores are never flagged. When the IQR
//! collapses to zero the fences collapse onto the quartile, so every record
//! away from that value counts as an outlier; on a heavily skewed ordinal
//! scale that is the informative answer, not a degenerate one.

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::stats::{self, quantile_sorted};
use crate::error::{AnalysisError, Result};
use crate::utils::{frequency_counts, non_null_numeric, numeric_values, string_values};

/// Quartiles and the derived outlier fences.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct OutlierBounds {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Mean and spread of one numeric column over the outlier subset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NumericSummary {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
}

/// Share of one category value within the outlier subset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryShare {
    pub value: String,
    pub count: usize,
    /// Percentage of the subset, rounded to one decimal.
    pub percentage: f64,
}

/// Frequency breakdown of one categorical column over the outlier subset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryBreakdown {
    pub column: String,
    pub entries: Vec<CategoryShare>,
}

/// Outlier detection outcome plus a profile of the flagged records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutlierReport {
    pub score_column: String,
    pub bounds: OutlierBounds,
    /// Records with a non-null score.
    pub scored_count: usize,
    pub outlier_count: usize,
    pub numeric_summaries: Vec<NumericSummary>,
    pub breakdowns: Vec<CategoryBreakdown>,
}

/// Compute quartiles and fences for a set of values.
pub fn iqr_bounds(values: &[f64], multiplier: f64) -> Result<OutlierBounds> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let (Some(q1), Some(q3)) = (
        quantile_sorted(&sorted, 0.25),
        quantile_sorted(&sorted, 0.75),
    ) else {
        return Err(AnalysisError::InsufficientData {
            analysis: "outlier detection".to_string(),
            reason: "no scored records".to_string(),
        });
    };

    let iqr = q3 - q1;
    Ok(OutlierBounds {
        q1,
        q3,
        iqr,
        lower: q1 - multiplier * iqr,
        upper: q3 + multiplier * iqr,
    })
}

/// Flag records whose score falls outside the fences.
///
/// The returned mask is row-aligned with the input table; null scores are
/// never flagged.
pub fn outlier_mask(
    df: &DataFrame,
    score_column: &str,
    multiplier: f64,
) -> Result<(OutlierBounds, BooleanChunked)> {
    let scores = numeric_values(df, score_column)?;
    let valid: Vec<f64> = scores.iter().copied().flatten().collect();
    let bounds = iqr_bounds(&valid, multiplier)?;

    let flags: Vec<bool> = scores
        .iter()
        .map(|score| matches!(score, Some(s) if *s < bounds.lower || *s > bounds.upper))
        .collect();
    Ok((bounds, BooleanChunked::from_slice("outlier_mask".into(), &flags)))
}

/// Detect outliers and profile the flagged subset.
///
/// `numeric_columns` get a mean/spread summary over the subset and
/// `categorical_columns` get a frequency breakdown, mirroring how an analyst
/// would eyeball who the outliers are. Columns absent from the table are
/// ignored here; the caller decides which ones to ask for.
pub fn outlier_report(
    df: &DataFrame,
    score_column: &str,
    multiplier: f64,
    numeric_columns: &[&str],
    categorical_columns: &[&str],
) -> Result<OutlierReport> {
    let (bounds, mask) = outlier_mask(df, score_column, multiplier)?;
    let scored_count = df.height()
        - df.column(score_column)
            .map_err(|_| AnalysisError::MissingColumn(score_column.to_string()))?
            .null_count();
    let outlier_count = mask.sum().unwrap_or(0) as usize;

    if outlier_count == 0 {
        return Ok(OutlierReport {
            score_column: score_column.to_string(),
            bounds,
            scored_count,
            outlier_count,
            numeric_summaries: Vec::new(),
            breakdowns: Vec::new(),
        });
    }

    let subset = df.filter(&mask)?;

    let mut numeric_summaries = Vec::new();
    for column in numeric_columns {
        if subset.column(column).is_err() {
            continue;
        }
        let values = non_null_numeric(&subset, column)?;
        numeric_summaries.push(NumericSummary {
            column: column.to_string(),
            count: values.len(),
            mean: stats::mean(&values),
            std_dev: stats::sample_std(&values),
        });
    }

    let mut breakdowns = Vec::new();
    for column in categorical_columns {
        if subset.column(column).is_err() {
            continue;
        }
        let values = string_values(&subset, column)?;
        let non_null: Vec<&str> = values.iter().flatten().map(String::as_str).collect();
        let total = non_null.len();
        if total == 0 {
            continue;
        }
        let mut entries: Vec<CategoryShare> = frequency_counts(non_null)
            .into_iter()
            .map(|(value, count)| CategoryShare {
                value,
                count,
                percentage: (count as f64 / total as f64 * 1000.0).round() / 10.0,
            })
            .collect();
        entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
        breakdowns.push(CategoryBreakdown {
            column: column.to_string(),
            entries,
        });
    }

    Ok(OutlierReport {
        score_column: score_column.to_string(),
        bounds,
        scored_count,
        outlier_count,
        numeric_summaries,
        breakdowns,
    })
}
