//! Shared utilities for the HR analysis pipeline.
//!
//! This module contains common helper functions used across multiple modules
//! to reduce code duplication and ensure consistency.

use std::collections::HashMap;

use polars::prelude::*;

use crate::error::{AnalysisError, Result, ResultExt};

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a date or datetime type.
#[inline]
pub fn is_temporal_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Datetime(_, _) | DataType::Date)
}

// =============================================================================
// Column Extraction
// =============================================================================

/// Extract a column as `f64` values, preserving null positions.
///
/// Non-numeric columns are coerced: string cells that fail to parse as a
/// number become null rather than aborting the analysis.
pub fn numeric_values(df: &DataFrame, column: &str) -> Result<Vec<Option<f64>>> {
    let col = df
        .column(column)
        .map_err(|_| AnalysisError::MissingColumn(column.to_string()))?;
    let casted = col
        .as_materialized_series()
        .cast(&DataType::Float64)
        .context(format!("casting column '{column}' to f64"))?;
    Ok(casted.f64()?.into_iter().collect())
}

/// Extract a column as `f64` values with nulls dropped.
pub fn non_null_numeric(df: &DataFrame, column: &str) -> Result<Vec<f64>> {
    Ok(numeric_values(df, column)?.into_iter().flatten().collect())
}

/// Extract a column as owned strings, preserving null positions.
pub fn string_values(df: &DataFrame, column: &str) -> Result<Vec<Option<String>>> {
    let col = df
        .column(column)
        .map_err(|_| AnalysisError::MissingColumn(column.to_string()))?;
    let casted = col
        .as_materialized_series()
        .cast(&DataType::String)
        .context(format!("casting column '{column}' to string"))?;
    Ok(casted
        .str()?
        .into_iter()
        .map(|opt| opt.map(str::to_string))
        .collect())
}

// =============================================================================
// Frequency Utilities
// =============================================================================

/// Count occurrences of each distinct value, in first-seen order.
pub fn frequency_counts<'a, I>(values: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for value in values {
        if !counts.contains_key(value) {
            order.push(value.to_string());
        }
        *counts.entry(value.to_string()).or_insert(0) += 1;
    }
    order
        .into_iter()
        .map(|value| {
            let count = counts[&value];
            (value, count)
        })
        .collect()
}

/// Most frequent value; ties resolve to the lexicographically smallest.
pub fn mode<'a, I>(values: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(value, _)| value.to_string())
}
