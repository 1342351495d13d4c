//! Tenure derivation from the hire date column.
//!
//! Hire dates arrive either as a real temporal column or as strings in the
//! US month-first layout HR exports use. Tenure is the day span between hire
//! and a fixed reference date divided by 365; anchoring on a configurable
//! reference date instead of "now" keeps runs reproducible.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::analysis::stats;
use crate::error::{AnalysisError, Result};
use crate::utils::{frequency_counts, is_temporal_dtype, numeric_values};

/// Accepted string layouts, tried in order.
const DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%m/%d/%y", "%Y-%m-%d"];

/// Parse outcome counts for the hire date column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TenureStats {
    pub valid_count: usize,
    pub unparseable_count: usize,
    pub null_count: usize,
    pub mean_tenure_years: Option<f64>,
}

/// Mean score of records sharing a whole-year tenure bucket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TenureBucket {
    /// Completed years of tenure (floor).
    pub years: i64,
    pub count: usize,
    pub mean_score: f64,
}

/// Tenure analysis section of the run report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TenureReport {
    pub hire_date_column: String,
    pub tenure_column: String,
    pub reference_date: NaiveDate,
    pub valid_count: usize,
    pub unparseable_count: usize,
    pub null_count: usize,
    pub mean_tenure_years: Option<f64>,
    /// Tenure-bucket means of the normalized score, ascending by years.
    pub buckets: Vec<TenureBucket>,
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
}

/// Build the tenure-in-years series from the hire date column.
///
/// Unparseable values become nulls in the series and are reported in the
/// stats; valid records are unaffected. Fails only when the hire date column
/// itself is absent.
pub fn tenure_series(
    df: &DataFrame,
    hire_column: &str,
    tenure_column: &str,
    reference_date: NaiveDate,
) -> Result<(Series, TenureStats)> {
    let col = df
        .column(hire_column)
        .map_err(|_| AnalysisError::MissingColumn(hire_column.to_string()))?;
    let series = col.as_materialized_series();

    let mut unparseable: Vec<String> = Vec::new();
    let dates: Vec<Option<NaiveDate>> = if is_temporal_dtype(series.dtype()) {
        let casted = series.cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;
        casted
            .datetime()?
            .physical()
            .into_iter()
            .map(|opt| {
                opt.and_then(|ms| {
                    DateTime::<Utc>::from_timestamp_millis(ms).map(|dt| dt.date_naive())
                })
            })
            .collect()
    } else {
        let casted = series.cast(&DataType::String)?;
        casted
            .str()?
            .into_iter()
            .map(|opt| {
                let raw = opt?;
                let parsed = parse_date(raw);
                if parsed.is_none() {
                    unparseable.push(raw.to_string());
                }
                parsed
            })
            .collect()
    };

    for (value, occurrences) in frequency_counts(unparseable.iter().map(String::as_str)) {
        let err = AnalysisError::DateParse {
            column: hire_column.to_string(),
            value,
        };
        warn!("{err} ({occurrences} occurrences), excluded from tenure analysis");
    }

    let tenures: Vec<Option<f64>> = dates
        .iter()
        .map(|date| {
            date.map(|d| reference_date.signed_duration_since(d).num_days() as f64 / 365.0)
        })
        .collect();

    let valid: Vec<f64> = tenures.iter().copied().flatten().collect();
    let stats = TenureStats {
        valid_count: valid.len(),
        unparseable_count: unparseable.len(),
        null_count: dates.len() - valid.len() - unparseable.len(),
        mean_tenure_years: stats::mean(&valid),
    };

    Ok((Series::new(tenure_column.into(), tenures), stats))
}

/// Group normalized scores by completed years of tenure.
///
/// Buckets come back ascending by years; records missing either value are
/// excluded. Fails with a recoverable error when no record has both.
pub fn tenure_vs_score(
    df: &DataFrame,
    tenure_column: &str,
    score_column: &str,
) -> Result<Vec<TenureBucket>> {
    let tenures = numeric_values(df, tenure_column)?;
    let scores = numeric_values(df, score_column)?;

    let mut buckets: BTreeMap<i64, (f64, usize)> = BTreeMap::new();
    for (tenure, score) in tenures.into_iter().zip(scores) {
        let (Some(tenure), Some(score)) = (tenure, score) else {
            continue;
        };
        let entry = buckets.entry(tenure.floor() as i64).or_insert((0.0, 0));
        entry.0 += score;
        entry.1 += 1;
    }

    if buckets.is_empty() {
        return Err(AnalysisError::InsufficientData {
            analysis: "tenure vs performance".to_string(),
            reason: "no records with both tenure and score".to_string(),
        });
    }

    Ok(buckets
        .into_iter()
        .map(|(years, (sum, count))| TenureBucket {
            years,
            count,
            mean_score: sum / count as f64,
        })
        .collect())
}
