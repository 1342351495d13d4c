//! Group comparisons: per-category means and one-way ANOVA.
//!
//! A comparison takes one numeric column and one categorical column, drops
//! records where either is null, and groups the rest in first-seen category
//! order. The ANOVA tests whether the group means differ more than the
//! within-group spread explains.

use std::collections::HashMap;

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, FisherSnedecor};

use crate::analysis::{SIGNIFICANCE_LEVEL, stats};
use crate::error::{AnalysisError, Result};
use crate::utils::{numeric_values, string_values};

/// Mean and spread of one category's values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupStat {
    pub group: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; `None` below two observations.
    pub std_dev: Option<f64>,
}

/// One-way ANOVA outcome.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnovaResult {
    pub f_statistic: f64,
    pub p_value: f64,
    pub df_between: usize,
    pub df_within: usize,
    pub significant: bool,
}

fn collect_groups(
    df: &DataFrame,
    value_column: &str,
    group_column: &str,
) -> Result<Vec<(String, Vec<f64>)>> {
    let values = numeric_values(df, value_column)?;
    let groups = string_values(df, group_column)?;

    let mut order: Vec<String> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut collected: Vec<Vec<f64>> = Vec::new();

    for (group, value) in groups.into_iter().zip(values) {
        let (Some(group), Some(value)) = (group, value) else {
            continue;
        };
        let i = match index.get(&group) {
            Some(&i) => i,
            None => {
                let i = order.len();
                order.push(group.clone());
                index.insert(group, i);
                collected.push(Vec::new());
                i
            }
        };
        collected[i].push(value);
    }

    Ok(order.into_iter().zip(collected).collect())
}

/// Mean, count and spread of a numeric column per category.
///
/// Categories appear in first-seen record order. Records where either column
/// is null are excluded.
pub fn group_means(df: &DataFrame, value_column: &str, group_column: &str) -> Result<Vec<GroupStat>> {
    let groups = collect_groups(df, value_column, group_column)?;
    Ok(groups
        .into_iter()
        .map(|(group, values)| GroupStat {
            group,
            count: values.len(),
            mean: stats::mean(&values).unwrap_or(0.0),
            std_dev: stats::sample_std(&values),
        })
        .collect())
}

/// One-way ANOVA of a numeric column across categories.
///
/// Degenerate inputs are recoverable errors: fewer than two groups, no
/// residual degrees of freedom, or zero within-group variance.
pub fn one_way_anova(df: &DataFrame, value_column: &str, group_column: &str) -> Result<AnovaResult> {
    let groups = collect_groups(df, value_column, group_column)?;
    let analysis = || format!("ANOVA ({value_column} by {group_column})");

    let k = groups.len();
    if k < 2 {
        return Err(AnalysisError::InsufficientData {
            analysis: analysis(),
            reason: format!("found {k} group(s), need at least 2"),
        });
    }

    let n: usize = groups.iter().map(|(_, values)| values.len()).sum();
    if n <= k {
        return Err(AnalysisError::InsufficientData {
            analysis: analysis(),
            reason: format!("{n} observations across {k} groups leave no residual degrees of freedom"),
        });
    }

    let grand_sum: f64 = groups
        .iter()
        .map(|(_, values)| values.iter().sum::<f64>())
        .sum();
    let grand_mean = grand_sum / n as f64;

    let mut ss_between = 0.0;
    let mut ss_within = 0.0;
    for (_, values) in &groups {
        let group_mean = values.iter().sum::<f64>() / values.len() as f64;
        ss_between += values.len() as f64 * (group_mean - grand_mean).powi(2);
        ss_within += values.iter().map(|v| (v - group_mean).powi(2)).sum::<f64>();
    }

    if ss_within == 0.0 {
        return Err(AnalysisError::InsufficientData {
            analysis: analysis(),
            reason: "zero within-group variance".to_string(),
        });
    }

    let df_between = k - 1;
    let df_within = n - k;
    let ms_between = ss_between / df_between as f64;
    let ms_within = ss_within / df_within as f64;
    let f_statistic = ms_between / ms_within;

    let dist = FisherSnedecor::new(df_between as f64, df_within as f64).map_err(|_| {
        AnalysisError::InsufficientData {
            analysis: analysis(),
            reason: "invalid degrees of freedom".to_string(),
        }
    })?;
    let p_value = 1.0 - dist.cdf(f_statistic);

    Ok(AnovaResult {
        f_statistic,
        p_value,
        df_between,
        df_within,
        significant: p_value < SIGNIFICANCE_LEVEL,
    })
}
