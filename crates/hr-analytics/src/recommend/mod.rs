//! Rule-based recommendations from department aggregates.
//!
//! The rules are deliberately simple benchmark comparisons: a department is
//! flagged when its mean sits strictly on the wrong side of the unweighted
//! mean of department means. Using the mean of means keeps one huge
//! department from dragging the benchmark toward itself and hiding every
//! other department.

use std::collections::HashMap;

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::ColumnBindings;
use crate::error::Result;
use crate::schema::top_label;
use crate::utils::{mode, numeric_values, string_values};

const METRIC_COUNT: usize = 5;

/// Per-department means over the analysis metrics.
///
/// A `None` mean says the department had no usable values for that metric
/// (or the column is absent entirely); such departments sit out the rules
/// for that metric instead of being counted as zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DepartmentAggregate {
    pub department: String,
    /// Records bound to the department, nulls in the metrics included.
    pub headcount: usize,
    pub mean_engagement: Option<f64>,
    pub mean_satisfaction: Option<f64>,
    pub mean_absences: Option<f64>,
    pub mean_days_late: Option<f64>,
    pub mean_special_projects: Option<f64>,
}

/// A department flagged by one rule, with the benchmark it was held against.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DepartmentFlag {
    pub department: String,
    /// The department's own mean for the rule metric.
    pub value: f64,
    /// Unweighted mean of department means for the rule metric.
    pub benchmark: f64,
}

/// Flag lists for the three department rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DepartmentFlags {
    pub low_engagement: Vec<DepartmentFlag>,
    pub high_absences: Vec<DepartmentFlag>,
    pub low_special_projects: Vec<DepartmentFlag>,
}

/// Who the top performers are, as modes over their categorical fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopPerformerSummary {
    /// The label at the top of the scale.
    pub label: String,
    pub count: usize,
    pub top_department: Option<String>,
    pub top_position: Option<String>,
    pub top_employment_status: Option<String>,
}

/// Recommendation section of the run report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationReport {
    pub top_performers: Option<TopPerformerSummary>,
    pub low_engagement: Vec<DepartmentFlag>,
    pub high_absences: Vec<DepartmentFlag>,
    pub low_special_projects: Vec<DepartmentFlag>,
}

impl RecommendationReport {
    pub fn assemble(top_performers: Option<TopPerformerSummary>, flags: DepartmentFlags) -> Self {
        Self {
            top_performers,
            low_engagement: flags.low_engagement,
            high_absences: flags.high_absences,
            low_special_projects: flags.low_special_projects,
        }
    }
}

fn optional_numeric(df: &DataFrame, column: &str) -> Option<Vec<Option<f64>>> {
    df.column(column).ok()?;
    numeric_values(df, column).ok()
}

/// Compute per-department means over the five analysis metrics.
///
/// Departments appear in first-seen order. Metric columns absent from the
/// table yield `None` means across the board rather than failing the whole
/// aggregation; only a missing department column is an error.
pub fn department_aggregates(
    df: &DataFrame,
    bindings: &ColumnBindings,
) -> Result<Vec<DepartmentAggregate>> {
    let departments = string_values(df, &bindings.department)?;

    let metrics: [Option<Vec<Option<f64>>>; METRIC_COUNT] = [
        optional_numeric(df, &bindings.engagement),
        optional_numeric(df, &bindings.satisfaction),
        optional_numeric(df, &bindings.absences),
        optional_numeric(df, &bindings.days_late),
        optional_numeric(df, &bindings.special_projects),
    ];

    struct Acc {
        headcount: usize,
        sums: [f64; METRIC_COUNT],
        counts: [usize; METRIC_COUNT],
    }

    let mut order: Vec<String> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut accs: Vec<Acc> = Vec::new();

    for (row, department) in departments.into_iter().enumerate() {
        let Some(department) = department else {
            continue;
        };
        let i = match index.get(&department) {
            Some(&i) => i,
            None => {
                let i = order.len();
                order.push(department.clone());
                index.insert(department, i);
                accs.push(Acc {
                    headcount: 0,
                    sums: [0.0; METRIC_COUNT],
                    counts: [0; METRIC_COUNT],
                });
                i
            }
        };
        accs[i].headcount += 1;
        for (m, metric) in metrics.iter().enumerate() {
            if let Some(values) = metric
                && let Some(value) = values[row]
            {
                accs[i].sums[m] += value;
                accs[i].counts[m] += 1;
            }
        }
    }

    let metric_mean = |acc: &Acc, m: usize| -> Option<f64> {
        (acc.counts[m] > 0).then(|| acc.sums[m] / acc.counts[m] as f64)
    };

    Ok(order
        .into_iter()
        .zip(&accs)
        .map(|(department, acc)| DepartmentAggregate {
            department,
            headcount: acc.headcount,
            mean_engagement: metric_mean(acc, 0),
            mean_satisfaction: metric_mean(acc, 1),
            mean_absences: metric_mean(acc, 2),
            mean_days_late: metric_mean(acc, 3),
            mean_special_projects: metric_mean(acc, 4),
        })
        .collect())
}

#[derive(Clone, Copy)]
enum Direction {
    Below,
    Above,
}

fn flag_against_benchmark<F>(
    aggregates: &[DepartmentAggregate],
    metric: F,
    direction: Direction,
) -> Vec<DepartmentFlag>
where
    F: Fn(&DepartmentAggregate) -> Option<f64>,
{
    let with_values: Vec<(&str, f64)> = aggregates
        .iter()
        .filter_map(|agg| metric(agg).map(|value| (agg.department.as_str(), value)))
        .collect();
    if with_values.is_empty() {
        return Vec::new();
    }

    let benchmark =
        with_values.iter().map(|(_, value)| value).sum::<f64>() / with_values.len() as f64;

    with_values
        .into_iter()
        .filter(|(_, value)| match direction {
            Direction::Below => *value < benchmark,
            Direction::Above => *value > benchmark,
        })
        .map(|(department, value)| DepartmentFlag {
            department: department.to_string(),
            value,
            benchmark,
        })
        .collect()
}

/// Apply the three department rules to the aggregates.
pub fn department_flags(aggregates: &[DepartmentAggregate]) -> DepartmentFlags {
    DepartmentFlags {
        low_engagement: flag_against_benchmark(aggregates, |a| a.mean_engagement, Direction::Below),
        high_absences: flag_against_benchmark(aggregates, |a| a.mean_absences, Direction::Above),
        low_special_projects: flag_against_benchmark(
            aggregates,
            |a| a.mean_special_projects,
            Direction::Below,
        ),
    }
}

fn mode_among(df: &DataFrame, column: &str, selected: &[bool]) -> Option<String> {
    let values = string_values(df, column).ok()?;
    mode(
        values
            .iter()
            .zip(selected)
            .filter(|(_, sel)| **sel)
            .filter_map(|(value, _)| value.as_deref()),
    )
}

/// Profile the records carrying the top label of the scale.
///
/// The dominant department/position/status are modes over the top-performer
/// subset; ties resolve to the lexicographically smallest value so runs stay
/// deterministic. Fails when the performance column is absent.
pub fn top_performer_summary(
    df: &DataFrame,
    bindings: &ColumnBindings,
) -> Result<TopPerformerSummary> {
    let labels = string_values(df, &bindings.performance)?;
    let selected: Vec<bool> = labels
        .iter()
        .map(|label| label.as_deref() == Some(top_label()))
        .collect();
    let count = selected.iter().filter(|sel| **sel).count();

    Ok(TopPerformerSummary {
        label: top_label().to_string(),
        count,
        top_department: mode_among(df, &bindings.department, &selected),
        top_position: mode_among(df, &bindings.position, &selected),
        top_employment_status: mode_among(df, &bindings.employment_status, &selected),
    })
}
