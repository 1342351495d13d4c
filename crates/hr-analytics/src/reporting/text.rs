//! Sectioned text rendering of the run report.

use std::fmt::Write as _;

use crate::types::AnalysisReport;

const MAX_GROUP_LINES: usize = 8;

fn banner(out: &mut String, title: &str) {
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", "=".repeat(80));
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{}", "=".repeat(80));
}

fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => "-".to_string(),
    }
}

/// Render the report as the human-readable summary the CLI prints.
pub fn render_summary(report: &AnalysisReport) -> String {
    let mut out = String::new();

    banner(&mut out, "HR ANALYSIS SUMMARY");
    let _ = writeln!(
        out,
        "Dataset: {} rows x {} columns",
        report.dataset.rows, report.dataset.columns
    );
    let missing: Vec<String> = report
        .dataset
        .bound_columns
        .iter()
        .filter(|c| !c.present)
        .map(|c| format!("{} -> {}", c.field, c.column))
        .collect();
    if !missing.is_empty() {
        let _ = writeln!(out, "Missing bindings: {}", missing.join(", "));
    }

    if let Some(normalization) = &report.normalization {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Performance Normalization ({} -> {}):",
            normalization.source_column, normalization.score_column
        );
        let _ = writeln!(
            out,
            "  Mapped: {} / {} labels ({} unmapped, {} missing)",
            normalization.mapped_count,
            normalization.total_rows,
            normalization.unmapped_count,
            normalization.null_count
        );
        for share in &normalization.distribution {
            let _ = writeln!(
                out,
                "    {}: {} ({:.1}%)",
                share.label, share.count, share.share
            );
        }
        for unmapped in &normalization.unmapped_labels {
            let _ = writeln!(
                out,
                "  Unmapped label '{}': {} occurrence(s)",
                unmapped.label, unmapped.occurrences
            );
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Correlations:");
    for pair in &report.correlations.pairs {
        match pair.coefficient {
            Some(r) => {
                let _ = writeln!(
                    out,
                    "  {} vs {}: r = {:.3} (n = {})",
                    pair.column_a, pair.column_b, r, pair.sample_size
                );
            }
            None => {
                let _ = writeln!(
                    out,
                    "  {} vs {}: not computable (n = {})",
                    pair.column_a, pair.column_b, pair.sample_size
                );
            }
        }
    }

    if !report.associations.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Associations with the performance label:");
        for association in &report.associations {
            match &association.chi_square {
                Some(chi) => {
                    let _ = writeln!(
                        out,
                        "  {}: chi2 = {:.2}, dof = {}, p = {:.4} ({})",
                        association.table.row_column,
                        chi.statistic,
                        chi.degrees_of_freedom,
                        chi.p_value,
                        if chi.significant {
                            "significant"
                        } else {
                            "not significant"
                        }
                    );
                }
                None => {
                    let _ = writeln!(
                        out,
                        "  {}: test skipped",
                        association.table.row_column
                    );
                }
            }
        }
    }

    if !report.group_comparisons.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Group Comparisons:");
        for comparison in &report.group_comparisons {
            match &comparison.anova {
                Some(anova) => {
                    let _ = writeln!(
                        out,
                        "  {} by {}: F = {:.2}, p = {:.4} ({})",
                        comparison.value_column,
                        comparison.group_column,
                        anova.f_statistic,
                        anova.p_value,
                        if anova.significant {
                            "significant"
                        } else {
                            "not significant"
                        }
                    );
                }
                None => {
                    let _ = writeln!(
                        out,
                        "  {} by {}: ANOVA skipped",
                        comparison.value_column, comparison.group_column
                    );
                }
            }
            for group in comparison.groups.iter().take(MAX_GROUP_LINES) {
                let _ = writeln!(
                    out,
                    "    {}: mean {:.2} (n = {})",
                    group.group, group.mean, group.count
                );
            }
            if comparison.groups.len() > MAX_GROUP_LINES {
                let _ = writeln!(
                    out,
                    "    ... and {} more",
                    comparison.groups.len() - MAX_GROUP_LINES
                );
            }
        }
    }

    if let Some(outliers) = &report.outliers {
        let _ = writeln!(out);
        let _ = writeln!(out, "Outlier Detection ({}):", outliers.score_column);
        let _ = writeln!(
            out,
            "  Bounds: [{:.2}, {:.2}] (Q1 = {:.2}, Q3 = {:.2}, IQR = {:.2})",
            outliers.bounds.lower,
            outliers.bounds.upper,
            outliers.bounds.q1,
            outliers.bounds.q3,
            outliers.bounds.iqr
        );
        let _ = writeln!(
            out,
            "  Outliers: {} of {} scored records",
            outliers.outlier_count, outliers.scored_count
        );
        for summary in &outliers.numeric_summaries {
            let _ = writeln!(
                out,
                "  {} among outliers: mean {} (n = {})",
                summary.column,
                fmt_opt(summary.mean),
                summary.count
            );
        }
        for breakdown in &outliers.breakdowns {
            let _ = writeln!(out, "  {} breakdown:", breakdown.column);
            for entry in &breakdown.entries {
                let _ = writeln!(
                    out,
                    "    {}: {} ({:.1}%)",
                    entry.value, entry.count, entry.percentage
                );
            }
        }
    }

    if let Some(tenure) = &report.tenure {
        let _ = writeln!(out);
        let _ = writeln!(out, "Tenure (as of {}):", tenure.reference_date);
        let _ = writeln!(
            out,
            "  Valid: {}, unparseable: {}, missing: {}",
            tenure.valid_count, tenure.unparseable_count, tenure.null_count
        );
        let _ = writeln!(
            out,
            "  Mean tenure: {} years",
            fmt_opt(tenure.mean_tenure_years)
        );
        if !tenure.buckets.is_empty() {
            let _ = writeln!(out, "  Score by completed years:");
            for bucket in &tenure.buckets {
                let _ = writeln!(
                    out,
                    "    {} year(s): mean {:.2} (n = {})",
                    bucket.years, bucket.mean_score, bucket.count
                );
            }
        }
    }

    if !report.departments.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Department Aggregates:");
        for department in &report.departments {
            let _ = writeln!(
                out,
                "  {} (n = {}): engagement {}, satisfaction {}, absences {}, days late {}, projects {}",
                department.department,
                department.headcount,
                fmt_opt(department.mean_engagement),
                fmt_opt(department.mean_satisfaction),
                fmt_opt(department.mean_absences),
                fmt_opt(department.mean_days_late),
                fmt_opt(department.mean_special_projects)
            );
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Recommendations:");
    match &report.recommendations.top_performers {
        Some(top) => {
            let profile: Vec<&str> = [
                top.top_department.as_deref(),
                top.top_position.as_deref(),
                top.top_employment_status.as_deref(),
            ]
            .into_iter()
            .flatten()
            .collect();
            let _ = writeln!(
                out,
                "  Top performers ({}): {} record(s){}",
                top.label,
                top.count,
                if profile.is_empty() {
                    String::new()
                } else {
                    format!("; dominant profile: {}", profile.join(" / "))
                }
            );
        }
        None => {
            let _ = writeln!(out, "  Top performers: unavailable");
        }
    }
    for (title, flags) in [
        ("Below-benchmark engagement", &report.recommendations.low_engagement),
        ("Above-benchmark absences", &report.recommendations.high_absences),
        (
            "Below-benchmark special projects",
            &report.recommendations.low_special_projects,
        ),
    ] {
        if flags.is_empty() {
            let _ = writeln!(out, "  {title}: none");
        } else {
            let rendered: Vec<String> = flags
                .iter()
                .map(|f| format!("{} ({:.2} vs {:.2})", f.department, f.value, f.benchmark))
                .collect();
            let _ = writeln!(out, "  {title}: {}", rendered.join(", "));
        }
    }

    if !report.skipped.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Skipped Analyses:");
        for skip in &report.skipped {
            let _ = writeln!(out, "  {} [{}]: {}", skip.analysis, skip.code, skip.reason);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{CorrelationResult, OutlierBounds, OutlierReport};
    use crate::recommend::{DepartmentFlag, RecommendationReport, TopPerformerSummary};
    use crate::types::{CorrelationSection, DatasetSummary, SkippedAnalysis};

    fn minimal_report() -> AnalysisReport {
        AnalysisReport {
            generated_at: "2025-01-01T00:00:00+00:00".to_string(),
            dataset: DatasetSummary {
                rows: 12,
                columns: 11,
                bound_columns: Vec::new(),
            },
            normalization: None,
            correlations: CorrelationSection {
                pairs: vec![
                    CorrelationResult {
                        column_a: "PerformanceScoreNumeric".to_string(),
                        column_b: "EngagementSurvey".to_string(),
                        coefficient: Some(0.593),
                        sample_size: 12,
                    },
                    CorrelationResult {
                        column_a: "SpecialProjectsCount".to_string(),
                        column_b: "EmpSatisfaction".to_string(),
                        coefficient: None,
                        sample_size: 1,
                    },
                ],
                matrix: None,
            },
            associations: Vec::new(),
            group_comparisons: Vec::new(),
            outliers: Some(OutlierReport {
                score_column: "PerformanceScoreNumeric".to_string(),
                bounds: OutlierBounds {
                    q1: 3.5,
                    q3: 4.25,
                    iqr: 0.75,
                    lower: 2.375,
                    upper: 5.375,
                },
                scored_count: 12,
                outlier_count: 3,
                numeric_summaries: Vec::new(),
                breakdowns: Vec::new(),
            }),
            tenure: None,
            departments: Vec::new(),
            recommendations: RecommendationReport {
                top_performers: Some(TopPerformerSummary {
                    label: "Exceeds".to_string(),
                    count: 3,
                    top_department: Some("IT/IS".to_string()),
                    top_position: None,
                    top_employment_status: Some("Active".to_string()),
                }),
                low_engagement: vec![DepartmentFlag {
                    department: "Production".to_string(),
                    value: 3.34,
                    benchmark: 3.91,
                }],
                high_absences: Vec::new(),
                low_special_projects: Vec::new(),
            },
            skipped: vec![SkippedAnalysis {
                analysis: "tenure analysis".to_string(),
                code: "MISSING_COLUMN".to_string(),
                reason: "Column 'DateofHire' not found in dataset".to_string(),
            }],
        }
    }

    // ==================== rendering tests ====================

    #[test]
    fn test_render_summary_sections() {
        let rendered = render_summary(&minimal_report());

        assert!(rendered.contains("HR ANALYSIS SUMMARY"));
        assert!(rendered.contains("Dataset: 12 rows x 11 columns"));
        assert!(rendered.contains("PerformanceScoreNumeric vs EngagementSurvey: r = 0.593"));
        assert!(rendered.contains("SpecialProjectsCount vs EmpSatisfaction: not computable"));
        assert!(rendered.contains("Outliers: 3 of 12 scored records"));
        assert!(rendered.contains("Top performers (Exceeds): 3 record(s)"));
        assert!(rendered.contains("dominant profile: IT/IS / Active"));
        assert!(rendered.contains("Below-benchmark engagement: Production (3.34 vs 3.91)"));
        assert!(rendered.contains("Above-benchmark absences: none"));
        assert!(rendered.contains("tenure analysis [MISSING_COLUMN]"));
    }

    #[test]
    fn test_render_summary_no_optional_sections() {
        let mut report = minimal_report();
        report.outliers = None;
        report.recommendations.top_performers = None;
        report.skipped.clear();
        let rendered = render_summary(&report);

        assert!(!rendered.contains("Outlier Detection"));
        assert!(rendered.contains("Top performers: unavailable"));
        assert!(!rendered.contains("Skipped Analyses"));
    }
}
