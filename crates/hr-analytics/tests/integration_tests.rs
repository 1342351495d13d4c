//! Integration tests for the HR records analysis pipeline.
//!
//! These tests verify end-to-end behavior of the pipeline against CSV
//! fixtures that exercise the messy parts of real HR exports: unknown
//! performance labels, blank cells, mixed date formats and malformed dates.

use chrono::NaiveDate;
use hr_analytics::{
    AnalysisPipeline, AnalysisReport, PipelineConfig, ReportWriter, render_summary,
};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::path::PathBuf;

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_csv(filename: &str) -> DataFrame {
    let path = fixtures_path().join(filename);
    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path))
        .expect("Failed to create CSV reader")
        .finish()
        .expect("Failed to read CSV file")
}

fn pinned_pipeline() -> AnalysisPipeline {
    AnalysisPipeline::builder()
        .with_reference_date(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
        .build()
        .unwrap()
}

fn analyze_pinned(filename: &str) -> AnalysisReport {
    pinned_pipeline()
        .analyze(&load_csv(filename))
        .expect("Pipeline should complete successfully")
}

// ============================================================================
// Full Report Tests
// ============================================================================

#[test]
fn test_full_report_covers_every_section() {
    let report = analyze_pinned("hr_records.csv");

    assert_eq!(report.dataset.rows, 24);
    assert_eq!(report.dataset.columns, 13);
    assert!(report.dataset.bound_columns.iter().all(|c| c.present));

    // 22 known labels, one "Exceptional", one blank cell
    let normalization = report.normalization.as_ref().unwrap();
    assert_eq!(normalization.total_rows, 24);
    assert_eq!(normalization.mapped_count, 22);
    assert_eq!(normalization.unmapped_count, 1);
    assert_eq!(normalization.null_count, 1);
    assert_eq!(normalization.unmapped_labels.len(), 1);
    assert_eq!(normalization.unmapped_labels[0].label, "Exceptional");
    let labels: Vec<&str> = normalization
        .distribution
        .iter()
        .map(|s| s.label.as_str())
        .collect();
    assert_eq!(
        labels,
        vec![
            "Fully Meets",
            "Exceeds",
            "Needs Improvement",
            "PIP",
            "Exceptional",
        ]
    );
    assert_eq!(normalization.distribution[0].count, 13);

    assert_eq!(report.correlations.pairs.len(), 3);
    let score_vs_engagement = &report.correlations.pairs[0];
    assert_eq!(score_vs_engagement.sample_size, 22);
    assert!(score_vs_engagement.coefficient.unwrap() > 0.9);
    assert_eq!(report.correlations.pairs[1].sample_size, 24);
    assert_eq!(report.correlations.matrix.as_ref().unwrap().columns.len(), 5);

    assert_eq!(report.associations.len(), 4);
    assert!(report.associations.iter().all(|a| a.chi_square.is_some()));
    let department_table = &report.associations[0].table;
    assert_eq!(
        department_table.rows,
        vec!["Production", "IT/IS", "Sales", "Admin Offices"]
    );
    assert_eq!(department_table.cols.len(), 5);
    // Production row, label columns in first-seen order
    assert_eq!(department_table.counts[0], vec![5, 1, 2, 1, 0]);

    assert_eq!(report.group_comparisons.len(), 7);
    assert!(report.group_comparisons.iter().all(|g| g.anova.is_some()));

    // "Fully Meets" dominates, so both quartiles sit on 4.0 and every
    // other score is outside the collapsed fences
    let outliers = report.outliers.as_ref().unwrap();
    assert_eq!(outliers.scored_count, 22);
    assert_eq!(outliers.outlier_count, 9);
    assert_eq!(outliers.bounds.q1, 4.0);
    assert_eq!(outliers.bounds.q3, 4.0);
    let department_breakdown = &outliers.breakdowns[0];
    assert_eq!(department_breakdown.column, "Department");
    assert_eq!(department_breakdown.entries[0].value, "Production");
    assert_eq!(department_breakdown.entries[0].count, 4);
    assert!((department_breakdown.entries[0].percentage - 44.4).abs() < 1e-9);

    // one malformed date ("13/45/2020") and one blank cell
    let tenure = report.tenure.as_ref().unwrap();
    assert_eq!(tenure.valid_count, 22);
    assert_eq!(tenure.unparseable_count, 1);
    assert_eq!(tenure.null_count, 1);
    assert!((tenure.mean_tenure_years.unwrap() - 9.8630).abs() < 1e-3);
    assert_eq!(tenure.buckets.len(), 10);
    assert_eq!(tenure.buckets[0].years, 5);
    assert_eq!(tenure.buckets[0].count, 3);

    let departments: Vec<(&str, usize)> = report
        .departments
        .iter()
        .map(|d| (d.department.as_str(), d.headcount))
        .collect();
    assert_eq!(
        departments,
        vec![
            ("Production", 10),
            ("IT/IS", 6),
            ("Sales", 5),
            ("Admin Offices", 3),
        ]
    );
    assert!((report.departments[0].mean_engagement.unwrap() - 3.35).abs() < 1e-9);

    let top = report.recommendations.top_performers.as_ref().unwrap();
    assert_eq!(top.label, "Exceeds");
    assert_eq!(top.count, 4);
    assert_eq!(top.top_department, Some("IT/IS".to_string()));
    assert_eq!(top.top_position, Some("Data Analyst".to_string()));
    assert_eq!(top.top_employment_status, Some("Active".to_string()));

    let flagged = |flags: &[hr_analytics::DepartmentFlag]| -> Vec<String> {
        flags.iter().map(|f| f.department.clone()).collect()
    };
    assert_eq!(
        flagged(&report.recommendations.low_engagement),
        vec!["Production", "Sales"]
    );
    assert_eq!(
        flagged(&report.recommendations.high_absences),
        vec!["Production", "Sales"]
    );
    assert_eq!(
        flagged(&report.recommendations.low_special_projects),
        vec!["Production", "Sales"]
    );

    assert!(report.skipped.is_empty());
}

#[test]
fn test_summary_renders_from_full_report() {
    let report = analyze_pinned("hr_records.csv");
    let rendered = render_summary(&report);

    assert!(rendered.contains("HR ANALYSIS SUMMARY"));
    assert!(rendered.contains("Dataset: 24 rows x 13 columns"));
    assert!(rendered.contains("Department Aggregates:"));
    assert!(rendered.contains("Unmapped label 'Exceptional': 1 occurrence(s)"));
}

// ============================================================================
// Degraded Input Tests
// ============================================================================

#[test]
fn test_missing_columns_degrade_gracefully() {
    // fixture lacks both the performance label and the hire date
    let report = analyze_pinned("hr_records_missing.csv");

    assert!(report.normalization.is_none());
    assert!(report.outliers.is_none());
    assert!(report.tenure.is_none());
    assert!(report.associations.is_empty());
    assert!(report.recommendations.top_performers.is_none());

    // engagement vs satisfaction and projects vs satisfaction survive
    assert_eq!(report.correlations.pairs.len(), 2);
    assert!(report.correlations.matrix.is_some());

    // only the two by-department comparisons can run
    assert_eq!(report.group_comparisons.len(), 2);

    // aggregates and their benchmark flags need no performance data
    assert_eq!(report.departments.len(), 4);
    assert!(!report.recommendations.low_engagement.is_empty());

    let skipped: Vec<&str> = report.skipped.iter().map(|s| s.analysis.as_str()).collect();
    assert!(skipped.contains(&"score normalization"));
    assert!(skipped.contains(&"categorical associations"));
    assert!(skipped.contains(&"outlier detection"));
    assert!(skipped.contains(&"tenure analysis"));
    assert!(skipped.contains(&"top performer profile"));
    assert!(
        skipped
            .iter()
            .any(|s| s.starts_with("correlation (PerformanceScoreNumeric"))
    );
    assert!(
        report
            .skipped
            .iter()
            .all(|s| s.code == "MISSING_COLUMN" || s.code == "INSUFFICIENT_DATA")
    );
}

#[test]
fn test_custom_column_bindings() {
    let config = PipelineConfig::builder()
        .performance_column("Rating")
        .engagement_column("EngagementScore")
        .date_column("HireDate")
        .reference_date(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
        .build()
        .unwrap();
    let report = AnalysisPipeline::new(config)
        .unwrap()
        .analyze(&load_csv("hr_records_renamed.csv"))
        .unwrap();

    let normalization = report.normalization.as_ref().unwrap();
    assert_eq!(normalization.source_column, "Rating");
    assert_eq!(normalization.mapped_count, 22);

    assert_eq!(report.correlations.pairs[0].column_b, "EngagementScore");
    assert_eq!(report.tenure.as_ref().unwrap().valid_count, 22);
    assert!(report.skipped.is_empty());
}

// ============================================================================
// Determinism Tests
// ============================================================================

#[test]
fn test_repeated_runs_agree() {
    use pretty_assertions::assert_eq;

    let df = load_csv("hr_records.csv");
    let pipeline = pinned_pipeline();
    let first = pipeline.analyze(&df).unwrap();
    let second = pipeline.analyze(&df).unwrap();

    // everything except the generation timestamp must match exactly
    assert_eq!(first.dataset, second.dataset);
    assert_eq!(first.normalization, second.normalization);
    assert_eq!(first.correlations, second.correlations);
    assert_eq!(first.associations, second.associations);
    assert_eq!(first.group_comparisons, second.group_comparisons);
    assert_eq!(first.outliers, second.outliers);
    assert_eq!(first.tenure, second.tenure);
    assert_eq!(first.departments, second.departments);
    assert_eq!(first.recommendations, second.recommendations);
    assert_eq!(first.skipped, second.skipped);
}

#[test]
fn test_reference_date_shifts_tenure() {
    let df = load_csv("hr_records.csv");
    let report_2025 = pinned_pipeline().analyze(&df).unwrap();
    let report_2026 = AnalysisPipeline::builder()
        .with_reference_date(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap())
        .build()
        .unwrap()
        .analyze(&df)
        .unwrap();

    let mean_2025 = report_2025.tenure.unwrap().mean_tenure_years.unwrap();
    let mean_2026 = report_2026.tenure.unwrap().mean_tenure_years.unwrap();
    // Jan 1 to Jan 1 across a non-leap year is exactly 365 days
    assert!((mean_2026 - mean_2025 - 1.0).abs() < 1e-9);
}

// ============================================================================
// Report File Tests
// ============================================================================

#[test]
fn test_written_report_round_trips() {
    let report = analyze_pinned("hr_records.csv");

    let dir = std::env::temp_dir().join(format!("hr-analytics-test-{}", std::process::id()));
    let writer = ReportWriter::new(&dir);
    let path = writer.write_report(&report, "hr_records").unwrap();
    assert_eq!(
        path.file_name().unwrap().to_str().unwrap(),
        "hr_records_analysis_report.json"
    );

    let raw = std::fs::read_to_string(&path).unwrap();
    let restored: AnalysisReport = serde_json::from_str(&raw).unwrap();
    assert_eq!(restored.normalization, report.normalization);
    assert_eq!(restored.departments, report.departments);
    assert_eq!(restored.recommendations, report.recommendations);

    std::fs::remove_dir_all(&dir).ok();
}
