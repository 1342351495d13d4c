//! CLI entry point for the HR records analysis pipeline.

use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use clap::Parser;
use hr_analytics::{AnalysisPipeline, ColumnResolver, PipelineConfig, ReportWriter, render_summary};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::path::Path;
use tracing::{debug, error, info};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Statistical analysis pipeline for HR employee records",
    long_about = "Runs correlation, association, group comparison, outlier and tenure\n\
                  analyses over an HR records CSV and emits a structured report.\n\n\
                  EXAMPLES:\n  \
                  # Analyze with the default column bindings\n  \
                  hr-analytics -i hr_records.csv\n\n  \
                  # Pin the tenure reference date and save the JSON report\n  \
                  hr-analytics -i hr_records.csv --as-of 2025-01-01 --emit-report\n\n  \
                  # Preview column bindings without running anything\n  \
                  hr-analytics -i hr_records.csv --dry-run\n\n  \
                  # Machine-readable output for piping\n  \
                  hr-analytics -i hr_records.csv --json | jq .recommendations"
)]
struct Args {
    /// Path to the CSV file to analyze
    #[arg(short, long)]
    input: String,

    /// Output directory for reports
    #[arg(short, long, default_value = "./reports")]
    output: String,

    /// Column holding the ordinal performance label
    #[arg(long)]
    performance_column: Option<String>,

    /// Column holding the engagement survey score
    #[arg(long)]
    engagement_column: Option<String>,

    /// Column holding the hire date
    #[arg(long)]
    date_column: Option<String>,

    /// Reference date for tenure computation (YYYY-MM-DD)
    ///
    /// Defaults to today, which makes tenure figures drift between runs.
    #[arg(long)]
    as_of: Option<NaiveDate>,

    /// IQR multiplier for outlier fences
    #[arg(long, default_value = "1.5")]
    iqr_multiplier: f64,

    /// Preview column bindings and planned analyses without running them
    #[arg(long)]
    dry_run: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings and the final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output JSON to stdout instead of the human-readable summary
    ///
    /// Disables all progress logs; only outputs the final JSON report.
    #[arg(long)]
    json: bool,

    /// Write the JSON report to the output directory
    ///
    /// The report will be saved as <input_name>_analysis_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging (disabled if --json is set)
    init_logging(&args.log_level, args.quiet, args.json);

    if !Path::new(&args.input).exists() {
        return Err(anyhow!("Input file not found: {}", args.input));
    }

    info!("Loading dataset from: {}", args.input);
    let data = load_csv_with_fallbacks(&args.input)?;
    info!("Dataset loaded successfully: {:?}", data.shape());

    let config = build_config(&args)?;

    if args.dry_run {
        return run_dry_run(&args, &config, &data);
    }

    let pipeline = AnalysisPipeline::new(config)?;
    run_analysis(&pipeline, &args, &data)
}

/// Build the pipeline configuration from CLI overrides.
fn build_config(args: &Args) -> Result<PipelineConfig> {
    let mut builder = PipelineConfig::builder().iqr_multiplier(args.iqr_multiplier);

    if let Some(ref column) = args.performance_column {
        builder = builder.performance_column(column);
    }
    if let Some(ref column) = args.engagement_column {
        builder = builder.engagement_column(column);
    }
    if let Some(ref column) = args.date_column {
        builder = builder.date_column(column);
    }
    if let Some(as_of) = args.as_of {
        builder = builder.reference_date(as_of);
    }

    builder
        .build()
        .map_err(|e| anyhow!("Invalid configuration: {}", e))
}

/// Run dry-run mode - show column bindings and planned analyses without running them.
///
/// Note: This function uses `println!` intentionally for user-facing CLI output.
/// Unlike logging (`info!`, `debug!`), this output should always be visible
/// regardless of log level settings since it's the primary purpose of --dry-run.
fn run_dry_run(args: &Args, config: &PipelineConfig, data: &DataFrame) -> Result<()> {
    println!("\n{}", "=".repeat(80));
    println!("DRY RUN - Preview of analyses");
    println!("{}\n", "=".repeat(80));

    println!("DATASET OVERVIEW");
    println!("{}", "-".repeat(40));
    println!("  File: {}", args.input);
    println!("  Rows: {}", data.height());
    println!("  Columns: {}", data.width());
    println!();

    println!("COLUMN BINDINGS");
    println!("{}", "-".repeat(40));
    let resolution = ColumnResolver::new(&config.columns).resolve(data);

    println!(
        "{:<18} {:<26} {:<10} {:<8}",
        "Field", "Column", "Status", "Nulls"
    );
    println!("{}", "-".repeat(64));
    for binding in &resolution.columns {
        let (status, nulls) = if binding.present {
            ("present", binding.null_count.to_string())
        } else {
            ("MISSING", "-".to_string())
        };
        println!(
            "{:<18} {:<26} {:<10} {:<8}",
            binding.field,
            truncate_str(&binding.column, 25),
            status,
            nulls
        );
    }
    println!();

    println!("PLANNED ANALYSES");
    println!("{}", "-".repeat(40));
    let note = |present: bool, column: &str| {
        if present {
            String::new()
        } else {
            format!(" (will be skipped: column '{}' missing)", column)
        }
    };
    let has_performance = resolution.has(&config.columns.performance);
    let has_hire_date = resolution.has(&config.columns.hire_date);
    println!(
        "  1. Score normalization ({} -> {}){}",
        config.columns.performance,
        config.score_column,
        note(has_performance, &config.columns.performance)
    );
    println!("  2. Correlation analysis");
    println!(
        "  3. Chi-square association tests{}",
        note(has_performance, &config.columns.performance)
    );
    println!("  4. Group comparisons (one-way ANOVA)");
    println!(
        "  5. Outlier detection (IQR multiplier {}){}",
        config.iqr_multiplier,
        note(has_performance, &config.columns.performance)
    );
    println!(
        "  6. Tenure analysis{}",
        note(has_hire_date, &config.columns.hire_date)
    );
    println!("  7. Department benchmarks and recommendations");
    println!();

    println!("OUTPUT FILES (will be created)");
    println!("{}", "-".repeat(40));
    if args.emit_report {
        println!(
            "  - {}/{}_analysis_report.json",
            args.output,
            extract_file_stem(&args.input)
        );
    } else {
        println!("  No files; the summary is printed to stdout");
    }
    println!();

    println!("{}", "=".repeat(80));
    println!("To execute these analyses, run without --dry-run");
    if !args.emit_report {
        println!("Add --emit-report to save the JSON report");
    }
    println!("{}", "=".repeat(80));

    Ok(())
}

/// Truncate a string to max length with ellipsis
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len - 3])
    }
}

/// Run the pipeline and print results
fn run_analysis(pipeline: &AnalysisPipeline, args: &Args, data: &DataFrame) -> Result<()> {
    info!("{}", "=".repeat(80));
    info!("Starting HR records analysis...");
    info!("{}", "=".repeat(80));

    match pipeline.analyze(data) {
        Ok(report) => handle_output(&report, args),
        Err(e) => {
            error!("Analysis failed: {}", e);
            Err(anyhow!("Analysis failed: {}", e))
        }
    }
}

/// Handle pipeline output based on CLI flags.
///
/// Output behavior:
/// - Default: Print human-readable summary to stdout
/// - `--json`: Print JSON to stdout only (no logs)
/// - `--emit-report`: Write JSON report to file
fn handle_output(report: &hr_analytics::AnalysisReport, args: &Args) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    if args.emit_report {
        let input_stem = extract_file_stem(&args.input);
        let writer = ReportWriter::new(&args.output);
        let report_path = writer.write_report(report, &input_stem)?;
        info!("Report written to: {}", report_path.display());
    }

    println!("{}", render_summary(report));
    println!("Use --json for machine-readable output");
    if !args.emit_report {
        println!("Use --emit-report to save the JSON report");
    }
    println!("{}", "=".repeat(80));

    Ok(())
}

/// Extract the file stem (name without extension) from a path.
fn extract_file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string()
}

/// Load CSV with fallback strategies.
///
/// HR exports are frequently hand-edited; the permissive pass reads the whole
/// file before inferring types and skips rows that still fail to parse.
fn load_csv_with_fallbacks(path: &str) -> Result<DataFrame> {
    use std::path::PathBuf;

    match CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => {
            debug!("Standard loading failed: {}", e);
        }
    }

    // Permissive pass: full-file schema inference plus ignore_errors
    CsvReadOptions::default()
        .with_infer_schema_length(Some(0))
        .with_has_header(true)
        .with_ignore_errors(true)
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
        .map_err(|e| anyhow!("Failed to read CSV: {}", e))
}
