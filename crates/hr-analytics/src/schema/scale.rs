//! Ordinal performance scale and score normalization.
//!
//! Performance labels come out of HR systems as free text drawn from a fixed
//! review vocabulary. This module owns that vocabulary in one place and turns
//! the label column into a numeric score column the statistical analyses can
//! consume. Labels outside the vocabulary become nulls, never zeros: a zero
//! would silently drag down means and correlations.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;
use crate::utils::{frequency_counts, string_values};

/// The fixed ordinal vocabulary, highest rating first.
///
/// The gap between "Fully Meets" (4) and "Needs Improvement" (2) is part of
/// the scale: the two middle ratings are not adjacent in review practice.
pub const PERFORMANCE_SCALE: &[(&str, u8)] = &[
    ("Exceeds", 5),
    ("Fully Meets", 4),
    ("Needs Improvement", 2),
    ("PIP", 1),
];

/// Numeric score for a performance label, if it is in the vocabulary.
pub fn score_for(label: &str) -> Option<u8> {
    PERFORMANCE_SCALE
        .iter()
        .find(|(known, _)| *known == label)
        .map(|(_, score)| *score)
}

/// The label at the top of the scale.
pub fn top_label() -> &'static str {
    PERFORMANCE_SCALE[0].0
}

/// One distinct label that failed to map, with its occurrence count.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnmappedLabel {
    pub label: String,
    pub occurrences: usize,
}

/// Share of one label among the non-null labels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LabelShare {
    pub label: String,
    pub count: usize,
    /// Percentage of non-null labels, 0-100.
    pub share: f64,
}

/// Outcome of mapping the label column to numeric scores.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizationSummary {
    pub source_column: String,
    pub score_column: String,
    pub total_rows: usize,
    pub mapped_count: usize,
    pub unmapped_count: usize,
    pub null_count: usize,
    /// Distinct labels outside the vocabulary, in first-seen order.
    pub unmapped_labels: Vec<UnmappedLabel>,
    /// Distribution of all non-null labels, in first-seen order.
    pub distribution: Vec<LabelShare>,
}

/// Maps the performance label column onto the numeric scale.
pub struct ScoreNormalizer {
    source_column: String,
    score_column: String,
}

impl ScoreNormalizer {
    pub fn new(source_column: impl Into<String>, score_column: impl Into<String>) -> Self {
        Self {
            source_column: source_column.into(),
            score_column: score_column.into(),
        }
    }

    /// Build the numeric score series for the label column.
    ///
    /// Returns the new series (named after the configured score column) plus
    /// a summary of what mapped, what did not, and the label distribution.
    /// Fails with [`AnalysisError::MissingColumn`] when the label column is
    /// absent.
    pub fn normalize(&self, df: &DataFrame) -> Result<(Series, NormalizationSummary)> {
        let labels = string_values(df, &self.source_column)?;

        let mut scores: Vec<Option<f64>> = Vec::with_capacity(labels.len());
        let mut mapped_count = 0;
        let mut null_count = 0;
        let mut unmapped_raw: Vec<&str> = Vec::new();
        let mut non_null: Vec<&str> = Vec::new();

        for label in &labels {
            match label {
                None => {
                    null_count += 1;
                    scores.push(None);
                }
                Some(label) => {
                    non_null.push(label.as_str());
                    match score_for(label) {
                        Some(score) => {
                            mapped_count += 1;
                            scores.push(Some(f64::from(score)));
                        }
                        None => {
                            unmapped_raw.push(label.as_str());
                            scores.push(None);
                        }
                    }
                }
            }
        }

        let unmapped_labels: Vec<UnmappedLabel> = frequency_counts(unmapped_raw.iter().copied())
            .into_iter()
            .map(|(label, occurrences)| UnmappedLabel { label, occurrences })
            .collect();
        for unmapped in &unmapped_labels {
            warn!(
                "Performance label '{}' is outside the known vocabulary ({} occurrences), treated as missing",
                unmapped.label, unmapped.occurrences
            );
        }

        let non_null_total = non_null.len();
        let distribution: Vec<LabelShare> = frequency_counts(non_null.iter().copied())
            .into_iter()
            .map(|(label, count)| LabelShare {
                label,
                count,
                share: count as f64 / non_null_total as f64 * 100.0,
            })
            .collect();

        let summary = NormalizationSummary {
            source_column: self.source_column.clone(),
            score_column: self.score_column.clone(),
            total_rows: labels.len(),
            mapped_count,
            unmapped_count: unmapped_raw.len(),
            null_count,
            unmapped_labels,
            distribution,
        };

        let series = Series::new(self.score_column.as_str().into(), scores);
        Ok((series, summary))
    }
}
