//! Ingestion report assembly and JSON persistence.
//!
//! The report keeps complete data; caps and rounding are applied only when
//! it is rendered: five sample values per column, the first hundred
//! validation issues, two decimals for percentages, averages, and timing.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    data::{SourceKind, Value},
    profile::ColumnProfile,
    validation::{IssueKind, ValidationOutcome},
};

const REPORT_SAMPLE_LIMIT: usize = 5;
const REPORT_ISSUE_LIMIT: usize = 100;

#[derive(Debug, Clone)]
pub struct IngestionReport {
    pub timestamp: DateTime<Utc>,
    pub csv_path: String,
    pub schema: String,
    pub table_name: String,
    pub total_rows_csv: usize,
    pub duplicates_removed: usize,
    pub rows_inserted: usize,
    pub rows_failed: usize,
    pub duration_seconds: f64,
    pub dry_run: bool,
    pub column_analyses: Vec<ColumnProfile>,
    pub validation_result: Option<ValidationOutcome>,
    pub ddl_generated: Option<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ReportDocument<'a> {
    timestamp: String,
    csv_path: &'a str,
    schema: &'a str,
    table_name: &'a str,
    total_rows_csv: usize,
    duplicates_removed: usize,
    rows_inserted: usize,
    rows_failed: usize,
    duration_seconds: f64,
    dry_run: bool,
    column_analyses: Vec<ColumnSummary<'a>>,
    validation_result: Option<ValidationSummary<'a>>,
    ddl_generated: Option<&'a str>,
    warnings: &'a [String],
}

#[derive(Debug, Serialize)]
struct ColumnSummary<'a> {
    name: &'a str,
    source_kind: SourceKind,
    sql_type_suggested: String,
    null_count: usize,
    null_percentage: f64,
    total_rows: usize,
    unique_count: usize,
    sample_values: &'a [Value],
    min_value: Option<f64>,
    max_value: Option<f64>,
    avg_length: Option<f64>,
    max_length: Option<usize>,
}

#[derive(Debug, Serialize)]
struct ValidationSummary<'a> {
    is_valid: bool,
    valid_rows_count: usize,
    invalid_rows_count: usize,
    total_errors: usize,
    errors: Vec<IssueSummary<'a>>,
}

#[derive(Debug, Serialize)]
struct IssueSummary<'a> {
    row_index: usize,
    column: &'a str,
    value: String,
    expected_type: String,
    kind: IssueKind,
    error_message: &'a str,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl<'a> From<&'a ColumnProfile> for ColumnSummary<'a> {
    fn from(profile: &'a ColumnProfile) -> Self {
        let samples = &profile.sample_values;
        Self {
            name: &profile.name,
            source_kind: profile.source_kind,
            sql_type_suggested: profile.inferred_type.to_string(),
            null_count: profile.null_count,
            null_percentage: round2(profile.null_percentage),
            total_rows: profile.total_count,
            unique_count: profile.distinct_count,
            sample_values: &samples[..samples.len().min(REPORT_SAMPLE_LIMIT)],
            min_value: profile.min_value,
            max_value: profile.max_value,
            avg_length: profile.avg_length.map(round2),
            max_length: profile.max_length,
        }
    }
}

impl<'a> From<&'a ValidationOutcome> for ValidationSummary<'a> {
    fn from(outcome: &'a ValidationOutcome) -> Self {
        Self {
            is_valid: outcome.is_valid,
            valid_rows_count: outcome.valid_rows_count,
            invalid_rows_count: outcome.invalid_rows_count,
            total_errors: outcome.issues.len(),
            errors: outcome
                .issues
                .iter()
                .take(REPORT_ISSUE_LIMIT)
                .map(|issue| IssueSummary {
                    row_index: issue.row_index,
                    column: &issue.column,
                    value: issue.value.as_display(),
                    expected_type: issue.expected_type.to_string(),
                    kind: issue.kind,
                    error_message: &issue.message,
                })
                .collect(),
        }
    }
}

impl IngestionReport {
    fn document(&self) -> ReportDocument<'_> {
        ReportDocument {
            timestamp: self.timestamp.to_rfc3339(),
            csv_path: &self.csv_path,
            schema: &self.schema,
            table_name: &self.table_name,
            total_rows_csv: self.total_rows_csv,
            duplicates_removed: self.duplicates_removed,
            rows_inserted: self.rows_inserted,
            rows_failed: self.rows_failed,
            duration_seconds: round2(self.duration_seconds),
            dry_run: self.dry_run,
            column_analyses: self.column_analyses.iter().map(ColumnSummary::from).collect(),
            validation_result: self.validation_result.as_ref().map(ValidationSummary::from),
            ddl_generated: self.ddl_generated.as_deref(),
            warnings: &self.warnings,
        }
    }

    pub fn to_json_value(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self.document()).context("Serializing ingestion report")
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.document()).context("Serializing ingestion report")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("Creating report directory {parent:?}"))?;
        }
        fs::write(path, self.to_json()?).with_context(|| format!("Writing report {path:?}"))
    }
}

/// Formats a duration as `2.50s`, `2m 30.0s`, or `1h 2m 3s`.
pub fn format_duration(seconds: f64) -> String {
    if seconds < 60.0 {
        return format!("{seconds:.2}s");
    }
    let minutes = (seconds / 60.0).floor() as u64;
    let remaining_seconds = seconds % 60.0;
    if minutes < 60 {
        return format!("{minutes}m {remaining_seconds:.1}s");
    }
    let hours = minutes / 60;
    let remaining_minutes = minutes % 60;
    format!("{hours}h {remaining_minutes}m {remaining_seconds:.0}s")
}
