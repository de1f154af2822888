//! Options for a single ingestion run.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use clap::ValueEnum;
use encoding_rs::{Encoding, UTF_8};
use serde::{Deserialize, Serialize};

use crate::{inference::DEFAULT_MAX_VARCHAR_LENGTH, io_utils};

pub const DEFAULT_CHUNK_SIZE: usize = 10_000;

/// How validation reacts to the first offending value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[value(rename_all = "kebab-case")]
#[serde(rename_all = "snake_case")]
pub enum ErrorStrategy {
    /// Stop at the first column with an offending value and reject every row
    #[default]
    #[value(alias = "fail_fast")]
    FailFast,
    /// Check every column and reject only the offending rows
    #[value(alias = "collect_errors")]
    CollectErrors,
}

impl fmt::Display for ErrorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorStrategy::FailFast => f.write_str("fail-fast"),
            ErrorStrategy::CollectErrors => f.write_str("collect-errors"),
        }
    }
}

/// What to do when the destination already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[value(rename_all = "kebab-case")]
#[serde(rename_all = "snake_case")]
pub enum IfExists {
    Fail,
    Replace,
    #[default]
    Append,
}

#[derive(Debug, Clone)]
pub struct IngestionConfig {
    pub input: PathBuf,
    /// Database schema name used in generated DDL.
    pub schema: String,
    pub table_name: String,
    pub if_exists: IfExists,
    pub chunk_size: usize,
    pub error_strategy: ErrorStrategy,
    pub delimiter: u8,
    pub encoding: &'static Encoding,
    pub create_table: bool,
    pub primary_key: Option<String>,
    pub dedup_columns: Option<Vec<String>>,
    pub validate_types: bool,
    pub max_varchar_length: usize,
    /// Previously saved profiles to validate against instead of inferring.
    pub profiles: Option<PathBuf>,
    pub ddl_output: Option<PathBuf>,
    pub rejects_output: Option<PathBuf>,
    pub dry_run: bool,
}

impl IngestionConfig {
    pub fn new(input: impl Into<PathBuf>, schema: &str, table_name: &str) -> Self {
        let input = input.into();
        let delimiter = io_utils::resolve_input_delimiter(&input, None);
        Self {
            input,
            schema: schema.to_string(),
            table_name: table_name.to_string(),
            if_exists: IfExists::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            error_strategy: ErrorStrategy::default(),
            delimiter,
            encoding: UTF_8,
            create_table: false,
            primary_key: None,
            dedup_columns: None,
            validate_types: true,
            max_varchar_length: DEFAULT_MAX_VARCHAR_LENGTH,
            profiles: None,
            ddl_output: None,
            rejects_output: None,
            dry_run: false,
        }
    }

    /// Default report location: `<input dir>/<table>_ingestion_report.json`.
    pub fn default_report_path(&self) -> PathBuf {
        self.input
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(format!("{}_ingestion_report.json", self.table_name))
    }
}
