use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{DEFAULT_CHUNK_SIZE, ErrorStrategy, IfExists};
use crate::inference::DEFAULT_MAX_VARCHAR_LENGTH;

#[derive(Debug, Parser)]
#[command(author, version, about = "Ingest CSV files with SQL type inference and validation", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Profile a CSV file, suggest SQL types, and print CREATE TABLE DDL
    Analyze(AnalyzeArgs),
    /// Validate a CSV file against inferred types and write the valid rows
    Ingest(IngestArgs),
}

#[derive(Debug, Args)]
pub struct InputArgs {
    /// Input CSV file ('-' reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Database schema used in generated DDL
    #[arg(long, default_value = "public")]
    pub schema: String,
    /// Destination table name
    #[arg(short = 't', long = "table")]
    pub table: String,
    /// Longest string length typed as VARCHAR(n) before falling back to TEXT
    #[arg(long = "max-varchar-length", default_value_t = DEFAULT_MAX_VARCHAR_LENGTH)]
    pub max_varchar_length: usize,
    /// Primary key column added to generated DDL
    #[arg(long = "primary-key")]
    pub primary_key: Option<String>,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub source: InputArgs,
    /// Write the inferred column profiles to this YAML file
    #[arg(long = "profiles-out")]
    pub profiles_out: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct IngestArgs {
    #[command(flatten)]
    pub source: InputArgs,
    /// Destination CSV file receiving the valid rows
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
    /// Behaviour when the destination already exists
    #[arg(long = "if-exists", value_enum, default_value_t = IfExists::Append)]
    pub if_exists: IfExists,
    /// Rows written per batch
    #[arg(long = "chunk-size", default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,
    /// Validation error handling
    #[arg(long = "error-strategy", value_enum, default_value_t = ErrorStrategy::FailFast)]
    pub error_strategy: ErrorStrategy,
    /// Generate CREATE TABLE DDL for the destination
    #[arg(long = "create-table")]
    pub create_table: bool,
    /// File receiving the generated DDL (implies --create-table)
    #[arg(long = "ddl-out")]
    pub ddl_out: Option<PathBuf>,
    /// Columns defining row uniqueness for deduplication
    #[arg(long = "dedup-columns", value_delimiter = ',', num_args = 0..)]
    pub dedup_columns: Option<Vec<String>>,
    /// Skip type validation and trust the inferred types
    #[arg(long = "no-validate")]
    pub no_validate: bool,
    /// Validate against a saved profile file instead of inferring types
    #[arg(long = "profiles")]
    pub profiles: Option<PathBuf>,
    /// File receiving rows rejected by validation
    #[arg(long = "rejects")]
    pub rejects: Option<PathBuf>,
    /// JSON report path (defaults to <input dir>/<table>_ingestion_report.json)
    #[arg(long = "report")]
    pub report: Option<PathBuf>,
    /// Analyze and validate without writing any rows
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
