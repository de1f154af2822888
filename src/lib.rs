pub mod cli;
pub mod config;
pub mod data;
pub mod dataset;
pub mod dedup;
pub mod diagnostics;
pub mod error;
pub mod inference;
pub mod ingest;
pub mod io_utils;
pub mod profile;
pub mod report;
pub mod sink;
pub mod sql_type;
pub mod table;
pub mod validation;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{LevelFilter, info, warn};

use crate::{
    cli::{AnalyzeArgs, Cli, Commands, IngestArgs, InputArgs},
    config::{ErrorStrategy, IngestionConfig},
    diagnostics::Diagnostics,
    profile::ProfileSet,
    sink::CsvSink,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_ingest", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze(args) => handle_analyze(&args),
        Commands::Ingest(args) => handle_ingest(&args),
    }
}

fn base_config(args: &InputArgs) -> Result<IngestionConfig> {
    let mut config = IngestionConfig::new(&args.input, &args.schema, &args.table);
    config.delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    config.encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    config.max_varchar_length = args.max_varchar_length;
    config.primary_key = args.primary_key.clone();
    Ok(config)
}

fn handle_analyze(args: &AnalyzeArgs) -> Result<()> {
    let config = base_config(&args.source)?;
    let mut diagnostics = Diagnostics::new();
    let analysis = ingest::analyze(&config, &mut diagnostics)?;
    info!(
        "Analyzed {} column(s) over {} row(s)",
        analysis.profiles.len(),
        analysis.table.len()
    );

    print!("{}", table::render_profiles(&analysis.profiles));
    println!();
    println!(
        "{}",
        inference::generate_ddl(
            &config.table_name,
            &config.schema,
            &analysis.profiles,
            config.primary_key.as_deref(),
        )
    );

    if let Some(path) = &args.profiles_out {
        ProfileSet::new(analysis.profiles)
            .save(path)
            .with_context(|| format!("Writing profiles to {path:?}"))?;
        info!("Column profiles written to {:?}", path);
    }
    Ok(())
}

fn handle_ingest(args: &IngestArgs) -> Result<()> {
    let mut config = base_config(&args.source)?;
    config.if_exists = args.if_exists;
    config.chunk_size = args.chunk_size;
    config.error_strategy = args.error_strategy;
    config.create_table = args.create_table || args.ddl_out.is_some();
    config.ddl_output = args.ddl_out.clone();
    config.dedup_columns = args.dedup_columns.clone();
    config.validate_types = !args.no_validate;
    config.profiles = args.profiles.clone();
    config.rejects_output = args.rejects.clone();
    config.dry_run = args.dry_run;

    let mut sink = CsvSink::new(&args.output, config.delimiter, config.if_exists);
    let report = ingest::run(&config, &mut sink)?;

    if config.dry_run {
        println!("{}", report.to_json()?);
    }
    let report_path = match (&args.report, config.dry_run) {
        (Some(path), _) => Some(path.clone()),
        (None, false) => Some(config.default_report_path()),
        (None, true) => None,
    };
    if let Some(path) = report_path {
        report.save(&path)?;
        info!("Ingestion report written to {:?}", path);
    }

    if let Some(outcome) = &report.validation_result
        && !outcome.is_valid
    {
        match config.error_strategy {
            ErrorStrategy::FailFast => bail!(
                "Validation failed: {} issue(s); first: {}",
                outcome.issues.len(),
                outcome
                    .issues
                    .first()
                    .map(|issue| issue.to_string())
                    .unwrap_or_default()
            ),
            ErrorStrategy::CollectErrors => warn!(
                "{} row(s) rejected by validation; {} row(s) written to {:?}",
                report.rows_failed,
                report.rows_inserted,
                sink.path()
            ),
        }
    }
    Ok(())
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        other => (other as char).to_string(),
    }
}
