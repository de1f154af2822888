//! End-to-end ingestion: read, profile, deduplicate, validate, write, report.

use std::{fs, time::Instant};

use anyhow::{Context, Result, ensure};
use chrono::Utc;
use log::{error, info, warn};

use crate::{
    config::{ErrorStrategy, IngestionConfig},
    dataset::Table,
    dedup,
    diagnostics::Diagnostics,
    inference,
    io_utils,
    profile::{ColumnProfile, ProfileSet},
    report::{IngestionReport, format_duration},
    sink::{self, RowSink},
    validation,
};

/// Result of [`analyze`]: the loaded table and one profile per column.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub table: Table,
    pub profiles: Vec<ColumnProfile>,
}

/// Loads the input and profiles it, or loads saved profiles when configured.
pub fn analyze(config: &IngestionConfig, diagnostics: &mut Diagnostics) -> Result<Analysis> {
    info!(
        "Reading {:?} with delimiter '{}'",
        config.input,
        crate::printable_delimiter(config.delimiter)
    );
    let table = io_utils::read_table(&config.input, config.delimiter, config.encoding)
        .with_context(|| format!("Loading {:?}", config.input))?;
    info!(
        "Loaded {} row(s) across {} column(s)",
        table.len(),
        table.headers.len()
    );

    let profiles = match &config.profiles {
        Some(path) => {
            let set = ProfileSet::load(path)
                .with_context(|| format!("Loading profiles from {path:?}"))?;
            info!("Using {} saved column profile(s) from {:?}", set.columns.len(), path);
            set.columns
        }
        None => inference::profile_table(&table, config.max_varchar_length, diagnostics),
    };
    Ok(Analysis { table, profiles })
}

/// Runs the whole pipeline, writing valid rows to `sink` unless dry-running.
///
/// With [`ErrorStrategy::FailFast`] a failed validation leaves `sink`
/// untouched; the returned report carries the failure.
pub fn run(config: &IngestionConfig, sink: &mut dyn RowSink) -> Result<IngestionReport> {
    ensure!(config.chunk_size > 0, "Chunk size must be greater than zero");
    let started = Instant::now();
    let mut diagnostics = Diagnostics::new();

    let Analysis { table, profiles } = analyze(config, &mut diagnostics)?;
    let total_rows = table.len();

    let ddl_generated = config.create_table.then(|| {
        inference::generate_ddl(
            &config.table_name,
            &config.schema,
            &profiles,
            config.primary_key.as_deref(),
        )
    });
    if let (Some(ddl), Some(path)) = (&ddl_generated, &config.ddl_output) {
        fs::write(path, format!("{ddl}\n")).with_context(|| format!("Writing DDL to {path:?}"))?;
        info!("DDL written to {:?}", path);
    }

    let (table, duplicates_removed) = match &config.dedup_columns {
        Some(columns) => dedup::deduplicate(table, columns).context("Deduplicating rows")?,
        None => (table, 0),
    };

    let (validation_result, valid, invalid) = if config.validate_types {
        let (outcome, valid, invalid) = validation::validate_table(
            &table,
            &profiles,
            config.error_strategy,
            &mut diagnostics,
        );
        if outcome.is_valid {
            info!("Validation passed for {} row(s)", outcome.valid_rows_count);
        } else {
            error!(
                "Validation found {} issue(s): {} valid row(s), {} invalid row(s) ({})",
                outcome.issues.len(),
                outcome.valid_rows_count,
                outcome.invalid_rows_count,
                config.error_strategy
            );
        }
        (Some(outcome), valid, invalid)
    } else {
        warn!("Type validation disabled; trusting inferred types");
        let invalid = table.empty_like();
        (None, table, invalid)
    };

    let halted = config.error_strategy == ErrorStrategy::FailFast
        && validation_result
            .as_ref()
            .is_some_and(|outcome| !outcome.is_valid);

    let mut rows_inserted = 0usize;
    if halted {
        warn!("Validation failed with {}; nothing written", config.error_strategy);
    } else if config.dry_run {
        info!(
            "Dry run: skipping write of {} row(s) to the destination",
            valid.len()
        );
    } else {
        rows_inserted = write_in_batches(sink, &valid, config.chunk_size)?;
    }
    if !config.dry_run
        && let Some(path) = &config.rejects_output
        && !invalid.is_empty()
    {
        sink::write_rejects(path, &invalid, config.delimiter)?;
    }

    let duration = started.elapsed().as_secs_f64();
    info!(
        "Ingestion of {:?} finished in {}: {} inserted, {} failed",
        config.input,
        format_duration(duration),
        rows_inserted,
        invalid.len()
    );

    Ok(IngestionReport {
        timestamp: Utc::now(),
        csv_path: config.input.display().to_string(),
        schema: config.schema.clone(),
        table_name: config.table_name.clone(),
        total_rows_csv: total_rows,
        duplicates_removed,
        rows_inserted,
        rows_failed: invalid.len(),
        duration_seconds: duration,
        dry_run: config.dry_run,
        column_analyses: profiles,
        validation_result,
        ddl_generated,
        warnings: diagnostics.into_warnings(),
    })
}

fn write_in_batches(sink: &mut dyn RowSink, table: &Table, chunk_size: usize) -> Result<usize> {
    sink.prepare(&table.headers)?;
    let mut written = 0usize;
    for (batch_idx, batch) in table.rows.chunks(chunk_size).enumerate() {
        written += sink
            .write_batch(batch)
            .with_context(|| format!("Writing batch {}", batch_idx + 1))?;
        info!("Batch {}: {} / {} row(s) written", batch_idx + 1, written, table.len());
    }
    sink.finish()?;
    Ok(written)
}

