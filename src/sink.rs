//! Destinations for validated rows.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use log::{debug, info};

use crate::{
    config::IfExists,
    dataset::{Row, Table},
    error::IngestError,
};

/// Receives validated rows in batches.
pub trait RowSink {
    /// Called once before the first batch.
    fn prepare(&mut self, headers: &[String]) -> Result<()>;

    /// Writes one batch and returns the number of rows accepted.
    fn write_batch(&mut self, rows: &[Row]) -> Result<usize>;

    fn finish(&mut self) -> Result<()>;
}

/// Writes rows to a CSV file, honouring an [`IfExists`] policy.
pub struct CsvSink {
    path: PathBuf,
    delimiter: u8,
    if_exists: IfExists,
    writer: Option<csv::Writer<Box<dyn Write>>>,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>, delimiter: u8, if_exists: IfExists) -> Self {
        Self {
            path: path.into(),
            delimiter,
            if_exists,
            writer: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RowSink for CsvSink {
    fn prepare(&mut self, headers: &[String]) -> Result<()> {
        let has_content = fs::metadata(&self.path)
            .map(|meta| meta.len() > 0)
            .unwrap_or(false);
        let append = match self.if_exists {
            IfExists::Fail if self.path.exists() => {
                return Err(IngestError::DestinationExists(self.path.clone()).into());
            }
            IfExists::Append => has_content,
            IfExists::Fail | IfExists::Replace => false,
        };
        debug!(
            "Opening destination {:?} ({})",
            self.path,
            if append { "append" } else { "create" }
        );
        let mut writer = crate::io_utils::open_csv_writer(&self.path, self.delimiter, append)?;
        if !append {
            writer
                .write_record(headers)
                .with_context(|| format!("Writing header to {:?}", self.path))?;
        }
        self.writer = Some(writer);
        Ok(())
    }

    fn write_batch(&mut self, rows: &[Row]) -> Result<usize> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| anyhow!("CsvSink::write_batch called before prepare"))?;
        for row in rows {
            writer
                .write_record(row.values.iter().map(|v| v.as_display()))
                .with_context(|| format!("Writing row {} to {:?}", row.index, self.path))?;
        }
        Ok(rows.len())
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer
                .flush()
                .with_context(|| format!("Flushing {:?}", self.path))?;
        }
        Ok(())
    }
}

/// Writes rejected rows with their source row index as the first column.
pub fn write_rejects(path: &Path, table: &Table, delimiter: u8) -> Result<()> {
    let mut writer = crate::io_utils::open_csv_writer(path, delimiter, false)?;
    let mut headers = Vec::with_capacity(table.headers.len() + 1);
    headers.push("row_index".to_string());
    headers.extend(table.headers.iter().cloned());
    writer.write_record(&headers)?;
    for row in &table.rows {
        let mut record = Vec::with_capacity(headers.len());
        record.push(row.index.to_string());
        record.extend(row.values.iter().map(|v| v.as_display()));
        writer
            .write_record(&record)
            .with_context(|| format!("Writing rejected row {} to {path:?}", row.index))?;
    }
    writer.flush()?;
    info!("Wrote {} rejected row(s) to {:?}", table.len(), path);
    Ok(())
}
