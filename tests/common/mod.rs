#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use csv_ingest::{
    dataset::{Row, Table},
    sink::RowSink,
};
use tempfile::{TempDir, tempdir};

pub const ORDERS_CSV: &str = "\
order_id,customer,amount,shipped,ordered_at,note
1,Alice,42.5,true,2024-01-01,
2,Bob,13.37,false,2024-01-03,rush
3,Carol,99.0,true,2024-02-10 08:30:00,
";

/// Scratch directory that removes its files on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        fs::write(&path, contents).expect("write temp file");
        path
    }

    pub fn join(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }
}

/// In-memory destination recording every batch it receives.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub headers: Vec<String>,
    pub batches: Vec<Vec<Row>>,
    pub prepared: bool,
    pub finished: bool,
}

impl MemorySink {
    pub fn rows(&self) -> Vec<&Row> {
        self.batches.iter().flatten().collect()
    }
}

impl RowSink for MemorySink {
    fn prepare(&mut self, headers: &[String]) -> anyhow::Result<()> {
        self.headers = headers.to_vec();
        self.prepared = true;
        Ok(())
    }

    fn write_batch(&mut self, rows: &[Row]) -> anyhow::Result<usize> {
        self.batches.push(rows.to_vec());
        Ok(rows.len())
    }

    fn finish(&mut self) -> anyhow::Result<()> {
        self.finished = true;
        Ok(())
    }
}

pub fn column_table(name: &str, values: Vec<csv_ingest::data::Value>) -> Table {
    Table::from_columns(vec![(name.to_string(), values)]).expect("single column table")
}
