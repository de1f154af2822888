//! Per-column profiles and their YAML persistence.

use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    data::{SourceKind, Value},
    sql_type::SqlType,
};

const CURRENT_PROFILE_VERSION: &str = "1.0.0";

/// Inferred SQL type plus descriptive statistics for one source column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub source_kind: SourceKind,
    pub inferred_type: SqlType,
    pub null_count: usize,
    pub null_percentage: f64,
    pub total_count: usize,
    pub distinct_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sample_values: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

impl ColumnProfile {
    /// Minimal profile carrying only a name and a target type, for validating
    /// against a hand-written column list.
    pub fn declared(name: impl Into<String>, inferred_type: SqlType) -> Self {
        Self {
            name: name.into(),
            source_kind: SourceKind::Text,
            inferred_type,
            null_count: 0,
            null_percentage: 0.0,
            total_count: 0,
            distinct_count: 0,
            sample_values: Vec::new(),
            min_value: None,
            max_value: None,
            avg_length: None,
            max_length: None,
        }
    }

    /// Whether the generated DDL marks this column `NOT NULL`.
    ///
    /// Heuristic: derived from the rows seen during analysis only. Later
    /// batches may still contain nulls.
    pub fn observed_not_null(&self) -> bool {
        self.null_count == 0
    }
}

/// Ordered profile list as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_version: Option<String>,
    pub columns: Vec<ColumnProfile>,
}

impl ProfileSet {
    pub fn new(columns: Vec<ColumnProfile>) -> Self {
        Self {
            profile_version: Some(CURRENT_PROFILE_VERSION.to_string()),
            columns,
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file =
            File::create(path).with_context(|| format!("Creating profile file {path:?}"))?;
        serde_yaml::to_writer(file, self).context("Writing profile YAML")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening profile file {path:?}"))?;
        let reader = BufReader::new(file);
        let profiles: ProfileSet =
            serde_yaml::from_reader(reader).context("Parsing profile YAML")?;
        Ok(profiles)
    }
}
