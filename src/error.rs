use std::path::PathBuf;

use thiserror::Error;

/// A SQL type string that the analyzer and validator do not understand.
///
/// Raised while loading profile files; reaching validation with such a type
/// is impossible because [`crate::sql_type::SqlType`] is a closed enum.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SqlTypeError {
    #[error("unknown SQL type '{0}'")]
    Unknown(String),
    #[error("SQL type '{0}' requires a length, e.g. VARCHAR(255)")]
    MissingLength(String),
    #[error("invalid type modifier in '{0}'")]
    InvalidModifier(String),
}

/// Precondition failures of an ingestion run (as opposed to data issues,
/// which are reported through [`crate::validation::ValidationOutcome`]).
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("column '{0}' not found in input headers")]
    UnknownColumn(String),

    #[error("destination {0:?} already exists (use --if-exists replace or append)")]
    DestinationExists(PathBuf),

    #[error("row {row} has {found} field(s) but the header defines {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("column '{column}' has {found} value(s), expected {expected}")]
    ColumnLength {
        column: String,
        expected: usize,
        found: usize,
    },
}
