//! Row validation against inferred column types.
//!
//! Data problems never surface as `Err`: every offending value becomes a
//! [`ValidationIssue`] and callers inspect [`ValidationOutcome::is_valid`].

use std::{collections::BTreeSet, fmt};

use log::{debug, error};
use serde::Serialize;

use crate::{
    config::ErrorStrategy,
    data::{Number, Value, float_to_i64},
    dataset::Table,
    diagnostics::Diagnostics,
    profile::ColumnProfile,
    sql_type::SqlType,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    Unparseable,
    OutOfRange,
    TooLong,
    InvalidBoolean,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    pub row_index: usize,
    pub column: String,
    pub value: Value,
    pub expected_type: SqlType,
    pub kind: IssueKind,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "row {} column '{}': {}",
            self.row_index, self.column, self.message
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOutcome {
    pub is_valid: bool,
    pub issues: Vec<ValidationIssue>,
    pub valid_rows_count: usize,
    pub invalid_rows_count: usize,
}

impl Default for ValidationOutcome {
    fn default() -> Self {
        Self {
            is_valid: true,
            issues: Vec::new(),
            valid_rows_count: 0,
            invalid_rows_count: 0,
        }
    }
}

impl ValidationOutcome {
    pub fn add_issue(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
        self.is_valid = false;
    }

    pub fn invalid_row_indices(&self) -> BTreeSet<usize> {
        self.issues.iter().map(|issue| issue.row_index).collect()
    }
}

/// Checks every non-null value of one column against `sql_type`.
pub fn validate_column<'a, I>(values: I, column: &str, sql_type: &SqlType) -> Vec<ValidationIssue>
where
    I: IntoIterator<Item = (usize, &'a Value)>,
{
    if *sql_type == SqlType::Text {
        return Vec::new();
    }
    values
        .into_iter()
        .filter(|(_, value)| !value.is_null())
        .filter_map(|(row_index, value)| {
            check_value(value, sql_type).map(|(kind, message)| ValidationIssue {
                row_index,
                column: column.to_string(),
                value: value.clone(),
                expected_type: sql_type.clone(),
                kind,
                message,
            })
        })
        .collect()
}

fn check_value(value: &Value, sql_type: &SqlType) -> Option<(IssueKind, String)> {
    match sql_type {
        SqlType::SmallInt | SqlType::Integer | SqlType::BigInt => {
            let (min, max) = sql_type.integer_bounds()?;
            check_integer(value, sql_type, min, max)
        }
        SqlType::Double | SqlType::Real | SqlType::Numeric(_) | SqlType::Decimal(_) => {
            match value.as_number() {
                Some(_) => None,
                None => Some(cannot_convert(value, sql_type)),
            }
        }
        SqlType::Boolean => (!value.is_boolean_token()).then(|| {
            (
                IssueKind::InvalidBoolean,
                format!("Value '{value}' is not a valid boolean"),
            )
        }),
        SqlType::Timestamp => value
            .as_timestamp()
            .is_none()
            .then(|| cannot_convert(value, sql_type)),
        SqlType::Varchar(limit) => {
            let length = value.char_len();
            (length > *limit).then(|| {
                (
                    IssueKind::TooLong,
                    format!("String of length {length} exceeds maximum of {limit}"),
                )
            })
        }
        SqlType::Text => None,
    }
}

fn check_integer(
    value: &Value,
    sql_type: &SqlType,
    min: i64,
    max: i64,
) -> Option<(IssueKind, String)> {
    let integer = match value.as_number() {
        Some(Number::Integer(i)) => i,
        Some(Number::Float(f)) if !f.is_finite() => return Some(cannot_convert(value, sql_type)),
        Some(Number::Float(f)) if f.fract() != 0.0 => {
            return Some((
                IssueKind::Unparseable,
                format!("Value '{value}' is not a valid integer (has a fractional part)"),
            ));
        }
        Some(Number::Float(f)) => match float_to_i64(f) {
            Some(i) => i,
            None => return Some(out_of_range(value, sql_type, min, max)),
        },
        None => return Some(cannot_convert(value, sql_type)),
    };
    (integer < min || integer > max).then(|| out_of_range(value, sql_type, min, max))
}

fn cannot_convert(value: &Value, sql_type: &SqlType) -> (IssueKind, String) {
    (
        IssueKind::Unparseable,
        format!("Cannot convert '{value}' to {sql_type}"),
    )
}

fn out_of_range(value: &Value, sql_type: &SqlType, min: i64, max: i64) -> (IssueKind, String) {
    (
        IssueKind::OutOfRange,
        format!("Value {value} is out of range for {sql_type} ({min} to {max})"),
    )
}

/// Validates `table` against `profiles` and splits it into `(valid, invalid)`.
///
/// Columns are checked in profile order. Under [`ErrorStrategy::FailFast`]
/// the first column with any offending value stops validation: the outcome
/// carries that single issue and every row is returned as invalid.
pub fn validate_table(
    table: &Table,
    profiles: &[ColumnProfile],
    strategy: ErrorStrategy,
    diagnostics: &mut Diagnostics,
) -> (ValidationOutcome, Table, Table) {
    let mut outcome = ValidationOutcome::default();

    for profile in profiles {
        let Some(column) = table.column_index(&profile.name) else {
            diagnostics.warn(format!(
                "Column '{}' expected but not found in the data; skipping validation",
                profile.name
            ));
            continue;
        };
        let issues = validate_column(
            table.column_cells(column),
            &profile.name,
            &profile.inferred_type,
        );
        debug!(
            "Column '{}' checked as {}: {} issue(s)",
            profile.name,
            profile.inferred_type,
            issues.len()
        );

        match strategy {
            ErrorStrategy::FailFast => {
                if let Some(first) = issues.into_iter().next() {
                    error!("Validation error (fail-fast): {first}");
                    outcome.add_issue(first);
                    outcome.valid_rows_count = 0;
                    outcome.invalid_rows_count = table.len();
                    return (outcome, table.empty_like(), table.clone());
                }
            }
            ErrorStrategy::CollectErrors => {
                for issue in issues {
                    outcome.add_issue(issue);
                }
            }
        }
    }

    let invalid_rows = outcome.invalid_row_indices();
    let (valid, invalid) = table.partition(|row| !invalid_rows.contains(&row.index));
    outcome.valid_rows_count = valid.len();
    outcome.invalid_rows_count = invalid.len();
    (outcome, valid, invalid)
}
