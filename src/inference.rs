//! SQL type inference, column profiling, and CREATE TABLE generation.
//!
//! Text columns are coerced in a fixed priority order: numeric, temporal,
//! boolean, then VARCHAR/TEXT. Numeric wins ties, so a column of `"1"`/`"0"`
//! is an integer column, not a boolean one.

use std::collections::HashSet;

use itertools::{Itertools, MinMaxResult};
use log::debug;

use crate::{
    data::{SourceKind, Value},
    dataset::Table,
    diagnostics::Diagnostics,
    profile::ColumnProfile,
    sql_type::SqlType,
};

pub const DEFAULT_MAX_VARCHAR_LENGTH: usize = 255;
const SAMPLE_LIMIT: usize = 10;

/// Infers the most specific SQL type able to hold every non-null value.
pub fn infer_type(values: &[Value], max_varchar_length: usize) -> SqlType {
    let non_null = values.iter().filter(|v| !v.is_null()).collect::<Vec<_>>();
    if non_null.is_empty() {
        return SqlType::Text;
    }
    match SourceKind::of(values) {
        SourceKind::Integer => {
            integer_tier(non_null.iter().filter_map(|v| v.as_number()?.as_integer()))
        }
        SourceKind::Float => SqlType::Double,
        SourceKind::Boolean => SqlType::Boolean,
        SourceKind::DateTime => SqlType::Timestamp,
        SourceKind::Text | SourceKind::Mixed => coerce(&non_null, max_varchar_length),
    }
}

fn coerce(values: &[&Value], max_varchar_length: usize) -> SqlType {
    if let Some(numbers) = values.iter().map(|v| v.as_number()).collect::<Option<Vec<_>>>() {
        return match numbers
            .iter()
            .map(|n| n.as_integer())
            .collect::<Option<Vec<_>>>()
        {
            Some(integers) => integer_tier(integers),
            None => SqlType::Double,
        };
    }
    if values.iter().all(|v| v.as_timestamp().is_some()) {
        return SqlType::Timestamp;
    }
    if values.iter().all(|v| v.is_boolean_token()) {
        return SqlType::Boolean;
    }
    let max_length = values.iter().map(|v| v.char_len()).max().unwrap_or(0);
    SqlType::for_text_length(max_length, max_varchar_length)
}

fn integer_tier<I>(integers: I) -> SqlType
where
    I: IntoIterator<Item = i64>,
{
    match integers.into_iter().minmax() {
        MinMaxResult::NoElements => SqlType::SmallInt,
        MinMaxResult::OneElement(only) => SqlType::for_integer_range(only, only),
        MinMaxResult::MinMax(min, max) => SqlType::for_integer_range(min, max),
    }
}

/// Builds the full profile of one column. Pure: the same input always yields
/// the same profile.
pub fn profile(values: &[Value], name: &str, max_varchar_length: usize) -> ColumnProfile {
    let total_count = values.len();
    let non_null = values.iter().filter(|v| !v.is_null()).collect::<Vec<_>>();
    let null_count = total_count - non_null.len();
    let null_percentage = if total_count > 0 {
        null_count as f64 / total_count as f64 * 100.0
    } else {
        0.0
    };
    let distinct_count = non_null.iter().copied().collect::<HashSet<_>>().len();
    let sample_values = non_null
        .iter()
        .take(SAMPLE_LIMIT)
        .map(|v| (*v).clone())
        .collect();

    let source_kind = SourceKind::of(values);
    let (mut min_value, mut max_value) = (None, None);
    let (mut avg_length, mut max_length) = (None, None);
    if !non_null.is_empty() {
        if source_kind.is_numeric() {
            let bounds = non_null
                .iter()
                .filter_map(|v| v.as_number())
                .map(|n| n.as_f64())
                .minmax_by(f64::total_cmp);
            match bounds {
                MinMaxResult::MinMax(min, max) => {
                    min_value = Some(min);
                    max_value = Some(max);
                }
                MinMaxResult::OneElement(only) => {
                    min_value = Some(only);
                    max_value = Some(only);
                }
                MinMaxResult::NoElements => {}
            }
        } else if source_kind.is_textual() {
            let lengths = non_null.iter().map(|v| v.char_len()).collect::<Vec<_>>();
            avg_length = Some(lengths.iter().sum::<usize>() as f64 / lengths.len() as f64);
            max_length = lengths.iter().copied().max();
        }
    }

    ColumnProfile {
        name: name.to_string(),
        source_kind,
        inferred_type: infer_type(values, max_varchar_length),
        null_count,
        null_percentage,
        total_count,
        distinct_count,
        sample_values,
        min_value,
        max_value,
        avg_length,
        max_length,
    }
}

/// Profiles every column of `table` in header order.
pub fn profile_table(
    table: &Table,
    max_varchar_length: usize,
    diagnostics: &mut Diagnostics,
) -> Vec<ColumnProfile> {
    table
        .headers
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let values = table.column_values(idx);
            let profile = profile(&values, name, max_varchar_length);
            if !values.is_empty() && profile.null_count == profile.total_count {
                diagnostics.warn(format!(
                    "Column '{name}' contains only null values; defaulting to TEXT"
                ));
            }
            debug!(
                "Column '{}' ({}) inferred as {} ({} null, {} distinct)",
                profile.name,
                profile.source_kind,
                profile.inferred_type,
                profile.null_count,
                profile.distinct_count
            );
            profile
        })
        .collect()
}

/// Renders a `CREATE TABLE` statement for `profiles`, in the given order.
///
/// `NOT NULL` is emitted for columns with no nulls in the analyzed rows. That
/// is a sample-based guess, not a constraint derived from the data source.
pub fn generate_ddl(
    table_name: &str,
    schema: &str,
    profiles: &[ColumnProfile],
    primary_key: Option<&str>,
) -> String {
    let mut definitions = profiles
        .iter()
        .map(|profile| {
            let null_clause = if profile.observed_not_null() {
                "NOT NULL"
            } else {
                "NULL"
            };
            format!(
                "    \"{}\" {} {null_clause}",
                profile.name, profile.inferred_type
            )
        })
        .collect::<Vec<_>>();
    if let Some(key) = primary_key {
        definitions.push(format!("    PRIMARY KEY (\"{key}\")"));
    }
    format!(
        "CREATE TABLE \"{schema}\".\"{table_name}\" (\n{}\n);",
        definitions.iter().join(",\n")
    )
}
