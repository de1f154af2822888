mod common;

use csv_ingest::{
    config::ErrorStrategy,
    data::Value,
    dataset::Table,
    diagnostics::Diagnostics,
    inference::{DEFAULT_MAX_VARCHAR_LENGTH, profile_table},
    io_utils,
    profile::ColumnProfile,
    sql_type::SqlType,
    validation::{IssueKind, validate_column, validate_table},
};

use common::{TestWorkspace, column_table};

fn abc_column() -> Table {
    column_table(
        "col1",
        vec![
            Value::Integer(1),
            Value::Integer(2),
            Value::text("abc"),
            Value::Integer(4),
        ],
    )
}

#[test]
fn fail_fast_rejects_every_row_with_one_issue() {
    let profiles = vec![ColumnProfile::declared("col1", SqlType::Integer)];
    let mut diagnostics = Diagnostics::new();
    let (outcome, valid, invalid) = validate_table(
        &abc_column(),
        &profiles,
        ErrorStrategy::FailFast,
        &mut diagnostics,
    );
    assert!(!outcome.is_valid);
    assert_eq!(outcome.valid_rows_count, 0);
    assert_eq!(outcome.invalid_rows_count, 4);
    assert_eq!(outcome.issues.len(), 1);
    assert!(valid.is_empty());
    assert_eq!(invalid.len(), 4);
    assert!(diagnostics.is_empty());
}

#[test]
fn collect_errors_partitions_rows_and_keeps_indices() {
    let profiles = vec![ColumnProfile::declared("col1", SqlType::Integer)];
    let mut diagnostics = Diagnostics::new();
    let (outcome, valid, invalid) = validate_table(
        &abc_column(),
        &profiles,
        ErrorStrategy::CollectErrors,
        &mut diagnostics,
    );
    assert!(!outcome.is_valid);
    assert_eq!(outcome.valid_rows_count, 3);
    assert_eq!(outcome.invalid_rows_count, 1);
    assert_eq!(outcome.issues.len(), 1);

    let issue = &outcome.issues[0];
    assert_eq!(issue.row_index, 2);
    assert_eq!(issue.value, Value::text("abc"));
    assert_eq!(issue.kind, IssueKind::Unparseable);
    assert_eq!(issue.message, "Cannot convert 'abc' to INTEGER");

    assert_eq!(
        valid.rows.iter().map(|row| row.index).collect::<Vec<_>>(),
        vec![0, 1, 3]
    );
    assert_eq!(invalid.rows[0].index, 2);
}

#[test]
fn collect_errors_counts_rows_once_across_columns() {
    let table = Table::from_rows(
        vec!["qty".to_string(), "code".to_string()],
        vec![
            vec![Value::Integer(1), Value::text("ab")],
            vec![Value::Integer(70_000), Value::text("toolong")],
            vec![Value::Integer(3), Value::text("cd")],
        ],
    )
    .expect("table");
    let profiles = vec![
        ColumnProfile::declared("qty", SqlType::SmallInt),
        ColumnProfile::declared("code", SqlType::Varchar(2)),
    ];
    let (outcome, valid, invalid) = validate_table(
        &table,
        &profiles,
        ErrorStrategy::CollectErrors,
        &mut Diagnostics::new(),
    );
    assert_eq!(outcome.issues.len(), 2);
    assert_eq!(outcome.invalid_rows_count, 1);
    assert_eq!(valid.len(), 2);
    assert_eq!(invalid.rows[0].index, 1);
    assert_eq!(outcome.issues[0].kind, IssueKind::OutOfRange);
    assert_eq!(
        outcome.issues[0].message,
        "Value 70000 is out of range for SMALLINT (-32768 to 32767)"
    );
    assert_eq!(outcome.issues[1].kind, IssueKind::TooLong);
    assert_eq!(
        outcome.issues[1].message,
        "String of length 7 exceeds maximum of 2"
    );
}

#[test]
fn nulls_never_produce_issues() {
    let values = [Value::Null, Value::Null];
    for sql_type in [
        SqlType::SmallInt,
        SqlType::Double,
        SqlType::Boolean,
        SqlType::Timestamp,
        SqlType::Varchar(0),
    ] {
        assert!(validate_column(values.iter().enumerate(), "c", &sql_type).is_empty());
    }
}

#[test]
fn boolean_and_timestamp_columns_report_bad_values() {
    let values = [Value::text("yes"), Value::text("maybe"), Value::Integer(2)];
    let issues = validate_column(values.iter().enumerate(), "flag", &SqlType::Boolean);
    assert_eq!(issues.len(), 2);
    assert!(issues.iter().all(|i| i.kind == IssueKind::InvalidBoolean));
    assert_eq!(issues[0].message, "Value 'maybe' is not a valid boolean");

    let stamps = [Value::text("2024-01-01"), Value::text("not a date")];
    let issues = validate_column(stamps.iter().enumerate(), "at", &SqlType::Timestamp);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].row_index, 1);
}

#[test]
fn missing_column_is_skipped_with_a_warning() {
    let profiles = vec![
        ColumnProfile::declared("col1", SqlType::Text),
        ColumnProfile::declared("ghost", SqlType::Integer),
    ];
    let mut diagnostics = Diagnostics::new();
    let (outcome, valid, _) = validate_table(
        &abc_column(),
        &profiles,
        ErrorStrategy::FailFast,
        &mut diagnostics,
    );
    assert!(outcome.is_valid);
    assert_eq!(valid.len(), 4);
    assert_eq!(diagnostics.warnings().len(), 1);
    assert!(diagnostics.warnings()[0].contains("'ghost'"));
}

#[test]
fn clean_table_is_valid() {
    let table = column_table("n", vec![Value::Integer(5), Value::Null]);
    let profiles = vec![ColumnProfile::declared("n", SqlType::SmallInt)];
    let (outcome, valid, invalid) = validate_table(
        &table,
        &profiles,
        ErrorStrategy::FailFast,
        &mut Diagnostics::new(),
    );
    assert!(outcome.is_valid);
    assert_eq!(outcome.valid_rows_count, 2);
    assert_eq!(outcome.invalid_rows_count, 0);
    assert!(invalid.is_empty());
    assert_eq!(valid.len(), 2);
}

#[test]
fn nan_spellings_read_as_null_and_pass_validation() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("prices.csv", "price\n1.5\nNAN\n+nan\n2\n");
    let table = io_utils::read_table(&input, b',', encoding_rs::UTF_8).expect("read table");
    assert_eq!(table.rows[1].values[0], Value::Null);
    assert_eq!(table.rows[2].values[0], Value::Null);

    let mut diagnostics = Diagnostics::new();
    let profiles = profile_table(&table, DEFAULT_MAX_VARCHAR_LENGTH, &mut diagnostics);
    assert_eq!(profiles[0].inferred_type, SqlType::Double);
    assert_eq!(profiles[0].null_count, 2);

    let (outcome, valid, _) = validate_table(
        &table,
        &profiles,
        ErrorStrategy::FailFast,
        &mut diagnostics,
    );
    assert!(outcome.is_valid);
    assert_eq!(valid.len(), 4);
}

#[test]
fn bigint_rejects_numbers_beyond_i64() {
    let values = [Value::text("9223372036854775807"), Value::text("1e30")];
    let issues = validate_column(values.iter().enumerate(), "big", &SqlType::BigInt);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].row_index, 1);
    assert_eq!(issues[0].kind, IssueKind::OutOfRange);
}
