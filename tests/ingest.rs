mod common;

use std::fs;

use csv_ingest::{
    config::{ErrorStrategy, IngestionConfig},
    data::Value,
    ingest,
    profile::{ColumnProfile, ProfileSet},
    sql_type::SqlType,
};

use common::{MemorySink, ORDERS_CSV, TestWorkspace};

#[test]
fn run_writes_valid_rows_in_batches_and_reports() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("orders.csv", ORDERS_CSV);
    let ddl_path = workspace.join("orders.sql");
    let mut config = IngestionConfig::new(&input, "sales", "orders");
    config.chunk_size = 2;
    config.create_table = true;
    config.ddl_output = Some(ddl_path.clone());

    let mut sink = MemorySink::default();
    let report = ingest::run(&config, &mut sink).expect("ingest");

    assert!(sink.prepared && sink.finished);
    assert_eq!(sink.batches.len(), 2);
    assert_eq!(sink.rows().len(), 3);
    assert_eq!(sink.headers[0], "order_id");

    assert_eq!(report.total_rows_csv, 3);
    assert_eq!(report.rows_inserted, 3);
    assert_eq!(report.rows_failed, 0);
    assert!(report.validation_result.as_ref().is_some_and(|v| v.is_valid));

    let types = report
        .column_analyses
        .iter()
        .map(|p| p.inferred_type.clone())
        .collect::<Vec<_>>();
    assert_eq!(
        types,
        vec![
            SqlType::SmallInt,
            SqlType::Varchar(5),
            SqlType::Double,
            SqlType::Boolean,
            SqlType::Timestamp,
            SqlType::Varchar(4),
        ]
    );

    let ddl = fs::read_to_string(&ddl_path).expect("ddl file");
    assert!(ddl.starts_with("CREATE TABLE \"sales\".\"orders\" (\n"));
    assert!(ddl.contains("    \"order_id\" SMALLINT NOT NULL,\n"));
    assert!(ddl.contains("    \"note\" VARCHAR(4) NULL\n"));
    assert_eq!(report.ddl_generated.as_deref(), Some(ddl.trim_end()));
}

#[test]
fn run_removes_duplicates_before_validation() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("people.csv", "id,name\n1,a\n1,a\n2,b\n1,c\n");
    let mut config = IngestionConfig::new(&input, "public", "people");
    config.dedup_columns = Some(Vec::new());

    let mut sink = MemorySink::default();
    let report = ingest::run(&config, &mut sink).expect("ingest");
    assert_eq!(report.duplicates_removed, 1);
    assert_eq!(report.rows_inserted, 3);
    assert_eq!(
        sink.rows().iter().map(|row| row.index).collect::<Vec<_>>(),
        vec![0, 2, 3]
    );

    config.dedup_columns = Some(vec!["id".to_string()]);
    let report = ingest::run(&config, &mut MemorySink::default()).expect("ingest");
    assert_eq!(report.duplicates_removed, 2);
    assert_eq!(report.rows_inserted, 2);
}

#[test]
fn dry_run_leaves_the_sink_untouched() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("orders.csv", ORDERS_CSV);
    let mut config = IngestionConfig::new(&input, "public", "orders");
    config.dry_run = true;

    let mut sink = MemorySink::default();
    let report = ingest::run(&config, &mut sink).expect("ingest");
    assert!(!sink.prepared);
    assert_eq!(report.rows_inserted, 0);
    assert!(report.dry_run);

    let json = report.to_json_value().expect("json");
    assert_eq!(json["total_rows_csv"], 3);
    assert_eq!(json["column_analyses"][2]["sql_type_suggested"], "DOUBLE PRECISION");
}

fn saved_profiles(workspace: &TestWorkspace) -> std::path::PathBuf {
    let path = workspace.join("profiles.yml");
    ProfileSet::new(vec![ColumnProfile::declared("id", SqlType::SmallInt)])
        .save(&path)
        .expect("save profiles");
    path
}

#[test]
fn collect_errors_writes_valid_rows_and_rejects() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("ids.csv", "id\n1\n70000\nx\n4\n");
    let rejects = workspace.join("rejects.csv");
    let mut config = IngestionConfig::new(&input, "public", "ids");
    config.profiles = Some(saved_profiles(&workspace));
    config.error_strategy = ErrorStrategy::CollectErrors;
    config.rejects_output = Some(rejects.clone());

    let mut sink = MemorySink::default();
    let report = ingest::run(&config, &mut sink).expect("ingest");
    assert_eq!(report.rows_inserted, 2);
    assert_eq!(report.rows_failed, 2);
    assert_eq!(
        sink.rows()
            .iter()
            .map(|row| row.values[0].clone())
            .collect::<Vec<_>>(),
        vec![Value::text("1"), Value::text("4")]
    );
    assert_eq!(
        fs::read_to_string(&rejects).expect("rejects"),
        "row_index,id\n1,70000\n2,x\n"
    );
}

#[test]
fn fail_fast_failure_writes_nothing() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("ids.csv", "id\n1\n70000\n3\n");
    let mut config = IngestionConfig::new(&input, "public", "ids");
    config.profiles = Some(saved_profiles(&workspace));

    let mut sink = MemorySink::default();
    let report = ingest::run(&config, &mut sink).expect("ingest");
    assert!(!sink.prepared);
    assert_eq!(report.rows_inserted, 0);
    assert_eq!(report.rows_failed, 3);
    let outcome = report.validation_result.expect("validation ran");
    assert!(!outcome.is_valid);
    assert_eq!(outcome.issues.len(), 1);
}

#[test]
fn skipping_validation_trusts_every_row() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("ids.csv", "id\n1\n70000\n");
    let mut config = IngestionConfig::new(&input, "public", "ids");
    config.profiles = Some(saved_profiles(&workspace));
    config.validate_types = false;

    let report = ingest::run(&config, &mut MemorySink::default()).expect("ingest");
    assert!(report.validation_result.is_none());
    assert_eq!(report.rows_inserted, 2);
}

#[test]
fn zero_chunk_size_is_rejected() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("orders.csv", ORDERS_CSV);
    let mut config = IngestionConfig::new(&input, "public", "orders");
    config.chunk_size = 0;
    let err = ingest::run(&config, &mut MemorySink::default()).expect_err("chunk size");
    assert!(err.to_string().contains("Chunk size"));
}

#[test]
fn all_null_column_is_reported_as_a_warning() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("sparse.csv", "id,empty\n1,\n2,NA\n");
    let config = IngestionConfig::new(&input, "public", "sparse");
    let report = ingest::run(&config, &mut MemorySink::default()).expect("ingest");
    assert_eq!(report.column_analyses[1].inferred_type, SqlType::Text);
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("'empty'"));
}
