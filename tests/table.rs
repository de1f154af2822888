use csv_ingest::{
    data::Value,
    inference::profile,
    table::{render_profiles, render_table},
};

#[test]
fn render_table_aligns_columns() {
    let headers = vec!["id".to_string(), "name".to_string()];
    let rows = vec![
        vec!["1".to_string(), "Alice".to_string()],
        vec!["2".to_string(), "Bob".to_string()],
    ];

    let rendered = render_table(&headers, &rows);
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(lines, vec!["id  name", "---  -----", "1   Alice", "2   Bob"]);
}

#[test]
fn render_table_normalizes_control_characters() {
    let headers = vec!["note".to_string()];
    let rows = vec![vec!["line1\nline2\tvalue".to_string()]];

    let rendered = render_table(&headers, &rows);
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[2], "line1 line2 value");
}

#[test]
fn render_table_handles_unicode_and_ansi_widths() {
    let headers = vec!["résumé".to_string(), "status".to_string()];
    let rows = vec![vec!["café".to_string(), "\u{1b}[31mERR\u{1b}[0m".to_string()]];

    let rendered = render_table(&headers, &rows);
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(lines[0], "résumé  status");
    // "résumé" is two display columns wider than "café", so expect two padding
    // spaces plus the standard two-column separator.
    assert_eq!(lines[2], "café    \u{1b}[31mERR\u{1b}[0m");
}

#[test]
fn render_profiles_lists_one_line_per_column() {
    let profiles = vec![
        profile(&[Value::Integer(1), Value::Integer(2)], "id", 255),
        profile(&[Value::text("Alice"), Value::Null], "name", 255),
    ];

    let rendered = render_profiles(&profiles);
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("column  source   sql_type"));
    assert!(lines[2].starts_with("id"));
    assert!(lines[2].contains("SMALLINT"));
    assert!(lines[2].ends_with("1, 2"));
    assert!(lines[3].contains("VARCHAR(5)"));
    assert!(lines[3].contains("50.00"));
}
