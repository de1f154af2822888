//! Plain-text rendering for terminal output.

use std::borrow::Cow;
use std::fmt::Write as _;

use itertools::Itertools;

use crate::profile::ColumnProfile;

const PREVIEW_SAMPLES: usize = 3;
const COLUMN_GAP: &str = "  ";

/// Renders `rows` under `headers` as left-aligned, space-padded columns.
pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths = headers
        .iter()
        .map(|header| display_width(header).max(1))
        .collect::<Vec<_>>();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(display_width(cell));
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(headers, &widths));
    let rule_widths = widths.iter().map(|w| (*w).max(3)).collect::<Vec<_>>();
    let rule = rule_widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&rule, &rule_widths));
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths));
    }
    output
}

/// Renders the column analysis shown by `analyze`.
pub fn render_profiles(profiles: &[ColumnProfile]) -> String {
    let headers = ["column", "source", "sql_type", "null_%", "distinct", "samples"]
        .map(String::from)
        .to_vec();
    let rows = profiles
        .iter()
        .map(|profile| {
            vec![
                profile.name.clone(),
                profile.source_kind.to_string(),
                profile.inferred_type.to_string(),
                format!("{:.2}", profile.null_percentage),
                profile.distinct_count.to_string(),
                profile
                    .sample_values
                    .iter()
                    .take(PREVIEW_SAMPLES)
                    .map(|value| value.as_display())
                    .join(", "),
            ]
        })
        .collect::<Vec<_>>();
    render_table(&headers, &rows)
}

fn format_row(values: &[String], widths: &[usize]) -> String {
    let line = values
        .iter()
        .zip(widths)
        .map(|(value, width)| {
            let cell = sanitize_cell(value);
            let padding = width.saturating_sub(display_width(&cell));
            format!("{cell}{}", " ".repeat(padding))
        })
        .join(COLUMN_GAP);
    line.trim_end().to_string()
}

fn display_width(value: &str) -> usize {
    let mut width = 0usize;
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' {
            // ANSI escape, e.g. \x1b[31m
            chars.by_ref().find(|next| *next == 'm');
        } else {
            width += 1;
        }
    }
    width
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}
