use itertools::Itertools;
use log::info;

use crate::{data::Value, dataset::Table, error::IngestError};

/// Drops rows whose values in `columns` repeat an earlier row, keeping the
/// first occurrence. An empty column list compares whole rows.
///
/// Returns the deduplicated table and the number of rows removed.
pub fn deduplicate(table: Table, columns: &[String]) -> Result<(Table, usize), IngestError> {
    let key_indices = if columns.is_empty() {
        (0..table.headers.len()).collect::<Vec<_>>()
    } else {
        columns
            .iter()
            .map(|name| {
                table
                    .column_index(name)
                    .ok_or_else(|| IngestError::UnknownColumn(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?
    };

    let before = table.len();
    let Table { headers, rows } = table;
    let rows = rows
        .into_iter()
        .unique_by(|row| {
            key_indices
                .iter()
                .map(|&idx| row.values[idx].clone())
                .collect::<Vec<Value>>()
        })
        .collect::<Vec<_>>();
    let removed = before - rows.len();
    if removed > 0 {
        info!("Removed {removed} duplicate row(s)");
    }
    Ok((Table { headers, rows }, removed))
}
