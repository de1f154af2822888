//! In-memory table handed from the CSV reader to the analyzer and validator.

use crate::{data::Value, error::IngestError};

/// One data row. `index` is the row's 0-based position in the source file and
/// is preserved through deduplication and partitioning.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub index: usize,
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self, IngestError> {
        let mut table = Table::new(headers);
        for (index, values) in rows.into_iter().enumerate() {
            table.push(Row { index, values })?;
        }
        Ok(table)
    }

    /// Builds a table from named columns of equal length.
    pub fn from_columns(columns: Vec<(String, Vec<Value>)>) -> Result<Self, IngestError> {
        let row_count = columns.first().map_or(0, |(_, values)| values.len());
        let headers = columns.iter().map(|(name, _)| name.clone()).collect::<Vec<_>>();
        let mut rows = vec![Vec::with_capacity(headers.len()); row_count];
        for (name, values) in columns {
            if values.len() != row_count {
                return Err(IngestError::ColumnLength {
                    column: name,
                    expected: row_count,
                    found: values.len(),
                });
            }
            for (row, value) in rows.iter_mut().zip(values) {
                row.push(value);
            }
        }
        Table::from_rows(headers, rows)
    }

    pub fn push(&mut self, row: Row) -> Result<(), IngestError> {
        if row.values.len() != self.headers.len() {
            return Err(IngestError::RowWidth {
                row: row.index,
                expected: self.headers.len(),
                found: row.values.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn column_values(&self, column: usize) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| row.values[column].clone())
            .collect()
    }

    /// `(row index, value)` pairs for one column, in row order.
    pub fn column_cells(&self, column: usize) -> impl Iterator<Item = (usize, &Value)> + '_ {
        self.rows.iter().map(move |row| (row.index, &row.values[column]))
    }

    pub fn empty_like(&self) -> Table {
        Table::new(self.headers.clone())
    }

    /// Splits rows into `(matching, rest)`, keeping order and row indices.
    pub fn partition<F>(&self, mut predicate: F) -> (Table, Table)
    where
        F: FnMut(&Row) -> bool,
    {
        let (matching, rest): (Vec<Row>, Vec<Row>) =
            self.rows.iter().cloned().partition(|row| predicate(row));
        (
            Table {
                headers: self.headers.clone(),
                rows: matching,
            },
            Table {
                headers: self.headers.clone(),
                rows: rest,
            },
        )
    }
}
