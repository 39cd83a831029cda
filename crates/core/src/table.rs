//! Row-oriented table representation
//!
//! Rows are stored positionally against the table's column list, so every
//! row has exactly one cell per column.

use crate::value::Scalar;
use crate::{Error, Result};

/// A single row of a table
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Cells in column order
    pub cells: Vec<Scalar>,
    /// 1-based line in the source file (the header is line 1)
    pub source_line: usize,
}

impl Row {
    /// Create a new row
    pub fn new(cells: Vec<Scalar>, source_line: usize) -> Self {
        Self { cells, source_line }
    }

    /// Cell at a column position
    pub fn get(&self, index: usize) -> Option<&Scalar> {
        self.cells.get(index)
    }
}

/// An ordered collection of rows sharing one column set
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Create an empty table with the given columns
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table from rows, checking each row's width
    pub fn from_rows(columns: Vec<String>, rows: Vec<Row>) -> Result<Self> {
        let mut table = Self::new(columns);
        table.rows.reserve(rows.len());
        for row in rows {
            table.push(row)?;
        }
        Ok(table)
    }

    /// Build a table from plain cell vectors, numbering lines from 2
    pub fn from_values<I, R>(columns: &[&str], rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = Scalar>,
    {
        let columns = columns.iter().map(|c| c.to_string()).collect();
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(i, cells)| Row::new(cells.into_iter().collect(), i + 2))
            .collect();
        Self::from_rows(columns, rows)
    }

    /// Append a row
    pub fn push(&mut self, row: Row) -> Result<()> {
        if row.cells.len() != self.columns.len() {
            return Err(Error::RowWidthMismatch {
                line: row.source_line,
                expected: self.columns.len(),
                found: row.cells.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by exact name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Value of `column` in the row at `row`
    pub fn value(&self, row: usize, column: &str) -> Option<&Scalar> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.get(index)
    }

    /// Iterate a row as `(column, value)` pairs
    pub fn row_entries(&self, row: usize) -> Option<impl Iterator<Item = (&str, &Scalar)>> {
        let row = self.rows.get(row)?;
        Some(
            self.columns
                .iter()
                .map(String::as_str)
                .zip(row.cells.iter()),
        )
    }

    /// Same columns, different rows. Rows are assumed to come from a table
    /// with this column set.
    pub(crate) fn with_rows(&self, rows: Vec<Row>) -> Self {
        Self {
            columns: self.columns.clone(),
            rows,
        }
    }
}
