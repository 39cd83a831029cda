//! CSV decoding into tables
//!
//! Reads a header row and the records below it into a [`Table`]. Each
//! column gets a single type, chosen once every record has been read:
//! integer when every present cell is an `i64` literal, float when every
//! present cell is numeric, text otherwise. Text cells keep their literal.

use crate::{CsvOptions, Error, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use csvdedup_core::{Row, Scalar, Table};
use std::collections::HashSet;
use std::io::Read;
use tracing::debug;

/// Type chosen for a whole column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Int,
    Float,
    Text,
}

/// What a single present cell could be read as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellClass {
    Int,
    Float,
    /// Integer literal outside `i64`; only exact as text
    WideInt,
    Text,
}

impl ColumnKind {
    fn widen(self, cell: CellClass) -> Self {
        match (self, cell) {
            (ColumnKind::Text, _) | (_, CellClass::Text) | (_, CellClass::WideInt) => {
                ColumnKind::Text
            }
            (ColumnKind::Int, CellClass::Int) => ColumnKind::Int,
            _ => ColumnKind::Float,
        }
    }
}

/// CSV reader producing whole tables
pub struct CsvReader {
    options: CsvOptions,
    na_values: HashSet<String>,
}

impl CsvReader {
    /// Create a reader with the given options
    pub fn new(options: CsvOptions) -> Self {
        let na_values = options.na_values.iter().cloned().collect();
        Self { options, na_values }
    }

    /// Decode a table from an in-memory buffer
    pub fn read_bytes(&self, data: &[u8]) -> Result<Table> {
        self.read(data)
    }

    /// Decode a table from any reader
    pub fn read<R: Read>(&self, input: R) -> Result<Table> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.options.delimiter_byte()?)
            .trim(if self.options.trim { Trim::All } else { Trim::None })
            .flexible(true)
            .from_reader(input);

        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            return Err(Error::EmptyInput);
        }
        let columns = unique_columns(&headers);
        let width = columns.len();
        debug!("Read header with {} columns: {:?}", width, columns);

        // First pass: raw cells, with missing ones as None
        let mut records: Vec<(usize, Vec<Option<String>>)> = Vec::new();
        let mut record = StringRecord::new();
        while reader.read_record(&mut record)? {
            let line = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(records.len() + 2);

            if record.len() > width {
                return Err(Error::InvalidFile(format!(
                    "expected {} fields in line {}, saw {}",
                    width,
                    line,
                    record.len()
                )));
            }

            let mut cells: Vec<Option<String>> = record
                .iter()
                .map(|raw| (!self.is_missing(raw)).then(|| raw.to_string()))
                .collect();
            // short rows are padded
            cells.resize(width, None);
            records.push((line, cells));
        }

        let kinds = self.column_kinds(width, &records);
        debug!("Column types: {:?}", kinds);

        let mut table = Table::new(columns);
        for (line, cells) in records {
            let cells = cells
                .into_iter()
                .zip(&kinds)
                .map(|(cell, kind)| typed_cell(cell, *kind))
                .collect();
            table.push(Row::new(cells, line))?;
        }

        debug!("Decoded {} rows", table.len());
        Ok(table)
    }

    fn is_missing(&self, raw: &str) -> bool {
        raw.is_empty() || (self.options.infer_types && self.na_values.contains(raw))
    }

    fn column_kinds(
        &self,
        width: usize,
        records: &[(usize, Vec<Option<String>>)],
    ) -> Vec<ColumnKind> {
        if !self.options.infer_types {
            return vec![ColumnKind::Text; width];
        }
        (0..width)
            .map(|col| {
                records
                    .iter()
                    .filter_map(|(_, cells)| cells[col].as_deref())
                    .map(classify)
                    .fold(ColumnKind::Int, ColumnKind::widen)
            })
            .collect()
    }
}

impl Default for CsvReader {
    fn default() -> Self {
        Self::new(CsvOptions::default())
    }
}

fn classify(raw: &str) -> CellClass {
    if raw.parse::<i64>().is_ok() {
        return CellClass::Int;
    }
    let digits = raw.strip_prefix(['+', '-']).unwrap_or(raw);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        return CellClass::WideInt;
    }
    if raw.parse::<f64>().is_ok() {
        CellClass::Float
    } else {
        CellClass::Text
    }
}

/// Convert a present cell to the column's type
fn typed_cell(cell: Option<String>, kind: ColumnKind) -> Scalar {
    let Some(raw) = cell else {
        return Scalar::Missing;
    };
    match kind {
        ColumnKind::Int => match raw.parse::<i64>() {
            Ok(i) => Scalar::Int(i),
            Err(_) => Scalar::Text(raw),
        },
        ColumnKind::Float => match raw.parse::<f64>() {
            Ok(f) if f.is_nan() => Scalar::Missing,
            Ok(f) => Scalar::Float(f),
            Err(_) => Scalar::Text(raw),
        },
        ColumnKind::Text => Scalar::Text(raw),
    }
}

/// Make header names unique by suffixing repeats with `.1`, `.2`, ...
fn unique_columns(headers: &StringRecord) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(headers.len());
    let mut columns = Vec::with_capacity(headers.len());

    for (i, name) in headers.iter().enumerate() {
        let name = if i == 0 {
            name.trim_start_matches('\u{feff}')
        } else {
            name
        };
        let mut candidate = name.to_string();
        let mut counter = 1;
        while seen.contains(&candidate) {
            candidate = format!("{}.{}", name, counter);
            counter += 1;
        }
        seen.insert(candidate.clone());
        columns.push(candidate);
    }
    columns
}
