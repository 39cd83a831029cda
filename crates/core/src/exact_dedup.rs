//! Key-column deduplication
//!
//! Keeps the first row for every distinct value of one column and drops the
//! rest, reporting which values repeated. The pass is pure: inputs are only
//! borrowed and the cleaned table is a new value.

use crate::dedup::KeyTracker;
use crate::table::{Row, Table};
use crate::value::{KeyRef, Scalar};
use crate::{Error, Result};
use ahash::AHashSet;
use serde::Serialize;
use std::fmt;

/// Report text used when no value repeats
pub const NO_DUPLICATES: &str = "None";

/// Separator between values in the duplicate report
pub const REPORT_SEPARATOR: &str = ", ";

/// Statistics for a deduplication pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DedupStats {
    /// Total number of rows scanned
    pub total_seen: usize,
    /// Number of rows dropped
    pub duplicates_found: usize,
    /// Number of rows kept
    pub unique_count: usize,
    /// Number of distinct values that repeated
    pub duplicated_values: usize,
}

impl DedupStats {
    /// Get the deduplication rate as a percentage
    pub fn dedup_rate(&self) -> f64 {
        if self.total_seen == 0 {
            0.0
        } else {
            (self.duplicates_found as f64 / self.total_seen as f64) * 100.0
        }
    }
}

/// Distinct key values that occurred more than once, in first-seen order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DuplicateSet {
    values: Vec<Scalar>,
}

impl DuplicateSet {
    pub fn values(&self) -> &[Scalar] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, value: &Scalar) -> bool {
        self.values.contains(value)
    }

    /// Each value in its display form
    pub fn display_strings(&self) -> Vec<String> {
        self.values.iter().map(Scalar::to_string).collect()
    }

    /// Comma-joined report, or `None` when nothing repeated
    pub fn report(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for DuplicateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.values.is_empty() {
            return f.write_str(NO_DUPLICATES);
        }
        f.write_str(&self.display_strings().join(REPORT_SEPARATOR))
    }
}

/// A dropped row and the kept row it repeats
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Removal {
    /// Source line of the dropped row
    pub line: usize,
    /// Source line of the first row carrying the same key
    pub duplicate_of_line: usize,
    /// The shared key value
    pub value: Scalar,
}

/// Output of a successful deduplication
#[derive(Debug, Clone)]
pub struct Deduplicated {
    /// Input columns with the first row per key
    pub table: Table,
    pub duplicates: DuplicateSet,
    pub removals: Vec<Removal>,
    pub stats: DedupStats,
}

/// Remove rows whose `key_column` value already appeared in an earlier row.
///
/// Fails with [`Error::MissingKeyColumn`] when `key_column` is blank and
/// with [`Error::MissingColumn`] when the table has no such column. Both
/// checks run before any row is scanned.
pub fn deduplicate(table: &Table, key_column: &str) -> Result<Deduplicated> {
    if key_column.trim().is_empty() {
        return Err(Error::MissingKeyColumn);
    }
    let index = table
        .column_index(key_column)
        .ok_or_else(|| Error::MissingColumn(key_column.to_string()))?;

    let rows = table.rows();
    let mut tracker = KeyTracker::with_capacity(rows.len());
    let mut reported: AHashSet<KeyRef<'_>> = AHashSet::new();
    let mut duplicates = Vec::new();
    let mut removals = Vec::new();
    let mut kept: Vec<Row> = Vec::with_capacity(rows.len());

    for (position, row) in rows.iter().enumerate() {
        let value = &row.cells[index];
        let key = value.key();

        match tracker.observe(key, position) {
            None => kept.push(row.clone()),
            Some(first) => {
                let first_row = &rows[first];
                if reported.insert(key) {
                    duplicates.push(first_row.cells[index].clone());
                }
                removals.push(Removal {
                    line: row.source_line,
                    duplicate_of_line: first_row.source_line,
                    value: value.clone(),
                });
            }
        }
    }

    let stats = DedupStats {
        total_seen: rows.len(),
        duplicates_found: removals.len(),
        unique_count: kept.len(),
        duplicated_values: duplicates.len(),
    };

    Ok(Deduplicated {
        table: table.with_rows(kept),
        duplicates: DuplicateSet { values: duplicates },
        removals,
        stats,
    })
}
