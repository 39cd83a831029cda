//! File-level table loading
//!
//! Picks the CSV dialect from the file extension and transparently
//! decompresses gzip input.

use crate::{CsvOptions, CsvReader, Error, Result};
use csvdedup_core::Table;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::info;

/// Supported table formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Tsv,
}

/// Detect format and compression from a path
///
/// Supported extensions:
/// - `.csv`, `.txt` - comma separated (or the configured delimiter)
/// - `.tsv` - tab separated
/// - `.gz` - gzip of any of the above, e.g. `data.csv.gz`
pub fn detect_format(path: &Path) -> Result<(TableFormat, bool)> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| Error::UnsupportedFormat("No file extension found".to_string()))?;

    let (extension, gzipped) = if extension.eq_ignore_ascii_case("gz") {
        let inner = path
            .file_stem()
            .map(Path::new)
            .and_then(|stem| stem.extension())
            .and_then(|e| e.to_str())
            .unwrap_or("csv");
        (inner, true)
    } else {
        (extension, false)
    };

    let format = match extension.to_ascii_lowercase().as_str() {
        "csv" | "txt" => TableFormat::Csv,
        "tsv" => TableFormat::Tsv,
        other => {
            return Err(Error::UnsupportedFormat(format!(
                "Unsupported file extension: {}",
                other
            )))
        }
    };
    Ok((format, gzipped))
}

/// Open and decode a table with automatic format detection
///
/// `.tsv` files always use a tab delimiter; other options apply as given.
pub fn open_table<P: AsRef<Path>>(path: P, options: &CsvOptions) -> Result<Table> {
    let path = path.as_ref();
    let (format, gzipped) = detect_format(path)?;

    info!(
        "Opening table: {:?} (format: {:?}, gzip: {})",
        path, format, gzipped
    );

    let options = match format {
        TableFormat::Csv => options.clone(),
        TableFormat::Tsv => CsvOptions {
            delimiter: '\t',
            ..options.clone()
        },
    };

    let file = File::open(path)?;
    let input: Box<dyn Read> = if gzipped {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };

    CsvReader::new(options).read(BufReader::new(input))
}
