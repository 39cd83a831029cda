//! CSV encoding of tables
//!
//! Writes the header row followed by every row, with missing cells as
//! empty fields. Also produces in-memory and base64 payloads for callers
//! that hand the file over without touching disk.

use crate::{CsvOptions, Result};
use base64::prelude::{Engine, BASE64_STANDARD};
use csv::WriterBuilder;
use csvdedup_core::Table;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// CSV writer for whole tables
#[derive(Debug, Clone, Default)]
pub struct CsvWriter {
    options: CsvOptions,
}

impl CsvWriter {
    pub fn new(options: CsvOptions) -> Self {
        Self { options }
    }

    /// Write `table` to any sink
    pub fn write<W: Write>(&self, sink: W, table: &Table) -> Result<()> {
        let mut writer = WriterBuilder::new()
            .delimiter(self.options.delimiter_byte()?)
            .from_writer(sink);

        writer.write_record(table.columns())?;
        for row in table.rows() {
            writer.write_record(row.cells.iter().map(|c| c.to_field()))?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Write `table` to a new file at `path`
    pub fn write_file<P: AsRef<Path>>(&self, path: P, table: &Table) -> Result<()> {
        let path = path.as_ref();
        debug!("Writing {} rows to {:?}", table.len(), path);
        let file = File::create(path)?;
        self.write(std::io::BufWriter::new(file), table)
    }

    /// Encode `table` into a byte buffer
    pub fn to_bytes(&self, table: &Table) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write(&mut buffer, table)?;
        Ok(buffer)
    }

    /// Encode `table` as base64 of its CSV bytes
    pub fn to_base64(&self, table: &Table) -> Result<String> {
        Ok(encode_base64(&self.to_bytes(table)?))
    }
}

/// Standard base64 with padding
pub fn encode_base64(bytes: &[u8]) -> String {
    BASE64_STANDARD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CsvReader;
    use csvdedup_core::Scalar;
    use tempfile::NamedTempFile;

    fn sample() -> Table {
        Table::from_values(
            &["id", "name", "score"],
            vec![
                vec![Scalar::Int(1), Scalar::text("A"), Scalar::Float(2.0)],
                vec![Scalar::Int(2), Scalar::text("B, Jr."), Scalar::Missing],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_to_bytes() {
        let bytes = CsvWriter::default().to_bytes(&sample()).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "id,name,score\n1,A,2.0\n2,\"B, Jr.\",\n"
        );
    }

    #[test]
    fn test_header_only_for_empty_table() {
        let table = Table::new(vec!["id".to_string()]);
        let bytes = CsvWriter::default().to_bytes(&table).unwrap();
        assert_eq!(bytes, b"id\n");
    }

    #[test]
    fn test_tab_delimiter() {
        let bytes = CsvWriter::new(CsvOptions::tsv()).to_bytes(&sample()).unwrap();
        assert!(String::from_utf8(bytes).unwrap().starts_with("id\tname\tscore\n"));
    }

    #[test]
    fn test_to_base64() {
        let table = Table::from_values(&["id"], vec![vec![Scalar::Int(1)]]).unwrap();
        let encoded = CsvWriter::default().to_base64(&table).unwrap();
        // "id\n1\n"
        assert_eq!(encoded, "aWQKMQo=");
    }

    #[test]
    fn test_write_file_reads_back() {
        let temp_file = NamedTempFile::new().unwrap();
        CsvWriter::default().write_file(temp_file.path(), &sample()).unwrap();

        let table = CsvReader::default()
            .read(std::fs::File::open(temp_file.path()).unwrap())
            .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.value(1, "name"), Some(&Scalar::text("B, Jr.")));
        assert_eq!(table.value(1, "score"), Some(&Scalar::Missing));
    }

    /// Decode, deduplicate on `column`, encode; returns output text and report
    fn dedup_csv(input: &str, column: &str) -> (String, String, usize) {
        let table = CsvReader::default().read_bytes(input.as_bytes()).unwrap();
        let result = csvdedup_core::deduplicate(&table, column).unwrap();
        let bytes = CsvWriter::default().to_bytes(&result.table).unwrap();
        (
            String::from_utf8(bytes).unwrap(),
            result.duplicates.report(),
            result.table.len(),
        )
    }

    #[test]
    fn test_dedup_keeps_wide_ids_apart() {
        let input = "id,name\n12345678901234567890,A\n12345678901234567891,B\n";
        let (output, report, kept) = dedup_csv(input, "id");

        assert_eq!(kept, 2);
        assert_eq!(report, "None");
        assert_eq!(output, input);
    }

    #[test]
    fn test_dedup_mixed_column_preserves_literals() {
        let input = "zip,name\n02134,A\n2134,B\nN/A-unknown,C\n1.0,D\n1,E\n";
        let (output, report, kept) = dedup_csv(input, "zip");

        assert_eq!(kept, 5);
        assert_eq!(report, "None");
        assert_eq!(output, input);
    }

    #[test]
    fn test_dedup_float_column() {
        let (output, report, kept) = dedup_csv("id\n1\n2.5\n1\n", "id");

        assert_eq!(kept, 2);
        assert_eq!(report, "1.0");
        assert_eq!(output, "id\n1.0\n2.5\n");
    }

    #[test]
    fn test_dedup_integer_column_drops_leading_zeros() {
        let (output, report, kept) = dedup_csv("id,name\n007,A\n7,B\n8,C\n", "id");

        assert_eq!(kept, 2);
        assert_eq!(report, "7");
        assert_eq!(output, "id,name\n7,A\n8,C\n");
    }

    #[test]
    fn test_dedup_raw_mode_keeps_leading_zeros() {
        let input = "id,name\n007,A\n7,B\n";
        let table = CsvReader::new(CsvOptions::default().raw())
            .read_bytes(input.as_bytes())
            .unwrap();
        let result = csvdedup_core::deduplicate(&table, "id").unwrap();
        let bytes = CsvWriter::default().to_bytes(&result.table).unwrap();

        assert_eq!(result.duplicates.report(), "None");
        assert_eq!(String::from_utf8(bytes).unwrap(), input);
    }
}
