//! CSV dialect and column typing options

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Cell texts read as missing when type inference is on
pub const DEFAULT_NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Options shared by the CSV reader and writer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvOptions {
    /// Field delimiter, must be a single ASCII character
    pub delimiter: char,
    /// Trim surrounding whitespace from headers and cells
    pub trim: bool,
    /// Parse numbers and NA markers; when off every non-empty cell is text
    pub infer_types: bool,
    /// Cell texts treated as missing when `infer_types` is on
    pub na_values: Vec<String>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            trim: false,
            infer_types: true,
            na_values: DEFAULT_NA_VALUES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl CsvOptions {
    /// Tab-separated defaults
    pub fn tsv() -> Self {
        Self {
            delimiter: '\t',
            ..Self::default()
        }
    }

    /// Keep every cell as text
    pub fn raw(mut self) -> Self {
        self.infer_types = false;
        self
    }

    /// Delimiter as the byte the csv crate expects
    pub fn delimiter_byte(&self) -> Result<u8> {
        if self.delimiter.is_ascii() && self.delimiter != '"' && self.delimiter != '\n' {
            Ok(self.delimiter as u8)
        } else {
            Err(Error::InvalidOptions(format!(
                "delimiter must be a single ASCII character other than quote or newline, got {:?}",
                self.delimiter
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delimiter_byte() {
        assert_eq!(CsvOptions::default().delimiter_byte().unwrap(), b',');
        assert_eq!(CsvOptions::tsv().delimiter_byte().unwrap(), b'\t');

        let bad = CsvOptions {
            delimiter: '§',
            ..CsvOptions::default()
        };
        assert!(matches!(bad.delimiter_byte(), Err(Error::InvalidOptions(_))));
    }

    #[test]
    fn test_default_na_values_include_empty_and_nan() {
        let options = CsvOptions::default();
        assert!(options.na_values.iter().any(|v| v.is_empty()));
        assert!(options.na_values.iter().any(|v| v == "NaN"));
        assert!(options.infer_types);
        assert!(!options.clone().raw().infer_types);
    }
}
