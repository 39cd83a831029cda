//! CSV readers and writers for csvdedup
//!
//! Decodes uploaded CSV bytes into [`csvdedup_core::Table`] values and
//! encodes cleaned tables back to bytes.

pub mod csv_reader;
pub mod csv_writer;
pub mod error;
pub mod options;
pub mod reader;

pub use csv_reader::CsvReader;
pub use csv_writer::{encode_base64, CsvWriter};
pub use error::{Error, Result};
pub use options::{CsvOptions, DEFAULT_NA_VALUES};
pub use reader::{detect_format, open_table, TableFormat};
