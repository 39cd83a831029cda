//! Core deduplication logic for CSV tables
//!
//! This crate provides the table model and the key-column deduplication
//! engine, plus a small store for handing encoded results to a caller.

pub mod error;
pub mod value;
pub mod table;
pub mod dedup;
pub mod exact_dedup;
pub mod hash;
pub mod result_store;

pub use error::{Error, Result};
pub use exact_dedup::{deduplicate, DedupStats, Deduplicated, DuplicateSet, Removal, NO_DUPLICATES};
pub use result_store::{ResultId, ResultStore, StoreConfig, StoredResult};
pub use table::{Row, Table};
pub use value::Scalar;
