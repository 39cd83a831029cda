//! Handing cleaned files to the user
//!
//! A cleaned table is encoded once, staged in a [`ResultStore`] and then
//! delivered by its id. Removed-row logs are written alongside.

use anyhow::{anyhow, Context, Result};
use csvdedup_core::{Removal, ResultId, ResultStore};
use csvdedup_formats::encode_base64;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Where a staged result ends up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Write CSV bytes to this path
    File(PathBuf),
    /// Return the bytes as base64 text
    Base64,
}

/// What a delivery produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivered {
    Written { path: PathBuf, bytes: usize },
    Encoded(String),
}

/// Take a staged result out of the store and deliver it
pub fn deliver(store: &ResultStore, id: &ResultId, target: &Delivery) -> Result<Delivered> {
    let result = store
        .take(id)
        .ok_or_else(|| anyhow!("Cleaned file {} expired or is unknown", id))?;
    debug!("Delivering {} ({} bytes)", result.name, result.bytes.len());

    match target {
        Delivery::File(path) => {
            std::fs::write(path, &result.bytes)
                .with_context(|| format!("Failed to write output file: {}", path.display()))?;
            info!("Wrote {:?} ({} bytes)", path, result.bytes.len());
            Ok(Delivered::Written {
                path: path.clone(),
                bytes: result.bytes.len(),
            })
        }
        Delivery::Base64 => Ok(Delivered::Encoded(encode_base64(&result.bytes))),
    }
}

/// Default cleaned-file path next to the input.
///
/// Examples:
///   people.csv     → people.deduped.csv
///   people.tsv.gz  → people.deduped.tsv
fn deduped_name(input: &Path) -> String {
    let name = input
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    let name = name
        .strip_suffix(".gz")
        .or_else(|| name.strip_suffix(".GZ"))
        .unwrap_or(&name);
    let inner = Path::new(name);
    let stem = inner.file_stem().unwrap_or_default().to_string_lossy();
    let ext = inner
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .filter(|e| e == "tsv")
        .unwrap_or_else(|| "csv".to_string());
    format!("{}.deduped.{}", stem, ext)
}

/// Default cleaned-file path in the input's directory
pub fn default_output(input: &Path) -> PathBuf {
    let parent = input.parent().unwrap_or_else(|| Path::new("."));
    parent.join(deduped_name(input))
}

/// Default cleaned-file path inside `dir`
pub fn output_in_dir(dir: &Path, input: &Path) -> PathBuf {
    dir.join(deduped_name(input))
}

/// Write one JSON object per removed row
pub fn write_removals(path: &Path, key_column: &str, removals: &[Removal]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create removed-rows log: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    for removal in removals {
        let entry = serde_json::json!({
            "line": removal.line,
            "duplicate_of_line": removal.duplicate_of_line,
            "column": key_column,
            "value": removal.value,
            "display": removal.value.to_string(),
        });
        writeln!(writer, "{}", serde_json::to_string(&entry)?)?;
    }
    writer.flush()?;
    info!("Wrote {} removed rows to {:?}", removals.len(), path);
    Ok(())
}
