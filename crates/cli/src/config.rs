//! Configuration file support for deduplication runs

use anyhow::{Context, Result};
use csvdedup_core::StoreConfig;
use csvdedup_formats::CsvOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Complete run configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Column whose repeated values are removed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_column: Option<String>,
    pub csv: CsvOptions,
    pub output: OutputConfig,
    pub store: StoreSettings,
}

impl DedupConfig {
    /// Load configuration from a file (YAML or TOML)
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("");

        match extension {
            "yaml" | "yml" => serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            "toml" => toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            _ => Err(anyhow::anyhow!(
                "Unsupported config file format: {}. Use .yaml, .yml, or .toml",
                extension
            )),
        }
    }

    /// Load from `path` when given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("");

        let content = match extension {
            "yaml" | "yml" => serde_yaml::to_string(self)?,
            "toml" => toml::to_string_pretty(self)?,
            _ => {
                return Err(anyhow::anyhow!(
                    "Unsupported config file format: {}. Use .yaml, .yml, or .toml",
                    extension
                ))
            }
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Where the cleaned file goes (defaults to `<stem>.deduped.<ext>`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// How the cleaned file is delivered
    pub encoding: OutputEncoding,
    /// Where to write a JSON-lines log of removed rows
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removed: Option<String>,
}

/// Delivery encoding for the cleaned file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputEncoding {
    /// Plain CSV written to the output path
    #[default]
    Csv,
    /// Base64 of the CSV bytes printed to stdout
    Base64,
}

/// Result store settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Seconds a cleaned file stays retrievable
    pub ttl_secs: u64,
    /// Maximum number of cleaned files held at once
    pub max_entries: usize,
}

impl Default for StoreSettings {
    fn default() -> Self {
        let defaults = StoreConfig::default();
        Self {
            ttl_secs: defaults.ttl.as_secs(),
            max_entries: defaults.max_entries,
        }
    }
}

impl StoreSettings {
    /// Store config able to hold at least `min_entries` results
    pub fn to_store_config(&self, min_entries: usize) -> StoreConfig {
        StoreConfig {
            ttl: Duration::from_secs(self.ttl_secs),
            max_entries: self.max_entries.max(min_entries),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> DedupConfig {
        DedupConfig {
            key_column: Some("email".to_string()),
            csv: CsvOptions {
                delimiter: ';',
                ..CsvOptions::default()
            },
            output: OutputConfig {
                path: Some("clean.csv".to_string()),
                encoding: OutputEncoding::Base64,
                removed: Some("removed.jsonl".to_string()),
            },
            store: StoreSettings {
                ttl_secs: 60,
                max_entries: 4,
            },
        }
    }

    #[test]
    fn test_save_and_load_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dedup.yaml");

        sample().save(&path).unwrap();
        let loaded = DedupConfig::load(&path).unwrap();

        assert_eq!(loaded, sample());
    }

    #[test]
    fn test_save_and_load_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dedup.toml");

        sample().save(&path).unwrap();
        let loaded = DedupConfig::load(&path).unwrap();

        assert_eq!(loaded, sample());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dedup.yml");
        std::fs::write(&path, "key_column: id\ncsv:\n  infer_types: false\n").unwrap();

        let loaded = DedupConfig::load(&path).unwrap();
        assert_eq!(loaded.key_column.as_deref(), Some("id"));
        assert!(!loaded.csv.infer_types);
        assert_eq!(loaded.csv.delimiter, ',');
        assert_eq!(loaded.output.encoding, OutputEncoding::Csv);
        assert_eq!(loaded.store, StoreSettings::default());
    }

    #[test]
    fn test_unsupported_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dedup.json");

        assert!(sample().save(&path).is_err());
        std::fs::write(&path, "{}").unwrap();
        assert!(DedupConfig::load(&path).is_err());
    }

    #[test]
    fn test_store_config_respects_minimum() {
        let settings = StoreSettings {
            ttl_secs: 5,
            max_entries: 2,
        };
        let config = settings.to_store_config(10);
        assert_eq!(config.max_entries, 10);
        assert_eq!(config.ttl, Duration::from_secs(5));
    }
}
