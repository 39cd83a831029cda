//! Short-lived, content-addressed storage for encoded results
//!
//! Holds cleaned files between producing them and handing them to whoever
//! delivers them. Entries are keyed by a hash of their bytes and expire
//! after a fixed time to live.

use crate::hash::content_id;
use ahash::AHashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::debug;

/// Handle for a stored result
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResultId(String);

impl ResultId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResultId {
    fn from(s: &str) -> Self {
        ResultId(s.to_string())
    }
}

/// A stored payload
#[derive(Debug, Clone, PartialEq)]
pub struct StoredResult {
    /// Suggested file name for delivery
    pub name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug)]
struct Entry {
    result: StoredResult,
    expires_at: Instant,
}

/// Store settings
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// How long an entry stays retrievable
    pub ttl: Duration,
    /// Maximum number of entries; the oldest is evicted when full
    pub max_entries: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(15 * 60),
            max_entries: 64,
        }
    }
}

/// Thread-safe result store
#[derive(Debug)]
pub struct ResultStore {
    config: StoreConfig,
    entries: Mutex<AHashMap<ResultId, Entry>>,
}

impl ResultStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            entries: Mutex::new(AHashMap::new()),
        }
    }

    /// Store `bytes` under their content id and return the id.
    ///
    /// Storing identical bytes again refreshes the entry's expiry.
    pub fn insert(&self, name: impl Into<String>, bytes: Vec<u8>) -> ResultId {
        let id = ResultId(content_id(&bytes));
        let now = Instant::now();
        let mut entries = self.lock();

        Self::purge_locked(&mut entries, now);
        if !entries.contains_key(&id) && entries.len() >= self.config.max_entries.max(1) {
            // evict whatever expires soonest, i.e. the oldest insert
            if let Some(oldest) = entries
                .iter()
                .min_by_key(|(_, e)| e.expires_at)
                .map(|(k, _)| k.clone())
            {
                debug!("Evicting stored result {}", oldest);
                entries.remove(&oldest);
            }
        }

        entries.insert(
            id.clone(),
            Entry {
                result: StoredResult {
                    name: name.into(),
                    bytes,
                },
                expires_at: now + self.config.ttl,
            },
        );
        id
    }

    /// Copy of a live entry
    pub fn get(&self, id: &ResultId) -> Option<StoredResult> {
        let entries = self.lock();
        entries
            .get(id)
            .filter(|e| e.expires_at > Instant::now())
            .map(|e| e.result.clone())
    }

    /// Remove and return a live entry
    pub fn take(&self, id: &ResultId) -> Option<StoredResult> {
        let mut entries = self.lock();
        let entry = entries.remove(id)?;
        (entry.expires_at > Instant::now()).then_some(entry.result)
    }

    /// Drop expired entries, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        Self::purge_locked(&mut self.lock(), Instant::now())
    }

    /// Number of entries currently held, expired or not
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn purge_locked(entries: &mut AHashMap<ResultId, Entry>, now: Instant) -> usize {
        let before = entries.len();
        entries.retain(|_, e| e.expires_at > now);
        let removed = before - entries.len();
        if removed > 0 {
            debug!("Purged {} expired results", removed);
        }
        removed
    }

    fn lock(&self) -> MutexGuard<'_, AHashMap<ResultId, Entry>> {
        // entries stay consistent even if a holder panicked
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for ResultStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}
