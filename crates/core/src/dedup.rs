//! First-occurrence tracking for key values

use crate::value::KeyRef;
use ahash::AHashMap;

/// Tracks which keys have been seen and where they first appeared
pub struct KeyTracker<'a> {
    first_seen: AHashMap<KeyRef<'a>, usize>,
}

impl<'a> KeyTracker<'a> {
    /// Create a new tracker
    pub fn new() -> Self {
        Self {
            first_seen: AHashMap::new(),
        }
    }

    /// Create a tracker sized for `capacity` distinct keys
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            first_seen: AHashMap::with_capacity(capacity),
        }
    }

    /// Record `key` at `position`.
    ///
    /// Returns `None` on the first sighting, or the position of the first
    /// sighting if the key was seen before.
    pub fn observe(&mut self, key: KeyRef<'a>, position: usize) -> Option<usize> {
        match self.first_seen.get(&key) {
            Some(&first) => Some(first),
            None => {
                self.first_seen.insert(key, position);
                None
            }
        }
    }
}

impl Default for KeyTracker<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_tracker() {
        let mut tracker = KeyTracker::new();

        assert_eq!(tracker.observe(KeyRef::Int(123), 0), None);
        assert_eq!(tracker.observe(KeyRef::Int(123), 1), Some(0));
        assert_eq!(tracker.observe(KeyRef::Text("123"), 2), None);
        assert_eq!(tracker.observe(KeyRef::Int(123), 3), Some(0));
        assert_eq!(tracker.observe(KeyRef::Text("123"), 4), Some(2));
    }
}
