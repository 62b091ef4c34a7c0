//! Completion persistence seam.
//!
//! The engine records "this tour has been seen" as the literal string
//! `"true"` under the caller-supplied `local_key`, and treats any non-empty
//! stored value as truthy on read. The store itself is external: browser
//! local storage, a settings file, or the in-memory store below.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Value written when a tour completes.
pub(crate) const COMPLETED: &str = "true";

// =============================================================================
// Store trait
// =============================================================================

/// Synchronous durable key-value store for completion flags.
pub trait CompletionStore {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`.
    fn set(&mut self, key: &str, value: &str);
}

/// Shared handle to a completion store.
///
/// The engine only borrows it around single `get`/`set` calls, so callers
/// can keep their own clone and inspect it while a tour is mounted.
pub type SharedStore = Rc<RefCell<dyn CompletionStore>>;

/// Truthiness of a stored completion value: present and non-empty.
pub(crate) fn is_truthy(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

// =============================================================================
// In-memory store
// =============================================================================

/// Process-local [`CompletionStore`], used by the test suite and by
/// embedders without durable storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate an entry, e.g. to simulate a previously finished tour.
    pub fn seed(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }
}

impl CompletionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_back_written_flag() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("tour-a"), None);

        store.set("tour-a", COMPLETED);
        assert_eq!(store.get("tour-a").as_deref(), Some("true"));
    }

    #[test]
    fn truthiness_matches_storage_semantics() {
        assert!(is_truthy(Some("true")));
        // Any non-empty value counts, even "false".
        assert!(is_truthy(Some("false")));
        assert!(!is_truthy(Some("")));
        assert!(!is_truthy(None));
    }
}
