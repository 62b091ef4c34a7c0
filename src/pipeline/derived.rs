//! Invalidation-keyed derivation.
//!
//! The anchor and its positioning context are derived values: pure
//! functions of the step index and the resync tick. Instead of a reactive
//! dependency graph, the cache is keyed by an explicit version tuple. A
//! stale key throws the cached value away, an equal key reuses it. Writes
//! to either input change the key, so recomputation happens exactly when a
//! declared dependency changed.

/// One cached derivation, keyed by the version tuple of its inputs.
pub(crate) struct DerivedCell<K: PartialEq, V> {
    entry: Option<(K, V)>,
}

impl<K: PartialEq, V> DerivedCell<K, V> {
    pub fn new() -> Self {
        Self { entry: None }
    }

    /// Whether the cache holds a value for `key`.
    pub fn is_stale(&self, key: &K) -> bool {
        !matches!(&self.entry, Some((k, _)) if k == key)
    }

    /// Replace the cached value, keyed by `key`.
    pub fn store(&mut self, key: K, value: V) {
        self.entry = Some((key, value));
    }

    /// The cached value, regardless of key.
    pub fn current(&self) -> Option<&V> {
        self.entry.as_ref().map(|(_, v)| v)
    }

    /// Drop the cached value entirely.
    #[cfg(test)]
    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_cell_is_stale_for_every_key() {
        let cell: DerivedCell<(i32, u64), &str> = DerivedCell::new();
        assert!(cell.is_stale(&(0, 0)));
        assert!(cell.current().is_none());
    }

    #[test]
    fn stores_and_reuses_under_the_same_key() {
        let mut cell = DerivedCell::new();
        cell.store((1, 7), "value");

        assert!(!cell.is_stale(&(1, 7)));
        assert_eq!(cell.current(), Some(&"value"));
    }

    #[test]
    fn any_key_component_change_invalidates() {
        let mut cell = DerivedCell::new();
        cell.store((1, 7), "value");

        assert!(cell.is_stale(&(2, 7)));
        assert!(cell.is_stale(&(1, 8)));
    }

    #[test]
    fn invalidate_drops_the_value() {
        let mut cell = DerivedCell::new();
        cell.store((1, 7), "value");
        cell.invalidate();
        assert!(cell.current().is_none());
    }
}
