//! In-memory storage implementations for testing and embedding

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use crate::traits::*;
use crate::types::*;

/// In-memory key-value store
///
/// Clones share the same underlying map, so an engine and the test that
/// drives it can observe each other's writes.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    /// Create a new, empty memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored
    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    /// Whether the store holds no keys
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) -> StoreResult<()> {
        self.entries
            .write()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))?
            .clear();
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> StoreResult<()> {
        self.entries
            .write()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))?
            .insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        self.entries
            .write()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))?
            .remove(key);
        Ok(())
    }
}

/// Sequence counters keyed by reset period, persisted under `invoiceSequences`
///
/// Serializes as a flat JSON object, e.g. `{"2025-03": 4, "global": 17}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SequenceCounterMap {
    counters: BTreeMap<String, u64>,
}

impl SequenceCounterMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Iterate over `(sequence key, next value)` pairs in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counters.iter().map(|(key, value)| (key.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}

impl SequenceStore for SequenceCounterMap {
    fn get(&self, key: &str) -> Option<u64> {
        self.counters.get(key).copied()
    }

    fn set(&mut self, key: &str, value: u64) {
        self.counters.insert(key.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_shares_state_between_clones() {
        let mut store = MemoryStore::new();
        let observer = store.clone();

        store.set("businessSettings", "{}".to_string()).unwrap();
        assert_eq!(
            observer.get("businessSettings").unwrap(),
            Some("{}".to_string())
        );
        assert_eq!(observer.len(), 1);

        store.remove("businessSettings").unwrap();
        assert!(observer.is_empty());
    }

    #[test]
    fn test_json_helpers() {
        let mut store = MemoryStore::new();
        let mut counters = SequenceCounterMap::new();
        counters.set("2025-03", 4);
        store.write_json(INVOICE_SEQUENCES_KEY, &counters).unwrap();

        assert_eq!(
            store.get(INVOICE_SEQUENCES_KEY).unwrap().unwrap(),
            r#"{"2025-03":4}"#
        );
        let loaded: SequenceCounterMap = store.read_json_or_default(INVOICE_SEQUENCES_KEY);
        assert_eq!(loaded, counters);
    }

    #[test]
    fn test_corrupt_json_reads_as_empty() {
        let mut store = MemoryStore::new();
        store
            .set(INVOICE_SEQUENCES_KEY, "{not json".to_string())
            .unwrap();

        assert!(matches!(
            store.read_json::<SequenceCounterMap>(INVOICE_SEQUENCES_KEY),
            Err(StoreError::Corrupt { .. })
        ));
        let loaded: SequenceCounterMap = store.read_json_or_default(INVOICE_SEQUENCES_KEY);
        assert!(loaded.is_empty());
    }
}
