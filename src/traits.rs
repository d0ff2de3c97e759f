//! Traits for storage abstraction

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::types::*;

/// Key holding the [`BusinessSettings`] JSON
pub const BUSINESS_SETTINGS_KEY: &str = "businessSettings";
/// Key holding the sequence counter map JSON
pub const INVOICE_SEQUENCES_KEY: &str = "invoiceSequences";
/// Key holding the ordered list of [`InvoiceRecord`] JSON objects
pub const GENERATED_INVOICES_KEY: &str = "generatedInvoices";

/// Persisted key-value store the engine reads from and writes to
///
/// Values are JSON documents stored as strings. This lets the engine sit on
/// top of browser local storage, a file, a database row or plain memory.
pub trait KeyValueStore {
    /// Read the raw value stored under `key`
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Replace the value stored under `key`
    fn set(&mut self, key: &str, value: String) -> StoreResult<()>;

    /// Remove `key` from the store
    fn remove(&mut self, key: &str) -> StoreResult<()>;
}

/// Counter store used by the invoice number allocator
///
/// Maps a sequence key (`global`, `YYYY-MM`, `YYYY` or `YYYY-YY`) to the next
/// sequence value to try.
pub trait SequenceStore {
    /// Current counter for `key`, if one has been created
    fn get(&self, key: &str) -> Option<u64>;

    /// Store the next value to try for `key`
    fn set(&mut self, key: &str, value: u64);
}

/// JSON helpers available on every [`KeyValueStore`]
pub trait JsonStoreExt: KeyValueStore {
    /// Read and decode `key`. Corrupt JSON is an error.
    fn read_json<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        match self.get(key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| StoreError::Corrupt {
                    key: key.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    /// Encode `value` and store it under `key`
    fn write_json<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> StoreResult<()> {
        let raw = serde_json::to_string(value)?;
        self.set(key, raw)
    }

    /// Read and decode `key`, treating a missing, unreadable or corrupt value
    /// as "no data"
    fn read_json_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.read_json(key) {
            Ok(Some(value)) => value,
            Ok(None) => T::default(),
            Err(error) => {
                warn!(key, %error, "treating unreadable store value as empty");
                T::default()
            }
        }
    }
}

impl<S: KeyValueStore + ?Sized> JsonStoreExt for S {}
