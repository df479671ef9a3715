//! Persistence of the record list and id counter.
//!
//! Storage is a plain string key-value interface so the same record store runs
//! over SQLite on disk or an in-memory map. The record list is kept as one
//! JSON document under a single key and the counter as a decimal string under
//! another; key names are configuration.

mod memory;
mod migration;

pub use memory::MemoryStore;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{InventoryError, Record, Result};

/// String key-value storage.
pub trait KeyValueStore {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// Storage keys used by the record store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreKeys {
    /// Key holding the JSON record list.
    pub records: String,
    /// Key holding the id counter.
    pub counter: String,
    /// Retired key that once held the tag vocabulary; removed on startup.
    pub legacy_tags: String,
}

impl Default for StoreKeys {
    fn default() -> Self {
        Self {
            records: "stockData".to_string(),
            counter: "productCounter".to_string(),
            legacy_tags: "stockTags".to_string(),
        }
    }
}

/// Records read from storage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedRecords {
    pub records: Vec<Record>,
    /// How many records needed a legacy-format repair while loading.
    pub migrated: usize,
}

/// Snapshot of what is currently persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageInfo {
    pub record_count: usize,
    pub counter: u64,
    pub has_data: bool,
    /// Size in bytes of the serialized record list.
    pub storage_size: usize,
}

/// Loads and saves inventory state through a [`KeyValueStore`].
pub struct RecordStore<S> {
    backend: S,
    keys: StoreKeys,
}

impl<S: KeyValueStore> RecordStore<S> {
    /// Creates a record store with the default keys.
    pub fn new(backend: S) -> Self {
        Self::with_keys(backend, StoreKeys::default())
    }

    /// Creates a record store with custom keys.
    pub fn with_keys(backend: S, keys: StoreKeys) -> Self {
        Self { backend, keys }
    }

    /// Returns the underlying key-value backend.
    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Returns the keys in use.
    pub fn keys(&self) -> &StoreKeys {
        &self.keys
    }

    /// Loads the record list.
    ///
    /// A missing key yields an empty list. Records in older layouts (a single
    /// `tag` string instead of a `tags` list, non-string names) are repaired
    /// on the way in.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::CorruptData`] if the stored text is not a
    /// JSON array of records.
    pub fn load_records(&self) -> Result<LoadedRecords> {
        let Some(raw) = self.backend.get(&self.keys.records)? else {
            debug!(key = %self.keys.records, "no stored records");
            return Ok(LoadedRecords::default());
        };

        let values: Vec<Value> = serde_json::from_str(&raw).map_err(InventoryError::CorruptData)?;

        let mut loaded = LoadedRecords::default();
        for mut value in values {
            if migration::repair_record(&mut value) {
                loaded.migrated += 1;
            }
            let record: Record =
                serde_json::from_value(value).map_err(InventoryError::CorruptData)?;
            loaded.records.push(record);
        }

        if loaded.migrated > 0 {
            info!(count = loaded.migrated, "migrated legacy records");
        }
        debug!(count = loaded.records.len(), "loaded records");
        Ok(loaded)
    }

    /// Loads the id counter, defaulting to 1 when missing or unreadable.
    pub fn load_counter(&self) -> Result<u64> {
        let Some(raw) = self.backend.get(&self.keys.counter)? else {
            return Ok(1);
        };
        match raw.trim().parse() {
            Ok(counter) => Ok(counter),
            Err(_) => {
                warn!(value = %raw, "stored counter is not a number, starting from 1");
                Ok(1)
            }
        }
    }

    /// Persists the record list.
    pub fn save_records(&mut self, records: &[Record]) -> Result<()> {
        let json = serde_json::to_string(records).map_err(InventoryError::CorruptData)?;
        self.backend.set(&self.keys.records, &json)?;
        debug!(count = records.len(), bytes = json.len(), "saved records");
        Ok(())
    }

    /// Persists the id counter.
    pub fn save_counter(&mut self, counter: u64) -> Result<()> {
        self.backend.set(&self.keys.counter, &counter.to_string())
    }

    /// Persists both the record list and the counter.
    pub fn save_all(&mut self, records: &[Record], counter: u64) -> Result<()> {
        self.save_records(records)?;
        self.save_counter(counter)
    }

    /// Removes the retired tag vocabulary key if it is still present.
    ///
    /// Returns true if something was removed.
    pub fn cleanup_legacy_tags(&mut self) -> Result<bool> {
        if self.backend.get(&self.keys.legacy_tags)?.is_none() {
            return Ok(false);
        }
        self.backend.remove(&self.keys.legacy_tags)?;
        info!(key = %self.keys.legacy_tags, "removed legacy tag storage");
        Ok(true)
    }

    /// Removes the record list and counter.
    pub fn clear(&mut self) -> Result<()> {
        self.backend.remove(&self.keys.records)?;
        self.backend.remove(&self.keys.counter)
    }

    /// Describes the persisted state.
    pub fn info(&self) -> Result<StorageInfo> {
        let records = self.load_records()?.records;
        let counter = self.load_counter()?;
        let storage_size = serde_json::to_string(&records)
            .map_err(InventoryError::CorruptData)?
            .len();

        Ok(StorageInfo {
            record_count: records.len(),
            counter,
            has_data: !records.is_empty(),
            storage_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RecordId, Stock};

    fn store() -> RecordStore<MemoryStore> {
        RecordStore::new(MemoryStore::new())
    }

    fn record(id: &str) -> Record {
        Record::new(
            RecordId::new(id),
            "TEST URUN",
            "PRD001",
            vec!["TEST".to_string()],
            Stock::Count(10),
        )
    }

    #[test]
    fn test_empty_store_defaults() {
        let store = store();

        assert!(store.load_records().unwrap().records.is_empty());
        assert_eq!(store.load_counter().unwrap(), 1);
    }

    #[test]
    fn test_records_roundtrip() {
        let mut store = store();
        let records = vec![record("AB001"), record("CD002")];

        store.save_records(&records).unwrap();
        let loaded = store.load_records().unwrap();

        assert_eq!(loaded.records, records);
        assert_eq!(loaded.migrated, 0);
    }

    #[test]
    fn test_counter_roundtrip() {
        let mut store = store();
        store.save_counter(42).unwrap();
        assert_eq!(store.load_counter().unwrap(), 42);
    }

    #[test]
    fn test_save_all() {
        let mut store = store();
        store.save_all(&[record("CD002")], 99).unwrap();

        assert_eq!(store.load_records().unwrap().records.len(), 1);
        assert_eq!(store.load_counter().unwrap(), 99);
    }

    #[test]
    fn test_unreadable_counter_defaults_to_one() {
        let mut store = store();
        store
            .backend
            .set("productCounter", "not a number")
            .unwrap();
        assert_eq!(store.load_counter().unwrap(), 1);
    }

    #[test]
    fn test_corrupt_records_error() {
        let mut store = store();
        store.backend.set("stockData", "invalid json").unwrap();

        let err = store.load_records().unwrap_err();
        assert!(matches!(err, InventoryError::CorruptData(_)));
    }

    #[test]
    fn test_legacy_tag_field_is_migrated_on_load() {
        let mut store = store();
        store
            .backend
            .set(
                "stockData",
                r#"[{"id":"AB001","name":"VIDA","partNumber":"M3","tag":"mekanik vida","stock":5}]"#,
            )
            .unwrap();

        let loaded = store.load_records().unwrap();

        assert_eq!(loaded.migrated, 1);
        assert_eq!(loaded.records[0].tags, vec!["MEKANIK", "VIDA"]);
    }

    #[test]
    fn test_migrated_records_are_saved_without_legacy_field() {
        let mut store = store();
        store
            .backend
            .set(
                "stockData",
                r#"[{"id":"AB001","name":"VIDA","partNumber":"M3","tag":"mekanik","stock":"?"}]"#,
            )
            .unwrap();

        let records = store.load_records().unwrap().records;
        store.save_records(&records).unwrap();

        let raw = store.backend.get("stockData").unwrap().unwrap();
        assert!(!raw.contains("\"tag\""));
        assert!(raw.contains("\"tags\":[\"MEKANIK\"]"));
    }

    #[test]
    fn test_custom_keys() {
        let keys = StoreKeys {
            records: "test_stockData".to_string(),
            counter: "test_productCounter".to_string(),
            legacy_tags: "test_stockTags".to_string(),
        };
        let mut store = RecordStore::with_keys(MemoryStore::new(), keys);

        store.save_all(&[record("AB001")], 7).unwrap();

        assert!(store.backend().get("test_stockData").unwrap().is_some());
        assert_eq!(store.backend().get("stockData").unwrap(), None);
    }

    #[test]
    fn test_cleanup_legacy_tags() {
        let mut store = store();
        store.backend.set("stockTags", r#"["OLD_TAG"]"#).unwrap();

        assert!(store.cleanup_legacy_tags().unwrap());
        assert!(!store.cleanup_legacy_tags().unwrap());
        assert_eq!(store.backend().get("stockTags").unwrap(), None);
    }

    #[test]
    fn test_clear_resets_to_defaults() {
        let mut store = store();
        store.save_all(&[record("AB001")], 10).unwrap();

        store.clear().unwrap();

        assert!(store.load_records().unwrap().records.is_empty());
        assert_eq!(store.load_counter().unwrap(), 1);
    }

    #[test]
    fn test_info_reports_counts_and_size() {
        let mut store = store();
        store.save_all(&[record("EF003")], 15).unwrap();

        let info = store.info().unwrap();

        assert_eq!(info.record_count, 1);
        assert_eq!(info.counter, 15);
        assert!(info.has_data);
        assert!(info.storage_size > 0);
    }

    #[test]
    fn test_large_record_list() {
        let mut store = store();
        let records: Vec<Record> = (0..1000)
            .map(|i| {
                Record::new(
                    RecordId::new(format!("LARGE{i:03}")),
                    format!("TEST URUN {i}"),
                    format!("PRD{i}"),
                    vec!["BULK".to_string(), "TEST".to_string()],
                    Stock::Count(i % 100),
                )
            })
            .collect();

        store.save_records(&records).unwrap();
        let loaded = store.load_records().unwrap().records;

        assert_eq!(loaded.len(), 1000);
        assert_eq!(loaded[999].name, "TEST URUN 999");
        assert!(store.info().unwrap().storage_size > 50_000);
    }
}
