use std::collections::HashSet;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::csv::{self, DecodeOutcome};
use crate::store::{KeyValueStore, RecordStore, StorageInfo};
use crate::tags::{Vocabulary, parse_tags};
use crate::{InventoryError, Record, RecordId, RecordInput, Result, Stock, TextNormalizer};

/// How imported records are combined with the existing list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Keep existing records and add the imported ones after them.
    Append,
    /// Discard existing records; keep the tag vocabulary.
    Replace,
}

/// Counts describing a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionInfo {
    pub record_count: usize,
    pub tag_count: usize,
    pub storage: StorageInfo,
}

/// Owner of the inventory state for the lifetime of one run.
///
/// Holds the record list, the id counter and the tag vocabulary in memory,
/// and writes every change through to the record store. The in-memory state
/// is authoritative while the session is open; storage is last-write-wins.
///
/// # Examples
///
/// ```
/// use stok::{MemoryStore, RecordInput, RecordStore, Session};
///
/// # fn main() -> stok::Result<()> {
/// let mut session = Session::open(RecordStore::new(MemoryStore::new()))?;
/// let record = session.add(RecordInput::new("röle", "rl-12").tags("elektronik").stock("4"))?;
///
/// assert_eq!(record.name, "ROLE");
/// assert_eq!(session.records().len(), 1);
/// # Ok(())
/// # }
/// ```
pub struct Session<S> {
    store: RecordStore<S>,
    records: Vec<Record>,
    counter: u64,
    vocabulary: Vocabulary,
    rng: StdRng,
}

impl<S: KeyValueStore> Session<S> {
    /// Loads state from `store` and starts a session.
    ///
    /// Legacy records are migrated on load and written back immediately, and
    /// the retired tag vocabulary key is removed.
    pub fn open(mut store: RecordStore<S>) -> Result<Self> {
        let loaded = store.load_records()?;
        let counter = store.load_counter()?;

        if loaded.migrated > 0 {
            store.save_records(&loaded.records)?;
        }
        store.cleanup_legacy_tags()?;

        let vocabulary = Vocabulary::from_records(&loaded.records);
        info!(
            records = loaded.records.len(),
            tags = vocabulary.len(),
            counter,
            "session opened"
        );

        Ok(Self {
            store,
            records: loaded.records,
            counter,
            vocabulary,
            rng: StdRng::from_os_rng(),
        })
    }

    /// All records in insertion order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Next counter value to be used for id generation.
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Tags known to this session.
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// The backing record store.
    pub fn store(&self) -> &RecordStore<S> {
        &self.store
    }

    /// Looks up a record by id.
    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.records.iter().find(|r| &r.id == id)
    }

    /// Creates a record from form input.
    ///
    /// Name and code are required; tags and stock are optional and fall back
    /// to no tags and unknown stock.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::MissingField`] when the trimmed name or code
    /// is empty.
    pub fn add(&mut self, input: RecordInput) -> Result<Record> {
        let (name, code) = required_fields(&input.name, &input.code)?;
        let tags = parse_tags(&input.tags);
        let stock = Stock::coerce(input.stock.trim());

        self.vocabulary.extend(&tags);
        let id = self.next_id();
        let record = Record::new(id, name, code, tags, stock);
        self.records.push(record.clone());
        self.save_all()?;

        info!(id = %record.id, "record added");
        Ok(record)
    }

    /// Replaces name, code and tags of an existing record. Stock is kept.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::MissingField`] for an empty name or code and
    /// [`InventoryError::NotFound`] for an unknown id.
    pub fn edit(&mut self, id: &RecordId, name: &str, code: &str, tags: &str) -> Result<Record> {
        let (name, code) = required_fields(name, code)?;
        let tags = parse_tags(tags);

        let record = self.find_mut(id)?;
        record.name = name;
        record.code = code;
        record.tags = tags;
        let updated = record.clone();

        self.vocabulary.extend(&updated.tags);
        self.store.save_records(&self.records)?;

        info!(id = %updated.id, "record updated");
        Ok(updated)
    }

    /// Removes a record and returns it.
    pub fn delete(&mut self, id: &RecordId) -> Result<Record> {
        let index = self
            .records
            .iter()
            .position(|r| &r.id == id)
            .ok_or_else(|| InventoryError::NotFound(id.clone()))?;
        let removed = self.records.remove(index);
        self.store.save_records(&self.records)?;

        info!(id = %removed.id, "record deleted");
        Ok(removed)
    }

    /// Adds one unit of stock. Unknown stock becomes 1.
    pub fn increase_stock(&mut self, id: &RecordId) -> Result<Stock> {
        let record = self.find_mut(id)?;
        record.stock = record.stock.incremented();
        let stock = record.stock;
        self.store.save_records(&self.records)?;
        Ok(stock)
    }

    /// Removes one unit of stock.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::StockUnavailable`] when the stock is zero or
    /// unknown; the record is left unchanged.
    pub fn decrease_stock(&mut self, id: &RecordId) -> Result<Stock> {
        let record = self.find_mut(id)?;
        let stock = record
            .stock
            .decremented()
            .ok_or_else(|| InventoryError::StockUnavailable(id.clone()))?;
        record.stock = stock;
        self.store.save_records(&self.records)?;
        Ok(stock)
    }

    /// Sets stock from free-form text using the usual coercion rules.
    pub fn set_stock(&mut self, id: &RecordId, raw: &str) -> Result<Stock> {
        let record = self.find_mut(id)?;
        record.stock = Stock::coerce(raw.trim());
        let stock = record.stock;
        self.store.save_records(&self.records)?;
        Ok(stock)
    }

    /// Records whose name, code or tags contain `query`, ignoring case.
    pub fn search(&self, query: &str) -> Vec<&Record> {
        self.records.iter().filter(|r| r.matches(query)).collect()
    }

    /// Decodes CSV text, drawing ids for blank id cells from this session.
    pub fn decode_csv(&mut self, text: &str) -> Result<DecodeOutcome> {
        csv::decode(text, || self.next_id())
    }

    /// Merges decoded records into the session.
    ///
    /// Imported ids that collide with an id already present are replaced by
    /// freshly generated ones. In [`ImportMode::Replace`] the vocabulary is
    /// rebuilt from the new records and then re-seeded with every tag known
    /// before the import. An outcome without records changes nothing.
    ///
    /// Returns the number of records imported.
    pub fn import(&mut self, outcome: DecodeOutcome, mode: ImportMode) -> Result<usize> {
        if !outcome.is_valid() {
            debug!("import skipped: no valid records");
            return Ok(0);
        }

        let mut incoming = outcome.records;
        let mut taken: HashSet<RecordId> = match mode {
            ImportMode::Append => self.records.iter().map(|r| r.id.clone()).collect(),
            ImportMode::Replace => HashSet::new(),
        };
        for record in &mut incoming {
            while !taken.insert(record.id.clone()) {
                let fresh = self.next_id();
                debug!(old = %record.id, new = %fresh, "reassigned duplicate id");
                record.id = fresh;
            }
        }

        let count = incoming.len();
        match mode {
            ImportMode::Append => {
                for record in &incoming {
                    self.vocabulary.extend(&record.tags);
                }
                self.records.extend(incoming);
            }
            ImportMode::Replace => {
                let previous = std::mem::take(&mut self.vocabulary);
                self.records = incoming;
                self.vocabulary = Vocabulary::from_records(&self.records);
                self.vocabulary.extend(previous.iter());
            }
        }
        self.save_all()?;

        info!(count, ?mode, "records imported");
        Ok(count)
    }

    /// Encodes all records as CSV.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::EmptyExport`] when there are no records.
    pub fn export_csv(&self) -> Result<String> {
        if self.records.is_empty() {
            return Err(InventoryError::EmptyExport);
        }
        Ok(csv::encode(&self.records))
    }

    /// Summary counts for display.
    pub fn info(&self) -> Result<SessionInfo> {
        Ok(SessionInfo {
            record_count: self.records.len(),
            tag_count: self.vocabulary.len(),
            storage: self.store.info()?,
        })
    }

    /// Deletes all records, forgets the vocabulary and restarts the counter.
    pub fn reset(&mut self) -> Result<()> {
        self.store.clear()?;
        self.records.clear();
        self.vocabulary = Vocabulary::new();
        self.counter = 1;
        info!("inventory reset");
        Ok(())
    }

    fn next_id(&mut self) -> RecordId {
        loop {
            let id = RecordId::generate(self.counter, &mut self.rng);
            self.counter += 1;
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    fn find_mut(&mut self, id: &RecordId) -> Result<&mut Record> {
        self.records
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| InventoryError::NotFound(id.clone()))
    }

    fn save_all(&mut self) -> Result<()> {
        self.store.save_all(&self.records, self.counter)
    }
}

fn required_fields(name: &str, code: &str) -> Result<(String, String)> {
    let name = name.trim();
    if name.is_empty() {
        return Err(InventoryError::MissingField("Name"));
    }
    let code = code.trim();
    if code.is_empty() {
        return Err(InventoryError::MissingField("Code"));
    }
    Ok((TextNormalizer::normalize(name), TextNormalizer::normalize(code)))
}
