//! stok - single-user parts inventory tracker.
//!
//! Records (name, code, tags, stock) live in a [`Session`] that persists them
//! through a string key-value [`store`], either SQLite on disk ([`Database`])
//! or memory ([`MemoryStore`]). Free text is normalized with
//! [`TextNormalizer`], stock input is coerced with [`Stock::coerce`], and
//! records move in and out as CSV through the [`csv`] module.

pub mod config;
pub mod csv;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod normalizer;
pub mod prompt;
pub mod session;
pub mod store;
pub mod tags;

pub use db::Database;
pub use error::{InventoryError, Result};
pub use models::{Record, RecordId, RecordInput, Stock, UNKNOWN_STOCK};
pub use normalizer::TextNormalizer;
pub use prompt::{Confirmation, Prompt};
pub use session::{ImportMode, Session, SessionInfo};
pub use store::{KeyValueStore, MemoryStore, RecordStore, StoreKeys};
