//! Local key-indexed record store.
//!
//! Records live in named collections and are keyed by an integer id that the
//! store assigns. The id is the key only; record bodies never carry it.

mod database;
mod json_file;
mod memory;

pub use database::{Database, Table};
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::io;
use thiserror::Error;

pub type RecordId = u64;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Collection {
    Tasks,
    Labels,
}

impl Collection {
    pub fn name(self) -> &'static str {
        match self {
            Collection::Tasks => "tasks",
            Collection::Labels => "labels",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value that can be stored in one collection.
pub trait Record: Serialize + DeserializeOwned {
    const COLLECTION: Collection;
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage i/o failed: {0}")]
    Io(#[from] io::Error),

    #[error("malformed {collection} record {id}: {source}")]
    Decode {
        collection: Collection,
        id: RecordId,
        #[source]
        source: serde_json::Error,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no ids left in {collection}")]
    IdSpaceExhausted { collection: Collection },

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Persistence contract the board is written against.
///
/// `put` is an upsert and is idempotent for the same id and record.
pub trait Storage {
    /// All records of `R`'s collection, in ascending id order.
    fn get_all<R: Record>(&self) -> StorageResult<Vec<(RecordId, R)>>;

    /// Stores a new record and returns the id assigned to it.
    fn add<R: Record>(&mut self, record: &R) -> StorageResult<RecordId>;

    /// Inserts or replaces the record stored under `id`.
    fn put<R: Record>(&mut self, id: RecordId, record: &R) -> StorageResult<()>;
}
