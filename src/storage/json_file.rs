use log::{debug, info};
use std::fs;
use std::path::PathBuf;

use super::{Database, Record, RecordId, Storage, StorageResult};

/// Keeps the database as one pretty-printed JSON document on disk.
///
/// Every write rewrites the file; the in-memory copy only changes once the
/// file write succeeded.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    db: Database,
}

impl JsonFileStore {
    /// Opens `path`, treating a missing file as an empty database.
    pub fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        let db = if path.exists() {
            let data = fs::read_to_string(&path)?;
            if data.trim().is_empty() {
                Database::default()
            } else {
                serde_json::from_str(&data)?
            }
        } else {
            info!("no board at {}, starting empty", path.display());
            Database::default()
        };
        Ok(Self { path, db })
    }

    fn commit(&mut self, next: Database) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(&next)?)?;
        debug!("wrote {}", self.path.display());
        self.db = next;
        Ok(())
    }
}

impl Storage for JsonFileStore {
    fn get_all<R: Record>(&self) -> StorageResult<Vec<(RecordId, R)>> {
        self.db.get_all()
    }

    fn add<R: Record>(&mut self, record: &R) -> StorageResult<RecordId> {
        let mut next = self.db.clone();
        let id = next.add(record)?;
        self.commit(next)?;
        Ok(id)
    }

    fn put<R: Record>(&mut self, id: RecordId, record: &R) -> StorageResult<()> {
        let mut next = self.db.clone();
        next.put(id, record)?;
        self.commit(next)
    }
}
