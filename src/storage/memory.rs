use super::{Database, Record, RecordId, Storage, StorageError, StorageResult};

/// In-memory store for tests; writes can be made to fail on demand.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    db: Database,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, `add` and `put` return [`StorageError::Unavailable`].
    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    fn check_writable(&self) -> StorageResult<()> {
        if self.fail_writes {
            Err(StorageError::Unavailable("writes disabled".into()))
        } else {
            Ok(())
        }
    }
}

impl Storage for MemoryStore {
    fn get_all<R: Record>(&self) -> StorageResult<Vec<(RecordId, R)>> {
        self.db.get_all()
    }

    fn add<R: Record>(&mut self, record: &R) -> StorageResult<RecordId> {
        self.check_writable()?;
        self.db.add(record)
    }

    fn put<R: Record>(&mut self, id: RecordId, record: &R) -> StorageResult<()> {
        self.check_writable()?;
        self.db.put(id, record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Label;

    #[test]
    fn failing_writes_leave_contents_untouched() {
        let mut store = MemoryStore::new();
        store.add(&Label::new("a", "#000000")).unwrap();
        let before = store.database().clone();

        store.fail_writes(true);
        assert!(matches!(
            store.add(&Label::new("b", "#000000")),
            Err(StorageError::Unavailable(_))
        ));
        assert!(store.put(1, &Label::new("c", "#000000")).is_err());
        assert_eq!(store.database(), &before);

        store.fail_writes(false);
        assert_eq!(store.add(&Label::new("b", "#000000")).unwrap(), 2);
    }
}
