use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::{Collection, Record, RecordId, StorageError, StorageResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub next_id: RecordId,
    #[serde(default)]
    pub records: BTreeMap<RecordId, Value>,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            next_id: 1,
            records: BTreeMap::new(),
        }
    }
}

/// The whole persisted document: one table per collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Database {
    #[serde(default)]
    pub tasks: Table,
    #[serde(default)]
    pub labels: Table,
}

impl Database {
    pub fn table(&self, collection: Collection) -> &Table {
        match collection {
            Collection::Tasks => &self.tasks,
            Collection::Labels => &self.labels,
        }
    }

    fn table_mut(&mut self, collection: Collection) -> &mut Table {
        match collection {
            Collection::Tasks => &mut self.tasks,
            Collection::Labels => &mut self.labels,
        }
    }

    pub fn get_all<R: Record>(&self) -> StorageResult<Vec<(RecordId, R)>> {
        self.table(R::COLLECTION)
            .records
            .iter()
            .map(|(&id, value)| {
                R::deserialize(value)
                    .map(|record| (id, record))
                    .map_err(|source| StorageError::Decode {
                        collection: R::COLLECTION,
                        id,
                        source,
                    })
            })
            .collect()
    }

    pub fn add<R: Record>(&mut self, record: &R) -> StorageResult<RecordId> {
        let value = serde_json::to_value(record)?;
        let table = self.table_mut(R::COLLECTION);
        let id = table.next_id;
        table.next_id = bump(R::COLLECTION, id)?;
        table.records.insert(id, value);
        Ok(id)
    }

    pub fn put<R: Record>(&mut self, id: RecordId, record: &R) -> StorageResult<()> {
        let value = serde_json::to_value(record)?;
        let table = self.table_mut(R::COLLECTION);
        if id >= table.next_id {
            table.next_id = bump(R::COLLECTION, id)?;
        }
        table.records.insert(id, value);
        Ok(())
    }
}

/// The id after `id`; the allocator never wraps.
fn bump(collection: Collection, id: RecordId) -> StorageResult<RecordId> {
    id.checked_add(1)
        .ok_or(StorageError::IdSpaceExhausted { collection })
}
