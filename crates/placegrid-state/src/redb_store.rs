//! RedbStore — transactional placement log backed by redb.
//!
//! Each record is JSON-serialized into the `placements` table under the
//! next sequence number, so key order is commit order. Supports both
//! on-disk and in-memory backends (the latter for testing).

use std::path::Path;
use std::sync::Arc;

use placegrid_core::PlacementRecord;
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata};
use tracing::debug;

use crate::error::{StateError, StateResult};
use crate::store::{RecordIter, StateStore};
use crate::tables::PLACEMENTS;

/// Convert any `Display` error into a `StateError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StateError::$variant(e.to_string())
    };
}

/// Placement log backed by redb. Clones share one database.
#[derive(Clone)]
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open (or create) a persistent store at the given path.
    pub fn open(path: &Path) -> StateResult<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|source| StateError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!(?path, "redb placement store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory store (for testing).
    pub fn open_in_memory() -> StateResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!("in-memory redb placement store opened");
        Ok(store)
    }

    fn ensure_tables(&self) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        // Opening a table in a write transaction creates it if absent.
        txn.open_table(PLACEMENTS).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    /// Number of records stored.
    pub fn len(&self) -> StateResult<u64> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(PLACEMENTS).map_err(map_err!(Table))?;
        table.len().map_err(map_err!(Read))
    }

    pub fn is_empty(&self) -> StateResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl StateStore for RedbStore {
    fn append(&mut self, record: &PlacementRecord) -> StateResult<()> {
        let value = serde_json::to_vec(record).map_err(map_err!(Serialize))?;
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let seq;
        {
            let mut table = txn.open_table(PLACEMENTS).map_err(map_err!(Table))?;
            seq = match table.last().map_err(map_err!(Read))? {
                Some((key, _)) => key.value() + 1,
                None => 0,
            };
            table
                .insert(seq, value.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(seq, node = %record.node_id, app = %record.app_name, "placement stored");
        Ok(())
    }

    fn load_all(&self) -> StateResult<RecordIter<'_>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        // The table keeps its read transaction alive after `txn` drops.
        let table = txn.open_table(PLACEMENTS).map_err(map_err!(Table))?;
        let records = table
            .range::<u64>(..)
            .map_err(map_err!(Read))?
            .map(|entry| -> StateResult<PlacementRecord> {
                let (_, value) = entry.map_err(map_err!(Read))?;
                serde_json::from_slice(value.value()).map_err(map_err!(Deserialize))
            });
        Ok(Box::new(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use placegrid_core::{AppDescriptor, ResourceType};

    fn record(node: &str, name: &str, ty: ResourceType) -> PlacementRecord {
        PlacementRecord::new(node, &AppDescriptor::new(name, ty, format!("img/{name}")))
    }

    fn collect(store: &RedbStore) -> Vec<PlacementRecord> {
        store
            .load_all()
            .unwrap()
            .collect::<StateResult<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn empty_store_loads_nothing() {
        let store = RedbStore::open_in_memory().unwrap();
        assert!(collect(&store).is_empty());
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn append_keeps_commit_order() {
        let mut store = RedbStore::open_in_memory().unwrap();
        let records: Vec<_> = (0..12)
            .map(|i| record(&format!("node{}", i % 3), &format!("app-{i}"), ResourceType::Cpu))
            .collect();
        for r in &records {
            store.append(r).unwrap();
        }

        // Sequence keys must not sort lexically ("app-10" after "app-1").
        assert_eq!(collect(&store), records);
        assert_eq!(store.len().unwrap(), 12);
    }

    #[test]
    fn persistence_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("placements.redb");

        {
            let mut store = RedbStore::open(&path).unwrap();
            store.append(&record("node1", "svcA", ResourceType::Cpu)).unwrap();
            store.append(&record("node2", "svcB", ResourceType::Memory)).unwrap();
        }

        let mut store = RedbStore::open(&path).unwrap();
        assert_eq!(collect(&store).len(), 2);

        store.append(&record("node1", "svcC", ResourceType::Memory)).unwrap();
        let names: Vec<_> = collect(&store).into_iter().map(|r| r.app_name).collect();
        assert_eq!(names, vec!["svcA", "svcB", "svcC"]);
    }

    #[test]
    fn undecodable_entry_surfaces_when_reached() {
        let mut store = RedbStore::open_in_memory().unwrap();
        store.append(&record("node1", "svcA", ResourceType::Cpu)).unwrap();
        store.append(&record("node2", "svcB", ResourceType::Memory)).unwrap();

        let txn = store.db.begin_write().unwrap();
        {
            let mut table = txn.open_table(PLACEMENTS).unwrap();
            table.insert(2u64, b"not json".as_slice()).unwrap();
        }
        txn.commit().unwrap();

        let mut records = store.load_all().unwrap();
        assert_eq!(records.next().unwrap().unwrap().app_name, "svcA");
        assert_eq!(records.next().unwrap().unwrap().app_name, "svcB");
        assert!(matches!(records.next(), Some(Err(StateError::Deserialize(_)))));
        assert!(records.next().is_none());
    }
}
