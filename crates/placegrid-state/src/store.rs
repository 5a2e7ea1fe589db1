//! The `StateStore` abstraction and backend selection.

use std::sync::{Arc, Mutex, PoisonError};

use placegrid_core::PlacementRecord;
use placegrid_core::config::{StateBackend, StateConfig};
use tracing::debug;

use crate::error::StateResult;
use crate::log_store::LogStore;
use crate::redb_store::RedbStore;

/// Records in append order, read lazily where the backend allows it.
pub type RecordIter<'a> = Box<dyn Iterator<Item = StateResult<PlacementRecord>> + Send + 'a>;

/// Append-only durable log of placement records.
pub trait StateStore: Send + Sync {
    /// Durably persist one record. Returns only after the write is durable.
    fn append(&mut self, record: &PlacementRecord) -> StateResult<()>;

    /// Iterate all records from the first one, in append order.
    ///
    /// Yields nothing when no state exists yet. Every call starts over.
    fn load_all(&self) -> StateResult<RecordIter<'_>>;
}

/// Open the backend selected in configuration.
pub fn open_store(config: &StateConfig) -> StateResult<Box<dyn StateStore>> {
    let store: Box<dyn StateStore> = match config.backend {
        StateBackend::Log => Box::new(LogStore::open(&config.path)?),
        StateBackend::Redb => Box::new(RedbStore::open(&config.path)?),
    };
    debug!(backend = ?config.backend, path = ?config.path, "placement store opened");
    Ok(store)
}

/// Volatile store. Clones share the same record list.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Arc<Mutex<Vec<PlacementRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing log, as if previously appended.
    pub fn with_records(records: Vec<PlacementRecord>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
        }
    }

    /// Snapshot of everything appended so far.
    pub fn records(&self) -> Vec<PlacementRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl StateStore for MemoryStore {
    fn append(&mut self, record: &PlacementRecord) -> StateResult<()> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        Ok(())
    }

    fn load_all(&self) -> StateResult<RecordIter<'_>> {
        Ok(Box::new(self.records().into_iter().map(Ok)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use placegrid_core::{AppDescriptor, ResourceType};

    fn record(node: &str, name: &str) -> PlacementRecord {
        PlacementRecord::new(node, &AppDescriptor::new(name, ResourceType::Cpu, "img:1"))
    }

    #[test]
    fn memory_store_keeps_append_order() {
        let mut store = MemoryStore::new();
        store.append(&record("node1", "a")).unwrap();
        store.append(&record("node2", "b")).unwrap();

        let names: Vec<String> = store
            .load_all()
            .unwrap()
            .map(|r| r.unwrap().app_name)
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn memory_store_clones_share_records() {
        let store = MemoryStore::new();
        let mut writer = store.clone();
        writer.append(&record("node1", "a")).unwrap();

        assert_eq!(store.records().len(), 1);
    }

    #[test]
    fn load_all_is_restartable() {
        let store = MemoryStore::with_records(vec![record("node1", "a")]);
        assert_eq!(store.load_all().unwrap().count(), 1);
        assert_eq!(store.load_all().unwrap().count(), 1);
    }

    #[test]
    fn open_store_selects_backend() {
        let dir = tempfile::tempdir().unwrap();

        let log_cfg = StateConfig {
            backend: StateBackend::Log,
            path: dir.path().join("apps.csv"),
        };
        let mut log = open_store(&log_cfg).unwrap();
        log.append(&record("node1", "a")).unwrap();
        assert!(log_cfg.path.is_file());

        let redb_cfg = StateConfig {
            backend: StateBackend::Redb,
            path: dir.path().join("apps.redb"),
        };
        let mut db = open_store(&redb_cfg).unwrap();
        db.append(&record("node1", "a")).unwrap();
        assert_eq!(db.load_all().unwrap().count(), 1);
    }
}
