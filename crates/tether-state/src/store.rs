//! StateStore — redb-backed persistence for operations and nodes.
//!
//! All values are JSON-serialized into redb's `&[u8]` value columns. The
//! store supports both on-disk and in-memory backends (the latter for
//! testing).

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable};
use tracing::debug;

use crate::error::{StateError, StateResult};
use crate::tables::*;
use crate::types::*;

/// Convert any `Display` error into a `StateError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StateError::$variant(e.to_string())
    };
}

/// Thread-safe state store backed by redb.
#[derive(Clone)]
pub struct StateStore {
    db: Arc<Database>,
}

impl StateStore {
    /// Open (or create) a persistent state store at the given path.
    pub fn open(path: &Path) -> StateResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!(?path, "state store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory state store (for testing).
    pub fn open_in_memory() -> StateResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!("in-memory state store opened");
        Ok(store)
    }

    fn ensure_tables(&self) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        txn.open_table(OPERATIONS).map_err(map_err!(Table))?;
        txn.open_table(NODES).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    // ── Operations ─────────────────────────────────────────────────

    /// Insert or replace an operation. The stored copy gets the next
    /// resource version, which is returned.
    pub fn put_operation(&self, op: &Operation) -> StateResult<u64> {
        let key = op.table_key();
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let version;
        {
            let mut table = txn.open_table(OPERATIONS).map_err(map_err!(Table))?;
            let current = match table.get(key.as_str()).map_err(map_err!(Read))? {
                Some(guard) => decode_operation(guard.value())?.resource_version,
                None => 0,
            };
            version = current + 1;
            let mut stored = op.clone();
            stored.resource_version = version;
            let value = serde_json::to_vec(&stored).map_err(map_err!(Serialize))?;
            table
                .insert(key.as_str(), value.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%key, version, "operation stored");
        Ok(version)
    }

    /// Get an operation by `{namespace}/{name}` key.
    pub fn get_operation(&self, key: &str) -> StateResult<Option<Operation>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(OPERATIONS).map_err(map_err!(Table))?;
        match table.get(key).map_err(map_err!(Read))? {
            Some(guard) => Ok(Some(decode_operation(guard.value())?)),
            None => Ok(None),
        }
    }

    /// List all operations in a namespace.
    pub fn list_operations(&self, namespace: &str) -> StateResult<Vec<Operation>> {
        let prefix = format!("{namespace}/");
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(OPERATIONS).map_err(map_err!(Table))?;
        let mut results = Vec::new();
        for entry in table.iter().map_err(map_err!(Read))? {
            let (key, value) = entry.map_err(map_err!(Read))?;
            if key.value().starts_with(&prefix) {
                results.push(decode_operation(value.value())?);
            }
        }
        Ok(results)
    }

    /// Delete an operation by key. Returns true if it existed.
    pub fn delete_operation(&self, key: &str) -> StateResult<bool> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let existed;
        {
            let mut table = txn.open_table(OPERATIONS).map_err(map_err!(Table))?;
            existed = table.remove(key).map_err(map_err!(Write))?.is_some();
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%key, existed, "operation deleted");
        Ok(existed)
    }

    /// Replace only the status of an operation.
    ///
    /// Fails with [`StateError::Conflict`] unless the stored resource version
    /// equals `expected_version`. The spec is left as stored. Returns the new
    /// resource version.
    pub fn update_operation_status(
        &self,
        key: &str,
        expected_version: u64,
        status: &OperationStatus,
    ) -> StateResult<u64> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let version;
        {
            let mut table = txn.open_table(OPERATIONS).map_err(map_err!(Table))?;
            let mut stored = match table.get(key).map_err(map_err!(Read))? {
                Some(guard) => decode_operation(guard.value())?,
                None => return Err(StateError::NotFound(key.to_string())),
            };
            if stored.resource_version != expected_version {
                return Err(StateError::Conflict {
                    key: key.to_string(),
                    expected: expected_version,
                    actual: stored.resource_version,
                });
            }
            version = stored.resource_version + 1;
            stored.resource_version = version;
            stored.status = status.clone();
            let value = serde_json::to_vec(&stored).map_err(map_err!(Serialize))?;
            table.insert(key, value.as_slice()).map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%key, version, phase = ?status.phase, "operation status updated");
        Ok(version)
    }

    // ── Nodes ──────────────────────────────────────────────────────

    /// Insert or update a node.
    pub fn put_node(&self, node: &NodeInfo) -> StateResult<()> {
        let value = serde_json::to_vec(node).map_err(map_err!(Serialize))?;
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(NODES).map_err(map_err!(Table))?;
            table
                .insert(node.name.as_str(), value.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    /// Get a node by name.
    pub fn get_node(&self, name: &str) -> StateResult<Option<NodeInfo>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(NODES).map_err(map_err!(Table))?;
        match table.get(name).map_err(map_err!(Read))? {
            Some(guard) => {
                let node: NodeInfo =
                    serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?;
                Ok(Some(node))
            }
            None => Ok(None),
        }
    }

    /// List all nodes.
    pub fn list_nodes(&self) -> StateResult<Vec<NodeInfo>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(NODES).map_err(map_err!(Table))?;
        let mut results = Vec::new();
        for entry in table.iter().map_err(map_err!(Read))? {
            let (_, value) = entry.map_err(map_err!(Read))?;
            let node: NodeInfo =
                serde_json::from_slice(value.value()).map_err(map_err!(Deserialize))?;
            results.push(node);
        }
        Ok(results)
    }

    /// Delete a node by name. Returns true if it existed.
    pub fn delete_node(&self, name: &str) -> StateResult<bool> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let existed;
        {
            let mut table = txn.open_table(NODES).map_err(map_err!(Table))?;
            existed = table.remove(name).map_err(map_err!(Write))?.is_some();
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(existed)
    }
}

fn decode_operation(bytes: &[u8]) -> StateResult<Operation> {
    serde_json::from_slice(bytes).map_err(map_err!(Deserialize))
}
