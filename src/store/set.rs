//! Per-peer aggregate of table stores.

use crate::error::{Error, Result};
use crate::schema::{Column, Schema, Table};
use crate::store::data_store::DataStore;
use parking_lot::RwLock;
use serde_json::Value as Json;
use std::collections::HashMap;

/// Mapping from table name to that table's [`DataStore`] for one peer.
///
/// Created fresh per peer during reconstruction, never shared across peers.
/// The interior lock lets the query layer read concurrently once the peer
/// has been committed to the registry.
#[derive(Debug, Default)]
pub struct DataStoreSet {
    stores: RwLock<HashMap<String, DataStore>>,
}

impl DataStoreSet {
    /// Create an empty store set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert rows for a table, creating the table's store on first use.
    pub fn insert_rows(
        &self,
        table: &Table,
        rows: &[Vec<Json>],
        columns: &[Column],
        peer: &str,
    ) -> Result<()> {
        let mut stores = self.stores.write();
        let store = stores
            .entry(table.name.clone())
            .or_insert_with(|| DataStore::new(table));
        store.insert(rows, columns, peer)
    }

    /// Whether a store exists for the given table.
    pub fn has_table(&self, table: &str) -> bool {
        self.stores.read().contains_key(table)
    }

    /// Number of rows stored for the given table (zero if absent).
    pub fn row_count(&self, table: &str) -> usize {
        self.stores
            .read()
            .get(table)
            .map_or(0, DataStore::row_count)
    }

    /// Names of tables with a store, unordered.
    pub fn table_names(&self) -> Vec<String> {
        self.stores.read().keys().cloned().collect()
    }

    /// Run a closure against one table's store, if present.
    pub fn with_store<T>(&self, table: &str, f: impl FnOnce(&DataStore) -> T) -> Option<T> {
        self.stores.read().get(table).map(f)
    }

    /// Finalize cross-references after import.
    ///
    /// Every non-empty store whose table declares relational links must be
    /// able to resolve each referenced table to a present store.
    pub fn set_references(&self, schema: &Schema, peer: &str) -> Result<()> {
        let stores = self.stores.read();
        for (name, store) in stores.iter() {
            if store.row_count() == 0 {
                continue;
            }
            let Some(table) = schema.by_name(name) else {
                continue;
            };
            for referenced in &table.references {
                if !stores.contains_key(referenced) {
                    return Err(Error::ReferenceResolution {
                        peer: peer.to_string(),
                        reason: format!("table {name} references missing table {referenced}"),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;
    use serde_json::json;

    fn host_row(name: &str) -> Vec<Json> {
        vec![json!(name), json!(0)]
    }

    fn host_columns(schema: &Schema) -> Vec<Column> {
        let hosts = schema.by_name("hosts").unwrap();
        vec![
            hosts.column("name").unwrap().clone(),
            hosts.column("state").unwrap().clone(),
        ]
    }

    #[test]
    fn test_insert_creates_store_once() {
        let schema = Schema::monitoring();
        let hosts = schema.by_name("hosts").unwrap();
        let columns = host_columns(&schema);
        let set = DataStoreSet::new();

        set.insert_rows(&hosts, &[host_row("a")], &columns, "p1")
            .unwrap();
        set.insert_rows(&hosts, &[host_row("b")], &columns, "p1")
            .unwrap();

        assert!(set.has_table("hosts"));
        assert_eq!(set.row_count("hosts"), 2);
        assert_eq!(set.row_count("services"), 0);
    }

    #[test]
    fn test_set_references_ok() {
        let schema = Schema::monitoring();
        let hosts = schema.by_name("hosts").unwrap();
        let services = schema.by_name("services").unwrap();
        let set = DataStoreSet::new();

        let host_cols = host_columns(&schema);
        set.insert_rows(&hosts, &[host_row("web1")], &host_cols, "p1")
            .unwrap();

        let svc_cols = vec![
            services.column("host_name").unwrap().clone(),
            services.column("description").unwrap().clone(),
        ];
        set.insert_rows(
            &services,
            &[vec![json!("web1"), json!("ping")]],
            &svc_cols,
            "p1",
        )
        .unwrap();

        set.set_references(&schema, "p1").unwrap();
    }

    #[test]
    fn test_set_references_missing_table() {
        let schema = Schema::monitoring();
        let services = schema.by_name("services").unwrap();
        let set = DataStoreSet::new();

        let svc_cols = vec![services.column("host_name").unwrap().clone()];
        set.insert_rows(&services, &[vec![json!("web1")]], &svc_cols, "p1")
            .unwrap();

        let err = set.set_references(&schema, "p1").unwrap_err();
        match err {
            Error::ReferenceResolution { peer, reason } => {
                assert_eq!(peer, "p1");
                assert!(reason.contains("hosts"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_set_references_skips_empty_set() {
        let schema = Schema::monitoring();
        let set = DataStoreSet::new();
        set.set_references(&schema, "p1").unwrap();
    }
}
