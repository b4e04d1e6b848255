//! Column-oriented row storage for one table of one peer.

use crate::error::{Error, Result};
use crate::schema::{decode, Column, Table, Value};
use serde_json::Value as Json;

/// Per-peer, per-table column store.
///
/// Columns are bound on the first insertion; storage is one value vector per
/// bound column, appended in file order.
#[derive(Debug)]
pub struct DataStore {
    /// Name of the table this store holds rows for.
    table_name: String,

    /// Columns bound positionally to incoming rows. Empty until the first
    /// insertion.
    columns: Vec<Column>,

    /// One decoded value vector per bound column.
    cells: Vec<Vec<Value>>,
}

impl DataStore {
    /// Create an empty store for the given table.
    pub fn new(table: &Table) -> Self {
        Self {
            table_name: table.name.clone(),
            columns: Vec::new(),
            cells: Vec::new(),
        }
    }

    /// Bulk-insert raw rows under the given positional column binding.
    ///
    /// The first call binds the columns; later calls must carry the same
    /// binding. Rows are decoded per declared column kind and appended
    /// preserving their order. A row whose arity does not match the binding
    /// fails the whole insertion.
    pub fn insert(&mut self, rows: &[Vec<Json>], columns: &[Column], peer: &str) -> Result<()> {
        if self.columns.is_empty() {
            self.columns = columns.to_vec();
            self.cells = vec![Vec::new(); columns.len()];
        } else if self.columns.len() != columns.len()
            || self
                .columns
                .iter()
                .zip(columns)
                .any(|(a, b)| a.name != b.name)
        {
            return Err(Error::RowArity {
                table: self.table_name.clone(),
                peer: peer.to_string(),
                expected: self.columns.len(),
                actual: columns.len(),
            });
        }

        for row in rows {
            if row.len() != self.columns.len() {
                return Err(Error::RowArity {
                    table: self.table_name.clone(),
                    peer: peer.to_string(),
                    expected: self.columns.len(),
                    actual: row.len(),
                });
            }
            for (idx, (col, raw)) in self.columns.iter().zip(row).enumerate() {
                self.cells[idx].push(decode(col.kind, raw));
            }
        }

        Ok(())
    }

    /// Name of the table this store belongs to.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Columns bound to this store, in positional order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Number of stored rows.
    pub fn row_count(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    /// Reassemble row `idx` across all bound columns.
    pub fn row(&self, idx: usize) -> Option<Vec<&Value>> {
        if idx >= self.row_count() {
            return None;
        }
        Some(self.cells.iter().map(|col| &col[idx]).collect())
    }

    /// All values of one bound column, in insertion order.
    pub fn column_values(&self, name: &str) -> Option<&[Value]> {
        let idx = self.columns.iter().position(|c| c.name == name)?;
        Some(&self.cells[idx])
    }
}
