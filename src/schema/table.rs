//! Table and column schema descriptors.
//!
//! Tables are defined once, process-wide, and looked up by case-insensitive
//! name during snapshot import. Column names inside a table file resolve
//! case-sensitively against the table's declared columns.

use std::sync::Arc;

/// Name of the site identity table. One row of this table starts a new peer
/// during snapshot import.
pub const TABLE_SITES: &str = "sites";

/// Decode kind of a raw cell value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// UTF-8 text.
    String,
    /// Integer (stored as i64).
    Int,
    /// 64-bit integer (epoch timestamps, counters).
    Int64,
    /// Floating point (latencies, rates).
    Float,
    /// List of strings (flags, group memberships).
    StringList,
}

/// A single column descriptor: name plus decode kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Column name as it appears in table-file headers.
    pub name: String,

    /// How raw cell values of this column are decoded.
    pub kind: ColumnKind,
}

impl Column {
    /// Create a new column descriptor.
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Whether a table holds imported rows or is computed at query time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// Rows are stored per peer and restored from snapshots.
    Stored,
    /// Contents are computed at query time, never stored or restored.
    Virtual,
}

/// Immutable schema descriptor for one table.
#[derive(Debug, Clone)]
pub struct Table {
    /// Table name (lowercase by convention).
    pub name: String,

    /// Ordered column descriptors.
    pub columns: Vec<Column>,

    /// Stored vs virtual.
    pub kind: TableKind,

    /// Names of tables this table holds relational links into.
    /// Checked during cross-reference finalization after import.
    pub references: Vec<String>,
}

impl Table {
    /// Create a stored table.
    pub fn stored(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
            kind: TableKind::Stored,
            references: Vec::new(),
        }
    }

    /// Create a virtual table.
    pub fn virtual_table(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
            kind: TableKind::Virtual,
            references: Vec::new(),
        }
    }

    /// Declare relational links into other tables.
    pub fn with_references(mut self, references: Vec<String>) -> Self {
        self.references = references;
        self
    }

    /// Check whether this table is virtual.
    pub fn is_virtual(&self) -> bool {
        matches!(self.kind, TableKind::Virtual)
    }

    /// Resolve a column by exact (case-sensitive) name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Process-wide table catalog.
#[derive(Debug, Clone)]
pub struct Schema {
    tables: Vec<Arc<Table>>,
}

impl Schema {
    /// Create a schema from a list of tables.
    pub fn new(tables: Vec<Table>) -> Self {
        Self {
            tables: tables.into_iter().map(Arc::new).collect(),
        }
    }

    /// Resolve a table by case-insensitive name.
    pub fn by_name(&self, name: &str) -> Option<Arc<Table>> {
        self.tables
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
            .cloned()
    }

    /// All tables in declaration order.
    pub fn tables(&self) -> &[Arc<Table>] {
        &self.tables
    }

    /// The live monitoring schema: peer identity, host/service state,
    /// groupings, comments and downtimes, plus the virtual status tables.
    pub fn monitoring() -> Self {
        use ColumnKind::*;

        Self::new(vec![
            Table::stored(
                TABLE_SITES,
                vec![
                    Column::new("peer_name", String),
                    Column::new("peer_key", String),
                    Column::new("addr", String),
                    Column::new("section", String),
                    Column::new("flags", StringList),
                    Column::new("status", Int),
                    Column::new("last_update", Int64),
                    Column::new("last_error", String),
                    Column::new("last_online", Int64),
                    Column::new("queries", Int64),
                    Column::new("response_time", Float),
                ],
            ),
            Table::stored(
                "hosts",
                vec![
                    Column::new("name", String),
                    Column::new("alias", String),
                    Column::new("address", String),
                    Column::new("state", Int),
                    Column::new("last_check", Int64),
                    Column::new("plugin_output", String),
                    Column::new("groups", StringList),
                ],
            ),
            Table::stored(
                "services",
                vec![
                    Column::new("host_name", String),
                    Column::new("description", String),
                    Column::new("state", Int),
                    Column::new("last_check", Int64),
                    Column::new("plugin_output", String),
                    Column::new("groups", StringList),
                ],
            )
            .with_references(vec!["hosts".into()]),
            Table::stored(
                "hostgroups",
                vec![
                    Column::new("name", String),
                    Column::new("alias", String),
                    Column::new("members", StringList),
                ],
            ),
            Table::stored(
                "servicegroups",
                vec![
                    Column::new("name", String),
                    Column::new("alias", String),
                    Column::new("members", StringList),
                ],
            ),
            Table::stored(
                "comments",
                vec![
                    Column::new("id", Int64),
                    Column::new("host_name", String),
                    Column::new("service_description", String),
                    Column::new("author", String),
                    Column::new("comment", String),
                    Column::new("entry_time", Int64),
                ],
            )
            .with_references(vec!["hosts".into()]),
            Table::stored(
                "downtimes",
                vec![
                    Column::new("id", Int64),
                    Column::new("host_name", String),
                    Column::new("service_description", String),
                    Column::new("author", String),
                    Column::new("comment", String),
                    Column::new("start_time", Int64),
                    Column::new("end_time", Int64),
                ],
            )
            .with_references(vec!["hosts".into()]),
            Table::virtual_table(
                "status",
                vec![
                    Column::new("program_start", Int64),
                    Column::new("requests", Int64),
                    Column::new("peers_online", Int),
                ],
            ),
            Table::virtual_table(
                "columns",
                vec![
                    Column::new("table", String),
                    Column::new("name", String),
                    Column::new("description", String),
                ],
            ),
        ])
    }
}
