//! Error types for the monitoring cache.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for monitoring cache operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for snapshot restore and store operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Snapshot path cannot be read or stat'ed.
    #[error("cannot read {path}: {source}")]
    Access {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Decompression or archive demultiplexing failure.
    #[error("corrupt snapshot data in {context}: {reason}")]
    Corrupt { context: String, reason: String },

    /// Archive entry of a type the importer cannot handle.
    #[error("unsupported entry type {type_code:#04x} in {entry}")]
    UnsupportedEntryType { entry: String, type_code: u8 },

    /// Schema resolution errors (unknown/unrecognized names).
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Declared entry size does not match the bytes actually read.
    #[error("{entry}: expected size {expected} but got {actual}")]
    SizeMismatch {
        entry: String,
        expected: u64,
        actual: u64,
    },

    /// Table file carried no rows at all, so no column header.
    #[error("{entry}: missing column header")]
    MissingHeader { entry: String },

    /// A data row does not match the bound column count.
    #[error("row arity mismatch in table {table} for peer {peer}: expected {expected} cells but got {actual}")]
    RowArity {
        table: String,
        peer: String,
        expected: usize,
        actual: usize,
    },

    /// Site identity file must contain exactly one row.
    #[error("wrong number of site rows in {entry}, expected 1 but got: {count}")]
    SiteRowCount { entry: String, count: usize },

    /// A data entry appeared before any site identity entry.
    #[error("data entry {entry} before any site identity entry")]
    DataBeforeIdentity { entry: String },

    /// Cross-reference finalization failed after import.
    #[error("failed to set references for peer {peer}: {reason}")]
    ReferenceResolution { peer: String, reason: String },

    /// Snapshot source kind the importer does not support.
    #[error("unsupported snapshot source: {0}")]
    Unsupported(String),
}

/// Schema resolution errors.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// Entry name does not follow the `<tablename>.json` convention.
    #[error("unrecognized entry name: {0}")]
    UnrecognizedEntry(String),

    /// No table matches the name extracted from the entry.
    #[error("no table found by name: {0}")]
    UnknownTable(String),

    /// A header column name is not defined on the resolved table.
    #[error("no column found by name: {column} in table {table}")]
    UnknownColumn { table: String, column: String },

    /// A column required by the importer is absent from the file header.
    #[error("missing required column {column} in table {table}")]
    MissingColumn { table: String, column: String },
}
