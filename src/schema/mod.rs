//! Process-wide table schema and cell value decoding.
//!
//! The schema is the contract between the live pollers, the query layer and
//! the snapshot importer: every table file in a snapshot must resolve to a
//! table defined here, and every header column must resolve to one of its
//! declared columns.

mod table;
mod value;

pub use table::{Column, ColumnKind, Schema, Table, TableKind, TABLE_SITES};
pub use value::{as_f64, as_i64, as_string, as_string_list, decode, ResultSet, Value};
