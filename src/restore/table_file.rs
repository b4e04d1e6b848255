//! Parsing of one per-table snapshot file.
//!
//! Entry names follow the `.../<tablename>.json` convention. The file body
//! is a JSON array of rows; the first row names the columns present, which
//! may be a subset or reordering of the table's declared columns.

use crate::error::{Error, Result, SchemaError};
use crate::schema::{as_string, Column, ResultSet, Schema, Table};
use std::io::Read;
use std::sync::Arc;

/// Result of parsing one table file: the resolved table, the positional
/// column binding from the header row, and the remaining data rows.
#[derive(Debug)]
pub struct ParsedTableFile {
    pub table: Arc<Table>,
    pub columns: Vec<Column>,
    pub rows: ResultSet,
}

/// Extract the table name from an entry name.
///
/// Matches a case-insensitive `.json` suffix on the final path segment.
pub fn table_name_from_entry(entry_name: &str) -> Option<&str> {
    let segment = entry_name.rsplit('/').next()?;
    let stem_len = segment.len().checked_sub(".json".len())?;
    let suffix = segment.get(stem_len..)?;
    if stem_len == 0 || !suffix.eq_ignore_ascii_case(".json") {
        return None;
    }
    segment.get(..stem_len)
}

/// Parse one archive entry into a [`ParsedTableFile`].
///
/// Reads exactly `declared` bytes, deserializes the row set, consumes the
/// header row and binds each of its column names against the resolved
/// table's schema. Any unresolved name fails the whole import.
pub fn parse_entry(
    schema: &Schema,
    entry_name: &str,
    mut reader: impl Read,
    declared: u64,
) -> Result<ParsedTableFile> {
    let table_name = table_name_from_entry(entry_name)
        .ok_or_else(|| SchemaError::UnrecognizedEntry(entry_name.to_string()))?;

    let table = schema
        .by_name(table_name)
        .ok_or_else(|| SchemaError::UnknownTable(table_name.to_string()))?;

    let mut buf = Vec::with_capacity(declared as usize);
    reader
        .read_to_end(&mut buf)
        .map_err(|e| Error::Corrupt {
            context: entry_name.to_string(),
            reason: format!("read error: {e}"),
        })?;
    if buf.len() as u64 != declared {
        return Err(Error::SizeMismatch {
            entry: entry_name.to_string(),
            expected: declared,
            actual: buf.len() as u64,
        });
    }

    let mut rows: ResultSet = serde_json::from_slice(&buf).map_err(|e| Error::Corrupt {
        context: entry_name.to_string(),
        reason: format!("parse error: {e}"),
    })?;
    if rows.is_empty() {
        return Err(Error::MissingHeader {
            entry: entry_name.to_string(),
        });
    }

    let header = rows.remove(0);
    let mut columns = Vec::with_capacity(header.len());
    for cell in &header {
        let name = as_string(cell);
        let column = table
            .column(&name)
            .ok_or_else(|| SchemaError::UnknownColumn {
                table: table.name.clone(),
                column: name,
            })?;
        columns.push(column.clone());
    }

    Ok(ParsedTableFile {
        table,
        columns,
        rows,
    })
}
