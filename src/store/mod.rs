//! Per-peer row storage.
//!
//! Each peer owns one [`DataStoreSet`], a mapping from table name to that
//! table's [`DataStore`]. Stores are populated in bulk during snapshot
//! restore and read concurrently by the query layer afterwards.

mod data_store;
mod set;

pub use data_store::DataStore;
pub use set::DataStoreSet;
