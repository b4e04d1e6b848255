//! Monitoring-data aggregation cache with warm-restart snapshot import.
//!
//! This crate mirrors the live state of many remote monitoring sources
//! ("peers") into an in-memory store. Its centerpiece is the restore
//! pipeline: reading a previously exported snapshot archive, reparsing it
//! into typed tabular rows, reconstructing each peer's identity and
//! last-known status, and repopulating that peer's column stores. Once
//! every peer is rebuilt, the complete set is committed into the
//! process-wide registry in one atomic swap.
//!
//! # Example
//!
//! ```rust,no_run
//! use moncache::{Config, Importer, PeerRegistry, Schema};
//! use std::sync::Arc;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let schema = Arc::new(Schema::monitoring());
//!     let registry = Arc::new(PeerRegistry::new());
//!     let importer = Importer::new(&Config::default(), schema, Arc::clone(&registry));
//!
//!     let summary = importer.restore_from_snapshot("./snapshot.tar.gz")?;
//!     println!("restored {} peers", summary.peers_restored);
//!
//!     for peer in registry.peers_in_order() {
//!         println!("{} ({}): {} host rows",
//!             peer.name(), peer.id(), peer.data().row_count("hosts"));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Restore guarantees
//!
//! - **All or nothing**: any fatal error aborts the whole restore; the
//!   registry stays empty. No reader ever observes a partial peer set.
//! - **Cold start only**: restore refuses (with a logged warning, not an
//!   error) when peers are already loaded.
//! - **Order preserving**: rows land in their stores in file order; peer
//!   display order follows archive entry order.
//! - **Online gating**: peers that were not online at export time get no
//!   restored rows, and virtual tables never get rows at all.

pub mod config;
pub mod error;
pub mod peer;
pub mod restore;
pub mod schema;
pub mod store;

// Re-export main types for convenience
pub use config::Config;
pub use error::{Error, Result, SchemaError};
pub use peer::{Connection, HealthMonitor, Peer, PeerRegistry, PeerState, PeerStatus};
pub use restore::{Importer, RestoreSummary};
pub use schema::{Column, ColumnKind, Schema, Table, TableKind, Value};
pub use store::{DataStore, DataStoreSet};
