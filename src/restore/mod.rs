//! Warm-restart snapshot import.
//!
//! Restores the full multi-peer state from a previously exported snapshot
//! archive so queries can be served without re-contacting every peer on
//! startup. The pipeline runs strictly sequentially per archive entry:
//!
//! ```text
//! ┌──────────────┐   ┌───────────────┐   ┌─────────────────┐
//! │ ArchiveReader│──▶│ TableFileParse│──▶│ PeerReconstruct │
//! │ (gzip + tar) │   │ (JSON + bind) │   │ + row insertion │
//! └──────────────┘   └───────────────┘   └────────┬────────┘
//!                                                 │
//!                                   atomic swap   ▼
//!                                        ┌─────────────────┐
//!                                        │  PeerRegistry   │
//!                                        └─────────────────┘
//! ```
//!
//! The registry is committed exactly once, after every entry parsed and
//! every peer finalized; a failure at any point discards the whole
//! in-progress peer list and leaves the registry untouched.

mod archive;
mod importer;
mod table_file;

pub use archive::{ArchiveEntries, ArchiveEntry, ArchiveReader};
pub use importer::{Importer, RestoreSummary};
pub use table_file::{parse_entry, table_name_from_entry, ParsedTableFile};
