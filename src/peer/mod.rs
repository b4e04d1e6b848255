//! Peer identity, connection descriptor and last-known status.

mod health;
mod registry;

pub use health::HealthMonitor;
pub use registry::PeerRegistry;

use crate::store::DataStoreSet;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Connection descriptor for one remote monitoring source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Connection {
    /// Display name.
    pub name: String,

    /// Stable peer ID.
    pub id: String,

    /// One or more source addresses.
    pub source: Vec<String>,

    /// Logical section/grouping label.
    pub section: String,

    /// Behavioral flags.
    pub flags: Vec<String>,
}

/// Reachability state of a peer, integer-coded in snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeerState {
    /// Not reachable.
    Down,
    /// Reachable and answering queries.
    Up,
    /// Reachable with degraded responses.
    Warning,
    /// Last contact ended in an error.
    Error,
    /// Never contacted yet.
    Pending,
}

impl PeerState {
    /// Decode from the integer code used in snapshots.
    /// Unknown codes are treated as down.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => PeerState::Up,
            2 => PeerState::Warning,
            3 => PeerState::Error,
            4 => PeerState::Pending,
            _ => PeerState::Down,
        }
    }

    /// The integer code used in snapshots.
    pub fn code(&self) -> i64 {
        match self {
            PeerState::Down => 0,
            PeerState::Up => 1,
            PeerState::Warning => 2,
            PeerState::Error => 3,
            PeerState::Pending => 4,
        }
    }

    /// Whether a peer in this state serves live data.
    pub fn is_online(&self) -> bool {
        matches!(self, PeerState::Up)
    }
}

/// Last-known status of a peer, restored from the site identity row and kept
/// current by the live pollers afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerStatus {
    /// Current reachability state.
    pub state: PeerState,

    /// Epoch seconds of the last successful update.
    pub last_update: i64,

    /// Text of the last error, empty if none.
    pub last_error: String,

    /// Epoch seconds the peer was last seen online.
    pub last_online: i64,

    /// Cumulative query count.
    pub queries: i64,

    /// Last response latency in seconds.
    pub response_time: f64,
}

impl Default for PeerStatus {
    fn default() -> Self {
        Self {
            state: PeerState::Pending,
            last_update: 0,
            last_error: String::new(),
            last_online: 0,
            queries: 0,
            response_time: 0.0,
        }
    }
}

/// One remote monitoring source mirrored locally.
///
/// Owns its connection descriptor, mutable status and exactly one
/// [`DataStoreSet`]. Created during snapshot restore (or by the live peer
/// manager) and handed to the registry as part of a complete set.
#[derive(Debug)]
pub struct Peer {
    connection: Connection,
    status: RwLock<PeerStatus>,
    data: DataStoreSet,
}

impl Peer {
    /// Create a peer from its connection descriptor, with default status
    /// and an empty store set.
    pub fn new(connection: Connection) -> Self {
        Self {
            connection,
            status: RwLock::new(PeerStatus::default()),
            data: DataStoreSet::new(),
        }
    }

    /// Stable peer ID.
    pub fn id(&self) -> &str {
        &self.connection.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.connection.name
    }

    /// Connection descriptor.
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Snapshot of the current status.
    pub fn status(&self) -> PeerStatus {
        self.status.read().clone()
    }

    /// Replace the status wholesale.
    pub fn set_status(&self, status: PeerStatus) {
        *self.status.write() = status;
    }

    /// Update the status in place.
    pub fn update_status(&self, f: impl FnOnce(&mut PeerStatus)) {
        f(&mut self.status.write());
    }

    /// Whether this peer currently serves live data.
    pub fn is_online(&self) -> bool {
        self.status.read().state.is_online()
    }

    /// The peer's table stores.
    pub fn data(&self) -> &DataStoreSet {
        &self.data
    }
}
