//! Process-wide peer registry.
//!
//! Maps peer ID to [`Peer`] and keeps an ordered ID list establishing
//! display order. Readers (the query layer, status reporters) may observe
//! the registry at any time; snapshot restore replaces the whole content in
//! a single write critical section, never mutating it incrementally.

use crate::peer::Peer;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Inner {
    peers: HashMap<String, Arc<Peer>>,
    order: Vec<String>,
}

/// Shared registry of all known peers.
#[derive(Debug, Default)]
pub struct PeerRegistry {
    inner: RwLock<Inner>,
}

impl PeerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered peers.
    pub fn len(&self) -> usize {
        self.inner.read().order.len()
    }

    /// Whether no peers are registered.
    pub fn is_empty(&self) -> bool {
        self.inner.read().order.is_empty()
    }

    /// Look up a peer by its stable ID.
    pub fn get(&self, id: &str) -> Option<Arc<Peer>> {
        self.inner.read().peers.get(id).cloned()
    }

    /// Peer IDs in display order.
    pub fn ids_in_order(&self) -> Vec<String> {
        self.inner.read().order.clone()
    }

    /// Peers in display order.
    pub fn peers_in_order(&self) -> Vec<Arc<Peer>> {
        let inner = self.inner.read();
        inner
            .order
            .iter()
            .filter_map(|id| inner.peers.get(id).cloned())
            .collect()
    }

    /// Replace the whole registry content atomically.
    ///
    /// The replacement map and order list are assembled outside the lock;
    /// the swap itself is a single write critical section, so no reader can
    /// observe a partially populated peer set.
    pub fn replace(&self, peers: Vec<Arc<Peer>>) {
        let mut map = HashMap::with_capacity(peers.len());
        let mut order = Vec::with_capacity(peers.len());
        for peer in peers {
            order.push(peer.id().to_string());
            map.insert(peer.id().to_string(), peer);
        }

        let mut inner = self.inner.write();
        inner.peers = map;
        inner.order = order;
    }
}
