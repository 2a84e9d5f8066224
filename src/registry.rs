//! Connection registry
//!
//! Maps connection identity to the peer's write handle. Only the
//! dispatcher task touches it, so it carries no locking of its own.

use std::collections::HashMap;

use tokio::io::AsyncWrite;
use tracing::warn;

use crate::peer::Peer;
use crate::types::ConnectionId;

/// Outcome of one broadcast
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Peers the payload was written to
    pub delivered: usize,
    /// Peers whose write failed
    pub failed: usize,
}

/// All registered connections: ConnectionId -> Peer
#[derive(Debug)]
pub struct Registry<W> {
    peers: HashMap<ConnectionId, Peer<W>>,
}

impl<W> Registry<W> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            peers: HashMap::new(),
        }
    }

    /// Check if a connection is registered
    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.peers.contains_key(id)
    }

    /// Register a peer
    ///
    /// Returns false and drops `peer` if its identity is already
    /// registered; the existing entry is left untouched.
    pub fn insert(&mut self, peer: Peer<W>) -> bool {
        if self.peers.contains_key(&peer.id) {
            return false;
        }
        self.peers.insert(peer.id, peer);
        true
    }

    /// Unregister a connection, returning its peer if it was present
    pub fn remove(&mut self, id: &ConnectionId) -> Option<Peer<W>> {
        self.peers.remove(id)
    }

    /// Number of registered connections
    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

impl<W: AsyncWrite + Unpin> Registry<W> {
    /// Write `payload` to every registered peer except `from`
    ///
    /// Writes happen one after another on the calling task. A failed write
    /// is logged and skipped; it never removes the peer, since the peer's own
    /// handler reports its disconnection.
    pub async fn broadcast(&mut self, from: ConnectionId, payload: &[u8]) -> Delivery {
        let mut delivery = Delivery::default();

        for (id, peer) in self.peers.iter_mut() {
            if *id == from {
                continue;
            }
            match peer.write(payload).await {
                Ok(()) => delivery.delivered += 1,
                Err(e) => {
                    warn!("Failed to relay {} bytes to {}: {}", payload.len(), id, e);
                    delivery.failed += 1;
                }
            }
        }

        delivery
    }
}

impl<W> Default for Registry<W> {
    fn default() -> Self {
        Self::new()
    }
}
