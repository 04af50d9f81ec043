//! # Peer Directory
//!
//! Every peer of the network with its public key and a way to reach it.
//! Ordering peers broadcast through it; users route through it and check
//! endorsements against its keys.

use shared_crypto::{KeyPair, PublicKey};
use shared_types::{peer_name, PeerId};
use std::sync::Arc;

use crate::ports::inbound::PeerApi;

/// Key pair of peer `id`, derived from the run seed so every process
/// agrees on it.
pub fn peer_keys(seed: u64, id: PeerId) -> KeyPair {
    KeyPair::derive(seed, "peer", id, 0)
}

/// One reachable peer.
#[derive(Clone)]
pub struct PeerEntry {
    pub id: PeerId,
    pub public_key: PublicKey,
    pub api: Arc<dyn PeerApi>,
}

impl PeerEntry {
    pub fn name(&self) -> String {
        peer_name(self.id)
    }
}

/// All peers, indexed by ID.
#[derive(Clone, Default)]
pub struct PeerDirectory {
    entries: Vec<PeerEntry>,
}

impl PeerDirectory {
    /// Directory over `entries`; they are sorted by ID.
    pub fn new(mut entries: Vec<PeerEntry>) -> Self {
        entries.sort_by_key(|entry| entry.id);
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: PeerId) -> Option<&PeerEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Entry at routing position `index`.
    pub fn at(&self, index: usize) -> Option<&PeerEntry> {
        self.entries.get(index)
    }

    pub fn public_key(&self, id: PeerId) -> Option<PublicKey> {
        self.get(id).map(|entry| entry.public_key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PeerEntry> {
        self.entries.iter()
    }
}
