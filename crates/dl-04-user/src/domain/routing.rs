//! # Deterministic Routing
//!
//! A message picks its peers from its hash alone: the anchor is
//! `SHA3(message) mod peers` read as a big-endian integer, endorsers are
//! the next `endorsements` positions from the anchor (wrapping), and the
//! orderer is `SHA3(message + "-order") mod peers`.

use shared_crypto::sha3_256;

/// Suffix hashed with the message to pick the orderer.
pub const ORDER_SUFFIX: &str = "-order";

/// `hash` as a big-endian integer, modulo `peers`.
pub fn peer_by_hash(hash: &[u8], peers: usize) -> usize {
    if peers == 0 {
        return 0;
    }
    let modulus = peers as u128;
    hash.iter()
        .fold(0u128, |acc, &byte| (acc * 256 + u128::from(byte)) % modulus) as usize
}

/// Routing positions of the endorsers of `message`.
pub fn endorsers(message: &str, peers: usize, endorsements: usize) -> Vec<usize> {
    let anchor = peer_by_hash(&sha3_256(message.as_bytes()), peers);
    (0..endorsements).map(|i| (anchor + i) % peers).collect()
}

/// Routing position of the orderer of `message`.
pub fn orderer(message: &str, peers: usize) -> usize {
    let marked = format!("{message}{ORDER_SUFFIX}");
    peer_by_hash(&sha3_256(marked.as_bytes()), peers)
}
