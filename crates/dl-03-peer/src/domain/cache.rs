//! # Identity-Proof Cache
//!
//! Keys are the first four bytes of SHA3-256 over the raw proof, kept per
//! operation. Lookup is a linear scan and entries live for the whole run.
//!
//! A 32-bit key collides after roughly 2^16 distinct proofs and the lists
//! never shrink. Both match the simulated system; a hardened peer would
//! key on the full digest and evict.

use parking_lot::Mutex;
use shared_crypto::sha3_256;
use shared_types::Operation;

/// Truncated proof digest.
pub type ProofKey = [u8; 4];

/// Cache key of `proof`.
pub fn proof_key(proof: &[u8]) -> ProofKey {
    let digest = sha3_256(proof);
    [digest[0], digest[1], digest[2], digest[3]]
}

/// Verified proofs, partitioned by operation.
#[derive(Debug, Default)]
pub struct ProofCache {
    endorsement: Mutex<Vec<ProofKey>>,
    ordering: Mutex<Vec<ProofKey>>,
    validation: Mutex<Vec<ProofKey>>,
}

impl ProofCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn partition(&self, operation: Operation) -> &Mutex<Vec<ProofKey>> {
        match operation {
            Operation::Endorsement => &self.endorsement,
            Operation::Ordering => &self.ordering,
            Operation::Validation => &self.validation,
        }
    }

    pub fn contains(&self, operation: Operation, key: &ProofKey) -> bool {
        self.partition(operation).lock().iter().any(|k| k == key)
    }

    pub fn insert(&self, operation: Operation, key: ProofKey) {
        self.partition(operation).lock().push(key);
    }

    /// Entries cached for `operation`.
    pub fn len(&self, operation: Operation) -> usize {
        self.partition(operation).lock().len()
    }
}
