//! # User Errors

use dl_02_revocation::RevocationError;
use dl_03_peer::PeerError;
use shared_types::ProtocolViolation;
use thiserror::Error;

/// Why a submission did not complete.
#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    Violation(#[from] ProtocolViolation),

    #[error(transparent)]
    Peer(#[from] PeerError),

    #[error(transparent)]
    Revocation(#[from] RevocationError),

    /// Every sender of the commit channel went away early.
    #[error("commit channel closed after {got} of {need} commits")]
    CommitsLost { got: usize, need: usize },

    /// Endorsement replies stopped before the threshold was reached.
    #[error("endorsement channel closed after {got} of {need} endorsements")]
    EndorsementsLost { got: usize, need: usize },

    /// Routing picked a position outside the peer directory.
    #[error("no peer at routing position {0}")]
    NoPeer(usize),
}
