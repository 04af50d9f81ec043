//! # Peer Errors

use shared_bus::RpcError;
use shared_types::PeerId;
use thiserror::Error;

/// Errors reaching a peer.
#[derive(Debug, Error)]
pub enum PeerError {
    /// The peer's actor has exited.
    #[error("peer {0} stopped")]
    Stopped(PeerId),

    /// Transport to a remote peer failed.
    #[error("peer unreachable: {0}")]
    Transport(#[from] RpcError),
}
