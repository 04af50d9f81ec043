//! # Inbound Ports (Driving Ports / API)
//!
//! The three requests a peer accepts. Submission returns as soon as the
//! peer has the request; results come back on the supplied channel, the
//! way a mailbox-driven peer answers.

use async_trait::async_trait;
use shared_types::{Endorsement, PeerId, Transaction, TransactionProposal};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::domain::errors::PeerError;

/// Peer API shared by the actor and RPC bindings.
#[async_trait]
pub trait PeerApi: Send + Sync {
    /// Ask for an endorsement, delivered on `reply`.
    async fn submit_endorsement(
        &self,
        proposal: Arc<TransactionProposal>,
        reply: mpsc::Sender<Endorsement>,
    ) -> Result<(), PeerError>;

    /// Ask this peer to order `transaction`. Every validating peer signals
    /// its ID on `commits`.
    async fn submit_order(
        &self,
        transaction: Transaction,
        commits: mpsc::Sender<PeerId>,
    ) -> Result<(), PeerError>;

    /// Ask this peer to validate `transaction`; it signals its ID on
    /// `commits` when done.
    async fn submit_validation(
        &self,
        transaction: Arc<Transaction>,
        commits: mpsc::Sender<PeerId>,
    ) -> Result<(), PeerError>;
}
