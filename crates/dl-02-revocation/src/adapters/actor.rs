//! # Revocation Actor
//!
//! In-process binding. One task owns the mailbox, the epoch timer and the
//! shutdown signal; every request is granted on its own task so the
//! service's limiter, not the loop, bounds concurrency.

use async_trait::async_trait;
use shared_crypto::PublicKey;
use shared_types::{NonRevocationHandle, NonRevocationRequest};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::{debug, info};

use crate::domain::epoch::EpochCounter;
use crate::domain::errors::RevocationError;
use crate::ports::inbound::RevocationApi;
use crate::service::RevocationService;

/// A queued request and where to deliver its handle.
pub struct RevocationMessage {
    pub request: NonRevocationRequest,
    pub reply: oneshot::Sender<NonRevocationHandle>,
}

/// Actor loop state.
pub struct RevocationActor {
    service: Arc<RevocationService>,
    mailbox: mpsc::Receiver<RevocationMessage>,
    shutdown: watch::Receiver<bool>,
    epoch_length: Duration,
    revoke: bool,
}

impl RevocationActor {
    /// Start the actor. The epoch advances every `epoch_length` when
    /// `revoke` is on.
    pub fn spawn(
        service: Arc<RevocationService>,
        epoch_length: Duration,
        revoke: bool,
        shutdown: watch::Receiver<bool>,
    ) -> (RevocationActorHandle, JoinHandle<()>) {
        let (sender, mailbox) = mpsc::channel(shared_bus::DEFAULT_CHANNEL_CAPACITY);
        let handle = RevocationActorHandle {
            sender,
            epoch: service.epoch().clone(),
            public_key: service.public_key(),
        };
        let actor = Self {
            service,
            mailbox,
            shutdown,
            epoch_length,
            revoke,
        };
        (handle, tokio::spawn(actor.run()))
    }

    /// Run the actor loop until shutdown.
    pub async fn run(mut self) {
        info!("[dl-02] revocation authority started");
        let mut ticker = interval_at(Instant::now() + self.epoch_length, self.epoch_length);

        loop {
            tokio::select! {
                Some(message) = self.mailbox.recv() => {
                    let service = self.service.clone();
                    tokio::spawn(async move {
                        let handle = service.grant(message.request).await;
                        if message.reply.send(handle).is_err() {
                            debug!("[dl-02] requester went away before its handle arrived");
                        }
                    });
                }
                _ = ticker.tick() => {
                    if self.revoke {
                        let epoch = self.service.epoch().advance();
                        info!("[dl-02] epoch advanced to {}", epoch);
                    }
                }
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("[dl-02] revocation authority stopped");
    }
}

/// Sending side of the actor, used by users.
#[derive(Clone)]
pub struct RevocationActorHandle {
    sender: mpsc::Sender<RevocationMessage>,
    epoch: EpochCounter,
    public_key: PublicKey,
}

#[async_trait]
impl RevocationApi for RevocationActorHandle {
    async fn current_epoch(&self) -> Result<u64, RevocationError> {
        Ok(self.epoch.current())
    }

    async fn public_key(&self) -> Result<PublicKey, RevocationError> {
        Ok(self.public_key)
    }

    async fn request_handle(
        &self,
        request: NonRevocationRequest,
    ) -> Result<NonRevocationHandle, RevocationError> {
        let (reply, receiver) = oneshot::channel();
        self.sender
            .send(RevocationMessage { request, reply })
            .await
            .map_err(|_| RevocationError::Stopped)?;
        receiver.await.map_err(|_| RevocationError::Stopped)
    }
}
