//! # Issuer Service
//!
//! Implements [`IssuerApi`] in-process: every nonce, request and credential
//! is billed through the bandwidth simulator between the issuer and the
//! requester. [`enroll`] is the client half of the protocol.

use async_trait::async_trait;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use shared_bus::BandwidthSimulator;
use shared_crypto::{generate_keys, CredRequest, Credentials, PublicParams};
use shared_types::{Identity, Nonce, ProtocolViolation, RoleTag};
use sim_telemetry::{CryptoEvent, SimulationRecorder};
use std::sync::Arc;
use tracing::debug;

use crate::domain::errors::IssuanceError;
use crate::domain::issuer::Issuer;
use crate::ports::inbound::IssuerApi;

/// Root or organization serving enrollment requests.
pub struct IssuerService {
    issuer: Issuer,
    bandwidth: Arc<BandwidthSimulator>,
    recorder: SimulationRecorder,
}

impl IssuerService {
    pub fn new(
        identity: Identity,
        bandwidth: Arc<BandwidthSimulator>,
        recorder: SimulationRecorder,
    ) -> Result<Self, IssuanceError> {
        Ok(Self {
            issuer: Issuer::new(identity)?,
            bandwidth,
            recorder,
        })
    }

    /// The issuing identity.
    pub fn identity(&self) -> &Identity {
        self.issuer.identity()
    }
}

#[async_trait]
impl IssuerApi for IssuerService {
    async fn get_nonce(&self, requester: u64) -> Result<Nonce, IssuanceError> {
        let nonce = self.issuer.nonce(&mut OsRng);
        self.bandwidth
            .record_transfer(&self.issuer.name(), &self.issuer.child_name(requester), &nonce)
            .await;
        Ok(nonce)
    }

    async fn process_cred_request(
        &self,
        requester: u64,
        request: CredRequest,
    ) -> Result<Credentials, IssuanceError> {
        let issuer = self.issuer.name();
        let holder = self.issuer.child_name(requester);
        self.bandwidth
            .record_transfer(&holder, &issuer, &request)
            .await;

        let credentials = self.issuer.grant(&mut OsRng, requester, &request)?;
        self.recorder.record(CryptoEvent::CredDelegate);
        debug!("{} delegated credentials to {}", issuer, holder);

        self.bandwidth
            .record_transfer(&issuer, &holder, &credentials)
            .await;
        Ok(credentials)
    }
}

/// Enroll identity `id` of `role` with `issuer`: fresh keys, nonce, signed
/// request, then a chain check against the root key.
pub async fn enroll<R>(
    rng: &mut R,
    issuer: &dyn IssuerApi,
    role: RoleTag,
    id: u64,
    params: &PublicParams,
    recorder: &SimulationRecorder,
) -> Result<Identity, IssuanceError>
where
    R: RngCore + CryptoRng + Send,
{
    let keys = generate_keys(rng, role.level());
    let nonce = issuer.get_nonce(id).await?;
    let request = CredRequest::new(rng, &keys, &nonce.0);
    let credentials = issuer.process_cred_request(id, request).await?;

    let identity = Identity {
        keys,
        credentials,
        id,
        role,
    };
    identity
        .credentials
        .verify(&identity.keys.sk, &params.root_pk)
        .map_err(|source| ProtocolViolation::InvalidCredentials {
            holder: identity.name(),
            source,
        })?;
    recorder.record(CryptoEvent::CredVerify);
    Ok(identity)
}
