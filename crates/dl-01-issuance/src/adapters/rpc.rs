//! # Issuer RPC Binding
//!
//! `GetNonce` and `ProcessCredRequest` over the shared request/reply
//! transport. The server wraps an [`IssuerService`]; the client implements
//! [`IssuerApi`] so [`crate::enroll`] runs unchanged against a remote issuer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_bus::{RequestHandler, RpcClient, RpcError};
use shared_crypto::{CredRequest, Credentials};
use shared_types::{abort, Nonce};
use std::sync::Arc;

use crate::domain::errors::IssuanceError;
use crate::ports::inbound::IssuerApi;
use crate::service::IssuerService;

/// Requests accepted by a root or organization server.
#[derive(Debug, Serialize, Deserialize)]
pub enum IssuerRequest {
    GetNonce { requester: u64 },
    ProcessCredRequest { requester: u64, request: CredRequest },
}

/// Replies of a root or organization server.
#[derive(Debug, Serialize, Deserialize)]
pub enum IssuerResponse {
    Nonce(Nonce),
    Credentials(Credentials),
    Rejected(String),
}

/// Server side.
pub struct IssuerRpcServer {
    service: Arc<IssuerService>,
}

impl IssuerRpcServer {
    pub fn new(service: Arc<IssuerService>) -> Self {
        Self { service }
    }
}

fn reply<T>(result: Result<T, IssuanceError>, wrap: fn(T) -> IssuerResponse) -> IssuerResponse {
    match result {
        Ok(value) => wrap(value),
        Err(IssuanceError::Violation(violation)) => abort("issuer", violation),
        Err(e) => IssuerResponse::Rejected(e.to_string()),
    }
}

#[async_trait]
impl RequestHandler for IssuerRpcServer {
    type Request = IssuerRequest;
    type Response = IssuerResponse;

    async fn handle(&self, request: IssuerRequest) -> IssuerResponse {
        match request {
            IssuerRequest::GetNonce { requester } => {
                reply(self.service.get_nonce(requester).await, IssuerResponse::Nonce)
            }
            IssuerRequest::ProcessCredRequest { requester, request } => reply(
                self.service.process_cred_request(requester, request).await,
                IssuerResponse::Credentials,
            ),
        }
    }
}

/// Client side.
#[derive(Debug, Clone)]
pub struct RpcIssuerClient {
    client: RpcClient,
}

impl RpcIssuerClient {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            client: RpcClient::new(address),
        }
    }
}

#[async_trait]
impl IssuerApi for RpcIssuerClient {
    async fn get_nonce(&self, requester: u64) -> Result<Nonce, IssuanceError> {
        match self.client.call(&IssuerRequest::GetNonce { requester }).await? {
            IssuerResponse::Nonce(nonce) => Ok(nonce),
            IssuerResponse::Rejected(reason) => Err(IssuanceError::Rejected(reason)),
            _ => Err(RpcError::UnexpectedReply("GetNonce").into()),
        }
    }

    async fn process_cred_request(
        &self,
        requester: u64,
        request: CredRequest,
    ) -> Result<Credentials, IssuanceError> {
        let request = IssuerRequest::ProcessCredRequest { requester, request };
        match self.client.call(&request).await? {
            IssuerResponse::Credentials(credentials) => Ok(credentials),
            IssuerResponse::Rejected(reason) => Err(IssuanceError::Rejected(reason)),
            _ => Err(RpcError::UnexpectedReply("ProcessCredRequest").into()),
        }
    }
}
