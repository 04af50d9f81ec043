//! # Request/Reply RPC
//!
//! One request and one reply per TCP connection, framed by
//! [`crate::framing`]. Servers implement [`RequestHandler`]; clients use
//! [`RpcClient`], which retries the connect step with exponential back-off
//! while the remote role is still starting.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::framing::{read_message, write_message, FrameError};

/// Maximum connection attempts before a call fails.
pub const MAX_CONNECT_ATTEMPTS: u32 = 10;

/// Delay before the first reconnection attempt.
const CONNECT_BASE_DELAY_MS: u64 = 100;

/// Upper bound on the delay between attempts.
const MAX_CONNECT_DELAY_MS: u64 = 5_000;

/// Errors from RPC calls and servers.
#[derive(Debug, Error)]
pub enum RpcError {
    /// The remote could not be reached.
    #[error("cannot connect to {address} after {attempts} attempts: {source}")]
    Connect {
        address: String,
        attempts: u32,
        source: io::Error,
    },

    /// The listener could not be bound.
    #[error("cannot listen on {address}: {source}")]
    Bind { address: String, source: io::Error },

    /// Reading or writing a frame failed.
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// The remote answered with an unexpected reply.
    #[error("unexpected reply to {0}")]
    UnexpectedReply(&'static str),
}

/// Server side of a role.
#[async_trait]
pub trait RequestHandler: Send + Sync + 'static {
    /// Request type.
    type Request: DeserializeOwned + Send;
    /// Reply type.
    type Response: Serialize + Send + Sync;

    /// Answer one request.
    async fn handle(&self, request: Self::Request) -> Self::Response;
}

/// Bind `address` for [`serve`].
pub async fn bind(address: &str) -> Result<TcpListener, RpcError> {
    TcpListener::bind(address).await.map_err(|source| RpcError::Bind {
        address: address.to_string(),
        source,
    })
}

async fn handle_connection<H: RequestHandler>(
    mut stream: TcpStream,
    peer: SocketAddr,
    handler: Arc<H>,
) -> Result<(), FrameError> {
    let request: H::Request = read_message(&mut stream).await?;
    let response = handler.handle(request).await;
    write_message(&mut stream, &response).await?;
    debug!(%peer, "served request");
    Ok(())
}

/// Accept connections until `shutdown` turns true, answering each on its
/// own task.
pub async fn serve<H: RequestHandler>(
    listener: TcpListener,
    handler: Arc<H>,
    mut shutdown: watch::Receiver<bool>,
) {
    if let Ok(address) = listener.local_addr() {
        info!(%address, "RPC server listening");
    }
    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    let handler = handler.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, peer, handler).await {
                            warn!(%peer, error = %e, "RPC connection failed");
                        }
                    });
                }
                Err(e) => warn!(error = %e, "accept failed"),
            },
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    info!("RPC server shutting down");
                    break;
                }
            }
        }
    }
}

/// Exponential back-off: base · 2^attempt, capped.
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(
        CONNECT_BASE_DELAY_MS
            .saturating_mul(1 << attempt.min(6))
            .min(MAX_CONNECT_DELAY_MS),
    )
}

/// Client for one remote role.
#[derive(Debug, Clone)]
pub struct RpcClient {
    address: String,
}

impl RpcClient {
    /// Client for the server at `address`.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }

    /// Remote address.
    pub fn address(&self) -> &str {
        &self.address
    }

    async fn connect(&self) -> Result<TcpStream, RpcError> {
        let mut attempt = 0;
        loop {
            match TcpStream::connect(&self.address).await {
                Ok(stream) => return Ok(stream),
                Err(source) => {
                    attempt += 1;
                    if attempt >= MAX_CONNECT_ATTEMPTS {
                        return Err(RpcError::Connect {
                            address: self.address.clone(),
                            attempts: attempt,
                            source,
                        });
                    }
                    let delay = backoff_delay(attempt);
                    debug!(address = %self.address, attempt, ?delay, "connect failed, retrying");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Send `request` and wait for the reply.
    pub async fn call<Req, Resp>(&self, request: &Req) -> Result<Resp, RpcError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let mut stream = self.connect().await?;
        write_message(&mut stream, request).await?;
        Ok(read_message(&mut stream).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize)]
    enum EchoRequest {
        Double(u64),
    }

    struct Doubler;

    #[async_trait]
    impl RequestHandler for Doubler {
        type Request = EchoRequest;
        type Response = u64;

        async fn handle(&self, request: EchoRequest) -> u64 {
            match request {
                EchoRequest::Double(n) => n * 2,
            }
        }
    }

    #[test]
    fn test_backoff_is_capped() {
        assert_eq!(backoff_delay(1), Duration::from_millis(200));
        assert!(backoff_delay(3) > backoff_delay(2));
        assert_eq!(backoff_delay(30), Duration::from_millis(MAX_CONNECT_DELAY_MS));
    }

    #[tokio::test]
    async fn test_call_round_trip() {
        let listener = bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let server = tokio::spawn(serve(listener, Arc::new(Doubler), shutdown_rx));

        let client = RpcClient::new(address);
        let first: u64 = client.call(&EchoRequest::Double(21)).await.unwrap();
        let second: u64 = client.call(&EchoRequest::Double(5)).await.unwrap();
        assert_eq!((first, second), (42, 10));

        shutdown_tx.send(true).unwrap();
        server.await.unwrap();
    }
}
