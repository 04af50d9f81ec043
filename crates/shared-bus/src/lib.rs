//! # Shared Bus - Inter-Actor Transport
//!
//! Everything between two roles passes through this crate.
//!
//! ## Components
//!
//! - **Bandwidth simulator**: charges every transfer against the sender's,
//!   the receiver's and the global link, then logs it.
//! - **Network event log**: append-only JSON lines, one per transfer.
//! - **RPC**: length-prefixed `bincode` request/reply over TCP, used when
//!   each role runs as its own process.
//!
//! ```text
//! ┌──────────┐   record_transfer()   ┌──────────────────┐
//! │  Role A  │ ────────────────────▶ │ BandwidthSimulator│──▶ NetworkEventLog
//! └──────────┘                       └──────────────────┘
//!      │  mailbox (in-process) / RpcClient (distributed)
//!      ▼
//! ┌──────────┐
//! │  Role B  │
//! └──────────┘
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod bandwidth;
pub mod framing;
pub mod network_log;
pub mod rpc;

// Re-export main types
pub use bandwidth::{transfer_delay, BandwidthSimulator};
pub use framing::{read_message, write_message, FrameError, MAX_FRAME_SIZE};
pub use network_log::{NetworkEvent, NetworkEventLog};
pub use rpc::{bind, serve, RequestHandler, RpcClient, RpcError};

/// Mailbox capacity of actor inboxes.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capacity() {
        assert_eq!(DEFAULT_CHANNEL_CAPACITY, 1000);
    }
}
