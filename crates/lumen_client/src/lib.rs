//! lumen_client - end-to-end encrypted messaging client for a Lumen relay.
//!
//! The relay is honest-but-untrusted: it routes envelopes between user ids
//! and never sees plaintext. This crate holds the protocol engine around
//! that assumption: the identity-based login handshake, per-peer envelope
//! sealing, and the push notification channel.
//!
//! # Module layout
//! - `client`    - public facade and its three construction modes
//! - `handshake` - pure login state machine and the session credential
//! - `http`      - JSON-over-HTTP plumbing
//! - `notify`    - WebSocket notification channel
//! - `error`     - unified error type

pub mod client;
pub mod error;
pub mod handshake;
mod http;
pub mod notify;

pub use client::Client;
pub use error::ClientError;
pub use handshake::SessionCredential;
pub use notify::NotifyChannel;
