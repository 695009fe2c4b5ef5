//! Message envelope and plaintext message forms.
//!
//! The relay is an untrusted router: it sees `fromUser`, `toUser` and an
//! opaque base64 ciphertext, nothing else. Plaintext [`Message`] values exist
//! only at the two endpoints, immediately before encryption or after
//! decryption; the core never stores them.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// On-wire envelope, sent to and fetched from the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Sender's user id. Must match the authenticated session when sending.
    pub from_user: String,
    /// Recipient's user id, needed by the relay for routing.
    pub to_user: String,
    /// Base64 of [ nonce | ciphertext+tag ].
    pub content: String,
}

/// Plaintext message, the unit the two peers actually exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub content: String,
    /// Unix seconds, stamped when the sender constructs the message.
    pub timestamp: i64,
    pub media_urls: Vec<String>,
}

impl Message {
    pub fn new(content: impl Into<String>, media_urls: Vec<String>) -> Self {
        Self {
            content: content.into(),
            timestamp: Utc::now().timestamp(),
            media_urls,
        }
    }
}
