//! API request/response types shared with the relay server.
//! These map directly to JSON bodies on the wire (camelCase field names).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Map of sender user id to count of unseen messages from that sender.
/// Produced by both `GET /new` and the notification channel.
pub type NewMessageSummary = HashMap<String, u64>;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Hex-encoded X25519 public key.
    pub public_key: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyResponse {
    /// Server's current handshake public key (hex).
    pub public_key: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub user_id: String,
    /// HKDF login proof, never the raw exchange output.
    pub shared_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    /// Expiry timestamp (Unix seconds). Enforcement is server-side.
    #[serde(default)]
    pub valid_until: Option<i64>,
}

/// First frame sent on the notification channel.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenFrame {
    pub access_token: String,
}

/// Body of every non-2xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
