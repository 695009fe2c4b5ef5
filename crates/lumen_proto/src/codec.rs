//! Envelope codec: seal plaintext messages into relay envelopes and open
//! fetched envelopes back into plaintext.
//!
//! Sealing: JSON of [`Message`] -> AES-256-GCM -> base64. The two failure
//! modes of [`open`] stay distinct so callers can tell transit corruption
//! from a peer speaking a different plaintext schema. Neither warrants a
//! retry; the envelope must be re-fetched or treated as lost.

use base64::{engine::general_purpose::STANDARD, Engine};
use thiserror::Error;

use lumen_crypto::{aead, agree::MessageKey};

use crate::envelope::{Envelope, Message};

#[derive(Debug, Error)]
pub enum CodecError {
    /// Tag mismatch, wrong key, or bytes corrupted in transit.
    #[error("Decryption failed (wrong key or tampered ciphertext)")]
    DecryptionFailed,

    /// Decryption succeeded but the plaintext is not a valid message.
    #[error("Decrypted plaintext is malformed: {0}")]
    MalformedPlaintext(String),

    /// The AEAD layer rejected the seal operation.
    #[error("Encryption failed")]
    EncryptionFailed,

    #[error("Message serialization failed: {0}")]
    Serialization(String),
}

/// Encrypt `message` under `key` and wrap it for the relay.
///
/// `from_user` and `to_user` stay plaintext (the relay routes on them);
/// only `content` is confidential.
pub fn seal(
    message: &Message,
    from_user: &str,
    to_user: &str,
    key: &MessageKey,
) -> Result<Envelope, CodecError> {
    let plaintext =
        serde_json::to_vec(message).map_err(|e| CodecError::Serialization(e.to_string()))?;
    let sealed = aead::encrypt(key, &plaintext).map_err(|_| CodecError::EncryptionFailed)?;
    Ok(Envelope {
        from_user: from_user.to_string(),
        to_user: to_user.to_string(),
        content: STANDARD.encode(sealed),
    })
}

/// Decrypt and deserialize a fetched envelope.
pub fn open(envelope: &Envelope, key: &MessageKey) -> Result<Message, CodecError> {
    let sealed = STANDARD
        .decode(&envelope.content)
        .map_err(|_| CodecError::DecryptionFailed)?;
    let plaintext = aead::decrypt(key, &sealed).map_err(|_| CodecError::DecryptionFailed)?;
    serde_json::from_slice(&plaintext).map_err(|e| CodecError::MalformedPlaintext(e.to_string()))
}
