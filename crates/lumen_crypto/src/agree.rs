//! Shared-secret derivation.
//!
//! Two derivations over the same X25519 exchange, kept distinct on purpose:
//!
//! - [`message_key`]: the raw ECDH output, used directly as the AEAD key for
//!   peer-to-peer message encryption. Symmetric in its arguments.
//! - [`login_proof`]: the ECDH output against the *server's* handshake key,
//!   passed through HKDF-SHA256 with a fixed domain-separation label before
//!   it is submitted as login proof. The raw exchange output is never
//!   transmitted, so a server transcript cannot be replayed as a message key.

use hkdf::Hkdf;
use sha2::Sha256;
use x25519_dalek::PublicKey;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{error::CryptoError, identity::IdentityKeyPair};

/// HKDF salt binding login proofs to this protocol revision.
const HANDSHAKE_SALT: &[u8] = b"lumen-handshake-v1";
const LOGIN_PROOF_INFO: &[u8] = b"login-proof";

/// 32-byte symmetric key shared between two peers. Zeroized on drop, never
/// serialized; recomputed on demand from the two keypairs.
#[derive(ZeroizeOnDrop)]
pub struct MessageKey([u8; 32]);

impl std::fmt::Debug for MessageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("MessageKey").field(&"<redacted>").finish()
    }
}

impl MessageKey {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// Parse a peer public key from its hex wire encoding.
pub fn public_key_from_hex(s: &str) -> Result<PublicKey, CryptoError> {
    let bytes = hex::decode(s.trim())
        .map_err(|e| CryptoError::InvalidPeerKey(format!("bad hex: {e}")))?;
    let arr: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
        CryptoError::InvalidPeerKey(format!("public key must be 32 bytes, got {}", bytes.len()))
    })?;
    Ok(PublicKey::from(arr))
}

/// Raw X25519 agreement, used directly as the per-peer AEAD key.
///
/// `message_key(a, b_pub)` equals `message_key(b, a_pub)` for matching
/// keypairs, so both ends open each other's envelopes without negotiation.
pub fn message_key(
    ours: &IdentityKeyPair,
    theirs: &PublicKey,
) -> Result<MessageKey, CryptoError> {
    let shared = ours.secret().diffie_hellman(theirs);
    if !shared.was_contributory() {
        return Err(CryptoError::InvalidPeerKey(
            "non-contributory exchange (low-order peer point)".into(),
        ));
    }
    Ok(MessageKey(shared.to_bytes()))
}

/// Login proof against the server's handshake key.
///
/// HKDF-SHA256 over the raw exchange output, domain-separated so the value
/// sent over the wire is one-way removed from any message key. Hex-encoded
/// for the `sharedSecret` field of the login request.
pub fn login_proof(
    ours: &IdentityKeyPair,
    server: &PublicKey,
) -> Result<String, CryptoError> {
    let shared = ours.secret().diffie_hellman(server);
    if !shared.was_contributory() {
        return Err(CryptoError::InvalidPeerKey(
            "non-contributory exchange (low-order server point)".into(),
        ));
    }
    let hk = Hkdf::<Sha256>::new(Some(HANDSHAKE_SALT), shared.as_bytes());
    let mut proof = [0u8; 32];
    hk.expand(LOGIN_PROOF_INFO, &mut proof)
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
    let encoded = hex::encode(proof);
    proof.zeroize();
    Ok(encoded)
}
