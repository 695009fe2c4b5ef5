//! Long-term identity key material.
//!
//! Each user holds one X25519 static keypair. The secret half never leaves
//! this struct except through [`IdentityKeyPair::secret_hex`], which exists
//! so callers can persist it themselves; the public half is always re-derived
//! from the secret. Keys travel on the wire hex-encoded.

use rand::rngs::OsRng;
use rand_core::{CryptoRng, RngCore};
use x25519_dalek::{PublicKey, StaticSecret};

use crate::error::CryptoError;

/// Long-term X25519 identity keypair. The secret is zeroized on drop.
pub struct IdentityKeyPair {
    secret: StaticSecret,
    public: PublicKey,
}

impl std::fmt::Debug for IdentityKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityKeyPair")
            .field("secret", &"<redacted>")
            .field("public", &self.public)
            .finish()
    }
}

impl IdentityKeyPair {
    /// Generate a fresh keypair from the OS CSPRNG.
    pub fn generate() -> Self {
        Self::generate_with(&mut OsRng)
    }

    /// Generate from a caller-supplied RNG.
    ///
    /// Exists so tests can feed a seeded RNG and get deterministic vectors;
    /// production callers use [`IdentityKeyPair::generate`].
    pub fn generate_with<R>(rng: &mut R) -> Self
    where
        R: RngCore + CryptoRng,
    {
        let secret = StaticSecret::random_from_rng(rng);
        let public = PublicKey::from(&secret);
        Self { secret, public }
    }

    /// Reconstruct a keypair from stored secret bytes; re-derives the public key.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let arr: [u8; 32] = bytes.try_into().map_err(|_| {
            CryptoError::InvalidKey(format!("secret key must be 32 bytes, got {}", bytes.len()))
        })?;
        let secret = StaticSecret::from(arr);
        let public = PublicKey::from(&secret);
        Ok(Self { secret, public })
    }

    /// Reconstruct a keypair from a hex-encoded secret.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(s.trim())?;
        Self::from_bytes(&bytes)
    }

    pub fn public(&self) -> &PublicKey {
        &self.public
    }

    /// Hex encoding of the public key, as published to the server.
    pub fn public_hex(&self) -> String {
        hex::encode(self.public.as_bytes())
    }

    /// Hex encoding of the secret key, for caller-side persistence.
    pub fn secret_hex(&self) -> String {
        hex::encode(self.secret.to_bytes())
    }

    pub(crate) fn secret(&self) -> &StaticSecret {
        &self.secret
    }
}
