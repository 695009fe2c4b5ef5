//! lumen_crypto - cryptographic primitives for the Lumen client.
//!
//! # Design principles
//! - No custom crypto; all primitives come from audited Rust crates.
//! - Secret material is zeroized on drop.
//! - Raw key bytes are wrapped in opaque types to prevent accidental misuse.
//!
//! # Module layout
//! - `identity` - long-term X25519 identity keypairs
//! - `agree`    - ECDH message keys and the HKDF login proof
//! - `aead`     - AES-256-GCM encrypt/decrypt helpers
//! - `error`    - unified error type

pub mod aead;
pub mod agree;
pub mod error;
pub mod identity;

pub use error::CryptoError;
