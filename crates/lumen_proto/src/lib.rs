//! lumen_proto - wire types and the envelope codec for the Lumen relay protocol.
//!
//! # Module layout
//! - `api`      - request/response JSON bodies
//! - `envelope` - on-wire envelope and plaintext message forms
//! - `codec`    - seal/open between the two

pub mod api;
pub mod codec;
pub mod envelope;

pub use codec::CodecError;
