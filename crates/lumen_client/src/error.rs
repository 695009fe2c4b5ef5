use thiserror::Error;

use lumen_crypto::CryptoError;
use lumen_proto::CodecError;

/// Failures surfaced by the client. All are terminal to the operation that
/// raised them; nothing is retried internally.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server address cannot be turned into a usable endpoint.
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    /// The server answered with something this protocol cannot parse.
    #[error("Unknown response from server")]
    UnknownResponse,

    /// The server rejected the request with a structured error body.
    #[error("Request rejected ({status}): {message}")]
    RequestRejected { status: u16, message: String },

    /// Refusing to send an envelope whose sender claim does not match the
    /// authenticated identity.
    #[error("Invalid message (sender does not match authenticated user)")]
    InvalidMessage,

    /// Connection-level transport failure (DNS, refused connection, TLS).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Notification channel failure (connect or authentication frame).
    #[error("Notification channel error: {0}")]
    Channel(String),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}
