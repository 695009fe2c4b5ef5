//! Session handshake state machine.
//!
//! Two wire steps: fetch the server's handshake public key, then submit the
//! HKDF login proof. The machine itself is pure; the facade performs the I/O
//! and feeds each response in. Every transition consumes the previous state,
//! so an out-of-order step is unrepresentable:
//!
//! Unauthenticated -> AwaitingServerKey -> AwaitingToken -> Authenticated

use lumen_crypto::{agree, identity::IdentityKeyPair, CryptoError};
use lumen_proto::api::{LoginRequest, LoginResponse};

/// Bearer credential produced by a completed handshake.
///
/// Immutable value; the client never refreshes or mutates it. Callers who
/// want to resume a session later persist the token themselves.
#[derive(Debug, Clone)]
pub struct SessionCredential {
    pub access_token: String,
    /// Expiry (Unix seconds) as reported by the server; not enforced
    /// client-side. A stale token shows up as a rejected request.
    pub valid_until: Option<i64>,
}

/// Leaves `Unauthenticated`: the next step is `GET /publicKey`.
pub(crate) fn begin<'a>(
    user_id: &'a str,
    identity: &'a IdentityKeyPair,
) -> AwaitingServerKey<'a> {
    AwaitingServerKey { user_id, identity }
}

/// Waiting for the server's handshake public key.
pub(crate) struct AwaitingServerKey<'a> {
    user_id: &'a str,
    identity: &'a IdentityKeyPair,
}

impl AwaitingServerKey<'_> {
    /// Consume the server's public key and produce the login request to
    /// submit via `POST /login`.
    pub(crate) fn on_server_key(
        self,
        server_public_hex: &str,
    ) -> Result<(LoginRequest, AwaitingToken), CryptoError> {
        let server_public = agree::public_key_from_hex(server_public_hex)?;
        let proof = agree::login_proof(self.identity, &server_public)?;
        let request = LoginRequest {
            user_id: self.user_id.to_string(),
            shared_secret: proof,
        };
        Ok((request, AwaitingToken))
    }
}

/// Login request submitted; waiting for the token.
#[derive(Debug)]
pub(crate) struct AwaitingToken;

impl AwaitingToken {
    /// Consume the login response, yielding the `Authenticated` credential.
    pub(crate) fn on_login_response(self, response: LoginResponse) -> SessionCredential {
        SessionCredential {
            access_token: response.access_token,
            valid_until: response.valid_until,
        }
    }
}
