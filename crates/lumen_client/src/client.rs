//! Client facade: composes identity, handshake, transport, codec and the
//! notification channel into the public API.

use reqwest::Method;
use tracing::{debug, warn};

use lumen_crypto::{agree, identity::IdentityKeyPair};
use lumen_proto::{
    api::{LoginResponse, NewMessageSummary, PublicKeyResponse, RegisterRequest, RegisterResponse},
    codec,
    envelope::{Envelope, Message},
    CodecError,
};

use crate::{
    error::ClientError,
    handshake::{self, SessionCredential},
    http::Api,
    notify::NotifyChannel,
};

/// An authenticated Lumen client bound to one relay server.
///
/// Construction always yields a fully authenticated instance or an error;
/// there is no observable half-connected state. Within one instance the
/// handshake completes before any authenticated call is issued, and the
/// access token is never written again afterwards, so the notification
/// receive loop can run concurrently with fetch/send calls.
pub struct Client {
    api: Api,
    /// Server address stripped to its "://host" remainder, shared by the
    /// plain and channel protocol endpoints.
    host: String,
    user_id: String,
    identity: IdentityKeyPair,
    credential: SessionCredential,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("host", &self.host)
            .field("user_id", &self.user_id)
            .field("identity", &self.identity)
            .field("credential", &"<redacted>")
            .finish()
    }
}

impl Client {
    /// Register a fresh account: generate an identity, obtain a
    /// server-assigned user id, then run the login handshake.
    pub async fn register(server_url: &str) -> Result<Self, ClientError> {
        Self::register_identity(server_url, IdentityKeyPair::generate()).await
    }

    /// [`Client::register`] with a caller-supplied RNG for the identity key.
    pub async fn register_with<R>(server_url: &str, rng: &mut R) -> Result<Self, ClientError>
    where
        R: rand_core::RngCore + rand_core::CryptoRng,
    {
        Self::register_identity(server_url, IdentityKeyPair::generate_with(rng)).await
    }

    async fn register_identity(
        server_url: &str,
        identity: IdentityKeyPair,
    ) -> Result<Self, ClientError> {
        let host = normalize_server_url(server_url)?;
        let api = Api::new(&format!("http{host}"))?;

        let registered: RegisterResponse = api
            .request(
                Method::PUT,
                "/register",
                Some(&RegisterRequest {
                    public_key: identity.public_hex(),
                }),
            )
            .await?;
        debug!(user_id = %registered.user_id, "registered new account");

        Self::finish_login(api, host, registered.user_id, identity).await
    }

    /// Log in with an existing identity, running the full handshake.
    pub async fn login(
        server_url: &str,
        user_id: &str,
        private_key_hex: &str,
    ) -> Result<Self, ClientError> {
        let host = normalize_server_url(server_url)?;
        let api = Api::new(&format!("http{host}"))?;
        let identity = IdentityKeyPair::from_hex(private_key_hex)?;
        Self::finish_login(api, host, user_id.to_string(), identity).await
    }

    /// Resume with a previously issued access token. No network calls and no
    /// freshness check; a stale token surfaces as
    /// [`ClientError::RequestRejected`] on the next authenticated call.
    pub fn with_token(
        server_url: &str,
        user_id: &str,
        private_key_hex: &str,
        access_token: &str,
    ) -> Result<Self, ClientError> {
        let host = normalize_server_url(server_url)?;
        let mut api = Api::new(&format!("http{host}"))?;
        let identity = IdentityKeyPair::from_hex(private_key_hex)?;
        api.set_access_token(access_token.to_string());
        Ok(Self {
            api,
            host,
            user_id: user_id.to_string(),
            identity,
            credential: SessionCredential {
                access_token: access_token.to_string(),
                valid_until: None,
            },
        })
    }

    /// Drives the handshake machine through its two wire steps.
    async fn finish_login(
        mut api: Api,
        host: String,
        user_id: String,
        identity: IdentityKeyPair,
    ) -> Result<Self, ClientError> {
        let state = handshake::begin(&user_id, &identity);

        let server_key: PublicKeyResponse = api
            .request(Method::GET, "/publicKey", None::<&()>)
            .await?;
        let (login, state) = state.on_server_key(&server_key.public_key)?;

        let response: LoginResponse = api.request(Method::POST, "/login", Some(&login)).await?;
        let credential = state.on_login_response(response);
        api.set_access_token(credential.access_token.clone());
        debug!(user_id = %user_id, "session established");

        Ok(Self {
            api,
            host,
            user_id,
            identity,
            credential,
        })
    }

    /// Sender ids with a count of unseen messages from each.
    pub async fn new_messages(&self) -> Result<NewMessageSummary, ClientError> {
        self.api.request(Method::GET, "/new", None::<&()>).await
    }

    /// Fetch the envelopes the relay currently holds from `from_user`.
    pub async fn fetch_messages(&self, from_user: &str) -> Result<Vec<Envelope>, ClientError> {
        self.api
            .request(Method::GET, &format!("/fetch/{from_user}"), None::<&()>)
            .await
    }

    /// Fetch from `from_user` and decrypt in one step.
    ///
    /// Results are per-envelope: one envelope that fails to open never
    /// discards the rest of the batch.
    pub async fn fetch_and_decrypt(
        &self,
        from_user: &str,
        their_public_hex: &str,
    ) -> Result<Vec<Result<Message, CodecError>>, ClientError> {
        let their_public = agree::public_key_from_hex(their_public_hex)?;
        let key = agree::message_key(&self.identity, &their_public)?;
        let envelopes = self.fetch_messages(from_user).await?;

        Ok(envelopes
            .iter()
            .map(|envelope| {
                codec::open(envelope, &key).map_err(|e| {
                    warn!(from_user, "failed to open envelope: {e}");
                    e
                })
            })
            .collect())
    }

    /// Hand a pre-sealed envelope to the relay.
    ///
    /// The sender claim is checked locally first: an envelope claiming a
    /// different `fromUser` is rejected before any network traffic.
    pub async fn send_envelope(&self, envelope: &Envelope) -> Result<(), ClientError> {
        if envelope.from_user != self.user_id {
            return Err(ClientError::InvalidMessage);
        }
        self.api
            .request_empty(Method::PUT, "/send", Some(envelope))
            .await
    }

    /// Seal `message` for `to_user` and send it.
    pub async fn send_message(
        &self,
        to_user: &str,
        their_public_hex: &str,
        message: &Message,
    ) -> Result<(), ClientError> {
        let their_public = agree::public_key_from_hex(their_public_hex)?;
        let key = agree::message_key(&self.identity, &their_public)?;
        let envelope = codec::seal(message, &self.user_id, to_user, &key)?;
        self.send_envelope(&envelope).await
    }

    /// Open the push notification channel for this session.
    pub async fn notifications(&self) -> Result<NotifyChannel, ClientError> {
        let url = format!("ws{}/newWS", self.host);
        NotifyChannel::connect(&url, &self.credential.access_token).await
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Hex public key, as shared with peers who want to message this user.
    pub fn public_key_hex(&self) -> String {
        self.identity.public_hex()
    }

    /// Hex secret key, for caller-side persistence.
    pub fn private_key_hex(&self) -> String {
        self.identity.secret_hex()
    }

    pub fn credential(&self) -> &SessionCredential {
        &self.credential
    }
}

/// Normalize the caller-supplied server address to its "://host" remainder
/// so the plain and channel protocol variants can be composed from the same
/// value. An `https` address keeps its `s`, mapping to `wss` for the channel.
fn normalize_server_url(raw: &str) -> Result<String, ClientError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ClientError::InvalidUrl("empty server address".into()));
    }
    match trimmed.strip_prefix("http") {
        Some(rest) => Ok(rest.to_string()),
        None => Ok(format!("://{trimmed}")),
    }
}
