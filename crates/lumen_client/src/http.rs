//! Thin JSON-over-HTTP plumbing shared by every endpoint call.
//!
//! Status handling: non-2xx responses must carry an `{"error": ...}` body,
//! surfaced as [`ClientError::RequestRejected`] with the original status
//! code; a non-2xx response without that body, or a 2xx body that does not
//! parse, is [`ClientError::UnknownResponse`].

use reqwest::{header::AUTHORIZATION, Method, Url};
use serde::{de::DeserializeOwned, Serialize};

use lumen_proto::api::ErrorResponse;

use crate::error::ClientError;

/// Requester bound to one relay server, optionally carrying a bearer token.
#[derive(Clone)]
pub(crate) struct Api {
    http: reqwest::Client,
    base_url: Url,
    access_token: Option<String>,
}

impl Api {
    pub(crate) fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url =
            Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        let http = reqwest::Client::builder()
            .user_agent(concat!("lumen-client/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url,
            access_token: None,
        })
    }

    /// Written once, after handshake completion; read-only afterwards.
    pub(crate) fn set_access_token(&mut self, token: String) {
        self.access_token = Some(token);
    }

    pub(crate) async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let bytes = self.send(method, path, body).await?;
        serde_json::from_slice(&bytes).map_err(|_| ClientError::UnknownResponse)
    }

    /// Same exchange as [`Api::request`] for endpoints with an empty success body.
    pub(crate) async fn request_empty<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<(), ClientError>
    where
        B: Serialize,
    {
        self.send(method, path, body).await.map(|_| ())
    }

    async fn send<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Vec<u8>, ClientError>
    where
        B: Serialize,
    {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| ClientError::InvalidUrl(e.to_string()))?;

        let mut req = self.http.request(method, url);
        if let Some(token) = &self.access_token {
            req = req.header(AUTHORIZATION, token.as_str());
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let res = req.send().await?;
        let status = res.status();
        let bytes = res.bytes().await?;

        if !status.is_success() {
            let parsed: ErrorResponse =
                serde_json::from_slice(&bytes).map_err(|_| ClientError::UnknownResponse)?;
            return Err(ClientError::RequestRejected {
                status: status.as_u16(),
                message: parsed.error,
            });
        }
        Ok(bytes.to_vec())
    }
}
