//! In-process mock relay implementing the wire surface the client speaks:
//! register/publicKey/login/new/fetch/send plus the /newWS push channel.
//!
//! Login proofs are validated the way the real relay does it: the server
//! runs the same HKDF derivation with its own secret and the client's
//! registered public key.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::sync::broadcast;

use lumen_crypto::{agree, identity::IdentityKeyPair};

pub struct RelayState {
    server_identity: IdentityKeyPair,
    /// user id -> registered public key (hex)
    users: Mutex<HashMap<String, String>>,
    /// access token -> user id
    tokens: Mutex<HashMap<String, String>>,
    /// (recipient, sender) -> stored envelopes
    mailboxes: Mutex<HashMap<(String, String), Vec<Value>>>,
    next_user: AtomicUsize,
    /// Every HTTP request, any endpoint.
    pub request_count: AtomicUsize,
    /// /publicKey and /login hits only.
    pub handshake_count: AtomicUsize,
    /// Token received as the first /newWS frame, once authenticated.
    ws_token: Mutex<Option<String>>,
    push_tx: broadcast::Sender<String>,
}

pub struct MockRelay {
    pub addr: SocketAddr,
    pub state: Arc<RelayState>,
}

impl MockRelay {
    pub async fn spawn() -> Self {
        let (push_tx, _) = broadcast::channel(16);
        let state = Arc::new(RelayState {
            server_identity: IdentityKeyPair::generate(),
            users: Mutex::new(HashMap::new()),
            tokens: Mutex::new(HashMap::new()),
            mailboxes: Mutex::new(HashMap::new()),
            next_user: AtomicUsize::new(0),
            request_count: AtomicUsize::new(0),
            handshake_count: AtomicUsize::new(0),
            ws_token: Mutex::new(None),
            push_tx,
        });

        let app = Router::new()
            .route("/register", put(register))
            .route("/publicKey", get(public_key))
            .route("/login", post(login))
            .route("/new", get(new_messages))
            .route("/fetch/:from_user", get(fetch))
            .route("/send", put(send))
            .route("/newWS", get(new_ws))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn request_count(&self) -> usize {
        self.state.request_count.load(Ordering::SeqCst)
    }

    pub fn handshake_count(&self) -> usize {
        self.state.handshake_count.load(Ordering::SeqCst)
    }

    /// Push a raw frame to every open notification channel.
    pub fn push(&self, frame: &str) {
        let _ = self.state.push_tx.send(frame.to_string());
    }

    /// Drop an envelope straight into a mailbox, bypassing /send.
    pub fn inject_envelope(&self, to_user: &str, from_user: &str, envelope: Value) {
        self.state
            .mailboxes
            .lock()
            .unwrap()
            .entry((to_user.to_string(), from_user.to_string()))
            .or_default()
            .push(envelope);
    }

    pub fn ws_token(&self) -> Option<String> {
        self.state.ws_token.lock().unwrap().clone()
    }

    /// Wait until a /newWS client has presented a valid token frame.
    pub async fn wait_ws_authenticated(&self) {
        for _ in 0..200 {
            if self.ws_token().is_some() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("notification channel never authenticated");
    }
}

fn authed_user(state: &RelayState, headers: &HeaderMap) -> Option<String> {
    let token = headers.get(AUTHORIZATION)?.to_str().ok()?;
    state.tokens.lock().unwrap().get(token).cloned()
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "unauthorized" })),
    )
        .into_response()
}

async fn register(
    State(state): State<Arc<RelayState>>,
    Json(body): Json<Value>,
) -> Response {
    state.request_count.fetch_add(1, Ordering::SeqCst);
    let Some(public_key) = body["publicKey"].as_str() else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "missing publicKey" })),
        )
            .into_response();
    };
    let n = state.next_user.fetch_add(1, Ordering::SeqCst);
    let user_id = format!("user-{n}");
    state
        .users
        .lock()
        .unwrap()
        .insert(user_id.clone(), public_key.to_string());
    Json(json!({ "userId": user_id })).into_response()
}

async fn public_key(State(state): State<Arc<RelayState>>) -> Response {
    state.request_count.fetch_add(1, Ordering::SeqCst);
    state.handshake_count.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "publicKey": state.server_identity.public_hex() })).into_response()
}

async fn login(State(state): State<Arc<RelayState>>, Json(body): Json<Value>) -> Response {
    state.request_count.fetch_add(1, Ordering::SeqCst);
    state.handshake_count.fetch_add(1, Ordering::SeqCst);

    let user_id = body["userId"].as_str().unwrap_or_default().to_string();
    let proof = body["sharedSecret"].as_str().unwrap_or_default();

    let public_hex = match state.users.lock().unwrap().get(&user_id) {
        Some(key) => key.clone(),
        None => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "unknown user" })),
            )
                .into_response();
        }
    };
    let client_public = agree::public_key_from_hex(&public_hex).unwrap();
    let expected = agree::login_proof(&state.server_identity, &client_public).unwrap();
    if proof != expected {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "invalid login proof" })),
        )
            .into_response();
    }

    let token = format!("token-{user_id}");
    state
        .tokens
        .lock()
        .unwrap()
        .insert(token.clone(), user_id);
    Json(json!({ "accessToken": token, "validUntil": 4_102_444_800_i64 })).into_response()
}

async fn new_messages(State(state): State<Arc<RelayState>>, headers: HeaderMap) -> Response {
    state.request_count.fetch_add(1, Ordering::SeqCst);
    let Some(user) = authed_user(&state, &headers) else {
        return unauthorized();
    };

    let mailboxes = state.mailboxes.lock().unwrap();
    let mut summary: HashMap<String, u64> = HashMap::new();
    for ((to, from), envelopes) in mailboxes.iter() {
        if *to == user && !envelopes.is_empty() {
            summary.insert(from.clone(), envelopes.len() as u64);
        }
    }
    Json(summary).into_response()
}

async fn fetch(
    State(state): State<Arc<RelayState>>,
    headers: HeaderMap,
    Path(from_user): Path<String>,
) -> Response {
    state.request_count.fetch_add(1, Ordering::SeqCst);
    let Some(user) = authed_user(&state, &headers) else {
        return unauthorized();
    };

    let envelopes = state
        .mailboxes
        .lock()
        .unwrap()
        .get(&(user, from_user))
        .cloned()
        .unwrap_or_default();
    Json(envelopes).into_response()
}

async fn send(
    State(state): State<Arc<RelayState>>,
    headers: HeaderMap,
    Json(envelope): Json<Value>,
) -> Response {
    state.request_count.fetch_add(1, Ordering::SeqCst);
    let Some(user) = authed_user(&state, &headers) else {
        return unauthorized();
    };

    let from = envelope["fromUser"].as_str().unwrap_or_default().to_string();
    let to = envelope["toUser"].as_str().unwrap_or_default().to_string();
    if from != user {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "sender mismatch" })),
        )
            .into_response();
    }

    state
        .mailboxes
        .lock()
        .unwrap()
        .entry((to, from))
        .or_default()
        .push(envelope);
    StatusCode::OK.into_response()
}

async fn new_ws(State(state): State<Arc<RelayState>>, ws: WebSocketUpgrade) -> Response {
    state.request_count.fetch_add(1, Ordering::SeqCst);
    ws.on_upgrade(move |socket| handle_ws(state, socket))
}

async fn handle_ws(state: Arc<RelayState>, mut socket: WebSocket) {
    // The first frame must be the access token; no ack is sent.
    let Some(Ok(WsMessage::Text(first))) = socket.recv().await else {
        return;
    };
    let Ok(frame) = serde_json::from_str::<Value>(&first) else {
        return;
    };
    let token = frame["accessToken"].as_str().unwrap_or_default().to_string();
    if !state.tokens.lock().unwrap().contains_key(&token) {
        return;
    }
    // Subscribe before signalling authentication so a push fired right
    // after wait_ws_authenticated() cannot be lost.
    let mut rx = state.push_tx.subscribe();
    *state.ws_token.lock().unwrap() = Some(token);
    while let Ok(frame) = rx.recv().await {
        if socket.send(WsMessage::Text(frame)).await.is_err() {
            break;
        }
    }
}
