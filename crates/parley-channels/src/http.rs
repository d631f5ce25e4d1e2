//! HTTP chat channel.
//!
//! Routes:
//! - `POST /chat` with `{"message": "..."}`: publish user text to the bus
//! - `GET /chat`: drain queued assistant messages as a JSON array
//! - `GET /app`: a minimal browser chat page that polls `GET /chat`

use std::sync::{Arc, Mutex};

use anyhow::Context;
use async_trait::async_trait;
use axum::{
    extract::State,
    http::StatusCode,
    response::Html,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tokio::sync::{mpsc, Notify};
use tracing::{debug, info, warn};

use parley_core::bus::{InboundMessage, OutboundMessage};
use parley_core::config::schema::GatewayConfig;

use crate::base::Channel;

/// Channel name used on the bus.
pub const HTTP_CHANNEL: &str = "http";

const CHAT_PAGE: &str = include_str!("../assets/chat.html");

#[derive(Debug, Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Clone)]
struct HttpState {
    inbound: mpsc::Sender<InboundMessage>,
    /// Assistant messages waiting for the next `GET /chat`.
    outbox: Arc<Mutex<Vec<String>>>,
}

// ─────────────────────────────────────────────
// HttpChannel
// ─────────────────────────────────────────────

pub struct HttpChannel {
    addr: String,
    state: HttpState,
    shutdown: Arc<Notify>,
}

impl HttpChannel {
    pub fn new(config: &GatewayConfig, inbound: mpsc::Sender<InboundMessage>) -> Self {
        Self {
            addr: format!("{}:{}", config.host, config.port),
            state: HttpState {
                inbound,
                outbox: Arc::new(Mutex::new(Vec::new())),
            },
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Listen address, `host:port`.
    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/chat", get(get_chat).post(post_chat))
            .route("/app", get(app_page))
            .with_state(self.state.clone())
    }
}

fn lock_outbox(outbox: &Mutex<Vec<String>>) -> std::sync::MutexGuard<'_, Vec<String>> {
    outbox.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl Channel for HttpChannel {
    fn name(&self) -> &str {
        HTTP_CHANNEL
    }

    async fn start(&self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.addr)
            .await
            .with_context(|| format!("failed to bind {}", self.addr))?;

        info!(addr = %self.addr, "chat server listening");

        let shutdown = self.shutdown.clone();
        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move { shutdown.notified().await })
            .await
            .context("chat server failed")?;

        info!("chat server stopped");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        self.shutdown.notify_one();
        Ok(())
    }

    async fn send(&self, msg: &OutboundMessage) -> anyhow::Result<()> {
        lock_outbox(&self.state.outbox).push(msg.content.clone());
        Ok(())
    }
}

// ─────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────

async fn post_chat(State(state): State<HttpState>, Json(body): Json<ChatRequest>) -> StatusCode {
    let message = match body.message {
        Some(m) if !m.trim().is_empty() => m,
        _ => return StatusCode::BAD_REQUEST,
    };

    debug!(len = message.len(), "chat message received");

    match state.inbound.send(InboundMessage::new(HTTP_CHANNEL, message)).await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            warn!(error = %e, "inbound bus closed, dropping chat message");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

async fn get_chat(State(state): State<HttpState>) -> Json<Vec<String>> {
    Json(std::mem::take(&mut *lock_outbox(&state.outbox)))
}

async fn app_page() -> Html<&'static str> {
    Html(CHAT_PAGE)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
