//! LINE webhook endpoint - verifies and decodes callbacks into domain events

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, TimeZone, Utc};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::application::errors::BotError;
use crate::application::services::EventService;
use crate::domain::entities::InboundEvent;

pub const SIGNATURE_HEADER: &str = "x-line-signature";

#[derive(Clone)]
pub struct WebhookState {
    service: EventService,
    channel_secret: Arc<str>,
}

impl WebhookState {
    pub fn new(service: EventService, channel_secret: impl Into<Arc<str>>) -> Self {
        Self {
            service,
            channel_secret: channel_secret.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WebhookBody {
    #[serde(default)]
    events: Vec<LineEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LineEvent {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    timestamp: i64,
    source: Option<LineSource>,
    reply_token: Option<String>,
    message: Option<LineMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LineSource {
    user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LineMessage {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

impl LineEvent {
    /// Convert into a domain event; unsupported events yield `None`
    fn into_domain(self) -> Option<InboundEvent> {
        let user_id = self.source.and_then(|s| s.user_id)?;
        let timestamp: DateTime<Utc> = Utc
            .timestamp_millis_opt(self.timestamp)
            .single()
            .unwrap_or_else(Utc::now);

        let event = match self.event_type.as_str() {
            "follow" => InboundEvent::follow(user_id, self.reply_token?),
            "unfollow" => InboundEvent::unfollow(user_id),
            "message" => {
                let message = self.message?;
                if message.kind != "text" {
                    return None;
                }
                InboundEvent::text(user_id, self.reply_token?, message.text?)
            }
            _ => return None,
        };
        Some(event.with_timestamp(timestamp))
    }
}

/// Check `X-Line-Signature`: base64 HMAC-SHA256 of the raw body
pub fn verify_signature(channel_secret: &str, body: &[u8], signature: &str) -> bool {
    let Ok(expected) = STANDARD.decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(channel_secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

/// Decode a webhook body into the events this bot handles
pub fn parse_events(body: &[u8]) -> Result<Vec<InboundEvent>, serde_json::Error> {
    let payload: WebhookBody = serde_json::from_slice(body)?;
    let total = payload.events.len();
    let events: Vec<InboundEvent> = payload
        .events
        .into_iter()
        .filter_map(LineEvent::into_domain)
        .collect();

    if events.len() < total {
        tracing::debug!("Skipped {} unsupported event(s)", total - events.len());
    }
    Ok(events)
}

async fn callback(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let Some(signature) = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok()) else {
        tracing::warn!("[LINE] Missing signature header");
        return (StatusCode::BAD_REQUEST, "missing signature");
    };

    if !verify_signature(&state.channel_secret, &body, signature) {
        tracing::warn!("[LINE] Invalid signature, rejecting webhook");
        return (StatusCode::BAD_REQUEST, "invalid signature");
    }

    tracing::debug!("Request body: {}", String::from_utf8_lossy(&body));

    let events = match parse_events(&body) {
        Ok(events) => events,
        Err(e) => {
            tracing::error!("[LINE] Failed to parse webhook body: {}", e);
            return (StatusCode::BAD_REQUEST, "bad request");
        }
    };

    let summary = state.service.handle_all(events).await;
    if summary.dropped > 0 {
        tracing::warn!("[LINE] {} event(s) dropped", summary.dropped);
    }
    (StatusCode::OK, "OK")
}

pub fn router(state: WebhookState, webhook_path: &str) -> Router {
    Router::new()
        .route(webhook_path, post(callback))
        .route("/health", get(|| async { "OK" }))
        .with_state(state)
}

/// Serve the webhook until Ctrl-C
pub async fn start_server(addr: SocketAddr, app: Router) -> Result<(), BotError> {
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| BotError::Webhook(format!("failed to bind {}: {}", addr, e)))?;
    tracing::info!("Webhook server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutting down");
        })
        .await
        .map_err(|e| BotError::Webhook(e.to_string()))
}
