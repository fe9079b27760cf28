//! HTTP API gateway for CoinClaw.
//!
//! Exposes the chat endpoint, a health check, a read-only view of the fact
//! store, and the embedded web frontend.
//!
//! Built on Axum. Sessions live in a bounded in-process cache and are lost on
//! restart.

pub mod frontend;

use axum::extract::DefaultBodyLimit;
use axum::extract::rejection::JsonRejection;
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use moka::policy::EvictionPolicy;
use moka::sync::Cache;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use coinclaw_agent::{ConversationMemory, QueryOrchestrator};
use coinclaw_config::AppConfig;
use coinclaw_core::answer::Provenance;
use coinclaw_core::error::Rejection;

/// Request bodies above this size are refused.
pub const BODY_LIMIT_BYTES: usize = 64 * 1024;

/// Conversations kept when the config does not say otherwise.
pub const DEFAULT_MAX_SESSIONS: u64 = 1000;

/// Idle time after which a conversation is forgotten.
pub const DEFAULT_SESSION_IDLE: Duration = Duration::from_secs(30 * 60);

/// Shared application state for the gateway.
pub struct GatewayState {
    pub orchestrator: Arc<QueryOrchestrator>,

    /// Conversation memory per session id. Bounded by count (least recently
    /// used goes first) and by idle time.
    pub sessions: Cache<String, ConversationMemory>,

    /// Held for the whole request, so queries are answered one at a time.
    turn: Mutex<()>,
}

impl GatewayState {
    pub fn new(orchestrator: Arc<QueryOrchestrator>) -> Self {
        Self::with_session_limits(orchestrator, DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_IDLE)
    }

    pub fn with_session_limits(
        orchestrator: Arc<QueryOrchestrator>,
        max_sessions: u64,
        idle: Duration,
    ) -> Self {
        let sessions = Cache::builder()
            .max_capacity(max_sessions)
            .time_to_idle(idle)
            .eviction_policy(EvictionPolicy::lru())
            .build();

        Self {
            orchestrator,
            sessions,
            turn: Mutex::new(()),
        }
    }

    /// Build state with the session limits from `[gateway]`.
    pub fn from_config(config: &AppConfig, orchestrator: Arc<QueryOrchestrator>) -> Self {
        Self::with_session_limits(
            orchestrator,
            config.gateway.max_sessions,
            Duration::from_secs(config.gateway.session_idle_secs),
        )
    }
}

type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
///
/// Layers applied:
/// - Request body size limit (64 KiB)
/// - HTTP trace logging
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/chat", post(chat_handler))
        .route("/v1/coins", get(coins_handler))
        .with_state(state)
        .merge(frontend::frontend_router())
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Start the gateway HTTP server.
pub async fn start(
    config: &AppConfig,
    orchestrator: Arc<QueryOrchestrator>,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let app = build_router(Arc::new(GatewayState::from_config(config, orchestrator)));

    info!(
        addr = %addr,
        max_sessions = config.gateway.max_sessions,
        "Gateway starting"
    );
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    session_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    answer: String,
    /// Human-readable provenance label
    source: String,
    provenance: Provenance,
    confidence: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    rejection: Option<Rejection>,
    session_id: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

async fn chat_handler(
    State(state): State<SharedState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!(error = %rejection.body_text(), "Unreadable chat request");
            return error_response(StatusCode::BAD_REQUEST, "No query provided");
        }
    };

    let Some(query) = request
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
    else {
        return error_response(StatusCode::BAD_REQUEST, "No query provided");
    };

    let session_id = request
        .session_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let turn = state.turn.lock().await;
    let mut session = state
        .sessions
        .get(&session_id)
        .unwrap_or_else(|| state.orchestrator.new_session());

    let answer = state.orchestrator.handle(&mut session, query).await;
    state.sessions.insert(session_id.clone(), session);
    drop(turn);

    info!(
        session = %session_id,
        provenance = ?answer.provenance,
        rejected = answer.is_rejected(),
        "Chat query answered"
    );

    Json(ChatResponse {
        source: answer.provenance.label().to_string(),
        answer: answer.text,
        provenance: answer.provenance,
        confidence: answer.confidence,
        rejection: answer.rejection,
        session_id,
    })
    .into_response()
}

async fn coins_handler(State(state): State<SharedState>) -> Response {
    match state.orchestrator.store().list().await {
        Ok(records) => Json(records).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to list coin records");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
