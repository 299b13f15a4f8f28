//! HTTP surface of the relay: `POST /api/ai`.
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use dragon_core::config::Config;
use dragon_core::relay::{RelayError, RelayResponse, RelayService};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::cli::ux::{ChatMessageType, style_chat_text};

#[derive(Clone)]
struct AppState {
    relay: Arc<RelayService>,
}

/// Maps relay failures onto the uniform `{ error }` body.
struct ApiError(RelayError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            RelayError::Validation(msg) => {
                info!(reason = *msg, "Rejected request");
                StatusCode::BAD_REQUEST
            }
            RelayError::Upstream(err) => {
                warn!(error = %err, "Upstream failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            RelayError::Internal(err) => {
                error!("Internal failure: {err:#}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(RelayResponse::from(self.0))).into_response()
    }
}

async fn ai_handler(State(state): State<AppState>, body: Bytes) -> Response {
    match state.relay.handle(&body).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => ApiError(err).into_response(),
    }
}

pub fn router(relay: RelayService) -> Router {
    Router::new()
        .route("/api/ai", post(ai_handler))
        .with_state(AppState {
            relay: Arc::new(relay),
        })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
    }
}

/// Runs the relay server until Ctrl-C.
pub async fn execute(bind: Option<String>, config: &Config) -> Result<()> {
    let relay_config = config
        .relay
        .resolve()
        .context("Invalid relay configuration")?;
    info!(config = ?relay_config, "Starting relay");
    let relay = RelayService::new(relay_config);

    let bind = bind.unwrap_or_else(|| config.server.bind.clone());
    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    let addr = listener.local_addr()?;
    info!(%addr, "Relay listening");
    eprintln!(
        "{}",
        style_chat_text(
            &format!("Dragon AI relay listening on http://{addr}/api/ai"),
            ChatMessageType::Footer
        )
    );

    axum::serve(listener, router(relay))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Relay server failed")?;
    Ok(())
}
