//! Axum route handlers for the Slipway gateway API.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use slipway_core::{validate_request, ChainVariant, Credential, DeployRequest};
use slipway_executor::{CommandBackend, DeployPipeline, ExecutorError};

use crate::error::GatewayError;
use crate::limiter::{ClientIdentity, RateLimiter};

// ── Shared state ─────────────────────────────────────────────────────────────

/// Gateway state: the rate limiter map and the deployment pipeline.
///
/// Generic over the command backend so tests can drive the full HTTP stack
/// against a scripted toolchain.
#[derive(Debug)]
pub struct AppState<B: CommandBackend> {
    /// Sole cross-request synchronization point.
    pub limiter: RateLimiter,
    /// Request-scoped deployment pipeline.
    pub pipeline: DeployPipeline<B>,
}

type SharedState<B> = Arc<AppState<B>>;

// ── Response types ────────────────────────────────────────────────────────────

/// Success body for `POST /deploy/{variant}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    pub rate_limit_remaining: u32,
    pub rate_limit_reset_in: u64,
}

// ── Router ────────────────────────────────────────────────────────────────────

/// Build the application router with the given state.
pub fn create_router<B: CommandBackend + 'static>(state: SharedState<B>) -> Router {
    Router::new()
        .route("/deploy/{variant}", post(deploy::<B>))
        .route("/health", get(health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// `GET /health` — liveness probe.
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({"status": "ok"})))
}

/// `POST /deploy/{variant}` — validate, rate limit, and run one deployment.
///
/// Validation and rate limiting return immediately with no side effects;
/// everything after them is owned by the pipeline, which removes the
/// workspace on every path before the response is produced.
///
/// # Errors
/// Returns [`GatewayError::UnknownVariant`] for an unrecognized path
/// segment, [`GatewayError::Validation`] for a malformed request,
/// [`GatewayError::RateLimited`] when the client's window is exhausted, and
/// [`GatewayError::Executor`] when the pipeline fails.
pub async fn deploy<B: CommandBackend + 'static>(
    State(state): State<SharedState<B>>,
    Path(variant): Path<String>,
    client: ClientIdentity,
    Json(request): Json<DeployRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let variant =
        ChainVariant::parse(&variant).ok_or_else(|| GatewayError::UnknownVariant(variant))?;

    validate_request(&request)?;

    let decision = state.limiter.check(&client.0);
    if !decision.allowed {
        tracing::info!(client = %client.0, reset_in = decision.reset_in_seconds, "rate limited");
        return Err(GatewayError::RateLimited {
            reset_in_seconds: decision.reset_in_seconds,
        });
    }

    tracing::info!(
        %variant,
        client = %client.0,
        credential = %request.credential,
        code_len = request.code.len(),
        "deployment request accepted"
    );

    let outcome = state
        .pipeline
        .deploy(variant, &request)
        .await
        .map_err(|e| GatewayError::Executor(scrub_executor(e, &request.credential)))?;

    Ok((
        StatusCode::OK,
        Json(DeployResponse {
            message: format!("{} contract deployed successfully!", variant.display_name()),
            address: outcome.artifact.address,
            transaction_hash: outcome.artifact.transaction_hash,
            rate_limit_remaining: decision.remaining,
            rate_limit_reset_in: decision.reset_in_seconds,
        }),
    ))
}

/// Scrub the credential from captured toolchain output before it can reach
/// a response body.
fn scrub_executor(error: ExecutorError, credential: &Credential) -> ExecutorError {
    match error {
        ExecutorError::StepFailed { step, exit_code, stdout, stderr } => {
            ExecutorError::StepFailed {
                step,
                exit_code,
                stdout: credential.scrub(&stdout),
                stderr: credential.scrub(&stderr),
            }
        }
        other => other,
    }
}
