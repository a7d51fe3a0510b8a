//! Error types and HTTP status mapping for the gateway crate.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::json;
use slipway_core::ValidationError;
use slipway_executor::ExecutorError;

/// Errors that can occur during gateway request handling.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// The request failed validation before touching disk or process.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The deployment path named an unsupported chain variant.
    #[error("unsupported variant '{0}'; expected 'evm' or 'move'")]
    UnknownVariant(String),

    /// The client exhausted its fixed-window request budget.
    #[error("rate limit exceeded; retry in {reset_in_seconds}s")]
    RateLimited { reset_in_seconds: u64 },

    /// An error propagated from the deployment pipeline.
    #[error("deployment failed: {0}")]
    Executor(#[from] ExecutorError),
}

impl GatewayError {
    fn status(&self) -> StatusCode {
        match self {
            GatewayError::Validation(_) | GatewayError::UnknownVariant(_) => StatusCode::BAD_REQUEST,
            GatewayError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::Executor(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        if let GatewayError::Executor(executor_error) = &self {
            if executor_error.is_sanitizer_trip() {
                // Possible attack signal, kept apart from ordinary failures.
                tracing::warn!(error = %executor_error, "command sanitizer tripped");
            }
        }

        let status = self.status();
        let timestamp = Utc::now().to_rfc3339();
        let body = match &self {
            GatewayError::Executor(ExecutorError::StepFailed { stdout, stderr, .. }) => json!({
                "error": self.to_string(),
                "stdout": stdout,
                "stderr": stderr,
                "timestamp": timestamp,
            }),
            _ => json!({
                "error": self.to_string(),
                "timestamp": timestamp,
            }),
        };
        (status, Json(body)).into_response()
    }
}
