//! Entry point for the `slipway-gateway` HTTP server.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use slipway_executor::{DeployPipeline, ProcessBackend};
use slipway_gateway::limiter::{RateLimiter, RateLimiterConfig};
use slipway_gateway::routes::{create_router, AppState};
use tracing::info;

const DEFAULT_RPC_URL: &str = "https://devnet.uminetwork.com";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let addr = std::env::var("SLIPWAY_LISTEN_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:4000".to_owned());
    let rpc_url = std::env::var("SLIPWAY_RPC_URL")
        .unwrap_or_else(|_| DEFAULT_RPC_URL.to_owned());
    let workspace_root = std::env::var("SLIPWAY_WORKSPACE_ROOT")
        .map_or_else(|_| std::env::temp_dir(), PathBuf::from);

    let state = Arc::new(AppState {
        limiter: RateLimiter::new(RateLimiterConfig::default()),
        pipeline: DeployPipeline::new(ProcessBackend, workspace_root, rpc_url),
    });
    let app = create_router(state).into_make_service_with_connect_info::<SocketAddr>();

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(addr = %addr, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };

    info!(addr = %addr, "slipway-gateway listening");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server error");
        std::process::exit(1);
    }
}
