//! Minimal HTTP endpoint for platform health checks.
//!
//! Served on port 8000 by default and started before the gateway is
//! verified, so liveness probes pass even while the gateway is down.

use crate::utils::error::Result;
use axum::{routing::get, Router};
use tokio::net::TcpListener;

pub fn router() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
}

async fn root() -> &'static str {
    "Service is Running"
}

async fn health() -> &'static str {
    "OK"
}

pub async fn serve(bind: &str) -> Result<()> {
    let listener = TcpListener::bind(bind).await?;
    tracing::info!("🌐 Health endpoint listening on {}", bind);
    axum::serve(listener, router()).await?;
    Ok(())
}

/// Run the health server as a background task for the lifetime of the
/// process. Failures are logged, not propagated; the forwarder keeps
/// running without its health endpoint.
pub fn spawn(bind: String) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = serve(&bind).await {
            tracing::error!("❌ Health server failed: {}", e);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_routes_respond() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router()).await.unwrap();
        });

        let body = reqwest::get(format!("http://{}/", addr))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "Service is Running");

        let response = reqwest::get(format!("http://{}/health", addr)).await.unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(response.text().await.unwrap(), "OK");
    }
}
