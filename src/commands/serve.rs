use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use crate::config::ServerConfig;
use crate::review::ReviewService;
use crate::web::{self, AppState, PageRenderer};

/// Bind the configured address and serve the review form until the process
/// is stopped.
pub async fn serve(service: Arc<ReviewService>, config: ServerConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", config.host, config.port))?;

    let pages = PageRenderer::new().context("failed to load page template")?;
    let app = web::router(AppState::new(service, pages, config));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Starting server on {addr}");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
