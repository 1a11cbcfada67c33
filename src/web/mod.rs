//! HTTP front end: one route that runs a fetch per GET request.

mod handlers;
mod router;

pub use handlers::{health_check, relay_feed, SharedFetcher};
pub use router::create_router;

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::feed::FeedFetcher;
use crate::transport::Transport;

/// Binds `addr` and serves the feed endpoint until Ctrl-C.
pub async fn serve<T>(addr: SocketAddr, path: &str, fetcher: FeedFetcher<T>) -> std::io::Result<()>
where
    T: Transport + 'static,
{
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, path = %path, "Feed relay listening");

    let app = create_router(path, Arc::new(fetcher));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
