//! HTTP surface for the intake form.

mod handlers;

pub use handlers::{router, AppState, SearchDuplicatesRequest};

use std::net::SocketAddr;

/// Bind and serve the lead-intake router until the process exits.
pub async fn run_server(state: AppState, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", addr);
    axum::serve(listener, router(state)).await
}
