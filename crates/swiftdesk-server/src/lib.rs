//! HTTP surface of the SwiftDesk backend.
//!
//! [`router`] wires the relays, notes and usage endpoints onto an axum
//! [`Router`](axum::Router); [`serve`] runs it until ctrl-c.

mod error;
mod routes;
mod state;

pub use error::{ChatFailure, ErrorReply};
pub use routes::router;
pub use state::AppState;

use log::{info, warn};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Serve the router on `listener` until ctrl-c.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    info!("swiftdesk server listening (addr={addr})");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("swiftdesk server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for ctrl-c: {err}");
        std::future::pending::<()>().await;
    }
}
