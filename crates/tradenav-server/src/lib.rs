//! TradeNavigator classifier service
//!
//! HTTP front end for the HS code classification cascade, used by the
//! landed-cost forms to suggest and check tariff codes.

pub mod config;
pub mod routes;
pub mod state;

pub use config::{ConfigOverrides, ServiceConfig};
pub use routes::{create_router, AppError};
pub use state::AppState;

use std::future::Future;
use std::net::SocketAddr;
use tracing::info;

/// Serve the API on `addr` until `shutdown` resolves
pub async fn serve(
    state: AppState,
    addr: SocketAddr,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Classifier service listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
