//! # marquee-server
//!
//! HTTP API behind the Marquee storefront.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Marquee Server                                 │
//! │                                                                         │
//! │  storefront ───► axum (3001) ───► routes ───► marquee-db (SQLite)       │
//! │                                     │                                   │
//! │                                     ├──► receipts dir                   │
//! │                                     │                                   │
//! │                                     └──► Dispatcher ──► mail relay      │
//! │                                                    └──► WhatsApp API    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod notify;
pub mod receipts;
pub mod routes;
pub mod state;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ErrorCode};
pub use routes::router;
pub use state::AppState;

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins; otherwise `info,marquee=debug,sqlx=warn`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,marquee=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

/// Serves the API on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "Marquee server listening");
    }

    let app = router(state);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
}
