//! Portfolio HTTP front end.
//!
//! Binds the HTTP server that the portfolio page talks to:
//!
//! | Route | Handler |
//! |-------|---------|
//! | `GET /` | Static entry document (the single-page site) |
//! | `POST /api/contact` | [`routes::submit_contact`] → [`intake::ContactIntake::submit`] |
//!
//! It also owns the background task that sweeps expired entries out of the
//! shared rate-limit table.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Transport details, client identification and HTTP
//! status mapping all live here. The [`intake`] crate sees only a
//! [`intake::ClientKey`] and a raw JSON payload.

use std::{future::Future, net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

use axum::{
    routing::{get_service, post},
    Router,
};
use intake::{ContactIntake, FixedWindowLimiter};
use thiserror::Error;
use tokio::{net::TcpListener, task::JoinHandle, time::MissedTickBehavior};
use tower_http::{catch_panic::CatchPanicLayer, services::ServeFile, trace::TraceLayer};
use tracing::{info, trace};

pub mod client;
pub mod response;
pub mod routes;

pub use response::ApiError;

/// Path of the contact endpoint.
pub const CONTACT_PATH: &str = "/api/contact";

/// HTTP-level settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerConfig {
    /// File served on `GET /`.
    pub entry_document: PathBuf,
    /// Whether `X-Forwarded-For` identifies the client (only behind a trusted proxy).
    pub trust_forwarded_for: bool,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            entry_document: PathBuf::from("main.html"),
            trust_forwarded_for: false,
        }
    }
}

/// State shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub intake: Arc<ContactIntake>,
    pub trust_forwarded_for: bool,
}

/// Errors raised while running the server.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Builds the application router.
pub fn router(intake: Arc<ContactIntake>, config: &ListenerConfig) -> Router {
    let state = AppState {
        intake,
        trust_forwarded_for: config.trust_forwarded_for,
    };

    Router::new()
        .route("/", get_service(ServeFile::new(&config.entry_document)))
        .route(CONTACT_PATH, post(routes::submit_contact))
        .layer(CatchPanicLayer::custom(response::panic_response))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds a TCP listener on `addr`.
pub async fn bind(addr: SocketAddr) -> Result<TcpListener, ListenerError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| ListenerError::Bind { addr, source })
}

/// Serves `app` on `listener` until `shutdown` resolves.
///
/// Peer addresses are attached to every request so the contact handler can
/// derive the client key.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<(), ListenerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "listening");
    }

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
    .map_err(ListenerError::Serve)
}

/// Spawns a task that calls [`FixedWindowLimiter::sweep_expired`] every
/// `every`. Abort the returned handle to stop it.
pub fn spawn_sweeper(limiter: Arc<FixedWindowLimiter>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; nothing can have expired yet.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let removed = limiter.sweep_expired();
            trace!(removed, remaining = limiter.len(), "rate-limit sweep finished");
        }
    })
}
