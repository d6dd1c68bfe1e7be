//! Web server using Axum.
//!
//! Hosts the WebSocket endpoint the relay engine lives behind, plus the
//! static greeting route.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};

use crate::config::Settings;
use crate::core::engine::{self, EngineHandle};
use crate::error::{Error, Result};

use super::ws;

/// Shared state handed to every connection handler.
#[derive(Clone)]
pub struct AppState {
    pub engine: EngineHandle,
    pub settings: Arc<Settings>,
}

/// Create the app router.
pub fn create_app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(greeting))
        .route("/ws", get(ws::chat_ws))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

/// Static greeting route.
async fn greeting() -> &'static str {
    "Hello world!"
}

/// Run the relay server until the process is stopped.
pub async fn run_server(settings: Settings) -> Result<()> {
    let engine = engine::spawn(settings.validation);
    let state = AppState {
        engine,
        settings: Arc::new(settings.clone()),
    };

    let app = create_app_router(state);

    let addr: SocketAddr = settings
        .bind_addr()
        .parse()
        .map_err(|e| Error::Config(format!("Invalid address: {}", e)))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        "App listening on {} (validation: {})",
        addr,
        settings.validation
    );

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::Web(e.to_string()))?;

    Ok(())
}
