use axum::extract::DefaultBodyLimit;
use axum::{routing::get, Router};
use std::sync::Arc;
use tracing::info;

mod auth;
mod config;
mod content_negotiation;
mod error;
mod results;
mod sparql;
mod state;

use crate::config::MAX_SPARQL_BODY_SIZE;
use crate::sparql::create_sparql_routes;
pub use auth::{TokenFileError, TokenRegistry, DEFAULT_REQUESTER};
pub use config::ServerConfig;
pub use error::MediatorServerError;
pub use state::AppState;

/// Creates the routes of the SPARQL endpoint.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/",
            get(|| async { "App is running, the SPARQL endpoint is at /query/ and /update/." }),
        )
        .merge(create_sparql_routes())
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_SPARQL_BODY_SIZE))
}

/// Serves the endpoint until the process receives Ctrl+C.
///
/// On shutdown, the knowledge bases of all requesters are removed from the knowledge network.
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let mediator = config.mediator;
    let app = create_router(AppState::new(Arc::clone(&mediator), config.tokens));

    let app = if config.cors {
        app.layer(tower_http::cors::CorsLayer::permissive())
    } else {
        app
    };

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    info!(
        "SPARQL endpoint '{}' listening on {}",
        config.endpoint_name,
        listener.local_addr()?
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down, removing knowledge bases from the knowledge network");
    mediator.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Could not listen for the shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
