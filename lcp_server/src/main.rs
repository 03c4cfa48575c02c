//! HTTP surface of the LIVABLŌM calendar proxy.
//!
//! Thin plumbing over `lcp_core`: routing, CORS, error-to-status mapping
//! and tracing setup. The aggregation semantics all live in the core
//! crate.

mod route;
mod state;

use std::net::SocketAddr;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use lcp_core::{store::SqliteStore, Config};
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

const DEFAULT_PORT: u16 = 4000;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    let database_path = std::env::var("LCP_DATABASE_PATH")
        .unwrap_or_else(|_| String::from("reservations.sqlite3"));
    let store = SqliteStore::open(&database_path)?;
    let state = AppState::new(config, store)?;

    // The booking site and the consuming platforms call from other
    // origins; the feed is public, so CORS stays permissive.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(route::liveness))
        .route("/api/events/:property", get(route::events::handler))
        .route("/ical/:file", get(route::ical::handler))
        .route("/api/add-reservation", post(route::reservation::handler))
        .with_state(state)
        .layer(cors);

    let port = std::env::var("LCP_PORT")
        .ok()
        .and_then(|port| port.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "calendar proxy listening");
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}
