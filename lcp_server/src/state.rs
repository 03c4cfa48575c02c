use std::sync::Arc;

use anyhow::Result;
use lcp_core::{feed, store::SqliteStore, Config};

/// Shared application state: the fixed property configuration, the
/// reservation store and the HTTP client for feed fetches, all shared
/// process-wide across requests.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<SqliteStore>,
    pub client: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config, store: SqliteStore) -> Result<Self> {
        Ok(Self {
            config: Arc::new(config),
            store: Arc::new(store),
            client: feed::feed_client()?,
        })
    }
}
