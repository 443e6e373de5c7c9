//! Shared application state for the web server.

use sqlx::PgPool;

use crate::config::{config, ListingConfig};

/// Shared state injected into every Axum handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn listing(&self) -> &'static ListingConfig {
        &config().listing
    }
}
