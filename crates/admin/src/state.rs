//! Application state shared across handlers.

use std::sync::Arc;

use secrecy::ExposeSecret;
use sqlx::PgPool;

use crate::config::AdminConfig;
use crate::middleware::auth::token_digest;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    token_digest: [u8; 32],
}

impl AppState {
    /// Create a new application state.
    ///
    /// Only the SHA-256 digest of the API token is kept for comparisons.
    #[must_use]
    pub fn new(config: AdminConfig, pool: PgPool) -> Self {
        let token_digest = token_digest(config.api_token.expose_secret());
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                token_digest,
            }),
        }
    }

    /// Get the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get the database pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// SHA-256 of the configured API token.
    #[must_use]
    pub fn token_digest(&self) -> &[u8; 32] {
        &self.inner.token_digest
    }
}
