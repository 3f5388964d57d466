//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::sample::SampleData;
use crate::services::{
    EmailService, PaymentClient, PaymentError, PostalCodeClient, PostalCodeLookupError,
};

/// Error creating the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("payment client: {0}")]
    Payment(#[from] PaymentError),
    #[error("postal code client: {0}")]
    PostalCode(#[from] PostalCodeLookupError),
    #[error("email transport: {0}")]
    Email(#[from] lettre::transport::smtp::Error),
    #[error("sample catalogue: {0}")]
    Sample(#[from] serde_yaml::Error),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    sample: SampleData,
    payments: PaymentClient,
    postal_codes: PostalCodeClient,
    email: Option<EmailService>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - `PostgreSQL` connection pool (may still be disconnected)
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client, the SMTP transport or the
    /// built-in sample catalogue cannot be set up.
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Result<Self, StateError> {
        let payments = PaymentClient::new(&config.payment)?;
        let postal_codes = PostalCodeClient::new(&config.postal_code_api_url)?;
        let email = config.email.as_ref().map(EmailService::new).transpose()?;
        if email.is_none() {
            tracing::warn!("SMTP not configured; transactional email disabled");
        }
        let sample = SampleData::builtin()?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                sample,
                payments,
                postal_codes,
                email,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Catalogue served while the database is unreachable.
    #[must_use]
    pub fn sample(&self) -> &SampleData {
        &self.inner.sample
    }

    /// Get a reference to the payment provider client.
    #[must_use]
    pub fn payments(&self) -> &PaymentClient {
        &self.inner.payments
    }

    /// Get a reference to the postal-code lookup client.
    #[must_use]
    pub fn postal_codes(&self) -> &PostalCodeClient {
        &self.inner.postal_codes
    }

    /// The email service, when SMTP is configured.
    #[must_use]
    pub fn email(&self) -> Option<&EmailService> {
        self.inner.email.as_ref()
    }
}
