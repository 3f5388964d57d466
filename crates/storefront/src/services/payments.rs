//! Hosted checkout provider client.
//!
//! Creates a checkout preference from a [`PaymentPreference`] and returns the
//! provider's redirect URL. The provider sends the customer back to
//! `/api/checkout/retorno` (or `/api/checkout/falha`) with
//! `external_reference`, `payment_id` and `status` query parameters. Those
//! come from the browser, so an approval is only trusted after
//! [`PaymentClient::verify`] has read the payment back from the provider.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use artesania_core::PaymentOutcome;
use artesania_core::checkout::PaymentPreference;

use crate::config::PaymentConfig;

/// Errors that can occur when talking to the payment provider.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to build the client or parse a response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// A created checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Provider preference id.
    pub id: String,
    /// URL the customer is redirected to.
    pub init_point: String,
    /// Sandbox redirect URL, when the token is a test token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sandbox_init_point: Option<String>,
}

/// A payment as the provider records it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProviderPayment {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub external_reference: Option<String>,
}

impl ProviderPayment {
    /// What this payment proves for the checkout `reference`. A payment that
    /// belongs to another checkout proves nothing and counts as pending.
    #[must_use]
    pub fn outcome_for(&self, reference: &str) -> PaymentOutcome {
        if self.external_reference.as_deref().map(str::trim) != Some(reference) {
            return PaymentOutcome::Pending;
        }
        PaymentOutcome::parse(self.status.as_deref())
    }
}

/// Payment provider API client.
#[derive(Clone)]
pub struct PaymentClient {
    client: reqwest::Client,
    api_url: String,
}

impl PaymentClient {
    /// Create a new payment client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &PaymentConfig) -> Result<Self, PaymentError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.access_token.expose_secret());
        let mut auth = HeaderValue::from_str(&auth_value)
            .map_err(|e| PaymentError::Parse(format!("Invalid access token format: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(15))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
        })
    }

    /// Create a hosted checkout for `preference`.
    ///
    /// The external reference doubles as the idempotency key, so a retried
    /// checkout does not create a second preference.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails, the provider rejects it, or the
    /// response cannot be parsed.
    #[tracing::instrument(
        skip(self, preference),
        fields(external_reference = %preference.external_reference)
    )]
    pub async fn create_checkout(
        &self,
        preference: &PaymentPreference,
    ) -> Result<CheckoutSession, PaymentError> {
        let url = format!("{}/checkout/preferences", self.api_url);

        let response = self
            .client
            .post(&url)
            .header("X-Idempotency-Key", &preference.external_reference)
            .json(preference)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Payment provider rejected checkout");
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let session: CheckoutSession = response
            .json()
            .await
            .map_err(|e| PaymentError::Parse(e.to_string()))?;

        tracing::info!(preference_id = %session.id, "Checkout preference created");
        Ok(session)
    }

    /// Fetch a payment by the id the provider put on the return URL.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails, the provider answers with an
    /// error status, or the response cannot be parsed.
    #[tracing::instrument(skip(self))]
    pub async fn get_payment(&self, payment_id: &str) -> Result<ProviderPayment, PaymentError> {
        if payment_id.is_empty() || !payment_id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(PaymentError::Parse(format!("Invalid payment id: {payment_id}")));
        }
        let url = format!("{}/v1/payments/{payment_id}", self.api_url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| PaymentError::Parse(e.to_string()))
    }

    /// The outcome of `payment_id` for checkout `reference`, as the provider
    /// reports it. Without a payment id, or when the provider cannot be
    /// asked, the payment counts as pending and is never approved.
    pub async fn verify(&self, payment_id: Option<&str>, reference: &str) -> PaymentOutcome {
        let Some(payment_id) = payment_id.map(str::trim).filter(|id| !id.is_empty()) else {
            return PaymentOutcome::Pending;
        };
        match self.get_payment(payment_id).await {
            Ok(payment) => {
                let outcome = payment.outcome_for(reference);
                tracing::info!(payment_id, ?outcome, "Payment verified with provider");
                outcome
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    payment_id,
                    "Could not verify payment; keeping it pending"
                );
                PaymentOutcome::Pending
            }
        }
    }
}
