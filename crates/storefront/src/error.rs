//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers return `Result<T, AppError>`;
//! every error renders as the JSON envelope with `success: false`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use thiserror::Error;

use artesania_core::{CartError, Envelope, Pagination, ValidationErrors};

use crate::db::RepositoryError;
use crate::services::payments::PaymentError;
use crate::services::postal_code::PostalCodeLookupError;

/// Sample data served instead of a database result.
#[derive(Debug)]
pub struct DegradedBody {
    pub data: Value,
    pub pagination: Option<Pagination>,
}

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Payment provider call failed.
    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),

    /// Postal-code lookup failed.
    #[error("Postal code error: {0}")]
    PostalCode(#[from] PostalCodeLookupError),

    /// Payload failed validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Cart operation rejected.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Database unreachable; the body carries sample data.
    #[error("Service degraded")]
    Degraded(Box<DegradedBody>),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request conflicts with current state (stock, duplicates).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The provider reported the payment as failed; nothing was stored.
    #[error("Payment not completed")]
    PaymentNotCompleted,

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// A degraded response carrying `data` (serialized) and optional pagination.
    pub fn degraded(data: impl serde::Serialize, pagination: Option<Pagination>) -> Self {
        let data = serde_json::to_value(data).unwrap_or(Value::Null);
        Self::Degraded(Box::new(DegradedBody { data, pagination }))
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(RepositoryError::Conflict(_)) | Self::Conflict(_) => {
                StatusCode::CONFLICT
            }
            Self::Database(_) | Self::Session(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Payment(_) => StatusCode::BAD_GATEWAY,
            Self::PaymentNotCompleted => StatusCode::PAYMENT_REQUIRED,
            Self::PostalCode(err) => match err {
                PostalCodeLookupError::InvalidFormat => StatusCode::BAD_REQUEST,
                PostalCodeLookupError::NotFound => StatusCode::NOT_FOUND,
                PostalCodeLookupError::Http(_) | PostalCodeLookupError::Upstream(_) => {
                    StatusCode::BAD_GATEWAY
                }
            },
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Cart(err) => match err {
                CartError::LineNotFound(_) => StatusCode::NOT_FOUND,
                CartError::InvalidQuantity | CartError::NegativePrice => StatusCode::BAD_REQUEST,
            },
            Self::Degraded(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    /// Client-safe message. Internal details never leave the server.
    fn public_message(&self) -> String {
        match self {
            Self::Database(RepositoryError::NotFound) => "Registro não encontrado".to_string(),
            Self::Database(RepositoryError::Conflict(msg)) => msg.clone(),
            Self::Database(_) | Self::Session(_) | Self::Internal(_) => {
                "Erro interno do servidor".to_string()
            }
            Self::Payment(_) => "Falha ao comunicar com o provedor de pagamento".to_string(),
            Self::PaymentNotCompleted => {
                "Pagamento não concluído; seu carrinho foi mantido".to_string()
            }
            Self::PostalCode(err) => match err {
                PostalCodeLookupError::InvalidFormat => "CEP deve ter 8 dígitos".to_string(),
                PostalCodeLookupError::NotFound => "CEP não encontrado".to_string(),
                _ => "Falha ao consultar o CEP".to_string(),
            },
            Self::Validation(_) => "Dados inválidos".to_string(),
            Self::Cart(err) => match err {
                CartError::LineNotFound(_) => "Item não está no carrinho".to_string(),
                CartError::InvalidQuantity => "Quantidade deve ser pelo menos 1".to_string(),
                CartError::NegativePrice => "Preço inválido".to_string(),
            },
            Self::Degraded(_) => {
                "Serviço temporariamente indisponível; exibindo dados de exemplo".to_string()
            }
            Self::RateLimited => "Muitas requisições, tente novamente em instantes".to_string(),
            Self::NotFound(msg) | Self::BadRequest(msg) | Self::Conflict(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() && !matches!(self, Self::Degraded(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let message = self.public_message();
        let envelope = match self {
            Self::Validation(errors) => {
                Envelope::failure(message, serde_json::to_value(errors).ok())
            }
            Self::Degraded(body) => {
                let DegradedBody { data, pagination } = *body;
                Envelope::degraded(message, data, pagination)
            }
            _ => Envelope::failure(message, None),
        };

        (status, Json(envelope)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for customer actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("product_id", "12")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    async fn body_json(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("produto 123".to_string());
        assert_eq!(err.to_string(), "Not found: produto 123");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(get_status(AppError::NotFound("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(get_status(AppError::BadRequest("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(get_status(AppError::Conflict("x".into())), StatusCode::CONFLICT);
        assert_eq!(get_status(AppError::RateLimited), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(get_status(AppError::PaymentNotCompleted), StatusCode::PAYMENT_REQUIRED);
        assert_eq!(
            get_status(AppError::Internal("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::Conflict("dup".into()))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Cart(CartError::LineNotFound(artesania_core::ProductId::new(1)))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::PostalCode(PostalCodeLookupError::NotFound)),
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_validation_lists_fields() {
        let mut errors = ValidationErrors::new();
        errors.add("email", "e-mail inválido");
        let (status, body) = body_json(AppError::Validation(errors)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["data"][0]["field"], "email");
    }

    #[tokio::test]
    async fn test_degraded_envelope() {
        let (status, body) = body_json(AppError::degraded(vec!["a", "b"], None)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["success"], false);
        assert_eq!(body["degraded"], true);
        assert_eq!(body["data"][1], "b");
    }

    #[tokio::test]
    async fn test_internal_details_hidden() {
        let (_, body) = body_json(AppError::Internal("pool exhausted at 10.0.0.3".into())).await;
        assert_eq!(body["message"], "Erro interno do servidor");
    }
}
