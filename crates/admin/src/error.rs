//! Unified error handling for admin.
//!
//! Every error renders as the JSON envelope with `success: false`.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use artesania_core::{Envelope, OrderStatus, ValidationErrors};

use crate::db::RepositoryError;

/// Application-level error type for the admin API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Payload failed validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// The order workflow does not allow this move.
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or wrong API token.
    #[error("Unauthorized")]
    Unauthorized,

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(RepositoryError::Conflict(_)) | Self::InvalidTransition { .. } => {
                StatusCode::CONFLICT
            }
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::Database(RepositoryError::NotFound) => "Registro não encontrado".to_string(),
            Self::Database(RepositoryError::Conflict(msg))
            | Self::NotFound(msg)
            | Self::BadRequest(msg) => msg.clone(),
            // Don't expose internal error details to clients
            Self::Database(_) | Self::Internal(_) => "Erro interno do servidor".to_string(),
            Self::Validation(_) => "Dados inválidos".to_string(),
            Self::InvalidTransition { from, to } => {
                format!("Transição de status inválida: {from} → {to}")
            }
            Self::Unauthorized => "Token de acesso ausente ou inválido".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        let message = self.public_message();
        let envelope = match &self {
            Self::Validation(errors) => {
                Envelope::failure(message, serde_json::to_value(errors).ok())
            }
            _ => Envelope::failure(message, None),
        };

        let mut response = (status, Json(envelope)).into_response();
        if matches!(self, Self::Unauthorized) {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
