//! The JSON envelope every API response is wrapped in.
//!
//! ```json
//! {"success": true, "data": [...], "pagination": {"page": 1, ...}}
//! {"success": false, "message": "Produto não encontrado"}
//! ```
//!
//! `degraded` is only serialized when set: the storefront marks responses
//! served from the built-in sample data while the database is unreachable.

use serde::{Deserialize, Serialize};

use crate::pagination::Pagination;

/// Response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub degraded: bool,
}

impl<T> Envelope<T> {
    /// A successful response carrying `data`.
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            pagination: None,
            degraded: false,
        }
    }

    /// A successful page of results.
    pub const fn page(data: T, pagination: Pagination) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            pagination: Some(pagination),
            degraded: false,
        }
    }

    /// A failed response with an optional payload (e.g. field errors).
    pub fn failure(message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data,
            pagination: None,
            degraded: false,
        }
    }

    /// Sample data served because the backend is down.
    pub fn degraded(message: impl Into<String>, data: T, pagination: Option<Pagination>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: Some(data),
            pagination,
            degraded: true,
        }
    }

    /// Attach a human-readable message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl Envelope<()> {
    /// A successful response with only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
            pagination: None,
            degraded: false,
        }
    }
}
