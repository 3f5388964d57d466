//! Bearer token authentication for the back-office API.
//!
//! Presented tokens are hashed and compared against the digest kept in
//! [`AppState`], so the comparison time does not depend on where the token
//! first differs or on its length.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use sha2::{Digest, Sha256};

use crate::error::AppError;
use crate::state::AppState;

/// Extractor that requires `Authorization: Bearer <ADMIN_API_TOKEN>`.
///
/// Applied to the whole `/api` router with
/// `axum::middleware::from_extractor_with_state`.
pub struct RequireAdminToken;

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("bearer")
        .then_some(token.trim())
        .filter(|t| !t.is_empty())
}

/// SHA-256 of `token`.
pub(crate) fn token_digest(token: &str) -> [u8; 32] {
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&Sha256::digest(token.as_bytes()));
    digest
}

fn digests_match(a: &[u8; 32], b: &[u8; 32]) -> bool {
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

impl FromRequestParts<AppState> for RequireAdminToken {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts) else {
            tracing::debug!(uri = %parts.uri, "Missing bearer token");
            return Err(AppError::Unauthorized);
        };

        if digests_match(&token_digest(token), state.token_digest()) {
            Ok(Self)
        } else {
            tracing::warn!(uri = %parts.uri, "Rejected admin API token");
            Err(AppError::Unauthorized)
        }
    }
}
