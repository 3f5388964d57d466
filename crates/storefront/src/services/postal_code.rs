//! Postal-code (CEP) lookup with a 24-hour cache.
//!
//! The upstream service answers `GET {base}/{cep}/json/` with the address, or
//! `{"erro": true}` for a well-formed but unknown CEP.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use artesania_core::PostalCode;

const CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);
const CACHE_CAPACITY: u64 = 10_000;

/// Errors from the postal-code lookup.
#[derive(Debug, Clone, Error)]
pub enum PostalCodeLookupError {
    /// Not 8 digits.
    #[error("invalid postal code format")]
    InvalidFormat,

    /// Well-formed but unknown.
    #[error("postal code not found")]
    NotFound,

    /// Request failed (connection, timeout).
    #[error("HTTP error: {0}")]
    Http(Arc<reqwest::Error>),

    /// Upstream answered with an unexpected status or body.
    #[error("upstream error: {0}")]
    Upstream(String),
}

impl From<reqwest::Error> for PostalCodeLookupError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(Arc::new(err))
    }
}

/// A resolved address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostalAddress {
    pub postal_code: String,
    pub street: String,
    pub complement: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
}

#[derive(Debug, Deserialize)]
struct UpstreamAddress {
    #[serde(default)]
    erro: Option<serde_json::Value>,
    #[serde(default)]
    cep: String,
    #[serde(default)]
    logradouro: String,
    #[serde(default)]
    complemento: String,
    #[serde(default)]
    bairro: String,
    #[serde(default)]
    localidade: String,
    #[serde(default)]
    uf: String,
}

impl UpstreamAddress {
    fn is_error(&self) -> bool {
        match &self.erro {
            None | Some(serde_json::Value::Null | serde_json::Value::Bool(false)) => false,
            Some(_) => true,
        }
    }
}

/// Cached postal-code lookup client.
#[derive(Clone)]
pub struct PostalCodeClient {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<PostalCode, PostalAddress>,
}

impl PostalCodeClient {
    /// Create a new lookup client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(base_url: &str) -> Result<Self, PostalCodeLookupError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            cache,
        })
    }

    /// Resolve `raw` (with or without separators) into an address.
    ///
    /// Only successful lookups are cached.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFormat` for anything but 8 digits, `NotFound` for an
    /// unknown CEP, `Http`/`Upstream` when the service misbehaves.
    #[tracing::instrument(skip(self))]
    pub async fn lookup(&self, raw: &str) -> Result<PostalAddress, PostalCodeLookupError> {
        let code = PostalCode::parse(raw).map_err(|_| PostalCodeLookupError::InvalidFormat)?;

        if let Some(address) = self.cache.get(&code).await {
            tracing::debug!(cep = %code, "Postal code cache hit");
            return Ok(address);
        }

        let address = self.fetch(&code).await?;
        self.cache.insert(code, address.clone()).await;
        Ok(address)
    }

    async fn fetch(&self, code: &PostalCode) -> Result<PostalAddress, PostalCodeLookupError> {
        let url = format!("{}/{}/json/", self.base_url, code.as_str());
        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::BAD_REQUEST || status == reqwest::StatusCode::NOT_FOUND {
            return Err(PostalCodeLookupError::NotFound);
        }
        if !status.is_success() {
            return Err(PostalCodeLookupError::Upstream(format!("status {status}")));
        }

        let body: UpstreamAddress = response
            .json()
            .await
            .map_err(|e| PostalCodeLookupError::Upstream(e.to_string()))?;
        if body.is_error() {
            return Err(PostalCodeLookupError::NotFound);
        }

        Ok(PostalAddress {
            postal_code: if body.cep.is_empty() {
                code.to_string()
            } else {
                body.cep
            },
            street: body.logradouro,
            complement: body.complemento,
            neighborhood: body.bairro,
            city: body.localidade,
            state: body.uf,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::extract::Path;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    use super::*;

    async fn serve(hits: Arc<AtomicUsize>) -> String {
        let app = Router::new().route(
            "/{cep}/json/",
            get(move |Path(cep): Path<String>| {
                let hits = Arc::clone(&hits);
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    if cep == "01310100" {
                        Json(json!({
                            "cep": "01310-100",
                            "logradouro": "Avenida Paulista",
                            "complemento": "de 612 a 1510 - lado par",
                            "bairro": "Bela Vista",
                            "localidade": "São Paulo",
                            "uf": "SP"
                        }))
                    } else {
                        Json(json!({"erro": "true"}))
                    }
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_lookup_caches_success() {
        let hits = Arc::new(AtomicUsize::new(0));
        let client = PostalCodeClient::new(&serve(Arc::clone(&hits)).await).unwrap();

        let address = client.lookup("01310-100").await.unwrap();
        assert_eq!(address.city, "São Paulo");
        assert_eq!(address.state, "SP");

        client.lookup("01310100").await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_lookup_unknown_and_invalid() {
        let hits = Arc::new(AtomicUsize::new(0));
        let client = PostalCodeClient::new(&serve(Arc::clone(&hits)).await).unwrap();

        assert!(matches!(
            client.lookup("99999-999").await,
            Err(PostalCodeLookupError::NotFound)
        ));
        assert!(matches!(
            client.lookup("123").await,
            Err(PostalCodeLookupError::InvalidFormat)
        ));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
