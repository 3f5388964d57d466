//! Subcommand implementations.

pub mod migrate;
pub mod seed;

use secrecy::SecretString;

/// Database URL for the marketplace schema.
///
/// Reads `STOREFRONT_DATABASE_URL`, falling back to `DATABASE_URL`.
pub(crate) fn database_url() -> Option<SecretString> {
    ["STOREFRONT_DATABASE_URL", "DATABASE_URL"]
        .into_iter()
        .find_map(|key| std::env::var(key).ok())
        .filter(|url| !url.trim().is_empty())
        .map(SecretString::from)
}
