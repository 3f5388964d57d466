//! News and blog posts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::non_blank;
use crate::types::NewsId;
use crate::validation::ValidationErrors;

/// A news/blog post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct News {
    pub id: NewsId,
    pub title: String,
    pub slug: String,
    pub summary: String,
    pub content: String,
    pub image_url: Option<String>,
    pub published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create/replace payload for a post. The slug defaults to the slugified title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsInput {
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub summary: String,
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub published: bool,
}

impl NewsInput {
    /// Check title and content and fill in the slug.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] for blank title/content or a slug that
    /// slugifies to nothing.
    pub fn validate(&self) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("title", &self.title);
        errors.require("content", &self.content);

        let slug = slugify(self.slug.as_deref().unwrap_or(&self.title));
        if slug.is_empty() && !errors.has("title") {
            errors.add("slug", "slug inválido");
        }

        errors.into_result(Self {
            title: self.title.trim().to_owned(),
            slug: Some(slug),
            summary: self.summary.trim().to_owned(),
            content: self.content.trim().to_owned(),
            image_url: non_blank(self.image_url.as_deref()),
            published: self.published,
        })
    }
}

/// URL slug: lowercase ASCII, accents folded, words joined by `-`.
///
/// ```
/// use artesania_core::models::slugify;
///
/// assert_eq!(
///     slugify("Feira de Artesanato: Edição São João!"),
///     "feira-de-artesanato-edicao-sao-joao"
/// );
/// ```
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for ch in text.chars().flat_map(char::to_lowercase) {
        let folded = match ch {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            'ñ' => 'n',
            c => c,
        };
        if folded.is_ascii_alphanumeric() {
            slug.push(folded);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("  Renda   de bilro -- Ceará "), "renda-de-bilro-ceara");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_validate_derives_slug_from_title() {
        let input = NewsInput {
            title: "Nova coleção de cerâmica".to_owned(),
            slug: None,
            summary: String::new(),
            content: "Texto".to_owned(),
            image_url: None,
            published: true,
        };
        let valid = input.validate().unwrap();
        assert_eq!(valid.slug.as_deref(), Some("nova-colecao-de-ceramica"));
    }

    #[test]
    fn test_validate_rejects_empty_slug() {
        let input = NewsInput {
            title: "Oficina".to_owned(),
            slug: Some("***".to_owned()),
            summary: String::new(),
            content: "Texto".to_owned(),
            image_url: None,
            published: false,
        };
        assert!(input.validate().unwrap_err().has("slug"));
    }
}
