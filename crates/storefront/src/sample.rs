//! Built-in sample catalogue.
//!
//! The same YAML document feeds two consumers: the storefront serves it as
//! degraded-mode data while the database is unreachable, and `art-cli seed`
//! writes it (or a file in the same format) into the database.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use artesania_core::models::{Artisan, ArtisanInput, News, NewsInput, Product, ProductInput};
use artesania_core::{ArtisanId, NewsId, PageParams, Pagination, ProductId};

use crate::db::ProductFilter;

const BUILTIN_CATALOG: &str = include_str!("../sample/catalog.yaml");

/// A product entry; the artisan is referenced by name.
#[derive(Debug, Clone, Deserialize)]
pub struct SampleProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub price: Decimal,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub artisan: Option<String>,
    #[serde(default)]
    pub featured: bool,
}

impl SampleProduct {
    /// The create payload, with the artisan resolved to `artisan_id`.
    #[must_use]
    pub fn to_input(&self, artisan_id: Option<ArtisanId>) -> ProductInput {
        ProductInput {
            name: self.name.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            price: self.price,
            stock: self.stock,
            image_url: self.image_url.clone(),
            artisan_id,
            featured: self.featured,
            active: true,
        }
    }
}

/// A news entry with an explicit publication date.
#[derive(Debug, Clone, Deserialize)]
pub struct SampleNews {
    pub title: String,
    #[serde(default)]
    pub summary: String,
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl SampleNews {
    /// The create payload.
    #[must_use]
    pub fn to_input(&self) -> NewsInput {
        NewsInput {
            title: self.title.clone(),
            slug: None,
            summary: self.summary.clone(),
            content: self.content.clone(),
            image_url: self.image_url.clone(),
            published: self.published,
        }
    }
}

/// A catalogue document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SampleCatalog {
    #[serde(default)]
    pub artisans: Vec<ArtisanInput>,
    #[serde(default)]
    pub products: Vec<SampleProduct>,
    #[serde(default)]
    pub news: Vec<SampleNews>,
}

impl SampleCatalog {
    /// Parse a YAML catalogue.
    ///
    /// # Errors
    ///
    /// Returns `serde_yaml::Error` if the document is malformed.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// The catalogue compiled into the binary.
    ///
    /// # Errors
    ///
    /// Returns `serde_yaml::Error` if the embedded document is malformed.
    pub fn builtin() -> Result<Self, serde_yaml::Error> {
        Self::from_yaml(BUILTIN_CATALOG)
    }

    /// Every problem in the document, one message each. Empty when valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        for (i, artisan) in self.artisans.iter().enumerate() {
            if let Err(errors) = artisan.validate() {
                problems.push(format!("artisans[{i}] ({}): {errors}", artisan.name));
            }
        }
        for (i, product) in self.products.iter().enumerate() {
            if let Err(errors) = product.to_input(None).validate() {
                problems.push(format!("products[{i}] ({}): {errors}", product.name));
            }
            if let Some(name) = &product.artisan
                && !self.artisans.iter().any(|a| a.name.trim() == name.trim())
            {
                problems.push(format!(
                    "products[{i}] ({}): unknown artisan '{name}'",
                    product.name
                ));
            }
        }
        for (i, post) in self.news.iter().enumerate() {
            if let Err(errors) = post.to_input().validate() {
                problems.push(format!("news[{i}] ({}): {errors}", post.title));
            }
        }

        problems
    }

    /// Materialize the catalogue as in-memory entities with sequential ids.
    ///
    /// Entries that fail validation are skipped.
    #[must_use]
    pub fn into_data(self) -> SampleData {
        let now = Utc::now();

        let mut artisan_ids = HashMap::new();
        let mut artisans = Vec::new();
        for input in self.artisans.iter().filter_map(|a| a.validate().ok()) {
            let id = ArtisanId::new(next_id(artisans.len()));
            artisan_ids.insert(input.name.clone(), id);
            artisans.push(Artisan {
                id,
                name: input.name,
                bio: input.bio,
                city: input.city,
                state: input.state,
                specialty: input.specialty,
                image_url: input.image_url,
                created_at: now,
                updated_at: now,
            });
        }

        let mut products = Vec::new();
        for sample in &self.products {
            let artisan_id = sample
                .artisan
                .as_deref()
                .and_then(|name| artisan_ids.get(name.trim()).copied());
            let Ok(input) = sample.to_input(artisan_id).validate() else {
                continue;
            };
            products.push(Product {
                id: ProductId::new(next_id(products.len())),
                name: input.name,
                description: input.description,
                category: input.category,
                price: input.price,
                stock: input.stock,
                image_url: input.image_url,
                artisan_id: input.artisan_id,
                featured: input.featured,
                active: input.active,
                created_at: now,
                updated_at: now,
            });
        }

        let mut news = Vec::new();
        for sample in &self.news {
            let Ok(input) = sample.to_input().validate() else {
                continue;
            };
            let published_at = input
                .published
                .then(|| sample.published_at.unwrap_or(now));
            news.push(News {
                id: NewsId::new(next_id(news.len())),
                title: input.title,
                slug: input.slug.unwrap_or_default(),
                summary: input.summary,
                content: input.content,
                image_url: input.image_url,
                published: input.published,
                published_at,
                created_at: published_at.unwrap_or(now),
                updated_at: published_at.unwrap_or(now),
            });
        }
        news.sort_by(|a, b| b.published_at.cmp(&a.published_at));

        SampleData {
            artisans,
            products,
            news,
        }
    }
}

fn next_id(len: usize) -> i32 {
    i32::try_from(len).map_or(i32::MAX, |n| n.saturating_add(1))
}

/// In-memory sample entities answering the public read queries.
#[derive(Debug, Clone, Default)]
pub struct SampleData {
    artisans: Vec<Artisan>,
    products: Vec<Product>,
    news: Vec<News>,
}

impl SampleData {
    /// Load the built-in catalogue.
    ///
    /// # Errors
    ///
    /// Returns `serde_yaml::Error` if the embedded document is malformed.
    pub fn builtin() -> Result<Self, serde_yaml::Error> {
        Ok(SampleCatalog::builtin()?.into_data())
    }

    /// Products matching `filter`, paginated like the SQL listing.
    #[must_use]
    pub fn products(
        &self,
        filter: &ProductFilter,
        page: &PageParams,
    ) -> (Vec<Product>, Pagination) {
        let mut matching: Vec<&Product> =
            self.products.iter().filter(|p| filter.matches(p)).collect();
        matching.sort_by(|a, b| b.featured.cmp(&a.featured).then(a.id.cmp(&b.id)));
        paginate(&matching, page)
    }

    /// An active product by id.
    #[must_use]
    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id && p.active)
    }

    /// Distinct categories of active products, alphabetically.
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = self
            .products
            .iter()
            .filter(|p| p.active)
            .map(|p| p.category.clone())
            .collect();
        categories.sort();
        categories.dedup();
        categories
    }

    /// Published posts, newest first.
    #[must_use]
    pub fn news(&self, page: &PageParams) -> (Vec<News>, Pagination) {
        let published: Vec<&News> = self.news.iter().filter(|n| n.published).collect();
        paginate(&published, page)
    }

    /// A published post by slug.
    #[must_use]
    pub fn news_by_slug(&self, slug: &str) -> Option<&News> {
        self.news.iter().find(|n| n.published && n.slug == slug)
    }

    /// Artisans by name.
    #[must_use]
    pub fn artisans(&self, page: &PageParams) -> (Vec<Artisan>, Pagination) {
        let mut artisans: Vec<&Artisan> = self.artisans.iter().collect();
        artisans.sort_by(|a, b| a.name.cmp(&b.name));
        paginate(&artisans, page)
    }

    /// An artisan and their active products.
    #[must_use]
    pub fn artisan(&self, id: ArtisanId) -> Option<(Artisan, Vec<Product>)> {
        let artisan = self.artisans.iter().find(|a| a.id == id)?;
        let products = self
            .products
            .iter()
            .filter(|p| p.active && p.artisan_id == Some(id))
            .cloned()
            .collect();
        Some((artisan.clone(), products))
    }
}

fn paginate<T: Clone>(items: &[&T], page: &PageParams) -> (Vec<T>, Pagination) {
    let total = i64::try_from(items.len()).unwrap_or(i64::MAX);
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
    let slice = items
        .iter()
        .skip(offset)
        .take(limit)
        .map(|item| (*item).clone())
        .collect();
    (slice, page.meta(total))
}
