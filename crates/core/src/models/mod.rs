//! Persistent entities and the payloads that create or replace them.
//!
//! Each `*Input` type validates itself into the shape repositories write, so
//! storefront and admin apply the same rules.

pub mod artisan;
pub mod customer;
pub mod encomenda;
pub mod news;
pub mod order;
pub mod product;

pub use artisan::{Artisan, ArtisanInput};
pub use customer::{Customer, CustomerInput, ValidCustomer};
pub use encomenda::{Encomenda, EncomendaInput, ValidEncomenda};
pub use news::{News, NewsInput, slugify};
pub use order::{NewOrder, Order, OrderItem};
pub use product::{Product, ProductInput};

/// Trim a value and turn blanks into `None`.
pub(crate) fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}
