//! Client-side catalog engine for storefront collections.
//!
//! Loads a collection's full product list through the paged
//! `/collections/{handle}/products.json` endpoint, then serves pure
//! filter/sort/derive queries over the in-memory snapshot, plus HTML
//! rendering of product cards. Used when no server-side filtering is
//! available; the alternate strategy lives in `sf-section`.

mod engine;
mod error;
mod product;
mod render;
mod source;

pub use engine::{compare_price, min_price, CatalogEngine, FilterSpec, SortKey, DEFAULT_PAGE_LIMIT};
pub use error::CatalogError;
pub use product::{FeaturedImage, Product, ProductImage, ProductsPage, Variant};
pub use render::{escape_html, format_money, render_card};
pub use source::{HttpProductSource, ProductSource};
