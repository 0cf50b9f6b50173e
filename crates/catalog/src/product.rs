//! Serde models for the public `products.json` endpoint.
//!
//! The payload shape is permissive by design: live storefronts omit, null
//! out, or reshape fields between platform versions, so everything defaults
//! and prices stay as the decimal strings the API sends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Top-level response from `GET /collections/{handle}/products.json`.
///
/// `products` is an `Option` because some storefronts answer `{}` on
/// out-of-range pages instead of an empty array.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductsPage {
	pub products: Option<Vec<Product>>,
}

/// One product of the collection snapshot. Immutable once loaded; the
/// engine only ever filters it into derived sequences.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
	pub id: i64,
	pub handle: String,
	pub title: String,
	/// Returned as a JSON array of strings; `"key:value"` tags carry the
	/// structured facets.
	pub tags: Vec<String>,
	/// Absent on older stores; optimistic default.
	#[serde(default = "default_true")]
	pub available: bool,
	pub variants: Vec<Variant>,
	pub images: Vec<ProductImage>,
	/// Either a bare URL string or an image object, depending on the
	/// storefront version.
	pub featured_image: Option<FeaturedImage>,
	pub image: Option<ProductImage>,
	pub published_at: Option<DateTime<Utc>>,
	pub created_at: Option<DateTime<Utc>>,
}

/// Explicitly `null` when not on sale, a decimal string (`"162.00"`) when
/// it is. Passed through as-is and parsed at query time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Variant {
	pub price: String,
	pub compare_at_price: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductImage {
	pub src: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeaturedImage {
	Url(String),
	Image(ProductImage),
}

impl FeaturedImage {
	pub fn src(&self) -> Option<&str> {
		match self {
			Self::Url(url) => Some(url.as_str()),
			Self::Image(image) => image.src.as_deref(),
		}
	}
}

impl Default for Product {
	fn default() -> Self {
		Self {
			id: 0,
			handle: String::new(),
			title: String::new(),
			tags: Vec::new(),
			available: true,
			variants: Vec::new(),
			images: Vec::new(),
			featured_image: None,
			image: None,
			published_at: None,
			created_at: None,
		}
	}
}

fn default_true() -> bool {
	true
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn deserializes_observed_shape() {
		let raw = r#"{
			"products": [{
				"id": 6789012345678,
				"handle": "hi-boy",
				"title": "Hi Boy Blood Orange",
				"tags": ["color:orange", "seasonal"],
				"variants": [{"price": "12.00", "compare_at_price": null}],
				"images": [{"src": "https://cdn.example/a.jpg"}],
				"featured_image": "https://cdn.example/f.jpg",
				"published_at": "2024-03-01T10:00:00-05:00"
			}]
		}"#;

		let page: ProductsPage = serde_json::from_str(raw).expect("payload should parse");
		let products = page.products.expect("products array present");
		assert_eq!(products.len(), 1);

		let product = &products[0];
		assert!(product.available, "missing availability defaults to true");
		assert_eq!(product.featured_image.as_ref().and_then(FeaturedImage::src), {
			Some("https://cdn.example/f.jpg")
		});
		assert!(product.published_at.is_some());
	}

	#[test]
	fn empty_object_page_has_no_products() {
		let page: ProductsPage = serde_json::from_str("{}").expect("empty page should parse");
		assert!(page.products.is_none());
	}

	#[test]
	fn featured_image_object_variant() {
		let raw = r#"{"featured_image": {"src": "https://cdn.example/o.jpg"}}"#;
		let product: Product = serde_json::from_str(raw).expect("product should parse");
		assert_eq!(
			product.featured_image.as_ref().and_then(FeaturedImage::src),
			Some("https://cdn.example/o.jpg")
		);
	}
}
