use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::CatalogError;
use crate::product::Product;
use crate::source::ProductSource;

/// Server-side maximum for `limit` on the products endpoint.
pub const DEFAULT_PAGE_LIMIT: u32 = 250;

/// Cap on sequential page fetches, in case a collaborator never shortens
/// its pages.
const MAX_PAGES: u32 = 200;

/// Structured filter specification. Categories intersect (logical AND);
/// the `tags` category is a logical OR across requested tags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
	pub available: Option<bool>,
	/// Inclusive lower bound on the product's minimum variant price.
	pub price_min: Option<f64>,
	/// Inclusive upper bound on the product's minimum variant price.
	pub price_max: Option<f64>,
	pub tags: Vec<String>,
	/// Matched case-insensitively against `"key:value"` tags; every entry
	/// must match.
	pub custom: Vec<(String, String)>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum SortKey {
	PriceAscending,
	PriceDescending,
	TitleAscending,
	TitleDescending,
	#[default]
	Newest,
}

/// In-memory snapshot of one collection plus its derived, filtered view.
///
/// One instance per page/collection context; the filtered view is always a
/// pure function of `(products, active_filters, active_sort)` and is fully
/// recomputed on every filter change, never patched incrementally.
#[derive(Debug, Default)]
pub struct CatalogEngine {
	products: Vec<Product>,
	filtered: Vec<Product>,
	active_filters: FilterSpec,
	active_sort: SortKey,
	loading: bool,
}

impl CatalogEngine {
	pub fn new() -> Self {
		Self::default()
	}

	/// Full product list, in load order.
	pub fn products(&self) -> &[Product] {
		&self.products
	}

	/// Current filtered view.
	pub fn filtered(&self) -> &[Product] {
		&self.filtered
	}

	pub fn active_sort(&self) -> SortKey {
		self.active_sort
	}

	pub fn active_filters(&self) -> &FilterSpec {
		&self.active_filters
	}

	pub fn is_loading(&self) -> bool {
		self.loading
	}

	/// Loads every page of the collection sequentially until a short or
	/// empty page signals end of data. Replaces the snapshot and resets the
	/// filtered view to the full list; on failure the previous snapshot is
	/// left untouched.
	pub async fn load_all(
		&mut self,
		source: &dyn ProductSource,
		handle: &str,
	) -> Result<usize, CatalogError> {
		self.load_all_paged(source, handle, DEFAULT_PAGE_LIMIT).await
	}

	/// [`Self::load_all`] with an explicit page size.
	pub async fn load_all_paged(
		&mut self,
		source: &dyn ProductSource,
		handle: &str,
		limit: u32,
	) -> Result<usize, CatalogError> {
		self.loading = true;
		let loaded = fetch_all(source, handle, limit).await;
		self.loading = false;

		let products = loaded.map_err(|e| {
			warn!(handle, "failed to load collection: {e}");
			e
		})?;

		info!(handle, count = products.len(), "collection loaded");
		self.products = products;
		self.filtered = self.products.clone();
		Ok(self.products.len())
	}

	/// Recomputes the filtered view from the full snapshot, then re-applies
	/// the active sort. Idempotent for a fixed spec.
	pub fn apply_filters(&mut self, spec: FilterSpec) -> &[Product] {
		self.active_filters = spec;
		let mut result: Vec<Product> = self
			.products
			.iter()
			.filter(|p| matches_filters(p, &self.active_filters))
			.cloned()
			.collect();
		sort_products(&mut result, self.active_sort);
		debug!(
			total = self.products.len(),
			kept = result.len(),
			"filters applied"
		);
		self.filtered = result;
		&self.filtered
	}

	/// Re-orders the current filtered view. Always applied to the filtered
	/// set as-is, never composed incrementally.
	pub fn sort(&mut self, key: SortKey) -> &[Product] {
		self.active_sort = key;
		sort_products(&mut self.filtered, key);
		&self.filtered
	}

	/// Sorted distinct values of `"prefix:value"` tags across the whole
	/// snapshot, for populating facet controls.
	pub fn distinct_tag_values(&self, prefix: &str) -> Vec<String> {
		let needle = format!("{}:", prefix.to_lowercase());
		let mut values = BTreeSet::new();
		for product in &self.products {
			for tag in &product.tags {
				if tag.to_lowercase().starts_with(&needle) {
					if let Some(value) = tag.splitn(2, ':').nth(1) {
						let value = value.trim();
						if !value.is_empty() {
							values.insert(value.to_owned());
						}
					}
				}
			}
		}
		values.into_iter().collect()
	}

	/// `(min, max)` of per-product minimum prices over the whole snapshot;
	/// `(0, 0)` when empty.
	pub fn price_range(&self) -> (f64, f64) {
		if self.products.is_empty() {
			return (0.0, 0.0);
		}
		let mut min = f64::INFINITY;
		let mut max = f64::NEG_INFINITY;
		for product in &self.products {
			let price = min_price(product);
			min = min.min(price);
			max = max.max(price);
		}
		(min, max)
	}
}

/// Lowest parsed variant price; `0.0` when no variant carries a parseable
/// price.
pub fn min_price(product: &Product) -> f64 {
	product
		.variants
		.iter()
		.filter_map(|v| v.price.parse::<f64>().ok())
		.fold(None, |lowest: Option<f64>, price| {
			Some(lowest.map_or(price, |l| l.min(price)))
		})
		.unwrap_or(0.0)
}

/// First variant's compare-at price, when present and parseable. Rendered
/// struck-through only when strictly greater than the minimum price.
pub fn compare_price(product: &Product) -> Option<f64> {
	product
		.variants
		.first()
		.and_then(|v| v.compare_at_price.as_deref())
		.and_then(|raw| raw.parse::<f64>().ok())
}

fn matches_filters(product: &Product, spec: &FilterSpec) -> bool {
	if let Some(available) = spec.available {
		if product.available != available {
			return false;
		}
	}

	if spec.price_min.is_some() || spec.price_max.is_some() {
		let price = min_price(product);
		if spec.price_min.is_some_and(|min| price < min) {
			return false;
		}
		if spec.price_max.is_some_and(|max| price > max) {
			return false;
		}
	}

	if !spec.tags.is_empty() && !spec.tags.iter().any(|t| product.tags.contains(t)) {
		return false;
	}

	spec.custom.iter().all(|(key, value)| {
		let facet = format!("{key}:{value}").to_lowercase();
		product.tags.iter().any(|t| t.to_lowercase() == facet)
	})
}

fn recency(product: &Product) -> Option<DateTime<Utc>> {
	product.published_at.or(product.created_at)
}

fn sort_products(products: &mut [Product], key: SortKey) {
	match key {
		SortKey::PriceAscending => {
			products.sort_by(|a, b| min_price(a).total_cmp(&min_price(b)));
		}
		SortKey::PriceDescending => {
			products.sort_by(|a, b| min_price(b).total_cmp(&min_price(a)));
		}
		SortKey::TitleAscending => {
			products.sort_by(|a, b| {
				a.title
					.to_lowercase()
					.cmp(&b.title.to_lowercase())
					.then_with(|| a.title.cmp(&b.title))
			});
		}
		SortKey::TitleDescending => {
			products.sort_by(|a, b| {
				b.title
					.to_lowercase()
					.cmp(&a.title.to_lowercase())
					.then_with(|| b.title.cmp(&a.title))
			});
		}
		// Most recent first; undated products sink to the end.
		SortKey::Newest => products.sort_by(|a, b| recency(b).cmp(&recency(a))),
	}
}

async fn fetch_all(
	source: &dyn ProductSource,
	handle: &str,
	limit: u32,
) -> Result<Vec<Product>, CatalogError> {
	let mut all = Vec::new();
	let mut page = 1u32;

	loop {
		if page > MAX_PAGES {
			return Err(CatalogError::TooManyPages {
				handle: handle.to_owned(),
				max_pages: MAX_PAGES,
			});
		}

		let batch = source.fetch_page(handle, page, limit).await?;
		if batch.is_empty() {
			break;
		}

		let short = (batch.len() as u32) < limit;
		all.extend(batch);
		if short {
			break;
		}
		page += 1;
	}

	Ok(all)
}
