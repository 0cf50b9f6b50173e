use async_trait::async_trait;
use reqwest::Url;
use tracing::{debug, warn};

use crate::error::CatalogError;
use crate::product::{Product, ProductsPage};

/// One page of a collection's product listing.
///
/// Implementations must answer an empty `Vec` (not an error) past the last
/// page, matching the public endpoint's behavior.
#[async_trait]
pub trait ProductSource: Send + Sync {
	async fn fetch_page(
		&self,
		handle: &str,
		page: u32,
		limit: u32,
	) -> Result<Vec<Product>, CatalogError>;
}

/// Production source backed by the storefront's public
/// `/collections/{handle}/products.json` endpoint.
pub struct HttpProductSource {
	client: reqwest::Client,
	base_url: Url,
}

impl HttpProductSource {
	pub fn new(client: reqwest::Client, base_url: Url) -> Self {
		Self { client, base_url }
	}
}

#[async_trait]
impl ProductSource for HttpProductSource {
	async fn fetch_page(
		&self,
		handle: &str,
		page: u32,
		limit: u32,
	) -> Result<Vec<Product>, CatalogError> {
		let mut url = self
			.base_url
			.join(&format!("collections/{handle}/products.json"))
			.map_err(|_| CatalogError::InvalidUrl(handle.to_owned()))?;
		url.query_pairs_mut()
			.append_pair("page", &page.to_string())
			.append_pair("limit", &limit.to_string());

		debug!(%url, "fetching products page");

		let response = self.client.get(url).send().await?;
		if !response.status().is_success() {
			return Err(CatalogError::Status(response.status()));
		}

		let body = response.text().await?;
		let parsed: ProductsPage = serde_json::from_str(&body)?;
		if parsed.products.is_none() {
			warn!(handle, page, "products key absent from page payload, treating as end of data");
		}
		Ok(parsed.products.unwrap_or_default())
	}
}
