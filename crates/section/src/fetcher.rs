use async_trait::async_trait;
use url::Url;

use crate::error::SectionError;

/// The fragment-fetch collaborator: given a fully built section URL,
/// returns the server-rendered HTML document. Non-2xx is a failure.
#[async_trait]
pub trait SectionFetcher: Send + Sync {
	async fn fetch_document(&self, url: &Url) -> Result<String, SectionError>;
}

pub struct HttpSectionFetcher {
	client: reqwest::Client,
}

impl HttpSectionFetcher {
	pub fn new(client: reqwest::Client) -> Self {
		Self { client }
	}
}

#[async_trait]
impl SectionFetcher for HttpSectionFetcher {
	async fn fetch_document(&self, url: &Url) -> Result<String, SectionError> {
		let response = self.client.get(url.as_str()).send().await?;
		if !response.status().is_success() {
			return Err(SectionError::Status(response.status()));
		}
		Ok(response.text().await?)
	}
}
