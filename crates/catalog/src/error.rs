use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
	#[error("transport failure: {0}")]
	Transport(#[from] reqwest::Error),
	#[error("unexpected status <code='{0}'>")]
	Status(StatusCode),
	#[error("malformed products payload: {0}")]
	Payload(#[from] serde_json::Error),
	#[error("invalid collection url for handle <handle='{0}'>")]
	InvalidUrl(String),
	#[error("paged load exceeded {max_pages} pages for collection <handle='{handle}'>")]
	TooManyPages { handle: String, max_pages: u32 },
}
