use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SectionError {
	#[error("transport failure: {0}")]
	Transport(#[from] reqwest::Error),
	#[error("unexpected status <code='{0}'>")]
	Status(StatusCode),
	#[error("invalid selector: {0}")]
	Selector(String),
	#[error(transparent)]
	InvalidUrl(#[from] url::ParseError),
}
