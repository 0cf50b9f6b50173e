use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing_test::traced_test;

use sf_catalog::{CatalogEngine, CatalogError, Product, ProductSource};

/// Serves a scripted sequence of pages and counts requests.
struct ScriptedSource {
	pages: Mutex<Vec<Result<Vec<Product>, CatalogError>>>,
	requests: AtomicU32,
}

impl ScriptedSource {
	fn new(pages: Vec<Result<Vec<Product>, CatalogError>>) -> Self {
		Self {
			pages: Mutex::new(pages),
			requests: AtomicU32::new(0),
		}
	}

	fn requests(&self) -> u32 {
		self.requests.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl ProductSource for ScriptedSource {
	async fn fetch_page(
		&self,
		_handle: &str,
		_page: u32,
		_limit: u32,
	) -> Result<Vec<Product>, CatalogError> {
		self.requests.fetch_add(1, Ordering::SeqCst);
		let mut pages = self.pages.lock().expect("pages lock");
		if pages.is_empty() {
			panic!("fetched past the end of the scripted pages");
		}
		pages.remove(0)
	}
}

/// Always answers a full page, as a collaborator that never shortens its
/// pages would.
struct EndlessSource;

#[async_trait]
impl ProductSource for EndlessSource {
	async fn fetch_page(
		&self,
		_handle: &str,
		_page: u32,
		limit: u32,
	) -> Result<Vec<Product>, CatalogError> {
		Ok(page_of(limit as usize, 0))
	}
}

fn page_of(count: usize, offset: usize) -> Vec<Product> {
	(0..count)
		.map(|i| Product {
			handle: format!("p{}", offset + i),
			title: format!("Product {}", offset + i),
			..Product::default()
		})
		.collect()
}

#[tokio::test]
async fn loads_until_short_page_without_extra_request() {
	let source = ScriptedSource::new(vec![Ok(page_of(3, 0)), Ok(page_of(3, 3)), Ok(page_of(2, 6))]);
	let mut engine = CatalogEngine::new();

	let loaded = engine
		.load_all_paged(&source, "summer", 3)
		.await
		.expect("load should succeed");

	assert_eq!(loaded, 8, "length equals the sum of all returned pages");
	assert_eq!(engine.products().len(), 8);
	assert_eq!(engine.filtered().len(), 8, "unfiltered mirror populated");
	assert_eq!(
		source.requests(),
		3,
		"the short page itself is the confirmation, no request follows it"
	);
	assert!(!engine.is_loading());
}

#[tokio::test]
async fn empty_first_page_yields_empty_catalog() {
	let source = ScriptedSource::new(vec![Ok(Vec::new())]);
	let mut engine = CatalogEngine::new();

	let loaded = engine
		.load_all_paged(&source, "empty", 3)
		.await
		.expect("empty collection is not an error");

	assert_eq!(loaded, 0);
	assert_eq!(source.requests(), 1);
}

#[tokio::test]
async fn full_last_page_needs_one_confirming_request() {
	// Exactly one full page: the loader cannot know it was the last until
	// the next page comes back empty.
	let source = ScriptedSource::new(vec![Ok(page_of(3, 0)), Ok(Vec::new())]);
	let mut engine = CatalogEngine::new();

	let loaded = engine
		.load_all_paged(&source, "exact", 3)
		.await
		.expect("load should succeed");

	assert_eq!(loaded, 3);
	assert_eq!(source.requests(), 2);
}

#[tokio::test]
async fn endless_full_pages_hit_the_page_cap() {
	let mut engine = CatalogEngine::new();

	let result = engine.load_all_paged(&EndlessSource, "bottomless", 2).await;

	assert!(matches!(result, Err(CatalogError::TooManyPages { .. })));
	assert!(engine.products().is_empty(), "no partial snapshot from the aborted load");
	assert!(!engine.is_loading());
}

#[tokio::test]
#[traced_test]
async fn failure_propagates_and_keeps_previous_snapshot() {
	let source = ScriptedSource::new(vec![Ok(page_of(2, 0))]);
	let mut engine = CatalogEngine::new();
	engine
		.load_all_paged(&source, "first", 3)
		.await
		.expect("seed load");

	let failing = ScriptedSource::new(vec![
		Ok(page_of(3, 0)),
		Err(CatalogError::Status(reqwest::StatusCode::BAD_GATEWAY)),
	]);
	let result = engine.load_all_paged(&failing, "second", 3).await;

	assert!(matches!(result, Err(CatalogError::Status(_))));
	assert_eq!(
		engine.products().len(),
		2,
		"failed reload must not corrupt the existing snapshot"
	);
	assert!(!engine.is_loading(), "loading flag cleared on failure too");
}
