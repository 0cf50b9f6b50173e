//! The section synchronizer: fetch → parse → reconcile → re-bind.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use scraper::Html;
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

use crate::config::{CompiledSelectors, SectionConfig};
use crate::fetcher::SectionFetcher;
use crate::filter_state::FilterState;
use crate::fragment::{extract_cards, next_page_number, parse_fragment, read_cursor};
use crate::panel::{FilterChip, FilterPanel};
use crate::request::FetchRequest;
use crate::surface::{FrameScheduler, History, SectionSurface};
use crate::watcher::ScrollWatcher;

/// Fixed delay between committing the faded-out style and swapping the
/// results content.
const SWAP_DELAY: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
	/// New filter/sort applied: whole-list replacement, discarding
	/// previously loaded pages.
	Replace,
	/// Infinite-scroll continuation: incremental tail growth.
	Append,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
	/// Fragment fetched and reconciled into the live region.
	Applied,
	/// Ignored: a fetch was already in flight, or the trigger no longer
	/// applies (stale intersection, unknown control).
	Dropped,
	/// Fetch failed; existing content untouched, a later trigger retries.
	Failed,
}

/// State behind the synchronizer's single lock: the live-region sinks plus
/// everything re-derived from fragments.
struct Inner {
	surface: Box<dyn SectionSurface>,
	history: Box<dyn History>,
	panel: FilterPanel,
	watcher: Option<ScrollWatcher>,
	next_page_url: Option<String>,
}

/// Owns one root UI region: filter form, results container, and scroll
/// sentinel. At most one in-flight fragment fetch at any time; concurrent
/// triggers are dropped, not queued — filter interactions are infrequent
/// enough that drops are rare, and scroll loads retry on the next
/// intersection event.
pub struct SectionSynchronizer {
	config: SectionConfig,
	selectors: CompiledSelectors,
	fetcher: Arc<dyn SectionFetcher>,
	scheduler: Box<dyn FrameScheduler>,
	inner: Mutex<Inner>,
	in_flight: AtomicBool,
}

impl SectionSynchronizer {
	/// Binds the synchronizer against the page's initial document. Returns
	/// `None` (a no-op, matching the calling page's contract) when the
	/// root region is missing, and `None` with an error log when the
	/// config's selectors do not compile.
	///
	/// With `fetch_on_init` the region self-bootstraps through an initial
	/// replace-mode synchronize; otherwise the pre-rendered markup is
	/// parsed in place.
	pub async fn initialize(
		config: SectionConfig,
		initial_document: &str,
		fetcher: Arc<dyn SectionFetcher>,
		surface: Box<dyn SectionSurface>,
		history: Box<dyn History>,
		scheduler: Box<dyn FrameScheduler>,
	) -> Option<Self> {
		let selectors = match CompiledSelectors::compile(&config) {
			Ok(selectors) => selectors,
			Err(e) => {
				error!(root = config.root_id, "section config rejected: {e}");
				return None;
			}
		};

		let (panel, next_page_url) = {
			let document = Html::parse_document(initial_document);
			if document.select(&selectors.root).next().is_none() {
				debug!(root = config.root_id, "root region absent, skipping init");
				return None;
			}
			let fragment = parse_fragment(initial_document, &selectors.filters, &selectors.results);
			let panel = fragment
				.filters
				.as_deref()
				.map(|html| FilterPanel::parse(html, &selectors))
				.unwrap_or_default();
			let next = fragment
				.results
				.as_deref()
				.and_then(|html| read_cursor(html, &selectors.cursor, &config.cursor_attr));
			(panel, next)
		};

		let synchronizer = Self {
			in_flight: AtomicBool::new(false),
			inner: Mutex::new(Inner {
				surface,
				history,
				panel,
				watcher: ScrollWatcher::arm(next_page_url.as_deref()),
				next_page_url,
			}),
			fetcher,
			scheduler,
			selectors,
			config,
		};

		if synchronizer.config.fetch_on_init {
			synchronizer.synchronize(None, SyncMode::Replace, None).await;
		}

		Some(synchronizer)
	}

	/// The central operation: builds a request from the supplied filter
	/// state and page, fetches the fragment, and reconciles whichever
	/// regions came back.
	///
	/// Guarded single-flight: a call arriving while another is in flight
	/// returns [`SyncOutcome::Dropped`] without fetching or mutating
	/// anything. The guard is released on every exit path.
	pub async fn synchronize(
		&self,
		filter_state: Option<FilterState>,
		mode: SyncMode,
		page: Option<u32>,
	) -> SyncOutcome {
		let Some(_guard) = FlightGuard::acquire(&self.in_flight) else {
			debug!("synchronize dropped, a fetch is already in flight");
			return SyncOutcome::Dropped;
		};

		let request = FetchRequest {
			collection_url: self.config.collection_url.clone(),
			filter_state: filter_state.clone().unwrap_or_default(),
			page,
			section_id: self.config.section_id.clone(),
		};
		let url = request.url();

		let document = match self.fetcher.fetch_document(&url).await {
			Ok(document) => document,
			Err(e) => {
				warn!(%url, "section fetch failed: {e}");
				return SyncOutcome::Failed;
			}
		};

		let fragment = parse_fragment(&document, &self.selectors.filters, &self.selectors.results);
		let mut inner = self.inner.lock().await;

		if let Some(filters_html) = fragment.filters.as_deref() {
			// The typed-but-uncommitted price text is not in filterState;
			// carry it across the replace by parameter name.
			let saved = inner.panel.pending_price_text();
			inner.surface.replace_filters(filters_html);
			inner.panel = FilterPanel::parse(filters_html, &self.selectors);
			inner.panel.restore_price_text(&saved);
		}

		if let Some(results_html) = fragment.results.as_deref() {
			match mode {
				SyncMode::Replace => {
					inner.surface.set_results_hidden(true);
					self.scheduler.delay(SWAP_DELAY).await;
					inner.surface.replace_results(results_html);
					inner.surface.mark_cards_entering();
					self.scheduler.next_frame().await;
					self.scheduler.next_frame().await;
					inner.surface.set_results_hidden(false);
				}
				SyncMode::Append => {
					let cards = extract_cards(results_html, &self.selectors.card);
					let next = read_cursor(results_html, &self.selectors.cursor, &self.config.cursor_attr);
					inner
						.surface
						.update_cursor_marker(next.as_deref().unwrap_or_default());
					for card in &cards {
						inner.surface.mark_card_entering();
						inner.surface.append_card(card);
					}
				}
			}

			inner.next_page_url =
				read_cursor(results_html, &self.selectors.cursor, &self.config.cursor_attr);
			inner.watcher = ScrollWatcher::arm(inner.next_page_url.as_deref());
			if inner.watcher.is_none() {
				debug!("no further pages to load");
			}
		}

		if let Some(state) = filter_state {
			inner.history.replace_query(&state.to_query());
		}

		SyncOutcome::Applied
	}

	/// A generic filter control changed: apply the current form state.
	pub async fn on_form_change(&self) -> SyncOutcome {
		let state = self.inner.lock().await.panel.form_state();
		self.synchronize(Some(state), SyncMode::Replace, None).await
	}

	/// Records typing into a price input without triggering anything.
	pub async fn set_price_text(&self, param: &str, text: &str) -> bool {
		self.inner.lock().await.panel.set_price_text(param, text)
	}

	/// Blur or Enter on a price input: commit every price input into its
	/// companion value, then apply.
	pub async fn commit_price_input(&self, param: &str, text: &str) -> SyncOutcome {
		let state = {
			let mut inner = self.inner.lock().await;
			inner.panel.set_price_text(param, text);
			inner.panel.commit_price_inputs();
			inner.panel.form_state()
		};
		self.synchronize(Some(state), SyncMode::Replace, None).await
	}

	/// Returns the menu's new open state.
	pub async fn toggle_sort_menu(&self) -> bool {
		self.inner.lock().await.panel.toggle_sort_menu()
	}

	/// A click outside the open sort menu closes it. Scoped to this
	/// instance; dropping the synchronizer drops the handler.
	pub async fn outside_click(&self) {
		self.inner.lock().await.panel.close_sort_menu();
	}

	/// Sort option chosen from the non-native dropdown: mirror it into the
	/// native value and apply with the new sort merged into the form state.
	pub async fn select_sort(&self, value: &str) -> SyncOutcome {
		let state = {
			let mut inner = self.inner.lock().await;
			if !inner.panel.select_sort(value) {
				return SyncOutcome::Dropped;
			}
			inner.panel.form_state()
		};
		self.synchronize(Some(state), SyncMode::Replace, None).await
	}

	/// Activation of an active-filter chip: apply the chip's reduced query
	/// as the new filter state instead of navigating.
	pub async fn remove_filter(&self, chip_index: usize) -> SyncOutcome {
		let state = {
			let inner = self.inner.lock().await;
			let Some(chip) = inner.panel.chips().get(chip_index) else {
				debug!(chip_index, "no such filter chip");
				return SyncOutcome::Dropped;
			};
			FilterState::from_query(&chip.query)
		};
		self.synchronize(Some(state), SyncMode::Replace, None).await
	}

	/// The scroll sentinel intersected the viewport. Re-checks the cursor
	/// (it may have changed or vanished since arming); tears the watcher
	/// down when no next page exists, otherwise fetches it in append mode
	/// with the ambient filter state.
	pub async fn on_intersection(&self) -> SyncOutcome {
		let (state, page) = {
			let mut inner = self.inner.lock().await;
			if inner.watcher.is_none() {
				debug!("intersection without an armed watcher");
				return SyncOutcome::Dropped;
			}
			let Some(next) = inner.next_page_url.clone() else {
				inner.watcher = None;
				return SyncOutcome::Dropped;
			};
			let page = next_page_number(&next, &self.config.collection_url);
			let state = FilterState::from_query(&inner.history.current_query());
			(state, page)
		};
		self.synchronize(Some(state), SyncMode::Append, page).await
	}

	pub async fn form_state(&self) -> FilterState {
		self.inner.lock().await.panel.form_state()
	}

	pub async fn watcher_armed(&self) -> bool {
		self.inner.lock().await.watcher.is_some()
	}

	pub async fn sort_menu_open(&self) -> bool {
		self.inner.lock().await.panel.sort_menu_open()
	}

	pub async fn price_text(&self, param: &str) -> Option<String> {
		self.inner
			.lock()
			.await
			.panel
			.price_text(param)
			.map(str::to_owned)
	}

	pub async fn active_chips(&self) -> Vec<FilterChip> {
		self.inner.lock().await.panel.chips().to_vec()
	}
}

/// Scoped acquisition of the single-flight flag; released on every exit
/// path, including unwinds.
struct FlightGuard<'a>(&'a AtomicBool);

impl<'a> FlightGuard<'a> {
	fn acquire(flag: &'a AtomicBool) -> Option<Self> {
		flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
			.is_ok()
			.then(|| Self(flag))
	}
}

impl Drop for FlightGuard<'_> {
	fn drop(&mut self) {
		self.0.store(false, Ordering::Release);
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::AtomicBool;

	use super::FlightGuard;

	#[test]
	fn flight_guard_releases_on_drop() {
		let flag = AtomicBool::new(false);

		let guard = FlightGuard::acquire(&flag).expect("first acquire succeeds");
		assert!(FlightGuard::acquire(&flag).is_none(), "second acquire is refused");

		drop(guard);
		assert!(FlightGuard::acquire(&flag).is_some(), "released after drop");
	}
}
