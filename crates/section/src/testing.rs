//! In-memory doubles for the synchronizer's collaborator seams.
//!
//! These stand where a browser would: the surface records its patch log,
//! the history is a plain string, the fetcher serves scripted documents.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use url::Url;

use crate::error::SectionError;
use crate::fetcher::SectionFetcher;
use crate::surface::{FrameScheduler, History, SectionSurface};

/// One recorded surface mutation, in application order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOp {
	ReplaceFilters,
	HideResults,
	ShowResults,
	ReplaceResults,
	MarkEntering,
	MarkCardEntering,
	AppendCard,
	UpdateCursor(String),
}

#[derive(Debug, Clone, Default)]
pub struct SurfaceState {
	pub ops: Vec<PatchOp>,
	pub filters_html: String,
	pub results_html: String,
	pub appended_cards: Vec<String>,
	pub cursor: String,
	pub hidden: bool,
	pub entering_marks: usize,
	pub card_entering_marks: usize,
}

/// Records every patch and materializes the region state it would leave
/// behind. Clones share state, so tests keep one handle while the
/// synchronizer owns another.
#[derive(Clone, Default)]
pub struct MemorySurface(Arc<Mutex<SurfaceState>>);

impl MemorySurface {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn snapshot(&self) -> SurfaceState {
		self.0.lock().expect("surface state poisoned").clone()
	}
}

impl SectionSurface for MemorySurface {
	fn replace_filters(&mut self, html: &str) {
		let mut state = self.0.lock().expect("surface state poisoned");
		state.ops.push(PatchOp::ReplaceFilters);
		state.filters_html = html.to_owned();
	}

	fn set_results_hidden(&mut self, hidden: bool) {
		let mut state = self.0.lock().expect("surface state poisoned");
		state.ops.push(if hidden {
			PatchOp::HideResults
		} else {
			PatchOp::ShowResults
		});
		state.hidden = hidden;
	}

	fn replace_results(&mut self, html: &str) {
		let mut state = self.0.lock().expect("surface state poisoned");
		state.ops.push(PatchOp::ReplaceResults);
		state.results_html = html.to_owned();
		state.appended_cards.clear();
	}

	fn mark_cards_entering(&mut self) {
		let mut state = self.0.lock().expect("surface state poisoned");
		state.ops.push(PatchOp::MarkEntering);
		state.entering_marks += 1;
	}

	fn mark_card_entering(&mut self) {
		let mut state = self.0.lock().expect("surface state poisoned");
		state.ops.push(PatchOp::MarkCardEntering);
		state.card_entering_marks += 1;
	}

	fn append_card(&mut self, html: &str) {
		let mut state = self.0.lock().expect("surface state poisoned");
		state.ops.push(PatchOp::AppendCard);
		state.appended_cards.push(html.to_owned());
	}

	fn update_cursor_marker(&mut self, next: &str) {
		let mut state = self.0.lock().expect("surface state poisoned");
		state.ops.push(PatchOp::UpdateCursor(next.to_owned()));
		state.cursor = next.to_owned();
	}
}

#[derive(Debug, Clone, Default)]
pub struct HistoryState {
	pub query: String,
	pub replacements: Vec<String>,
}

#[derive(Clone, Default)]
pub struct MemoryHistory(Arc<Mutex<HistoryState>>);

impl MemoryHistory {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_query(query: &str) -> Self {
		let history = Self::default();
		history
			.0
			.lock()
			.expect("history state poisoned")
			.query = query.to_owned();
		history
	}

	pub fn snapshot(&self) -> HistoryState {
		self.0.lock().expect("history state poisoned").clone()
	}
}

impl History for MemoryHistory {
	fn current_query(&self) -> String {
		self.0.lock().expect("history state poisoned").query.clone()
	}

	fn replace_query(&mut self, query: &str) {
		let mut state = self.0.lock().expect("history state poisoned");
		state.query = query.to_owned();
		state.replacements.push(query.to_owned());
	}
}

/// Serves a scripted response per fetch, recording the requested URLs.
/// Panics when fetched past the end of the script, which in a test means
/// an unexpected extra request.
#[derive(Default)]
pub struct ScriptedFetcher {
	responses: Mutex<VecDeque<Result<String, StatusCode>>>,
	requests: Mutex<Vec<Url>>,
}

impl ScriptedFetcher {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push_document(&self, html: &str) {
		self.responses
			.lock()
			.expect("responses poisoned")
			.push_back(Ok(html.to_owned()));
	}

	pub fn push_status(&self, status: StatusCode) {
		self.responses
			.lock()
			.expect("responses poisoned")
			.push_back(Err(status));
	}

	pub fn requests(&self) -> Vec<Url> {
		self.requests.lock().expect("requests poisoned").clone()
	}
}

#[async_trait]
impl SectionFetcher for ScriptedFetcher {
	async fn fetch_document(&self, url: &Url) -> Result<String, SectionError> {
		self.requests
			.lock()
			.expect("requests poisoned")
			.push(url.clone());
		let next = self
			.responses
			.lock()
			.expect("responses poisoned")
			.pop_front()
			.unwrap_or_else(|| panic!("no scripted response left for {url}"));
		next.map_err(SectionError::Status)
	}
}

/// Counts scheduling calls and yields immediately.
#[derive(Clone, Default)]
pub struct CountingScheduler {
	delays: Arc<Mutex<Vec<Duration>>>,
	frames: Arc<Mutex<usize>>,
}

impl CountingScheduler {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn delays(&self) -> Vec<Duration> {
		self.delays.lock().expect("delays poisoned").clone()
	}

	pub fn frames(&self) -> usize {
		*self.frames.lock().expect("frames poisoned")
	}
}

#[async_trait]
impl FrameScheduler for CountingScheduler {
	async fn delay(&self, duration: Duration) {
		self.delays.lock().expect("delays poisoned").push(duration);
	}

	async fn next_frame(&self) {
		*self.frames.lock().expect("frames poisoned") += 1;
	}
}
