//! Incremental, fragment-driven catalog browsing for a storefront section.
//!
//! The [`SectionSynchronizer`] owns one root UI region (filter form,
//! results container, scroll sentinel). On any filter change, sort change,
//! or scroll-triggered page request it fetches a server-rendered HTML
//! fragment for the new filter/sort/page combination, reconciles the named
//! regions into the live surface without visual disruption, re-binds the
//! panel controls, re-arms the infinite-scroll watcher, and mirrors the
//! applied filter state into the navigable address — all under a
//! single-flight concurrency guard.
//!
//! Browser facilities are trait seams ([`SectionSurface`], [`History`],
//! [`FrameScheduler`]); fragment parsing is pure and headless. The
//! alternate, fully client-side strategy lives in `sf-catalog`.

mod config;
mod error;
mod fetcher;
mod filter_state;
mod fragment;
mod panel;
mod request;
mod surface;
mod synchronizer;
pub mod testing;
mod watcher;

pub use config::SectionConfig;
pub use error::SectionError;
pub use fetcher::{HttpSectionFetcher, SectionFetcher};
pub use filter_state::FilterState;
pub use fragment::{
	extract_cards, next_page_number, parse_fragment, read_cursor, SectionFragment,
};
pub use panel::{FilterChip, FilterPanel, PriceInput, SortOption};
pub use request::FetchRequest;
pub use surface::{FrameScheduler, History, SectionSurface, TokioScheduler};
pub use synchronizer::{SectionSynchronizer, SyncMode, SyncOutcome};
pub use watcher::ScrollWatcher;

pub use scraper::Selector;
