//! Pure fragment parsing: a fetched HTML document in, owned markup out.
//!
//! Nothing here touches the live region or awaits; the scraper DOM never
//! escapes these functions, so callers can hold results across awaits.

use scraper::{Html, Selector};
use url::Url;

/// The two named regions extracted from a fetched document. Either may be
/// absent when the source fragment lacks that region.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionFragment {
	pub filters: Option<String>,
	pub results: Option<String>,
}

/// Extracts the filter-panel and results regions from a full document,
/// ignoring the rest of it.
pub fn parse_fragment(html: &str, filters: &Selector, results: &Selector) -> SectionFragment {
	let document = Html::parse_document(html);
	SectionFragment {
		filters: document.select(filters).next().map(|el| el.inner_html()),
		results: document.select(results).next().map(|el| el.inner_html()),
	}
}

/// Individual card elements of a results region, outer markup included,
/// in document order.
pub fn extract_cards(results_html: &str, card: &Selector) -> Vec<String> {
	Html::parse_fragment(results_html)
		.select(card)
		.map(|el| el.html())
		.collect()
}

/// Next-page URL from the cursor marker inside a results region. `None`
/// when the marker is missing or its attribute is empty.
pub fn read_cursor(results_html: &str, cursor: &Selector, attr: &str) -> Option<String> {
	Html::parse_fragment(results_html)
		.select(cursor)
		.next()
		.and_then(|el| el.value().attr(attr))
		.filter(|value| !value.is_empty())
		.map(str::to_owned)
}

/// Target page number encoded in a (possibly relative) cursor URL.
pub fn next_page_number(next_url: &str, base: &Url) -> Option<u32> {
	let url = base.join(next_url).ok()?;
	url.query_pairs()
		.find(|(key, _)| key == "page")
		.and_then(|(_, value)| value.parse().ok())
}
