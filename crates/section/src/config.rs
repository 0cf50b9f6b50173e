use scraper::Selector;
use url::Url;

use crate::error::SectionError;

/// Declares where the synchronizer's markup lives and which collection it
/// browses. Selector defaults match the theme's section markup; pages with
/// different class names override them.
#[derive(Debug, Clone)]
pub struct SectionConfig {
	/// Id of the root region element. Initialization is a no-op when the
	/// initial document has no element with this id.
	pub root_id: String,
	pub filters_selector: String,
	pub results_selector: String,
	pub card_selector: String,
	/// Element inside the results region whose [`Self::cursor_attr`]
	/// attribute carries the next-page URL. Absent or empty means no
	/// further pages.
	pub cursor_selector: String,
	pub cursor_attr: String,
	pub form_selector: String,
	/// Visible price-range inputs, distinguished from other controls: they
	/// commit on blur/Enter instead of on change, through a hidden
	/// companion input named by their `data-param` attribute.
	pub price_input_selector: String,
	pub chips_selector: String,
	pub sort_select_selector: String,
	pub collection_url: Url,
	/// Identifies which server-rendered region the fragment collaborator
	/// should return.
	pub section_id: String,
	/// `false`: the region is server-pre-rendered. `true`: the region
	/// bootstraps itself with an initial fetch.
	pub fetch_on_init: bool,
}

impl SectionConfig {
	pub fn new(
		root_id: impl Into<String>,
		collection_url: Url,
		section_id: impl Into<String>,
	) -> Self {
		Self {
			root_id: root_id.into(),
			filters_selector: ".collection-filters".to_owned(),
			results_selector: ".product-grid".to_owned(),
			card_selector: ".product-card".to_owned(),
			cursor_selector: "#pagination-data".to_owned(),
			cursor_attr: "data-next".to_owned(),
			form_selector: "#filter-form".to_owned(),
			price_input_selector: ".price-input".to_owned(),
			chips_selector: ".active-filters a".to_owned(),
			sort_select_selector: r#"select[name="sort_by"]"#.to_owned(),
			collection_url,
			section_id: section_id.into(),
			fetch_on_init: false,
		}
	}
}

/// Config selectors compiled once at initialization; a selector that does
/// not parse is a programming error in the embedding page and fails
/// initialization.
pub(crate) struct CompiledSelectors {
	pub root: Selector,
	pub filters: Selector,
	pub results: Selector,
	pub card: Selector,
	pub cursor: Selector,
	pub form: Selector,
	pub field: Selector,
	pub price_input: Selector,
	pub chips: Selector,
	pub sort_select: Selector,
	pub option: Selector,
}

impl CompiledSelectors {
	pub fn compile(config: &SectionConfig) -> Result<Self, SectionError> {
		Ok(Self {
			root: parse(&format!("#{}", config.root_id))?,
			filters: parse(&config.filters_selector)?,
			results: parse(&config.results_selector)?,
			card: parse(&config.card_selector)?,
			cursor: parse(&config.cursor_selector)?,
			form: parse(&config.form_selector)?,
			field: parse("input, select")?,
			price_input: parse(&config.price_input_selector)?,
			chips: parse(&config.chips_selector)?,
			sort_select: parse(&config.sort_select_selector)?,
			option: parse("option")?,
		})
	}
}

fn parse(selector: &str) -> Result<Selector, SectionError> {
	Selector::parse(selector).map_err(|e| SectionError::Selector(e.to_string()))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_selectors_compile() {
		let config = SectionConfig::new(
			"collection-root",
			Url::parse("https://shop.example/collections/all").unwrap(),
			"product-grid",
		);
		assert!(CompiledSelectors::compile(&config).is_ok());
	}

	#[test]
	fn broken_selector_fails_compilation() {
		let mut config = SectionConfig::new(
			"collection-root",
			Url::parse("https://shop.example/collections/all").unwrap(),
			"product-grid",
		);
		config.card_selector = ":::".to_owned();
		assert!(matches!(
			CompiledSelectors::compile(&config),
			Err(SectionError::Selector(_))
		));
	}
}
