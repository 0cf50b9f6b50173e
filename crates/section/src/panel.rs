//! Headless model of the filter panel's interactive controls.
//!
//! Rebuilt from the filters fragment on every panel replacement, which is
//! what "reattaching bindings" means without a DOM: the previous model dies
//! with the discarded markup and a fresh one is parsed from the new one.

use scraper::{ElementRef, Html};
use tracing::debug;

use crate::config::CompiledSelectors;
use crate::filter_state::FilterState;

/// A visible price-range input plus its in-progress, not-yet-applied text.
/// The committed value lives in the form field named by `param`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceInput {
	pub param: String,
	pub text: String,
}

/// An active-filter chip. Its query encodes the filter state with that one
/// filter removed; activating it applies that state instead of navigating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterChip {
	pub label: String,
	pub query: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOption {
	pub value: String,
	pub label: String,
}

/// Non-native dropdown mirroring the native `sort_by` select.
#[derive(Debug, Default)]
struct SortMenu {
	options: Vec<SortOption>,
	selected: Option<String>,
	open: bool,
	initialized: bool,
}

impl SortMenu {
	/// Idempotent: a menu that is already configured keeps its state, so
	/// re-binding never duplicates options.
	fn bind(&mut self, options: Vec<SortOption>, selected: Option<String>) {
		if self.initialized {
			return;
		}
		self.options = options;
		self.selected = selected;
		self.initialized = true;
	}

	fn select(&mut self, value: &str) -> bool {
		if !self.options.iter().any(|option| option.value == value) {
			return false;
		}
		self.selected = Some(value.to_owned());
		self.open = false;
		true
	}
}

/// Filter form state as parsed from the panel markup: serialized fields,
/// price inputs, removal chips, and the sort menu.
#[derive(Debug, Default)]
pub struct FilterPanel {
	fields: FilterState,
	price_inputs: Vec<PriceInput>,
	chips: Vec<FilterChip>,
	sort: SortMenu,
}

impl FilterPanel {
	pub(crate) fn parse(html: &str, selectors: &CompiledSelectors) -> Self {
		let fragment = Html::parse_fragment(html);
		let mut panel = Self::default();

		if let Some(form) = fragment.select(&selectors.form).next() {
			for field in form.select(&selectors.field) {
				serialize_field(&field, selectors, &mut panel.fields);
			}
		}

		for input in fragment.select(&selectors.price_input) {
			if let Some(param) = input.value().attr("data-param") {
				panel.price_inputs.push(PriceInput {
					param: param.to_owned(),
					text: input.value().attr("value").unwrap_or_default().to_owned(),
				});
			}
		}

		for link in fragment.select(&selectors.chips) {
			let href = link.value().attr("href").unwrap_or_default();
			let query = href.split_once('?').map_or("", |(_, q)| q);
			panel.chips.push(FilterChip {
				label: link.text().collect::<String>().trim().to_owned(),
				query: query.to_owned(),
			});
		}

		if let Some(select) = fragment.select(&selectors.sort_select).next() {
			let options: Vec<SortOption> = select
				.select(&selectors.option)
				.map(|option| {
					let label = option.text().collect::<String>().trim().to_owned();
					SortOption {
						value: option
							.value()
							.attr("value")
							.map_or_else(|| label.clone(), str::to_owned),
						label,
					}
				})
				.collect();
			let selected = select
				.select(&selectors.option)
				.find(|option| option.value().attr("selected").is_some())
				.and_then(|option| option.value().attr("value"))
				.map(str::to_owned);
			panel.sort.bind(options, selected);
		}

		panel
	}

	/// Current serialized form state; read on demand, never cached across
	/// reconciliation.
	pub fn form_state(&self) -> FilterState {
		self.fields.clone()
	}

	/// User-typed, not-yet-applied price text, keyed by parameter name.
	pub(crate) fn pending_price_text(&self) -> Vec<(String, String)> {
		self.price_inputs
			.iter()
			.filter(|input| !input.text.is_empty())
			.map(|input| (input.param.clone(), input.text.clone()))
			.collect()
	}

	/// Restores captured price text into the freshly parsed inputs.
	pub(crate) fn restore_price_text(&mut self, saved: &[(String, String)]) {
		for (param, text) in saved {
			if text.is_empty() {
				continue;
			}
			if let Some(input) = self.price_inputs.iter_mut().find(|i| &i.param == param) {
				input.text.clone_from(text);
			}
		}
	}

	/// Records typing into a price input. No synchronization happens until
	/// the value is committed.
	pub fn set_price_text(&mut self, param: &str, text: &str) -> bool {
		match self.price_inputs.iter_mut().find(|i| i.param == param) {
			Some(input) => {
				input.text = text.to_owned();
				true
			}
			None => {
				debug!(param, "no price input with this parameter");
				false
			}
		}
	}

	pub fn price_text(&self, param: &str) -> Option<&str> {
		self.price_inputs
			.iter()
			.find(|i| i.param == param)
			.map(|i| i.text.as_str())
	}

	/// Commits every price input into its companion form value: decimal
	/// text (comma or dot separator) rounds to an integer; empty or
	/// unparseable text clears the companion, leaving that bound open.
	/// An input whose markup carried no companion field of that name is
	/// skipped rather than inventing the parameter.
	pub fn commit_price_inputs(&mut self) {
		for input in &self.price_inputs {
			if self.fields.get(&input.param).is_none() {
				debug!(param = %input.param, "price input without a companion field");
				continue;
			}
			match parse_price_value(&input.text) {
				Some(value) => self.fields.set(&input.param, value.to_string()),
				None => self.fields.set(&input.param, ""),
			}
		}
	}

	/// Returns the new open state.
	pub fn toggle_sort_menu(&mut self) -> bool {
		self.sort.open = !self.sort.open;
		self.sort.open
	}

	pub fn close_sort_menu(&mut self) {
		self.sort.open = false;
	}

	pub fn sort_menu_open(&self) -> bool {
		self.sort.open
	}

	/// Mirrors the chosen option into the native `sort_by` value, updates
	/// the visual selection, and closes the menu. Unknown values are
	/// ignored.
	pub fn select_sort(&mut self, value: &str) -> bool {
		if !self.sort.select(value) {
			debug!(value, "unknown sort option");
			return false;
		}
		self.fields.set("sort_by", value);
		true
	}

	pub fn sort_selected(&self) -> Option<&str> {
		self.sort.selected.as_deref()
	}

	pub fn sort_options(&self) -> &[SortOption] {
		&self.sort.options
	}

	pub fn chips(&self) -> &[FilterChip] {
		&self.chips
	}
}

/// Serializes one form control the way a form submission would, skipping
/// visible price inputs (their committed value travels in the hidden
/// companion field).
fn serialize_field(field: &ElementRef<'_>, selectors: &CompiledSelectors, out: &mut FilterState) {
	if selectors.price_input.matches(field) {
		return;
	}
	let element = field.value();
	let Some(name) = element.attr("name").filter(|n| !n.is_empty()) else {
		return;
	};

	match element.name() {
		"select" => {
			let options: Vec<ElementRef<'_>> = field.select(&selectors.option).collect();
			let chosen = options
				.iter()
				.find(|o| o.value().attr("selected").is_some())
				.or_else(|| options.first());
			let value = chosen.map_or_else(String::new, |option| {
				option.value().attr("value").map_or_else(
					|| option.text().collect::<String>().trim().to_owned(),
					str::to_owned,
				)
			});
			out.append(name, value);
		}
		"input" => {
			let kind = element
				.attr("type")
				.unwrap_or("text")
				.to_ascii_lowercase();
			match kind.as_str() {
				"submit" | "button" | "reset" | "image" | "file" => {}
				"checkbox" | "radio" => {
					if element.attr("checked").is_some() {
						let value = element.attr("value").unwrap_or("on");
						out.append(name, value);
					}
				}
				_ => out.append(name, element.attr("value").unwrap_or_default()),
			}
		}
		_ => {}
	}
}

fn parse_price_value(text: &str) -> Option<i64> {
	let trimmed = text.trim();
	if trimmed.is_empty() {
		return None;
	}
	trimmed
		.replace(',', ".")
		.parse::<f64>()
		.ok()
		.map(|value| value.round() as i64)
}

#[cfg(test)]
mod tests {
	use url::Url;

	use super::*;
	use crate::config::{CompiledSelectors, SectionConfig};

	fn selectors() -> CompiledSelectors {
		let config = SectionConfig::new(
			"collection-root",
			Url::parse("https://shop.example/collections/all").unwrap(),
			"product-grid",
		);
		CompiledSelectors::compile(&config).unwrap()
	}

	const PANEL: &str = r#"
		<form id="filter-form">
			<input type="checkbox" name="availability" value="1" checked>
			<input type="checkbox" name="tag" value="red">
			<input type="checkbox" name="tag" value="blue" checked>
			<select name="sort_by">
				<option value="newest">Newest</option>
				<option value="price-ascending" selected>Price, low to high</option>
			</select>
			<input type="text" class="price-input" data-param="filter.price.gte" value="">
			<input type="hidden" name="filter.price.gte" value="">
			<input type="text" class="price-input" data-param="filter.price.lte" value="50">
			<input type="hidden" name="filter.price.lte" value="50">
			<input type="submit" value="Apply">
		</form>
		<div class="active-filters">
			<a href="/collections/all?tag=blue&sort_by=price-ascending">remove red</a>
			<a href="?sort_by=price-ascending">remove blue</a>
		</div>
	"#;

	#[test]
	fn serializes_fields_like_a_form_submission() {
		let panel = FilterPanel::parse(PANEL, &selectors());
		let state = panel.form_state();

		assert_eq!(
			state.to_query(),
			"availability=1&tag=blue&sort_by=price-ascending&filter.price.lte=50"
		);
		assert_eq!(state.get("filter.price.gte"), Some(""), "empty bound kept in state");
	}

	#[test]
	fn price_commit_accepts_comma_and_dot_and_rounds() {
		let mut panel = FilterPanel::parse(PANEL, &selectors());

		assert!(panel.set_price_text("filter.price.gte", "12,5"));
		panel.commit_price_inputs();
		assert_eq!(panel.form_state().get("filter.price.gte"), Some("13"));

		assert!(panel.set_price_text("filter.price.gte", "9.2"));
		panel.commit_price_inputs();
		assert_eq!(panel.form_state().get("filter.price.gte"), Some("9"));
	}

	#[test]
	fn unparseable_price_clears_the_bound() {
		let mut panel = FilterPanel::parse(PANEL, &selectors());

		panel.set_price_text("filter.price.lte", "cheap");
		panel.commit_price_inputs();
		assert_eq!(panel.form_state().get("filter.price.lte"), Some(""));
		assert!(!panel.form_state().to_query().contains("filter.price.lte"));
	}

	#[test]
	fn commit_skips_price_inputs_without_a_companion_field() {
		let orphan = r#"
			<form id="filter-form">
				<input type="text" class="price-input" data-param="filter.price.gte" value="20">
			</form>
		"#;
		let mut panel = FilterPanel::parse(orphan, &selectors());

		panel.commit_price_inputs();

		assert_eq!(
			panel.form_state().get("filter.price.gte"),
			None,
			"no companion field in the markup means nothing to commit into"
		);
	}

	#[test]
	fn pending_price_text_survives_a_reparse() {
		let mut panel = FilterPanel::parse(PANEL, &selectors());
		panel.set_price_text("filter.price.gte", "15");

		let saved = panel.pending_price_text();
		let mut fresh = FilterPanel::parse(PANEL, &selectors());
		fresh.restore_price_text(&saved);

		assert_eq!(fresh.price_text("filter.price.gte"), Some("15"));
		assert_eq!(fresh.price_text("filter.price.lte"), Some("50"));
	}

	#[test]
	fn sort_menu_mirrors_the_native_select() {
		let mut panel = FilterPanel::parse(PANEL, &selectors());
		assert_eq!(panel.sort_selected(), Some("price-ascending"));

		assert!(panel.toggle_sort_menu());
		assert!(panel.select_sort("newest"));
		assert!(!panel.sort_menu_open(), "selecting closes the menu");
		assert_eq!(panel.sort_selected(), Some("newest"));
		assert_eq!(panel.form_state().get("sort_by"), Some("newest"));

		assert!(!panel.select_sort("best-selling"), "unknown value ignored");
		assert_eq!(panel.sort_selected(), Some("newest"));
	}

	#[test]
	fn sort_bind_is_idempotent() {
		let mut panel = FilterPanel::parse(PANEL, &selectors());
		let before = panel.sort_options().len();

		panel.sort.bind(
			vec![SortOption {
				value: "dup".to_owned(),
				label: "Dup".to_owned(),
			}],
			None,
		);

		assert_eq!(panel.sort_options().len(), before);
		assert_eq!(panel.sort_selected(), Some("price-ascending"));
	}

	#[test]
	fn chips_carry_the_reduced_query() {
		let panel = FilterPanel::parse(PANEL, &selectors());
		assert_eq!(panel.chips().len(), 2);
		assert_eq!(panel.chips()[0].label, "remove red");
		assert_eq!(panel.chips()[0].query, "tag=blue&sort_by=price-ascending");
		assert_eq!(panel.chips()[1].query, "sort_by=price-ascending");
	}

	#[test]
	fn outside_click_closes_an_open_menu() {
		let mut panel = FilterPanel::parse(PANEL, &selectors());
		panel.toggle_sort_menu();
		panel.close_sort_menu();
		assert!(!panel.sort_menu_open());
	}
}
