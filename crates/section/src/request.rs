use url::Url;

use crate::filter_state::FilterState;

/// One fragment request, built fresh per synchronize call and immutable
/// once built. `page: None` means page 1; the parameter is then omitted.
#[derive(Debug, Clone)]
pub struct FetchRequest {
	pub collection_url: Url,
	pub filter_state: FilterState,
	pub page: Option<u32>,
	pub section_id: String,
}

impl FetchRequest {
	/// Query layout: filter parameters first (empty values omitted, any
	/// ambient `page`/`section_id` discarded), then `page` when beyond the
	/// first, then the section identifier for the rendering collaborator.
	pub fn url(&self) -> Url {
		let mut url = self.collection_url.clone();
		{
			let mut pairs = url.query_pairs_mut();
			for (key, value) in self.filter_state.pairs() {
				if value.is_empty() || key == "page" || key == "section_id" {
					continue;
				}
				pairs.append_pair(key, value);
			}
			if let Some(page) = self.page.filter(|page| *page > 1) {
				pairs.append_pair("page", &page.to_string());
			}
			pairs.append_pair("section_id", &self.section_id);
		}
		url
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn request(query: &str, page: Option<u32>) -> FetchRequest {
		FetchRequest {
			collection_url: Url::parse("https://shop.example/collections/summer").unwrap(),
			filter_state: FilterState::from_query(query),
			page,
			section_id: "product-grid".to_owned(),
		}
	}

	#[test]
	fn first_page_is_implicit() {
		assert_eq!(
			request("tag=red", None).url().as_str(),
			"https://shop.example/collections/summer?tag=red&section_id=product-grid"
		);
		assert_eq!(
			request("tag=red", Some(1)).url().as_str(),
			"https://shop.example/collections/summer?tag=red&section_id=product-grid"
		);
	}

	#[test]
	fn later_pages_carry_the_page_parameter() {
		assert_eq!(
			request("tag=red", Some(3)).url().as_str(),
			"https://shop.example/collections/summer?tag=red&page=3&section_id=product-grid"
		);
	}

	#[test]
	fn empty_and_ambient_control_parameters_are_dropped() {
		assert_eq!(
			request("min=&tag=red&page=9&section_id=stale", Some(2)).url().as_str(),
			"https://shop.example/collections/summer?tag=red&page=2&section_id=product-grid"
		);
	}
}
