use url::form_urlencoded;

/// Ordered multimap of filter parameters, the headless equivalent of the
/// filter form's serialized state. Duplicate keys carry multi-valued
/// filters; empty-string values stay in the state (an unbounded price field
/// still exists on the form) but are omitted from every serialized query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState(Vec<(String, String)>);

impl FilterState {
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses a query string, with or without the leading `?`.
	pub fn from_query(query: &str) -> Self {
		let query = query.strip_prefix('?').unwrap_or(query);
		Self(
			form_urlencoded::parse(query.as_bytes())
				.map(|(k, v)| (k.into_owned(), v.into_owned()))
				.collect(),
		)
	}

	pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
		self.0.push((name.into(), value.into()));
	}

	/// Replaces every value of `name` with a single one, appending when the
	/// parameter was absent.
	pub fn set(&mut self, name: &str, value: impl Into<String>) {
		self.0.retain(|(k, _)| k != name);
		self.0.push((name.to_owned(), value.into()));
	}

	pub fn remove(&mut self, name: &str) {
		self.0.retain(|(k, _)| k != name);
	}

	/// First value of `name`, when present.
	pub fn get(&self, name: &str) -> Option<&str> {
		self.0
			.iter()
			.find(|(k, _)| k == name)
			.map(|(_, v)| v.as_str())
	}

	pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Serializes to `application/x-www-form-urlencoded`, omitting
	/// empty-string values.
	pub fn to_query(&self) -> String {
		let mut serializer = form_urlencoded::Serializer::new(String::new());
		for (key, value) in self.pairs() {
			if !value.is_empty() {
				serializer.append_pair(key, value);
			}
		}
		serializer.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn round_trips_multi_valued_keys_in_order() {
		let state = FilterState::from_query("?tag=red&tag=blue&sort_by=newest");
		assert_eq!(state.get("tag"), Some("red"));
		assert_eq!(state.to_query(), "tag=red&tag=blue&sort_by=newest");
	}

	#[test]
	fn empty_values_are_kept_in_state_but_omitted_from_queries() {
		let mut state = FilterState::from_query("min=&tag=red");
		assert_eq!(state.get("min"), Some(""));
		assert_eq!(state.to_query(), "tag=red");

		state.set("min", "10");
		assert_eq!(state.to_query(), "tag=red&min=10");
	}

	#[test]
	fn set_collapses_duplicates() {
		let mut state = FilterState::from_query("tag=red&tag=blue");
		state.set("tag", "green");
		assert_eq!(state.to_query(), "tag=green");
	}

	#[test]
	fn decodes_encoded_pairs() {
		let state = FilterState::from_query("filter.v.price.gte=10&q=caf%C3%A9%20negro");
		assert_eq!(state.get("q"), Some("café negro"));
	}
}
