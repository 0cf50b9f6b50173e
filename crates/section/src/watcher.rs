/// Handle for the single live infinite-scroll subscription.
///
/// Armed only when the results region carries a next-page cursor; torn
/// down and recreated on every results update rather than mutated in
/// place, so it never observes a detached sentinel or a stale cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollWatcher {
	next_url: String,
}

impl ScrollWatcher {
	pub(crate) fn arm(next_url: Option<&str>) -> Option<Self> {
		next_url.filter(|url| !url.is_empty()).map(|url| Self {
			next_url: url.to_owned(),
		})
	}

	/// Cursor snapshot taken at arm time. Intersection handling re-checks
	/// the live cursor; this value only identifies the subscription.
	pub fn next_url(&self) -> &str {
		&self.next_url
	}
}
