//! Seams toward the browser facilities the synchronizer would drive.
//!
//! The controller itself is headless: the embedding page supplies the live
//! region sink, the address bar, and the frame clock through these traits,
//! and tests supply in-memory doubles.

use std::time::Duration;

use async_trait::async_trait;

/// Sink for mutations of the live root region. Implementations apply each
/// call to the real DOM; the synchronizer never mutates markup it has
/// already handed over.
pub trait SectionSurface: Send {
	/// Replaces the filter panel's content wholesale. Prior control
	/// bindings die with the discarded nodes; the synchronizer re-binds
	/// from the new markup after this call.
	fn replace_filters(&mut self, html: &str);

	/// Visual fade state of the results container. `true` commits the
	/// faded-out style; `false` requests the fade back in.
	fn set_results_hidden(&mut self, hidden: bool);

	/// Whole-list swap, discarding previously loaded pages.
	fn replace_results(&mut self, html: &str);

	/// Marks every card currently in the results container as entering,
	/// for the CSS-driven entrance animation.
	fn mark_cards_entering(&mut self);

	/// Marks the card about to be appended as entering, so it carries the
	/// entrance style from its first paint. Always immediately followed by
	/// [`Self::append_card`].
	fn mark_card_entering(&mut self);

	/// Appends one card at the end of the results list. Existing cards
	/// stay untouched.
	fn append_card(&mut self, html: &str);

	/// Rewrites the cursor marker's next-page attribute in place. An empty
	/// value means no further pages.
	fn update_cursor_marker(&mut self, next: &str);
}

/// The navigable address. Mirroring uses replace, never push: filter moves
/// must not pollute the back button.
pub trait History: Send {
	/// Ambient query string, used to seed scroll-triggered requests.
	fn current_query(&self) -> String;

	fn replace_query(&mut self, query: &str);
}

/// Paint-order separation for the cross-fade: a fixed delay before the
/// swap, then two nested next-frame yields before restoring visual state,
/// so the faded-out style is committed before the fade-in is requested.
#[async_trait]
pub trait FrameScheduler: Send + Sync {
	async fn delay(&self, duration: Duration);
	async fn next_frame(&self);
}

/// Production scheduler on the tokio clock. A browser embedding would
/// substitute requestAnimationFrame for [`FrameScheduler::next_frame`].
pub struct TokioScheduler;

#[async_trait]
impl FrameScheduler for TokioScheduler {
	async fn delay(&self, duration: Duration) {
		tokio::time::sleep(duration).await;
	}

	async fn next_frame(&self) {
		tokio::task::yield_now().await;
	}
}
