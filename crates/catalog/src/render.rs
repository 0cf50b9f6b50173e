//! HTML rendering of result cards.
//!
//! Produces the same self-contained card markup the server-rendered
//! fragments use, so client-side results drop into the same grid styling.

use crate::engine::{compare_price, min_price};
use crate::product::{FeaturedImage, Product};

/// Renders one product card: link, best-available image, escaped title and
/// an optional price block with a struck-through compare-at price when the
/// product is discounted.
pub fn render_card(product: &Product, show_price: bool) -> String {
	let price = min_price(product);
	let compare = compare_price(product);

	let mut html = format!(
		r#"<a href="/products/{}" class="product-card">"#,
		escape_html(&product.handle)
	);

	if let Some(src) = image_src(product) {
		html.push_str(&format!(
			r#"<img src="{}" alt="{}" class="product-card-image" loading="lazy">"#,
			escape_html(src),
			escape_html(&product.title)
		));
	}

	html.push_str(&format!(
		r#"<h3 class="product-card-title">{}</h3>"#,
		escape_html(&product.title)
	));

	if show_price {
		html.push_str(r#"<div class="product-card-price">"#);
		html.push_str(&format!(
			r#"<span class="price">{}</span>"#,
			format_money(price)
		));
		if let Some(compare) = compare.filter(|c| *c > price) {
			html.push_str(&format!(
				r#"<span class="compare-price">{}</span>"#,
				format_money(compare)
			));
		}
		html.push_str("</div>");
	}

	html.push_str("</a>");
	html
}

/// Image fallback chain: explicit featured image (string or object form),
/// then the primary image object, then the first gallery image.
fn image_src(product: &Product) -> Option<&str> {
	product
		.featured_image
		.as_ref()
		.and_then(FeaturedImage::src)
		.or_else(|| product.image.as_ref().and_then(|i| i.src.as_deref()))
		.or_else(|| product.images.first().and_then(|i| i.src.as_deref()))
}

/// `$1,234.50` style; non-finite amounts render as `$0.00`.
pub fn format_money(amount: f64) -> String {
	let amount = if amount.is_finite() { amount } else { 0.0 };
	let negative = amount < 0.0;
	let cents = (amount.abs() * 100.0).round() as u64;
	let units = cents / 100;
	let fraction = cents % 100;

	let digits = units.to_string();
	let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
	for (i, c) in digits.chars().enumerate() {
		if i > 0 && (digits.len() - i) % 3 == 0 {
			grouped.push(',');
		}
		grouped.push(c);
	}

	let sign = if negative { "-" } else { "" };
	format!("{sign}${grouped}.{fraction:02}")
}

/// Escapes `& < > " '` for interpolation into markup. Applied to every
/// user-controlled text field before rendering.
pub fn escape_html(text: &str) -> String {
	let mut escaped = String::with_capacity(text.len());
	for c in text.chars() {
		match c {
			'&' => escaped.push_str("&amp;"),
			'<' => escaped.push_str("&lt;"),
			'>' => escaped.push_str("&gt;"),
			'"' => escaped.push_str("&quot;"),
			'\'' => escaped.push_str("&#039;"),
			other => escaped.push(other),
		}
	}
	escaped
}
