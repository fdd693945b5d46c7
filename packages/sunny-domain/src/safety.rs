use sunny_config::Lexicon;

use crate::{product::Product, text};

/// Blocked when the name or description carries a blocked term, or the merchant is blocked.
pub fn is_blocked(product: &Product, lexicon: &Lexicon) -> bool {
	let term_hit = lexicon.blocked_terms.iter().any(|term| {
		product.name_contains(term)
			|| text::contains_lower_opt(product.description.as_deref(), term)
	});

	term_hit
		|| lexicon
			.blocked_merchants
			.iter()
			.any(|merchant| text::contains_lower(&product.merchant, merchant))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::product::ImageStatus;

	fn product(name: &str, description: Option<&str>, merchant: &str) -> Product {
		Product {
			id: "p".to_string(),
			name: name.to_string(),
			description: description.map(str::to_string),
			merchant: merchant.to_string(),
			brand: None,
			category: None,
			canonical_category: None,
			canonical_franchises: Vec::new(),
			price: 10.0,
			affiliate_link: String::new(),
			image_url: None,
			image_status: ImageStatus::Unknown,
			in_stock: true,
		}
	}

	#[test]
	fn blocks_terms_in_description_and_blocked_merchants() {
		let lexicon = Lexicon::default();

		assert!(is_blocked(
			&product("Gift Box", Some("Includes a Diet Pill sampler"), "Boots"),
			&lexicon
		));
		assert!(is_blocked(&product("Gift Hamper", None, "Naked Wines UK"), &lexicon));
		assert!(!is_blocked(&product("Teddy Bear", Some("Soft plush"), "Argos"), &lexicon));
	}
}
