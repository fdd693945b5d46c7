use serde::{Deserialize, Serialize};

use crate::text;

/// A catalog row as the ranking pipeline sees it. Owned by the catalog; never mutated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
	pub id: String,
	pub name: String,
	pub description: Option<String>,
	pub merchant: String,
	pub brand: Option<String>,
	pub category: Option<String>,
	pub canonical_category: Option<String>,
	#[serde(default)]
	pub canonical_franchises: Vec<String>,
	pub price: f64,
	pub affiliate_link: String,
	pub image_url: Option<String>,
	#[serde(default)]
	pub image_status: ImageStatus,
	pub in_stock: bool,
}
impl Product {
	pub fn name_contains(&self, needle: &str) -> bool {
		text::contains_lower(&self.name, needle)
	}

	pub fn brand_contains(&self, needle: &str) -> bool {
		text::contains_lower_opt(self.brand.as_deref(), needle)
	}

	pub fn category_contains(&self, needle: &str) -> bool {
		text::contains_lower_opt(self.category.as_deref(), needle)
	}

	/// Name or brand only, never the description.
	pub fn name_or_brand_contains(&self, needle: &str) -> bool {
		self.name_contains(needle) || self.brand_contains(needle)
	}
}

/// A product with its final relevance score, as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedProduct {
	#[serde(flatten)]
	pub product: Product,
	pub score: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageStatus {
	#[default]
	Unknown,
	Valid,
	Broken,
}
impl ImageStatus {
	pub fn parse(raw: Option<&str>) -> Self {
		match raw.map(|value| value.trim().to_ascii_lowercase()).as_deref() {
			Some("valid" | "working") => Self::Valid,
			Some("broken" | "broken_at_source") => Self::Broken,
			_ => Self::Unknown,
		}
	}
}

/// Caller-supplied narrowing filters. Each is a case-insensitive containment check.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilters {
	pub category: Option<String>,
	pub merchant: Option<String>,
	pub brand: Option<String>,
}
impl ProductFilters {
	pub fn new(
		category: Option<&str>,
		merchant: Option<&str>,
		brand: Option<&str>,
	) -> Self {
		Self { category: clean(category), merchant: clean(merchant), brand: clean(brand) }
	}

	pub fn is_empty(&self) -> bool {
		self.category.is_none() && self.merchant.is_none() && self.brand.is_none()
	}

	pub fn matches(&self, product: &Product) -> bool {
		if let Some(category) = self.category.as_deref()
			&& !product.category_contains(category)
		{
			return false;
		}
		if let Some(merchant) = self.merchant.as_deref()
			&& !text::contains_lower(&product.merchant, merchant)
		{
			return false;
		}
		if let Some(brand) = self.brand.as_deref()
			&& !product.brand_contains(brand)
		{
			return false;
		}

		true
	}
}

fn clean(value: Option<&str>) -> Option<String> {
	value.map(|raw| raw.trim().to_lowercase()).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn product() -> Product {
		Product {
			id: "p-1".to_string(),
			name: "Nike Revolution 7 Trainers".to_string(),
			description: Some("Lightweight running shoe".to_string()),
			merchant: "JD Sports".to_string(),
			brand: Some("Nike".to_string()),
			category: Some("Children's Footwear".to_string()),
			canonical_category: Some("Footwear".to_string()),
			canonical_franchises: Vec::new(),
			price: 34.99,
			affiliate_link: "https://example.test/p-1".to_string(),
			image_url: None,
			image_status: ImageStatus::Unknown,
			in_stock: true,
		}
	}

	#[test]
	fn image_status_parses_source_variants() {
		assert_eq!(ImageStatus::parse(Some("BROKEN_AT_SOURCE")), ImageStatus::Broken);
		assert_eq!(ImageStatus::parse(Some("working")), ImageStatus::Valid);
		assert_eq!(ImageStatus::parse(Some("pending")), ImageStatus::Unknown);
		assert_eq!(ImageStatus::parse(None), ImageStatus::Unknown);
	}

	#[test]
	fn filters_match_case_insensitively_and_ignore_blank_values() {
		let filters = ProductFilters::new(Some(" footwear "), Some(""), Some("NIKE"));

		assert_eq!(filters.merchant, None);
		assert!(filters.matches(&product()));

		let filters = ProductFilters::new(None, Some("argos"), None);

		assert!(!filters.matches(&product()));
	}
}
