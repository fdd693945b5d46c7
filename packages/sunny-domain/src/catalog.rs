use crate::product::{Product, ProductFilters};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
	Name,
	Brand,
	Category,
}
impl Field {
	pub const NAME_BRAND: &'static [Field] = &[Field::Name, Field::Brand];
	pub const NAME_BRAND_CATEGORY: &'static [Field] = &[Field::Name, Field::Brand, Field::Category];
	pub const NAME_CATEGORY: &'static [Field] = &[Field::Name, Field::Category];

	pub fn column(self) -> &'static str {
		match self {
			Self::Name => "name",
			Self::Brand => "brand",
			Self::Category => "category",
		}
	}
}

/// A lowercase term that must occur in at least one of `fields`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermMatch {
	pub term: String,
	pub fields: Vec<Field>,
}
impl TermMatch {
	pub fn new(term: &str, fields: &[Field]) -> Self {
		Self { term: term.to_lowercase(), fields: fields.to_vec() }
	}

	pub fn matches(&self, product: &Product) -> bool {
		self.fields.iter().any(|field| match field {
			Field::Name => product.name_contains(&self.term),
			Field::Brand => product.brand_contains(&self.term),
			Field::Category => product.category_contains(&self.term),
		})
	}
}

/// One lexical retrieval phase. A product qualifies when every `all` term matches, at least
/// one `any` term matches (if any are given), it fits the price ceiling and the filters.
#[derive(Debug, Clone, PartialEq)]
pub struct LexicalQuery {
	pub all: Vec<TermMatch>,
	pub any: Vec<TermMatch>,
	pub max_price: Option<f64>,
	pub filters: ProductFilters,
	pub limit: u32,
}
impl LexicalQuery {
	pub fn matches(&self, product: &Product) -> bool {
		if self.max_price.is_some_and(|max| product.price > max) {
			return false;
		}
		if !self.filters.matches(product) {
			return false;
		}

		self.all.iter().all(|term| term.matches(product))
			&& (self.any.is_empty() || self.any.iter().any(|term| term.matches(product)))
	}

	pub fn is_unconstrained(&self) -> bool {
		self.all.is_empty() && self.any.is_empty()
	}
}

/// Nearest-neighbour lookup over product embeddings.
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticQuery {
	pub vector: Vec<f32>,
	pub max_price: Option<f64>,
	pub filters: ProductFilters,
	pub limit: u32,
	/// Cosine distance (`1 - similarity`) above which hits are dropped.
	pub max_distance: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SemanticMatch {
	pub product: Product,
	/// Cosine similarity clamped to `[0, 1]`.
	pub similarity: f32,
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::product::ImageStatus;

	fn product(name: &str, brand: Option<&str>, category: Option<&str>, price: f64) -> Product {
		Product {
			id: name.to_string(),
			name: name.to_string(),
			description: None,
			merchant: "Argos".to_string(),
			brand: brand.map(str::to_string),
			category: category.map(str::to_string),
			canonical_category: None,
			canonical_franchises: Vec::new(),
			price,
			affiliate_link: String::new(),
			image_url: None,
			image_status: ImageStatus::Unknown,
			in_stock: true,
		}
	}

	#[test]
	fn lexical_query_requires_all_terms_and_one_of_any() {
		let query = LexicalQuery {
			all: vec![TermMatch::new("Lego", Field::NAME_BRAND)],
			any: vec![
				TermMatch::new("tower", Field::NAME_CATEGORY),
				TermMatch::new("ship", Field::NAME_CATEGORY),
			],
			max_price: Some(100.0),
			filters: ProductFilters::default(),
			limit: 10,
		};

		assert!(query.matches(&product("Star Wars Tower", Some("LEGO"), Some("Toys"), 99.0)));
		assert!(!query.matches(&product("Star Wars Tower", Some("LEGO"), Some("Toys"), 101.0)));
		assert!(!query.matches(&product("Star Wars Speeder", Some("LEGO"), Some("Toys"), 20.0)));
		assert!(!query.matches(&product("Castle Tower", Some("Playmobil"), Some("Toys"), 20.0)));
	}
}
