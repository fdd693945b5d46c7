use sunny_domain::{ImageStatus, Product, TaxonomyEntry, TaxonomyKind};

pub const PRODUCT_COLUMNS: &str = "\
id, name, description, merchant, brand, category, canonical_category, canonical_franchises, \
price, affiliate_link, image_url, image_status, in_stock";

#[derive(Debug, sqlx::FromRow)]
pub struct ProductRow {
	pub id: String,
	pub name: String,
	pub description: Option<String>,
	pub merchant: String,
	pub brand: Option<String>,
	pub category: Option<String>,
	pub canonical_category: Option<String>,
	pub canonical_franchises: Vec<String>,
	pub price: f64,
	pub affiliate_link: String,
	pub image_url: Option<String>,
	pub image_status: Option<String>,
	pub in_stock: bool,
}
impl From<ProductRow> for Product {
	fn from(row: ProductRow) -> Self {
		Self {
			image_status: ImageStatus::parse(row.image_status.as_deref()),
			id: row.id,
			name: row.name,
			description: row.description,
			merchant: row.merchant,
			brand: row.brand,
			category: row.category,
			canonical_category: row.canonical_category,
			canonical_franchises: row.canonical_franchises,
			price: row.price,
			affiliate_link: row.affiliate_link,
			image_url: row.image_url,
			in_stock: row.in_stock,
		}
	}
}

#[derive(Debug, sqlx::FromRow)]
pub struct TaxonomyRow {
	pub keyword: String,
	pub kind: String,
	pub subcategory: Option<String>,
	pub weight: Option<f32>,
}
impl From<TaxonomyRow> for TaxonomyEntry {
	fn from(row: TaxonomyRow) -> Self {
		TaxonomyEntry::new(
			&row.keyword,
			TaxonomyKind::parse(&row.kind),
			row.subcategory.as_deref(),
			row.weight,
		)
	}
}

pub fn image_status_label(status: ImageStatus) -> Option<&'static str> {
	match status {
		ImageStatus::Unknown => None,
		ImageStatus::Valid => Some("valid"),
		ImageStatus::Broken => Some("broken"),
	}
}
