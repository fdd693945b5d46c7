const SCHEMA: &str = "\
CREATE EXTENSION IF NOT EXISTS pg_trgm;

CREATE TABLE IF NOT EXISTS products (
	id TEXT PRIMARY KEY,
	name TEXT NOT NULL,
	description TEXT,
	merchant TEXT NOT NULL,
	brand TEXT,
	category TEXT,
	canonical_category TEXT,
	canonical_franchises TEXT[] NOT NULL DEFAULT '{}',
	price DOUBLE PRECISION NOT NULL CHECK (price >= 0),
	affiliate_link TEXT NOT NULL,
	image_url TEXT,
	image_status TEXT,
	in_stock BOOLEAN NOT NULL DEFAULT TRUE,
	updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX IF NOT EXISTS idx_products_name_trgm ON products USING gin (name gin_trgm_ops);

CREATE INDEX IF NOT EXISTS idx_products_brand_trgm ON products USING gin (brand gin_trgm_ops);

CREATE INDEX IF NOT EXISTS idx_products_category_trgm
	ON products USING gin (category gin_trgm_ops);

CREATE INDEX IF NOT EXISTS idx_products_price ON products (price);

CREATE TABLE IF NOT EXISTS taxonomy_entries (
	keyword TEXT NOT NULL,
	kind TEXT NOT NULL,
	subcategory TEXT,
	weight REAL,
	updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_taxonomy_entries_identity
	ON taxonomy_entries (keyword, kind, (COALESCE(subcategory, '')))";

/// Schema statements in execution order.
pub fn statements() -> impl Iterator<Item = &'static str> {
	SCHEMA.split(';').map(str::trim).filter(|statement| !statement.is_empty())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn schema_splits_into_statements() {
		let statements = statements().collect::<Vec<_>>();

		assert_eq!(statements.len(), 8);
		assert!(statements[0].starts_with("CREATE EXTENSION"));
		assert!(statements.iter().all(|statement| !statement.ends_with(';')));
	}
}
