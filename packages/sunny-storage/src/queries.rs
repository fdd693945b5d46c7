use sqlx::{Postgres, QueryBuilder};

use sunny_domain::{LexicalQuery, Product, ProductFilters, TaxonomyEntry, TermMatch};

use crate::{
	Result,
	db::Db,
	models::{self, PRODUCT_COLUMNS, ProductRow, TaxonomyRow},
};

pub async fn load_taxonomy(db: &Db) -> Result<Vec<TaxonomyEntry>> {
	let rows: Vec<TaxonomyRow> = sqlx::query_as(
		"\
SELECT keyword, kind, subcategory, weight
FROM taxonomy_entries
ORDER BY keyword, kind, updated_at",
	)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows.into_iter().map(TaxonomyEntry::from).collect())
}

pub async fn upsert_taxonomy_entry(db: &Db, entry: &TaxonomyEntry) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO taxonomy_entries (keyword, kind, subcategory, weight)
VALUES ($1, $2, $3, $4)
ON CONFLICT (keyword, kind, (COALESCE(subcategory, '')))
DO UPDATE SET weight = EXCLUDED.weight, updated_at = now()",
	)
	.bind(entry.keyword.as_str())
	.bind(entry.kind.as_str())
	.bind(entry.subcategory.as_deref())
	.bind(entry.weight)
	.execute(&db.pool)
	.await?;

	Ok(())
}

pub async fn upsert_product(db: &Db, product: &Product) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO products (
	id,
	name,
	description,
	merchant,
	brand,
	category,
	canonical_category,
	canonical_franchises,
	price,
	affiliate_link,
	image_url,
	image_status,
	in_stock
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
ON CONFLICT (id) DO UPDATE SET
	name = EXCLUDED.name,
	description = EXCLUDED.description,
	merchant = EXCLUDED.merchant,
	brand = EXCLUDED.brand,
	category = EXCLUDED.category,
	canonical_category = EXCLUDED.canonical_category,
	canonical_franchises = EXCLUDED.canonical_franchises,
	price = EXCLUDED.price,
	affiliate_link = EXCLUDED.affiliate_link,
	image_url = EXCLUDED.image_url,
	image_status = EXCLUDED.image_status,
	in_stock = EXCLUDED.in_stock,
	updated_at = now()",
	)
	.bind(product.id.as_str())
	.bind(product.name.as_str())
	.bind(product.description.as_deref())
	.bind(product.merchant.as_str())
	.bind(product.brand.as_deref())
	.bind(product.category.as_deref())
	.bind(product.canonical_category.as_deref())
	.bind(&product.canonical_franchises)
	.bind(product.price)
	.bind(product.affiliate_link.as_str())
	.bind(product.image_url.as_deref())
	.bind(models::image_status_label(product.image_status))
	.bind(product.in_stock)
	.execute(&db.pool)
	.await?;

	Ok(())
}

/// Runs one lexical phase as case-insensitive containment over the named columns.
pub async fn search_lexical(db: &Db, query: &LexicalQuery) -> Result<Vec<Product>> {
	if query.limit == 0 {
		return Ok(Vec::new());
	}

	let mut builder = lexical_sql(query);
	let rows: Vec<ProductRow> = builder.build_query_as().fetch_all(&db.pool).await?;

	Ok(rows.into_iter().map(Product::from).collect())
}

pub async fn fetch_products_by_ids(db: &Db, ids: &[String]) -> Result<Vec<Product>> {
	if ids.is_empty() {
		return Ok(Vec::new());
	}

	let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ANY($1)");
	let rows: Vec<ProductRow> = sqlx::query_as(&sql).bind(ids).fetch_all(&db.pool).await?;

	Ok(rows.into_iter().map(Product::from).collect())
}

fn lexical_sql(query: &LexicalQuery) -> QueryBuilder<'static, Postgres> {
	let mut builder =
		QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE TRUE"));

	if let Some(max_price) = query.max_price {
		builder.push(" AND price <= ").push_bind(max_price);
	}

	push_filters(&mut builder, &query.filters);

	for term in &query.all {
		builder.push(" AND ");
		push_term(&mut builder, term);
	}

	if !query.any.is_empty() {
		builder.push(" AND (");

		for (index, term) in query.any.iter().enumerate() {
			if index > 0 {
				builder.push(" OR ");
			}

			push_term(&mut builder, term);
		}

		builder.push(")");
	}

	builder.push(" ORDER BY in_stock DESC, id LIMIT ").push_bind(i64::from(query.limit));

	builder
}

fn push_filters(builder: &mut QueryBuilder<'static, Postgres>, filters: &ProductFilters) {
	for (column, value) in [
		("category", filters.category.as_deref()),
		("merchant", filters.merchant.as_deref()),
		("brand", filters.brand.as_deref()),
	] {
		let Some(value) = value else { continue };

		builder.push(format!(" AND {column} ILIKE ")).push_bind(like_pattern(value));
	}
}

fn push_term(builder: &mut QueryBuilder<'static, Postgres>, term: &TermMatch) {
	builder.push("(");

	for (index, field) in term.fields.iter().enumerate() {
		if index > 0 {
			builder.push(" OR ");
		}

		builder.push(field.column()).push(" ILIKE ").push_bind(like_pattern(&term.term));
	}

	if term.fields.is_empty() {
		builder.push("FALSE");
	}

	builder.push(")");
}

/// `%term%` with LIKE metacharacters escaped.
pub fn like_pattern(term: &str) -> String {
	let mut out = String::with_capacity(term.len() + 2);

	out.push('%');

	for ch in term.chars() {
		if matches!(ch, '%' | '_' | '\\') {
			out.push('\\');
		}

		out.push(ch);
	}

	out.push('%');

	out
}
