use sunny_config::Postgres;
use sunny_domain::{
	Field, ImageStatus, LexicalQuery, ProductFilters, TaxonomyEntry, TaxonomyKind, TermMatch,
};
use sunny_storage::{db::Db, queries};
use sunny_testkit::{TestDatabase, fixtures};

async fn seeded_db(test_db: &TestDatabase) -> Db {
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 1 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	for product in fixtures::sample_catalog() {
		queries::upsert_product(&db, &product).await.expect("Failed to upsert product.");
	}

	db
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set SUNNY_PG_DSN to run."]
async fn db_connects_and_bootstraps_twice() {
	let Some(base_dsn) = sunny_testkit::env_dsn() else {
		eprintln!("Skipping db_connects_and_bootstraps_twice; set SUNNY_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 1 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");
	db.ensure_schema().await.expect("Failed to re-run schema bootstrap.");

	let count: i64 = sqlx::query_scalar(
		"SELECT count(*) FROM information_schema.tables WHERE table_name = 'taxonomy_entries'",
	)
	.fetch_one(&db.pool)
	.await
	.expect("Failed to query schema tables.");

	assert_eq!(count, 1);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set SUNNY_PG_DSN to run."]
async fn taxonomy_upsert_replaces_weight() {
	let Some(base_dsn) = sunny_testkit::env_dsn() else {
		eprintln!("Skipping taxonomy_upsert_replaces_weight; set SUNNY_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = seeded_db(&test_db).await;
	let entry = TaxonomyEntry::new("Trainers", TaxonomyKind::parse("Footwear"), None, Some(1.0));

	queries::upsert_taxonomy_entry(&db, &entry).await.expect("Failed to upsert entry.");
	queries::upsert_taxonomy_entry(&db, &TaxonomyEntry { weight: 1.5, ..entry })
		.await
		.expect("Failed to upsert entry.");

	let entries = queries::load_taxonomy(&db).await.expect("Failed to load taxonomy.");

	assert_eq!(entries.len(), 1);
	assert_eq!(entries[0].keyword, "trainers");
	assert_eq!(entries[0].weight, 1.5);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set SUNNY_PG_DSN to run."]
async fn lexical_phase_matches_terms_price_and_filters() {
	let Some(base_dsn) = sunny_testkit::env_dsn() else {
		eprintln!(
			"Skipping lexical_phase_matches_terms_price_and_filters; set SUNNY_PG_DSN to run."
		);

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = seeded_db(&test_db).await;
	let query = LexicalQuery {
		all: vec![TermMatch::new("frozen", Field::NAME_BRAND)],
		any: vec![TermMatch::new("costume", Field::NAME_CATEGORY)],
		max_price: Some(20.0),
		filters: ProductFilters::default(),
		limit: 10,
	};
	let found = queries::search_lexical(&db, &query).await.expect("Failed to search.");
	let mut ids = found.iter().map(|product| product.id.as_str()).collect::<Vec<_>>();

	ids.sort_unstable();

	assert_eq!(ids, vec!["frozen-anna-costume", "frozen-elsa-costume"]);

	let filtered = LexicalQuery {
		all: vec![TermMatch::new("gift", Field::NAME_BRAND)],
		any: Vec::new(),
		max_price: None,
		filters: ProductFilters::new(None, Some("argos"), None),
		limit: 10,
	};
	let found = queries::search_lexical(&db, &filtered).await.expect("Failed to search.");

	assert_eq!(found.len(), 1);
	assert_eq!(found[0].id, "dad-bbq");

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set SUNNY_PG_DSN to run."]
async fn products_round_trip_through_rows() {
	let Some(base_dsn) = sunny_testkit::env_dsn() else {
		eprintln!("Skipping products_round_trip_through_rows; set SUNNY_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = seeded_db(&test_db).await;
	let ids = vec!["frozen-swimsuit".to_string(), "dad-joke-book".to_string()];
	let mut found =
		queries::fetch_products_by_ids(&db, &ids).await.expect("Failed to fetch products.");

	found.sort_by(|a, b| a.id.cmp(&b.id));

	assert_eq!(found.len(), 2);
	assert_eq!(found[0].image_status, ImageStatus::Broken);
	assert_eq!(found[1].image_status, ImageStatus::Valid);
	assert_eq!(found[1].canonical_franchises, vec!["frozen".to_string()]);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
