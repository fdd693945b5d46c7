use std::sync::Arc;

use axum::{
	Router,
	body::{self, Body},
	http::{Request, StatusCode},
};
use tower::util::ServiceExt;

use sunny_api::{routes, state::AppState};
use sunny_config::EmbeddingProviderConfig;
use sunny_domain::{LexicalQuery, Product, SemanticMatch, SemanticQuery, TaxonomyEntry};
use sunny_service::{
	BoxFuture, Catalog, EmbeddingProvider, Error, Providers, Result, SunnyService, TaxonomySource,
};
use sunny_testkit::fixtures;

struct FixtureCatalog {
	available: bool,
}
impl Catalog for FixtureCatalog {
	fn lexical<'a>(&'a self, query: &'a LexicalQuery) -> BoxFuture<'a, Result<Vec<Product>>> {
		Box::pin(async move {
			if !self.available {
				return Err(Error::CatalogUnavailable { message: "pool timed out".to_string() });
			}

			Ok(fixtures::sample_catalog()
				.into_iter()
				.filter(|product| query.matches(product))
				.take(query.limit as usize)
				.collect())
		})
	}

	fn nearest<'a>(
		&'a self,
		_query: &'a SemanticQuery,
	) -> BoxFuture<'a, Result<Vec<SemanticMatch>>> {
		Box::pin(async move { Ok(Vec::new()) })
	}
}
impl TaxonomySource for FixtureCatalog {
	fn load_taxonomy<'a>(&'a self) -> BoxFuture<'a, Result<Vec<TaxonomyEntry>>> {
		Box::pin(async move { Ok(fixtures::sample_taxonomy()) })
	}
}

struct FixedEmbedding;
impl EmbeddingProvider for FixedEmbedding {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>> {
		let vec = vec![0.5; cfg.dimensions as usize];

		Box::pin(async move { Ok(vec![vec; texts.len()]) })
	}
}

async fn app(available: bool) -> Router {
	let catalog = Arc::new(FixtureCatalog { available });
	let service = SunnyService::with_collaborators(
		fixtures::config(),
		catalog.clone(),
		catalog,
		Providers::new(Arc::new(FixedEmbedding)),
	)
	.await
	.expect("Failed to build service.");

	routes::router(AppState::from_service(service))
}

async fn post_search(app: Router, payload: serde_json::Value) -> (StatusCode, serde_json::Value) {
	let response = app
		.oneshot(
			Request::builder()
				.method("POST")
				.uri("/v1/search")
				.header("content-type", "application/json")
				.body(Body::from(payload.to_string()))
				.expect("Failed to build request."),
		)
		.await
		.expect("Failed to call search.");
	let status = response.status();
	let body = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");
	let json = serde_json::from_slice(&body).expect("Failed to parse response.");

	(status, json)
}

#[tokio::test]
async fn health_ok() {
	let response = app(true)
		.await
		.oneshot(Request::builder().uri("/health").body(Body::empty()).expect("Failed to build."))
		.await
		.expect("Failed to call /health.");

	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn search_returns_ranked_products() {
	let (status, json) = post_search(
		app(true).await,
		serde_json::json!({ "query": "gift for dad", "limit": 2, "filterMerchant": null }),
	)
	.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["totalCount"], 3);
	assert_eq!(json["hasMore"], true);
	assert_eq!(json["degraded"], false);
	assert_eq!(json["products"].as_array().map(Vec::len), Some(2));
	assert!(json["products"][0]["id"].is_string());
}

#[tokio::test]
async fn search_groups_variants_on_request() {
	let (status, json) = post_search(
		app(true).await,
		serde_json::json!({ "query": "nike trainers size 8", "groupVariants": true }),
	)
	.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["products"][0]["hasMultipleSizes"], true);
	assert_eq!(json["products"][0]["variants"][0]["size"], "7");
}

#[tokio::test]
async fn invalid_limit_is_a_bad_request() {
	let (status, json) =
		post_search(app(true).await, serde_json::json!({ "query": "lego", "limit": 0 })).await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(json["error_code"], "INVALID_REQUEST");
	assert_eq!(json["retryable"], false);
}

#[tokio::test]
async fn unavailable_catalog_is_retryable() {
	let (status, json) =
		post_search(app(false).await, serde_json::json!({ "query": "lego" })).await;

	assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
	assert_eq!(json["error_code"], "CATALOG_UNAVAILABLE");
	assert_eq!(json["retryable"], true);
}
