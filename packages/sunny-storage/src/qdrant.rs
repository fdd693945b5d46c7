use std::collections::HashMap;

use qdrant_client::{
	client::Payload,
	qdrant::{
		Condition, CreateCollectionBuilder, Distance, Filter, PointStruct, Query,
		QueryPointsBuilder, Range, UpsertPointsBuilder, Value, Vector, VectorParamsBuilder,
		VectorsConfigBuilder, value::Kind,
	},
};
use uuid::Uuid;

use sunny_domain::{Product, ProductFilters, SemanticQuery};

use crate::{Error, Result};

pub const DENSE_VECTOR_NAME: &str = "dense";
pub const PRODUCT_ID_KEY: &str = "product_id";
pub const PRICE_KEY: &str = "price";
pub const MERCHANT_KEY: &str = "merchant";
pub const CATEGORY_KEY: &str = "category";
pub const BRAND_KEY: &str = "brand";

/// Namespace for deriving point ids from catalog product ids.
const POINT_NAMESPACE: Uuid = Uuid::from_u128(0x5c2b_7d1e_8f4a_4b6c_9e3d_1a2b_3c4d_5e6f);

pub struct QdrantStore {
	pub client: qdrant_client::Qdrant,
	pub collection: String,
	pub vector_dim: u32,
}
impl QdrantStore {
	pub fn new(cfg: &sunny_config::Qdrant) -> Result<Self> {
		let client = qdrant_client::Qdrant::from_url(&cfg.url).build()?;

		Ok(Self { client, collection: cfg.collection.clone(), vector_dim: cfg.vector_dim })
	}

	/// Nearest products by cosine similarity, most similar first. Hits farther than
	/// `query.max_distance`, over the price ceiling or outside the filters are dropped
	/// server-side, before the limit applies.
	pub async fn nearest(&self, query: &SemanticQuery) -> Result<Vec<NearestProduct>> {
		if query.vector.len() != self.vector_dim as usize {
			return Err(Error::InvalidArgument(format!(
				"Query vector has {} dimensions; collection expects {}.",
				query.vector.len(),
				self.vector_dim
			)));
		}

		let mut search = QueryPointsBuilder::new(self.collection.clone())
			.query(Query::new_nearest(query.vector.clone()))
			.using(DENSE_VECTOR_NAME)
			.with_payload(true)
			.score_threshold(1.0 - query.max_distance)
			.limit(u64::from(query.limit));

		if let Some(filter) = search_filter(query.max_price, &query.filters) {
			search = search.filter(filter);
		}

		let response = self.client.query(search).await?;

		Ok(response
			.result
			.into_iter()
			.filter_map(|point| {
				let product_id = payload_string(&point.payload, PRODUCT_ID_KEY)?;

				Some(NearestProduct { product_id, similarity: point.score.clamp(0.0, 1.0) })
			})
			.collect())
	}

	pub async fn ensure_collection(&self) -> Result<()> {
		if self.client.collection_exists(self.collection.clone()).await? {
			return Ok(());
		}

		let mut vectors_config = VectorsConfigBuilder::default();

		vectors_config.add_named_vector_params(
			DENSE_VECTOR_NAME,
			VectorParamsBuilder::new(self.vector_dim.into(), Distance::Cosine),
		);

		self.client
			.create_collection(
				CreateCollectionBuilder::new(self.collection.clone())
					.vectors_config(vectors_config),
			)
			.await?;

		Ok(())
	}

	/// Stores the product's vector with the payload `nearest` filters on. Text fields are
	/// lowercased so substring conditions behave like the catalog's case-insensitive filters.
	pub async fn upsert_product_vector(&self, product: &Product, vector: Vec<f32>) -> Result<()> {
		if vector.len() != self.vector_dim as usize {
			return Err(Error::InvalidArgument(format!(
				"Product {} vector has {} dimensions; collection expects {}.",
				product.id,
				vector.len(),
				self.vector_dim
			)));
		}

		let mut payload = Payload::new();

		payload.insert(PRODUCT_ID_KEY, product.id.clone());
		payload.insert(PRICE_KEY, serde_json::Value::from(product.price));
		payload.insert(MERCHANT_KEY, product.merchant.to_lowercase());

		if let Some(category) = product.category.as_deref() {
			payload.insert(CATEGORY_KEY, category.to_lowercase());
		}
		if let Some(brand) = product.brand.as_deref() {
			payload.insert(BRAND_KEY, brand.to_lowercase());
		}

		let mut vectors = HashMap::new();

		vectors.insert(DENSE_VECTOR_NAME.to_string(), Vector::from(vector));

		let point = PointStruct::new(point_id(&product.id).to_string(), vectors, payload);

		self.client
			.upsert_points(
				UpsertPointsBuilder::new(self.collection.clone(), vec![point]).wait(true),
			)
			.await?;

		Ok(())
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct NearestProduct {
	pub product_id: String,
	pub similarity: f32,
}

/// Stable point id for a catalog product id.
pub fn point_id(product_id: &str) -> Uuid {
	Uuid::new_v5(&POINT_NAMESPACE, product_id.as_bytes())
}

/// Price ceiling plus one substring condition per filter. Filter values are already lowercase.
fn search_filter(max_price: Option<f64>, filters: &ProductFilters) -> Option<Filter> {
	let mut conditions = Vec::new();

	if let Some(max_price) = max_price {
		let ceiling = Range { lte: Some(max_price), ..Default::default() };

		conditions.push(Condition::range(PRICE_KEY, ceiling));
	}

	for (key, value) in [
		(CATEGORY_KEY, filters.category.as_deref()),
		(MERCHANT_KEY, filters.merchant.as_deref()),
		(BRAND_KEY, filters.brand.as_deref()),
	] {
		if let Some(value) = value {
			conditions.push(Condition::matches_text(key, value.to_string()));
		}
	}

	if conditions.is_empty() { None } else { Some(Filter::must(conditions)) }
}

fn payload_string(payload: &HashMap<String, Value>, key: &str) -> Option<String> {
	let value = payload.get(key)?;

	match &value.kind {
		Some(Kind::StringValue(text)) if !text.is_empty() => Some(text.clone()),
		_ => None,
	}
}
