pub mod search;

mod error;
mod taxonomy_store;

pub use error::{Error, Result};
pub use search::{SearchProducts, SearchRequest, SearchResponse};
pub use taxonomy_store::TaxonomyStore;

use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use time::OffsetDateTime;
use tokio::{task::JoinHandle, time as tokio_time};

use sunny_config::{Config, EmbeddingProviderConfig};
use sunny_domain::{
	LexicalQuery, Product, SemanticMatch, SemanticQuery, TaxonomyEntry, TaxonomySnapshot,
};
use sunny_providers::embedding;
use sunny_storage::{db::Db, qdrant::QdrantStore, queries};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Read access to the product catalog.
pub trait Catalog
where
	Self: Send + Sync,
{
	/// One lexical phase. Results honour the query's price ceiling, filters and limit.
	fn lexical<'a>(&'a self, query: &'a LexicalQuery) -> BoxFuture<'a, Result<Vec<Product>>>;

	/// Nearest neighbours by embedding similarity, most similar first.
	fn nearest<'a>(
		&'a self,
		query: &'a SemanticQuery,
	) -> BoxFuture<'a, Result<Vec<SemanticMatch>>>;
}

pub trait TaxonomySource
where
	Self: Send + Sync,
{
	fn load_taxonomy<'a>(&'a self) -> BoxFuture<'a, Result<Vec<TaxonomyEntry>>>;
}

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
}
impl Providers {
	pub fn new(embedding: Arc<dyn EmbeddingProvider>) -> Self {
		Self { embedding }
	}
}
impl Default for Providers {
	fn default() -> Self {
		Self { embedding: Arc::new(DefaultProviders) }
	}
}

struct DefaultProviders;
impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>> {
		Box::pin(async move { Ok(embedding::embed(cfg, texts).await?) })
	}
}

/// Postgres rows for lexical matching and the taxonomy, Qdrant for vectors.
pub struct StoreCatalog {
	pub db: Db,
	pub qdrant: QdrantStore,
}
impl StoreCatalog {
	pub fn new(db: Db, qdrant: QdrantStore) -> Self {
		Self { db, qdrant }
	}

	async fn nearest_products(&self, query: &SemanticQuery) -> Result<Vec<SemanticMatch>> {
		let hits = self.qdrant.nearest(query).await.map_err(catalog_unavailable)?;
		let ids = hits.iter().map(|hit| hit.product_id.clone()).collect::<Vec<_>>();
		let mut products = queries::fetch_products_by_ids(&self.db, &ids)
			.await
			.map_err(catalog_unavailable)?
			.into_iter()
			.map(|product| (product.id.clone(), product))
			.collect::<ahash::AHashMap<_, _>>();

		// Vector hits can outlive their rows and payloads can lag them; keep Qdrant's order,
		// drop the orphans and recheck the row.
		Ok(hits
			.into_iter()
			.filter_map(|hit| {
				let product = products.remove(&hit.product_id)?;

				Some(SemanticMatch { product, similarity: hit.similarity })
			})
			.filter(|matched| query.max_price.is_none_or(|max| matched.product.price <= max))
			.filter(|matched| query.filters.matches(&matched.product))
			.collect())
	}
}
impl Catalog for StoreCatalog {
	fn lexical<'a>(&'a self, query: &'a LexicalQuery) -> BoxFuture<'a, Result<Vec<Product>>> {
		Box::pin(async move {
			queries::search_lexical(&self.db, query).await.map_err(catalog_unavailable)
		})
	}

	fn nearest<'a>(
		&'a self,
		query: &'a SemanticQuery,
	) -> BoxFuture<'a, Result<Vec<SemanticMatch>>> {
		Box::pin(self.nearest_products(query))
	}
}
impl TaxonomySource for StoreCatalog {
	fn load_taxonomy<'a>(&'a self) -> BoxFuture<'a, Result<Vec<TaxonomyEntry>>> {
		Box::pin(async move {
			queries::load_taxonomy(&self.db)
				.await
				.map_err(|err| Error::TaxonomyUnavailable { message: err.to_string() })
		})
	}
}

pub struct SunnyService {
	pub cfg: Config,
	pub catalog: Arc<dyn Catalog>,
	pub taxonomy_source: Arc<dyn TaxonomySource>,
	pub providers: Providers,
	pub taxonomy: TaxonomyStore,
}
impl SunnyService {
	/// Connects the pipeline to the stores and loads the first taxonomy snapshot. A taxonomy
	/// that cannot be loaded here is fatal.
	pub async fn new(cfg: Config, db: Db, qdrant: QdrantStore) -> Result<Self> {
		let store = Arc::new(StoreCatalog::new(db, qdrant));

		Self::with_collaborators(cfg, store.clone(), store, Providers::default()).await
	}

	pub async fn with_collaborators(
		cfg: Config,
		catalog: Arc<dyn Catalog>,
		taxonomy_source: Arc<dyn TaxonomySource>,
		providers: Providers,
	) -> Result<Self> {
		let snapshot = load_snapshot(taxonomy_source.as_ref()).await?;

		tracing::info!(entries = snapshot.len(), "Taxonomy loaded.");

		Ok(Self {
			cfg,
			catalog,
			taxonomy_source,
			providers,
			taxonomy: TaxonomyStore::new(snapshot),
		})
	}

	/// Reloads the taxonomy and swaps it in. On failure the current snapshot stays live.
	pub async fn refresh_taxonomy(&self) -> Result<usize> {
		let snapshot = load_snapshot(self.taxonomy_source.as_ref()).await?;
		let entries = snapshot.len();

		self.taxonomy.replace(snapshot);

		Ok(entries)
	}
}

/// Refreshes the taxonomy every `taxonomy.refresh_interval_secs` until the task is aborted.
pub fn spawn_taxonomy_refresh(service: Arc<SunnyService>) -> JoinHandle<()> {
	let period = Duration::from_secs(service.cfg.taxonomy.refresh_interval_secs);

	tokio::spawn(async move {
		loop {
			tokio_time::sleep(period).await;

			match service.refresh_taxonomy().await {
				Ok(entries) => tracing::info!(entries, "Taxonomy refreshed."),
				Err(err) => {
					let loaded_at = service.taxonomy.snapshot().loaded_at();
					let snapshot_age_secs = (OffsetDateTime::now_utc() - loaded_at).whole_seconds();

					tracing::warn!(
						error = %err,
						snapshot_age_secs,
						"Taxonomy refresh failed; keeping the stale snapshot."
					);
				},
			}
		}
	})
}

async fn load_snapshot(source: &dyn TaxonomySource) -> Result<TaxonomySnapshot> {
	let entries = source.load_taxonomy().await?;

	Ok(TaxonomySnapshot::new(entries, OffsetDateTime::now_utc()))
}

fn catalog_unavailable(err: sunny_storage::Error) -> Error {
	Error::CatalogUnavailable { message: err.to_string() }
}
