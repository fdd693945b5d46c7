use std::sync::Arc;

use sunny_service::SunnyService;
use sunny_storage::{db::Db, qdrant::QdrantStore};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<SunnyService>,
}
impl AppState {
	pub async fn new(config: sunny_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		let qdrant = QdrantStore::new(&config.storage.qdrant)?;

		qdrant.ensure_collection().await?;

		let service = SunnyService::new(config, db, qdrant).await?;

		Ok(Self::from_service(service))
	}

	pub fn from_service(service: SunnyService) -> Self {
		Self { service: Arc::new(service) }
	}
}
