pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Catalog unavailable: {message}")]
	CatalogUnavailable { message: String },
	#[error("Taxonomy unavailable: {message}")]
	TaxonomyUnavailable { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
}
impl Error {
	/// Whether the caller may retry the same request unchanged.
	pub fn is_retryable(&self) -> bool {
		matches!(self, Self::CatalogUnavailable { .. } | Self::Provider { .. })
	}
}

impl From<sunny_providers::Error> for Error {
	fn from(err: sunny_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}
