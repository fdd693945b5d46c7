use axum::{
	Json, Router,
	extract::State,
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;

use sunny_service::{Error, SearchRequest, SearchResponse};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/search", post(search))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn search(
	State(state): State<AppState>,
	Json(payload): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
	let response = state.service.search(payload).await?;

	Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	retryable: bool,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	retryable: bool,
}
impl ApiError {
	fn new(status: StatusCode, error_code: &str, message: impl Into<String>) -> Self {
		Self {
			status,
			error_code: error_code.to_string(),
			message: message.into(),
			retryable: false,
		}
	}
}
impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		let retryable = err.is_retryable();
		let mut api_err = match &err {
			Error::InvalidRequest { message } =>
				ApiError::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message.as_str()),
			Error::CatalogUnavailable { .. } => ApiError::new(
				StatusCode::SERVICE_UNAVAILABLE,
				"CATALOG_UNAVAILABLE",
				"Product catalog is unavailable.",
			),
			Error::TaxonomyUnavailable { .. } => ApiError::new(
				StatusCode::SERVICE_UNAVAILABLE,
				"TAXONOMY_UNAVAILABLE",
				"Taxonomy is unavailable.",
			),
			Error::Provider { .. } => ApiError::new(
				StatusCode::BAD_GATEWAY,
				"PROVIDER_ERROR",
				"Embedding provider failed.",
			),
		};

		if !api_err.status.is_client_error() {
			tracing::error!(error = %err, "Search request failed.");
		}

		api_err.retryable = retryable;

		api_err
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody {
			error_code: self.error_code,
			message: self.message,
			retryable: self.retryable,
		};

		(self.status, Json(body)).into_response()
	}
}
