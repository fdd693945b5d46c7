mod assemble;
mod overrides;
mod retrieval;
mod scoring;

pub use scoring::{Exclusion, Verdict};

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use sunny_config::Config;
use sunny_domain::{
	GroupedProduct, ProductFilters, RankedProduct, build_query_plan, extract_intent,
	grouping::{self, GroupingRules},
};

use self::{retrieval::RetrievalScope, scoring::Scorer};
use crate::{Error, Result, SunnyService};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
	pub query: String,
	/// Signed so that negative values reach validation instead of failing to decode.
	#[serde(default)]
	pub limit: Option<i64>,
	#[serde(default)]
	pub offset: Option<i64>,
	#[serde(default)]
	pub max_price: Option<f64>,
	#[serde(default)]
	pub filter_category: Option<String>,
	#[serde(default)]
	pub filter_merchant: Option<String>,
	#[serde(default)]
	pub filter_brand: Option<String>,
	#[serde(default)]
	pub group_variants: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SearchProducts {
	Ranked(Vec<RankedProduct>),
	Grouped(Vec<GroupedProduct>),
}
impl SearchProducts {
	pub fn len(&self) -> usize {
		match self {
			Self::Ranked(items) => items.len(),
			Self::Grouped(items) => items.len(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Ids in response order; a group contributes its lead product.
	pub fn ids(&self) -> Vec<&str> {
		match self {
			Self::Ranked(items) => items.iter().map(|item| item.product.id.as_str()).collect(),
			Self::Grouped(items) => items.iter().map(|item| item.id.as_str()).collect(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
	pub products: SearchProducts,
	pub total_count: u64,
	pub has_more: bool,
	/// Set when the request deadline cut retrieval short.
	pub degraded: bool,
}

#[derive(Debug, Clone)]
struct ValidatedRequest {
	query: String,
	limit: u32,
	offset: u32,
	max_price: Option<f64>,
	filters: ProductFilters,
	group_variants: bool,
}

impl SunnyService {
	pub async fn search(&self, req: SearchRequest) -> Result<SearchResponse> {
		let request = validate(&self.cfg, req)?;
		let started = Instant::now();
		let deadline = started + Duration::from_millis(self.cfg.search.request_timeout_ms);
		let taxonomy = self.taxonomy.snapshot();
		let intent = extract_intent(&request.query, &taxonomy, &self.cfg.lexicon.stop_words);
		let plan = build_query_plan(&intent, &self.cfg.lexicon);
		let scope = RetrievalScope {
			max_price: effective_ceiling(request.max_price, intent.max_price),
			filters: request.filters.clone(),
			cap: fetch_cap(&self.cfg, &request),
		};
		let retrieved = retrieval::retrieve(self, &plan, &scope, deadline).await?;
		let degraded = retrieved.degraded;
		let semantic_count = retrieved.semantic.len();
		let lexical_count = retrieved.lexical.len();
		let scorer =
			Scorer { cfg: &self.cfg, intent: &intent, plan: &plan, max_price: scope.max_price };
		let scored = scoring::merge_candidates(retrieved.semantic, retrieved.lexical)
			.into_iter()
			.filter(|candidate| scope.admits(&candidate.product))
			.map(|candidate| scorer.score(candidate))
			.collect::<Vec<_>>();
		let scored =
			overrides::apply_must_match(scored, plan.must_match.as_ref(), &self.cfg.scoring);
		let ranked = assemble::rank(scored);
		let response = if request.group_variants {
			let rules = GroupingRules {
				groupable_categories: &self.cfg.lexicon.groupable_categories,
				min_base_name_chars: self.cfg.grouping.min_base_name_chars as usize,
				max_price: scope.max_price,
			};
			let page = assemble::paginate(
				assemble::sort_groups(grouping::group_products(&ranked, &rules)),
				request.offset,
				request.limit,
			);

			page.into_response(SearchProducts::Grouped, degraded)
		} else {
			assemble::paginate(ranked, request.offset, request.limit)
				.into_response(SearchProducts::Ranked, degraded)
		};

		tracing::info!(
			query_hash = %query_hash(&request.query),
			categories = intent.categories.len(),
			franchises = intent.franchises.len(),
			must_match = plan.must_match.as_ref().map(|term| term.kind.as_str()),
			semantic_count,
			lexical_count,
			total_count = response.total_count,
			degraded,
			elapsed_ms = started.elapsed().as_millis() as u64,
			"Search completed."
		);

		Ok(response)
	}
}

fn validate(cfg: &Config, req: SearchRequest) -> Result<ValidatedRequest> {
	let query = req.query.trim().to_string();

	if query.chars().count() > cfg.search.max_query_chars as usize {
		return Err(Error::InvalidRequest {
			message: format!("query must be at most {} characters.", cfg.search.max_query_chars),
		});
	}

	let limit = match req.limit {
		None => cfg.search.default_limit,
		Some(limit) if limit >= 1 && limit <= i64::from(cfg.search.max_limit) => limit as u32,
		Some(_) => {
			return Err(Error::InvalidRequest {
				message: format!("limit must be between 1 and {}.", cfg.search.max_limit),
			});
		},
	};
	let offset = match req.offset {
		None => 0,
		Some(offset) => u32::try_from(offset).map_err(|_| Error::InvalidRequest {
			message: "offset must be zero or greater.".to_string(),
		})?,
	};

	if let Some(max_price) = req.max_price
		&& (!max_price.is_finite() || max_price <= 0.0)
	{
		return Err(Error::InvalidRequest {
			message: "maxPrice must be a positive number.".to_string(),
		});
	}

	Ok(ValidatedRequest {
		query,
		limit,
		offset,
		max_price: req.max_price,
		filters: ProductFilters::new(
			req.filter_category.as_deref(),
			req.filter_merchant.as_deref(),
			req.filter_brand.as_deref(),
		),
		group_variants: req.group_variants,
	})
}

/// The lower of the caller's ceiling and the one stated in the query.
fn effective_ceiling(requested: Option<f64>, stated: Option<f64>) -> Option<f64> {
	match (requested, stated) {
		(Some(requested), Some(stated)) => Some(requested.min(stated)),
		(requested, stated) => requested.or(stated),
	}
}

fn fetch_cap(cfg: &Config, request: &ValidatedRequest) -> u32 {
	let retrieval = &cfg.search.retrieval;
	let window = request.offset.saturating_add(request.limit);
	let mut cap = window.saturating_mul(retrieval.fetch_multiplier);

	// Several size rows collapse into one group.
	if request.group_variants {
		cap = cap.saturating_mul(cfg.grouping.fetch_multiplier);
	}

	cap.max(retrieval.min_fetch)
}

fn query_hash(query: &str) -> String {
	let hash = blake3::hash(query.as_bytes());

	hash.to_hex().as_str()[..16].to_string()
}
