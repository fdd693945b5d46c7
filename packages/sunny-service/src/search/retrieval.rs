use std::time::Duration;

use ahash::AHashSet;
use tokio::time::{self as tokio_time, Instant};

use sunny_config::SearchRetrieval;
use sunny_domain::{
	Field, LexicalQuery, Product, ProductFilters, QueryPlan, SemanticMatch, SemanticQuery,
	TermMatch,
};

use crate::{Catalog, Error, Result, SunnyService};

/// Constraints shared by every retrieval call of one request.
#[derive(Debug, Clone)]
pub(crate) struct RetrievalScope {
	pub(crate) max_price: Option<f64>,
	pub(crate) filters: ProductFilters,
	/// Per-phase fetch cap.
	pub(crate) cap: u32,
}
impl RetrievalScope {
	/// Re-checks what a collaborator returned against the request's ceiling and filters.
	pub(crate) fn admits(&self, product: &Product) -> bool {
		self.max_price.is_none_or(|max| product.price <= max) && self.filters.matches(product)
	}

	fn lexical(&self, all: Vec<TermMatch>, any: Vec<TermMatch>, limit: u32) -> LexicalQuery {
		LexicalQuery {
			all,
			any,
			max_price: self.max_price,
			filters: self.filters.clone(),
			limit,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexicalPhase {
	Phrase,
	AllTokens,
	Fallback,
}
impl LexicalPhase {
	fn as_str(self) -> &'static str {
		match self {
			Self::Phrase => "phrase",
			Self::AllTokens => "all_tokens",
			Self::Fallback => "fallback",
		}
	}
}

#[derive(Debug, Default)]
pub(crate) struct Retrieved {
	pub(crate) semantic: Vec<SemanticMatch>,
	pub(crate) lexical: Vec<Product>,
	/// The request deadline cut at least one path short.
	pub(crate) degraded: bool,
}

/// Runs the semantic and lexical paths concurrently. Only a catalog failure on the lexical path
/// fails the request; the semantic path degrades to nothing.
pub(crate) async fn retrieve(
	service: &SunnyService,
	plan: &QueryPlan,
	scope: &RetrievalScope,
	deadline: Instant,
) -> Result<Retrieved> {
	let (semantic, lexical) = tokio::join!(
		semantic_candidates(service, plan, scope, deadline),
		lexical_candidates(
			service.catalog.as_ref(),
			&service.cfg.search.retrieval,
			plan,
			scope,
			deadline
		),
	);
	let (semantic, semantic_cut) = semantic;
	let (lexical, lexical_cut) = lexical?;

	Ok(Retrieved { semantic, lexical, degraded: semantic_cut || lexical_cut })
}

async fn semantic_candidates(
	service: &SunnyService,
	plan: &QueryPlan,
	scope: &RetrievalScope,
	deadline: Instant,
) -> (Vec<SemanticMatch>, bool) {
	let cfg = &service.cfg.search.semantic;

	if !cfg.enabled || plan.semantic_text.trim().is_empty() {
		return (Vec::new(), false);
	}

	let budget = Instant::now() + Duration::from_millis(cfg.timeout_ms);
	let until = budget.min(deadline);

	match tokio_time::timeout_at(until, semantic_lookup(service, plan, scope)).await {
		Ok(Ok(matches)) => (matches, false),
		Ok(Err(err)) => {
			tracing::warn!(error = %err, "Semantic retrieval failed; using lexical results only.");

			(Vec::new(), false)
		},
		Err(_) => {
			tracing::warn!(
				timeout_ms = cfg.timeout_ms,
				"Semantic retrieval timed out; using lexical results only."
			);

			(Vec::new(), until == deadline)
		},
	}
}

async fn semantic_lookup(
	service: &SunnyService,
	plan: &QueryPlan,
	scope: &RetrievalScope,
) -> Result<Vec<SemanticMatch>> {
	let cfg = &service.cfg.search.semantic;
	let texts = vec![plan.semantic_text.clone()];
	let vectors =
		service.providers.embedding.embed(&service.cfg.providers.embedding, &texts).await?;
	let vector = vectors.into_iter().next().ok_or_else(|| Error::Provider {
		message: "Embedding provider returned no vectors.".to_string(),
	})?;
	let query = SemanticQuery {
		vector,
		max_price: scope.max_price,
		filters: scope.filters.clone(),
		limit: scope.cap,
		max_distance: cfg.max_distance,
	};
	let matches = service.catalog.nearest(&query).await?;

	Ok(accept_semantic(matches, cfg.max_distance, scope.cap))
}

/// Clamps similarity into `[0, 1]`, drops hits beyond `max_distance` and keeps at most `limit`.
fn accept_semantic(
	matches: Vec<SemanticMatch>,
	max_distance: f32,
	limit: u32,
) -> Vec<SemanticMatch> {
	matches
		.into_iter()
		.map(|mut matched| {
			matched.similarity = matched.similarity.clamp(0.0, 1.0);

			matched
		})
		.filter(|matched| 1.0 - matched.similarity <= max_distance)
		.take(limit as usize)
		.collect()
}

/// Phrase, all-tokens and fallback phases in order, merged by product id. Each later phase only
/// runs while the merged set is still short of its trigger size.
async fn lexical_candidates(
	catalog: &dyn Catalog,
	retrieval: &SearchRetrieval,
	plan: &QueryPlan,
	scope: &RetrievalScope,
	deadline: Instant,
) -> Result<(Vec<Product>, bool)> {
	let mut merged = LexicalMerge::default();
	let fallback_cap = scope.cap.saturating_mul(retrieval.fallback_multiplier);

	for phase in [LexicalPhase::Phrase, LexicalPhase::AllTokens, LexicalPhase::Fallback] {
		let query = match phase {
			LexicalPhase::Phrase => phrase_phase(plan, scope),
			LexicalPhase::AllTokens if merged.len() < scope.cap as usize =>
				all_tokens_phase(plan, scope),
			LexicalPhase::Fallback if merged.len() < fallback_cap as usize =>
				fallback_phase(plan, scope, fallback_cap),
			_ => None,
		};
		let Some(query) = query else { continue };

		match tokio_time::timeout_at(deadline, catalog.lexical(&query)).await {
			Ok(products) => {
				let products = products?;

				tracing::debug!(
					phase = phase.as_str(),
					found = products.len(),
					"Lexical phase completed."
				);

				merged.extend(products);
			},
			Err(_) => {
				tracing::warn!(
					phase = phase.as_str(),
					kept = merged.len(),
					"Lexical retrieval hit the request deadline."
				);

				return Ok((merged.products, true));
			},
		}
	}

	Ok((merged.products, false))
}

/// Phrase in name or brand, plus every other token anywhere.
pub(crate) fn phrase_phase(plan: &QueryPlan, scope: &RetrievalScope) -> Option<LexicalQuery> {
	let phrase = plan.phrase.as_deref()?;
	let mut all = vec![TermMatch::new(phrase, Field::NAME_BRAND)];

	all.extend(
		plan.tokens_outside_phrase()
			.iter()
			.map(|token| TermMatch::new(token, Field::NAME_BRAND_CATEGORY)),
	);

	Some(scope.lexical(all, Vec::new(), scope.cap))
}

/// Every token in name or brand. Needs at least two tokens.
pub(crate) fn all_tokens_phase(plan: &QueryPlan, scope: &RetrievalScope) -> Option<LexicalQuery> {
	if plan.tokens.len() < 2 {
		return None;
	}

	let all = plan.tokens.iter().map(|token| TermMatch::new(token, Field::NAME_BRAND)).collect();

	Some(scope.lexical(all, Vec::new(), scope.cap))
}

/// Any product-type token in name or category; without product-type tokens, any expanded token
/// anywhere. A query with no terms at all only browses when something else narrows it.
pub(crate) fn fallback_phase(
	plan: &QueryPlan,
	scope: &RetrievalScope,
	limit: u32,
) -> Option<LexicalQuery> {
	let any = if plan.product_type_tokens.is_empty() {
		plan.expanded_tokens
			.iter()
			.map(|token| TermMatch::new(token, Field::NAME_BRAND_CATEGORY))
			.collect::<Vec<_>>()
	} else {
		plan.product_type_tokens
			.iter()
			.map(|token| TermMatch::new(token, Field::NAME_CATEGORY))
			.collect()
	};

	if any.is_empty() && scope.max_price.is_none() && scope.filters.is_empty() {
		return None;
	}

	Some(scope.lexical(Vec::new(), any, limit))
}

#[derive(Default)]
struct LexicalMerge {
	seen: AHashSet<String>,
	products: Vec<Product>,
}
impl LexicalMerge {
	fn len(&self) -> usize {
		self.products.len()
	}

	fn extend(&mut self, products: Vec<Product>) {
		for product in products {
			if self.seen.insert(product.id.clone()) {
				self.products.push(product);
			}
		}
	}
}
