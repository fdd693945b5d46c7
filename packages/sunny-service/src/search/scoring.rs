use ahash::AHashMap;

use sunny_config::Config;
use sunny_domain::{ImageStatus, Product, QueryPlan, SearchIntent, SemanticMatch, safety, text};

/// Why a candidate was removed from the ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
	/// Both a franchise and a category were requested and the product lacks the franchise.
	FranchiseMismatch,
	/// A requested category did not match the product's canonical category.
	CategoryMismatch,
	BrokenImage,
	Blocked,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
	Ranked(f32),
	Excluded(Exclusion),
}
impl Verdict {
	pub fn score(self) -> Option<f32> {
		match self {
			Self::Ranked(score) => Some(score),
			Self::Excluded(_) => None,
		}
	}
}

/// A retrieved product with where it came from.
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
	pub(crate) product: Product,
	pub(crate) similarity: Option<f32>,
	pub(crate) lexical: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct ScoredCandidate {
	pub(crate) product: Product,
	pub(crate) verdict: Verdict,
	/// The summed score whether or not the candidate was excluded.
	pub(crate) base_score: f32,
}

/// Union by id, semantic hits first, each list in its own order.
pub(crate) fn merge_candidates(
	semantic: Vec<SemanticMatch>,
	lexical: Vec<Product>,
) -> Vec<Candidate> {
	let mut candidates: Vec<Candidate> = Vec::with_capacity(semantic.len() + lexical.len());
	let mut by_id: AHashMap<String, usize> = AHashMap::new();

	for matched in semantic {
		if by_id.contains_key(&matched.product.id) {
			continue;
		}

		by_id.insert(matched.product.id.clone(), candidates.len());
		candidates.push(Candidate {
			product: matched.product,
			similarity: Some(matched.similarity),
			lexical: false,
		});
	}
	for product in lexical {
		match by_id.get(&product.id) {
			Some(index) => candidates[*index].lexical = true,
			None => {
				by_id.insert(product.id.clone(), candidates.len());
				candidates.push(Candidate { product, similarity: None, lexical: true });
			},
		}
	}

	candidates
}

pub(crate) struct Scorer<'a> {
	pub(crate) cfg: &'a Config,
	pub(crate) intent: &'a SearchIntent,
	pub(crate) plan: &'a QueryPlan,
	/// Effective ceiling for this request.
	pub(crate) max_price: Option<f64>,
}
impl Scorer<'_> {
	pub(crate) fn score(&self, candidate: Candidate) -> ScoredCandidate {
		let (taxonomy, gate) = self.taxonomy_score(&candidate.product);
		let base_score = taxonomy
			+ self.price_score(&candidate.product)
			+ self.listing_score(&candidate.product)
			+ self.retrieval_score(&candidate)
			+ self.category_adjustment(&candidate.product);
		let exclusion = if safety::is_blocked(&candidate.product, &self.cfg.lexicon) {
			Some(Exclusion::Blocked)
		} else if candidate.product.image_status == ImageStatus::Broken {
			Some(Exclusion::BrokenImage)
		} else {
			gate
		};
		let verdict = match exclusion {
			Some(reason) => Verdict::Excluded(reason),
			None => Verdict::Ranked(base_score),
		};

		ScoredCandidate { product: candidate.product, verdict, base_score }
	}

	/// Keyword, category and franchise relevance with the hard gate, scaled by the intent
	/// multiplier.
	fn taxonomy_score(&self, product: &Product) -> (f32, Option<Exclusion>) {
		let scoring = &self.cfg.scoring;
		let intent = self.intent;
		let mut score = 0.0;

		for keyword in &intent.keywords {
			let weight = intent.keyword_weight(keyword);

			if product.name_contains(keyword) {
				score += scoring.keyword_name * weight;
			} else if text::contains_lower_opt(product.description.as_deref(), keyword) {
				score += scoring.keyword_text * weight;
			}
		}

		let category_hits = intent
			.categories
			.iter()
			.filter(|wanted| canonical_category_is(product, wanted))
			.count();
		let category_hit = category_hits > 0;
		let franchise_hit = intent.franchises.iter().any(|wanted| has_franchise(product, wanted));

		score += scoring.category_match * category_hits as f32;

		if franchise_hit {
			score += scoring.franchise_match;
		}

		let wants_categories = !intent.categories.is_empty();
		let wants_franchises = !intent.franchises.is_empty();
		let gate = if wants_categories && wants_franchises {
			if !franchise_hit {
				Some(Exclusion::FranchiseMismatch)
			} else if !category_hit {
				Some(Exclusion::CategoryMismatch)
			} else {
				score += scoring.gate_pass_bonus;

				None
			}
		} else if wants_categories && !category_hit {
			Some(Exclusion::CategoryMismatch)
		} else {
			if wants_franchises && !franchise_hit {
				score -= scoring.franchise_miss_penalty;
			}

			None
		};

		(score * self.intent_multiplier(), gate)
	}

	/// Product of every configured multiplier whose intent and category the query carries.
	fn intent_multiplier(&self) -> f32 {
		let Some(intent_type) = self.intent.intent_type.as_deref() else { return 1.0 };

		self.cfg
			.lexicon
			.intent_weights
			.iter()
			.filter(|weight| weight.intent.eq_ignore_ascii_case(intent_type))
			.filter(|weight| self.intent.wants_category(&weight.category))
			.map(|weight| weight.multiplier)
			.product()
	}

	fn price_score(&self, product: &Product) -> f32 {
		let scoring = &self.cfg.scoring;
		let mut score = 0.0;

		if product.price <= 0.0 {
			return score;
		}
		if let Some(max) = self.max_price.filter(|max| *max > 0.0) {
			if product.price <= max {
				score += scoring.budget_fit * (product.price / max) as f32;
			} else {
				score -= scoring.over_budget_penalty;
			}
		}
		if self.intent.min_price.is_some_and(|min| product.price < min) {
			score -= scoring.under_floor_penalty;
		}

		score
	}

	fn listing_score(&self, product: &Product) -> f32 {
		let scoring = &self.cfg.scoring;
		let mut score = 0.0;

		if product.image_url.as_deref().is_some_and(|url| !url.trim().is_empty()) {
			score += scoring.image_bonus;
		}
		if product.in_stock {
			score += scoring.in_stock_bonus;
		}
		if product.image_status == ImageStatus::Valid {
			score += scoring.valid_image_bonus;
		}

		score
	}

	fn retrieval_score(&self, candidate: &Candidate) -> f32 {
		let scoring = &self.cfg.scoring;
		let product = &candidate.product;
		let plan = self.plan;
		let mut score = 0.0;

		if let Some(similarity) = candidate.similarity {
			let cap = self.cfg.search.semantic.score_cap;

			score += (similarity * cap).min(cap);
		}
		if candidate.lexical {
			if let Some(phrase) = plan.phrase.as_deref() {
				if product.name_contains(phrase) {
					score += scoring.phrase_name;
				} else if product.brand_contains(phrase) {
					score += scoring.phrase_brand;
				}
			}

			for token in &plan.expanded_tokens {
				if product.name_contains(token) {
					score += scoring.token_name;
				}
				if product.brand_contains(token) {
					score += scoring.token_brand;
				}
			}
		}

		for token in &plan.product_type_tokens {
			if product.name_contains(token) {
				score += scoring.product_type_name;
			} else if product.category_contains(token) {
				score += scoring.product_type_category;
			}
		}

		score
	}

	/// Media formats and decorations sink unless the shopper asked for home goods.
	fn category_adjustment(&self, product: &Product) -> f32 {
		let scoring = &self.cfg.scoring;
		let lexicon = &self.cfg.lexicon;
		let mut score = 0.0;

		if self.intent.wants_category(&lexicon.home_category) {
			return score;
		}
		if !self.intent.categories.is_empty()
			&& lexicon.media_categories.iter().any(|media| product.category_contains(media))
		{
			score -= scoring.media_penalty;
		}
		if product.category.as_deref().is_some_and(|category| {
			category.trim().eq_ignore_ascii_case(&lexicon.decoration_category)
		}) {
			score -= scoring.decoration_penalty;
		}

		score
	}
}

/// A missing canonical category never matches.
fn canonical_category_is(product: &Product, wanted: &str) -> bool {
	product
		.canonical_category
		.as_deref()
		.is_some_and(|category| category.trim().eq_ignore_ascii_case(wanted.trim()))
}

fn has_franchise(product: &Product, wanted: &str) -> bool {
	product
		.canonical_franchises
		.iter()
		.any(|franchise| franchise.trim().eq_ignore_ascii_case(wanted.trim()))
}
