mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, EmbeddingProviderConfig, Grouping, IntentCategoryWeight, Lexicon, Postgres, Providers,
	Qdrant, Scoring, Search, SearchRetrieval, SearchSemantic, Service, Storage, SynonymExpansion,
	Taxonomy,
};

use std::{fs, path::Path};

/// Hard ceiling on results per page, whatever the config says.
pub const MAX_RESULT_LIMIT: u32 = 50;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;
	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions != cfg.storage.qdrant.vector_dim {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must match storage.qdrant.vector_dim."
				.to_string(),
		});
	}
	if cfg.providers.embedding.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "Provider embedding api_key must be non-empty.".to_string(),
		});
	}
	if cfg.taxonomy.refresh_interval_secs == 0 {
		return Err(Error::Validation {
			message: "taxonomy.refresh_interval_secs must be greater than zero.".to_string(),
		});
	}
	if cfg.search.max_limit == 0 || cfg.search.max_limit > MAX_RESULT_LIMIT {
		return Err(Error::Validation {
			message: format!("search.max_limit must be between 1 and {MAX_RESULT_LIMIT}."),
		});
	}
	if cfg.search.default_limit == 0 || cfg.search.default_limit > cfg.search.max_limit {
		return Err(Error::Validation {
			message: "search.default_limit must be between 1 and search.max_limit.".to_string(),
		});
	}
	if cfg.search.max_query_chars == 0 {
		return Err(Error::Validation {
			message: "search.max_query_chars must be greater than zero.".to_string(),
		});
	}
	if cfg.search.request_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "search.request_timeout_ms must be greater than zero.".to_string(),
		});
	}

	let retrieval = &cfg.search.retrieval;

	if retrieval.fetch_multiplier == 0 {
		return Err(Error::Validation {
			message: "search.retrieval.fetch_multiplier must be greater than zero.".to_string(),
		});
	}
	if retrieval.min_fetch == 0 {
		return Err(Error::Validation {
			message: "search.retrieval.min_fetch must be greater than zero.".to_string(),
		});
	}
	if retrieval.fallback_multiplier == 0 {
		return Err(Error::Validation {
			message: "search.retrieval.fallback_multiplier must be greater than zero.".to_string(),
		});
	}

	let semantic = &cfg.search.semantic;

	if semantic.enabled {
		if semantic.timeout_ms == 0 {
			return Err(Error::Validation {
				message: "search.semantic.timeout_ms must be greater than zero.".to_string(),
			});
		}
		if semantic.timeout_ms >= cfg.search.request_timeout_ms {
			return Err(Error::Validation {
				message: "search.semantic.timeout_ms must be less than search.request_timeout_ms."
					.to_string(),
			});
		}
	}
	if !semantic.max_distance.is_finite() || !(0.0..=2.0).contains(&semantic.max_distance) {
		return Err(Error::Validation {
			message: "search.semantic.max_distance must be in the range 0.0-2.0.".to_string(),
		});
	}
	if !semantic.score_cap.is_finite() || semantic.score_cap < 0.0 {
		return Err(Error::Validation {
			message: "search.semantic.score_cap must be zero or greater.".to_string(),
		});
	}

	validate_scoring(&cfg.scoring)?;

	if cfg.grouping.fetch_multiplier == 0 {
		return Err(Error::Validation {
			message: "grouping.fetch_multiplier must be greater than zero.".to_string(),
		});
	}

	for weight in &cfg.lexicon.intent_weights {
		if !weight.multiplier.is_finite() || weight.multiplier <= 0.0 {
			return Err(Error::Validation {
				message: format!(
					"lexicon.intent_weights multiplier for {}:{} must be greater than zero.",
					weight.intent, weight.category
				),
			});
		}
	}
	for expansion in cfg.lexicon.lexical_synonyms.iter().chain(&cfg.lexicon.dialect_synonyms) {
		if expansion.term.is_empty() {
			return Err(Error::Validation {
				message: "lexicon synonym terms must be non-empty.".to_string(),
			});
		}
	}

	Ok(())
}

fn validate_scoring(scoring: &Scoring) -> Result<()> {
	for (label, value) in [
		("keyword_name", scoring.keyword_name),
		("keyword_text", scoring.keyword_text),
		("category_match", scoring.category_match),
		("franchise_match", scoring.franchise_match),
		("gate_pass_bonus", scoring.gate_pass_bonus),
		("franchise_miss_penalty", scoring.franchise_miss_penalty),
		("budget_fit", scoring.budget_fit),
		("over_budget_penalty", scoring.over_budget_penalty),
		("under_floor_penalty", scoring.under_floor_penalty),
		("image_bonus", scoring.image_bonus),
		("in_stock_bonus", scoring.in_stock_bonus),
		("valid_image_bonus", scoring.valid_image_bonus),
		("phrase_name", scoring.phrase_name),
		("phrase_brand", scoring.phrase_brand),
		("token_name", scoring.token_name),
		("token_brand", scoring.token_brand),
		("product_type_name", scoring.product_type_name),
		("product_type_category", scoring.product_type_category),
		("media_penalty", scoring.media_penalty),
		("decoration_penalty", scoring.decoration_penalty),
	] {
		if !value.is_finite() || value < 0.0 {
			return Err(Error::Validation {
				message: format!("scoring.{label} must be a finite number zero or greater."),
			});
		}
	}

	if !scoring.override_rescue_bonus.is_finite() || scoring.override_rescue_bonus <= 0.0 {
		return Err(Error::Validation {
			message: "scoring.override_rescue_bonus must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	let lexicon = &mut cfg.lexicon;

	for list in [
		&mut lexicon.stop_words,
		&mut lexicon.brands,
		&mut lexicon.characters,
		&mut lexicon.phrases,
		&mut lexicon.groupable_categories,
		&mut lexicon.media_categories,
		&mut lexicon.blocked_terms,
		&mut lexicon.blocked_merchants,
	] {
		normalize_terms(list);
	}
	for expansion in lexicon.lexical_synonyms.iter_mut().chain(lexicon.dialect_synonyms.iter_mut())
	{
		expansion.term = normalize_term(&expansion.term);

		normalize_terms(&mut expansion.synonyms);
	}
	for weight in &mut lexicon.intent_weights {
		weight.intent = normalize_term(&weight.intent);
		weight.category = normalize_term(&weight.category);
	}

	lexicon.decoration_category = normalize_term(&lexicon.decoration_category);
	lexicon.home_category = normalize_term(&lexicon.home_category);
}

fn normalize_terms(terms: &mut Vec<String>) {
	let mut seen = std::collections::HashSet::new();

	terms.retain_mut(|term| {
		*term = normalize_term(term);

		!term.is_empty() && seen.insert(term.clone())
	});
}

fn normalize_term(term: &str) -> String {
	term.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn normalize_terms_lowercases_collapses_and_dedupes() {
		let mut terms =
			vec!["  Peppa   Pig ".to_string(), "peppa pig".to_string(), " ".to_string()];

		normalize_terms(&mut terms);

		assert_eq!(terms, vec!["peppa pig".to_string()]);
	}
}
