use sunny_config::{Lexicon, SynonymExpansion};

use crate::{intent::SearchIntent, text};

/// Retrieval-side reading of the query: which tokens to match, which phrase or brand anchors
/// the search, and what text to embed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryPlan {
	/// Whitespace tokens longer than one character, stop words removed.
	pub tokens: Vec<String>,
	/// `tokens` plus the words of every lexical synonym whose term occurs in the query.
	pub expanded_tokens: Vec<String>,
	pub phrase: Option<String>,
	pub must_match: Option<MustMatch>,
	/// Tokens outside the phrase and the must-match term, i.e. what the shopper wants to buy.
	pub product_type_tokens: Vec<String>,
	pub semantic_text: String,
}
impl QueryPlan {
	/// Tokens that phase one still has to match outside the phrase.
	pub fn tokens_outside_phrase(&self) -> Vec<String> {
		let Some(phrase) = self.phrase.as_deref() else { return self.tokens.clone() };

		self.tokens.iter().filter(|token| !contains_token(phrase, token)).cloned().collect()
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MustMatchKind {
	Brand,
	Character,
}
impl MustMatchKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Brand => "brand",
			Self::Character => "character",
		}
	}
}

/// An explicit brand or character named in the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MustMatch {
	pub term: String,
	pub kind: MustMatchKind,
}

pub fn build_query_plan(intent: &SearchIntent, lexicon: &Lexicon) -> QueryPlan {
	let padded = text::padded_words(&intent.text);
	let tokens = dedup(
		intent
			.text
			.split_whitespace()
			.map(|raw| raw.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
			.filter(|token| token.chars().count() > 1)
			.filter(|token| !lexicon.stop_words.contains(token)),
	);
	let mut expanded_tokens = tokens.clone();

	for expansion in matched_expansions(&padded, &lexicon.lexical_synonyms) {
		for synonym in &expansion.synonyms {
			expanded_tokens.extend(
				synonym
					.split_whitespace()
					.filter(|word| word.chars().count() > 1)
					.map(str::to_string),
			);
		}
	}

	let expanded_tokens = dedup(expanded_tokens.into_iter());
	let must_match = detect_must_match(&padded, lexicon);
	let phrase =
		lexicon.phrases.iter().find(|phrase| text::contains_words(&padded, phrase)).cloned();
	let product_type_tokens = tokens
		.iter()
		.filter(|token| !phrase.as_deref().is_some_and(|phrase| contains_token(phrase, token)))
		.filter(|token| {
			!must_match.as_ref().is_some_and(|must_match| contains_token(&must_match.term, token))
		})
		.cloned()
		.collect();
	let semantic_text = expand_for_embedding(intent.raw_query.trim(), &padded, lexicon);

	QueryPlan { tokens, expanded_tokens, phrase, must_match, product_type_tokens, semantic_text }
}

/// First configured brand named in the query, otherwise the first character.
pub fn detect_must_match(padded_query: &str, lexicon: &Lexicon) -> Option<MustMatch> {
	let brand = lexicon
		.brands
		.iter()
		.find(|brand| text::contains_words(padded_query, brand))
		.map(|term| MustMatch { term: term.clone(), kind: MustMatchKind::Brand });

	brand.or_else(|| {
		lexicon
			.characters
			.iter()
			.find(|character| text::contains_words(padded_query, character))
			.map(|term| MustMatch { term: term.clone(), kind: MustMatchKind::Character })
	})
}

/// Appends regional synonyms so the embedding sees both spellings of the same product.
pub fn expand_for_embedding(query: &str, padded_query: &str, lexicon: &Lexicon) -> String {
	let mut out = query.to_string();

	for expansion in matched_expansions(padded_query, &lexicon.dialect_synonyms) {
		for synonym in &expansion.synonyms {
			out.push(' ');
			out.push_str(synonym);
		}
	}

	out
}

fn matched_expansions<'a>(
	padded_query: &'a str,
	expansions: &'a [SynonymExpansion],
) -> impl Iterator<Item = &'a SynonymExpansion> + 'a {
	expansions.iter().filter(move |expansion| text::contains_words(padded_query, &expansion.term))
}

fn contains_token(term: &str, token: &str) -> bool {
	term.split_whitespace().any(|word| word == token)
}

fn dedup(items: impl Iterator<Item = String>) -> Vec<String> {
	let mut out: Vec<String> = Vec::new();

	for item in items {
		if !out.contains(&item) {
			out.push(item);
		}
	}

	out
}

#[cfg(test)]
mod tests {
	use super::*;

	fn intent(text: &str) -> SearchIntent {
		SearchIntent { raw_query: text.to_string(), text: text.to_string(), ..Default::default() }
	}

	#[test]
	fn brand_wins_over_character() {
		let lexicon = Lexicon::default();
		let plan = build_query_plan(&intent("lego star wars tower playset"), &lexicon);
		let must_match = plan.must_match.as_ref().expect("Expected a must-match term.");

		assert_eq!(must_match.term, "lego");
		assert_eq!(must_match.kind, MustMatchKind::Brand);
		assert_eq!(plan.phrase.as_deref(), Some("lego star wars"));
		assert_eq!(plan.product_type_tokens, vec!["tower".to_string(), "playset".to_string()]);
		assert_eq!(plan.tokens_outside_phrase(), vec!["tower".to_string(), "playset".to_string()]);
	}

	#[test]
	fn character_is_detected_without_brand() {
		let lexicon = Lexicon::default();
		let plan = build_query_plan(&intent("frozen costume"), &lexicon);

		assert_eq!(
			plan.must_match,
			Some(MustMatch { term: "frozen".to_string(), kind: MustMatchKind::Character })
		);
		assert_eq!(plan.phrase, None);
		assert_eq!(plan.product_type_tokens, vec!["costume".to_string()]);
	}

	#[test]
	fn brand_detection_needs_word_boundaries() {
		let lexicon = Lexicon::default();
		let plan = build_query_plan(&intent("snuggle blanket"), &lexicon);

		assert_eq!(plan.must_match, None);
	}

	#[test]
	fn stop_words_and_single_characters_are_not_tokens() {
		let lexicon = Lexicon::default();
		let plan = build_query_plan(&intent("gift for dad, a"), &lexicon);

		assert_eq!(plan.tokens, vec!["gift".to_string(), "dad".to_string()]);
		assert_eq!(plan.product_type_tokens, plan.tokens);
	}

	#[test]
	fn lexical_synonyms_extend_expanded_tokens_only() {
		let lexicon = Lexicon::default();
		let plan = build_query_plan(&intent("kids trainers"), &lexicon);

		assert_eq!(plan.tokens, vec!["kids".to_string(), "trainers".to_string()]);
		assert!(plan.expanded_tokens.contains(&"sneakers".to_string()));
		assert!(plan.expanded_tokens.contains(&"athletic".to_string()));
		assert!(plan.semantic_text.starts_with("kids trainers sneakers"));
	}
}
