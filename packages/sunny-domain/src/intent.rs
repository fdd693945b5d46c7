use std::{collections::HashMap, ops::Range, sync::LazyLock};

use regex::Regex;

use crate::{
	taxonomy::{TaxonomyEntry, TaxonomyKind, TaxonomySnapshot},
	text,
};

const AMOUNT: &str = r"\d+(?:\.\d{1,2})?";
const CURRENCY_UNIT: &str = r"(?:\s*(?:pounds?|quid)\b)?";
// `3s`, `3+` and `3 years` name an age, not a price.
const AGE_UNIT: &str = r"(?P<unit>\s*(?:years?|yrs?|months?|mths?)\b|s\b|\+)?";
// Longest n-gram first; a match suppresses its token positions for shorter n-grams.
const NGRAM_SPANS: [usize; 3] = [3, 2, 1];

static PRICE_RULES: LazyLock<Vec<(PriceRule, Regex)>> = LazyLock::new(|| {
	[
		(
			PriceRule::Ceiling,
			format!(
				r"(?i)\b(?:(?:under|below|less than|up to|budget(?:\s+of)?)\s*£?|(?:max|maximum)\s*£)\s*(?P<amount>{AMOUNT}){CURRENCY_UNIT}{AGE_UNIT}"
			),
		),
		(PriceRule::Ceiling, format!(r"(?i)£\s*(?P<amount>{AMOUNT})\s*or\s+(?:less|under)\b")),
		(
			PriceRule::Ceiling,
			format!(r"(?i)\b(?P<amount>{AMOUNT})\s*(?:pounds?|quid)\s+or\s+(?:less|under)\b"),
		),
		(
			PriceRule::Floor,
			format!(
				r"(?i)\b(?:(?:over|above|more than|at least)\s*£?|(?:min|minimum)\s*£)\s*(?P<amount>{AMOUNT}){CURRENCY_UNIT}{AGE_UNIT}"
			),
		),
		(
			PriceRule::Range,
			format!(r"(?i)£\s*(?P<low>{AMOUNT})\s*(?:-|–|to)\s*£?\s*(?P<high>{AMOUNT})"),
		),
	]
	.into_iter()
	.filter_map(|(rule, pattern)| Regex::new(&pattern).ok().map(|regex| (rule, regex)))
	.collect()
});

/// Structured reading of one raw query. Built once per request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchIntent {
	pub raw_query: String,
	/// Lowercased query with price phrases removed.
	pub text: String,
	pub keywords: Vec<String>,
	pub categories: Vec<String>,
	pub franchises: Vec<String>,
	pub age_group: Option<String>,
	pub intent_type: Option<String>,
	pub min_price: Option<f64>,
	pub max_price: Option<f64>,
	pub weights: HashMap<String, f32>,
}
impl SearchIntent {
	pub fn keyword_weight(&self, keyword: &str) -> f32 {
		self.weights.get(keyword).copied().unwrap_or(1.0)
	}

	pub fn wants_category(&self, category: &str) -> bool {
		self.categories.iter().any(|wanted| wanted.eq_ignore_ascii_case(category))
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceRule {
	Ceiling,
	Floor,
	Range,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceBounds {
	pub min: Option<f64>,
	pub max: Option<f64>,
	pub residual: String,
}

pub fn extract_intent(
	query: &str,
	taxonomy: &TaxonomySnapshot,
	stop_words: &[String],
) -> SearchIntent {
	let lowered = query.to_lowercase();
	let price = extract_price_bounds(&lowered);
	let words = text::words(&price.residual);
	let mut intent = SearchIntent {
		raw_query: query.to_string(),
		min_price: price.min,
		max_price: price.max,
		..Default::default()
	};
	let mut suppressed = vec![false; words.len()];

	for span in NGRAM_SPANS {
		if words.len() < span {
			continue;
		}

		for start in 0..=words.len() - span {
			let range = start..start + span;

			if suppressed[range.clone()].iter().any(|flag| *flag) {
				continue;
			}

			let entries = taxonomy.lookup(&words[range.clone()].join(" "));

			if entries.is_empty() {
				continue;
			}

			for entry in entries {
				apply_match(&mut intent, entry);
			}

			suppressed[range].iter_mut().for_each(|flag| *flag = true);
		}
	}

	for (word, _) in words.iter().zip(&suppressed).filter(|(_, flag)| !**flag) {
		if word.chars().count() <= 1
			|| stop_words.iter().any(|stop| stop == word)
			|| intent.keywords.contains(word)
		{
			continue;
		}

		intent.keywords.push(word.clone());
		intent.weights.entry(word.clone()).or_insert(1.0);
	}

	intent.text = price.residual.split_whitespace().collect::<Vec<_>>().join(" ");

	intent
}

/// Applies the price rules in order. A later rule overrides the bound an earlier one set; a
/// bound followed by an age unit is not a price and stays in the text.
pub fn extract_price_bounds(query: &str) -> PriceBounds {
	let mut min = None;
	let mut max = None;
	let mut spans = Vec::new();

	for (rule, regex) in PRICE_RULES.iter() {
		let Some(caps) = regex.captures_iter(query).find(|caps| caps.name("unit").is_none())
		else {
			continue;
		};
		let Some(whole) = caps.get(0) else { continue };

		match rule {
			PriceRule::Ceiling => max = parse_amount(caps.name("amount")).or(max),
			PriceRule::Floor => min = parse_amount(caps.name("amount")).or(min),
			PriceRule::Range => {
				if let (Some(low), Some(high)) =
					(parse_amount(caps.name("low")), parse_amount(caps.name("high")))
				{
					min = Some(low.min(high));
					max = Some(low.max(high));
				}
			},
		}

		spans.push(whole.range());
	}

	PriceBounds { min, max, residual: remove_spans(query, spans) }
}

fn apply_match(intent: &mut SearchIntent, entry: &TaxonomyEntry) {
	let label = entry.subcategory.clone().unwrap_or_else(|| entry.keyword.clone());

	match &entry.kind {
		TaxonomyKind::Franchise => {
			if !intent.franchises.iter().any(|franchise| franchise.eq_ignore_ascii_case(&label)) {
				intent.franchises.push(label);
			}

			push_keyword(intent, &entry.keyword);
		},
		TaxonomyKind::AgeGroup =>
			if intent.age_group.is_none() {
				intent.age_group = Some(label);
			},
		TaxonomyKind::Intent =>
			if intent.intent_type.is_none() {
				intent.intent_type = Some(label);
			},
		TaxonomyKind::Category(category) => {
			if !intent.wants_category(category) {
				intent.categories.push(category.clone());
			}

			push_keyword(intent, &entry.keyword);
		},
	}

	intent.weights.insert(entry.keyword.clone(), entry.weight);
}

fn push_keyword(intent: &mut SearchIntent, keyword: &str) {
	if !intent.keywords.iter().any(|existing| existing == keyword) {
		intent.keywords.push(keyword.to_string());
	}
}

fn parse_amount(matched: Option<regex::Match<'_>>) -> Option<f64> {
	matched.and_then(|value| value.as_str().parse::<f64>().ok()).filter(|value| value.is_finite())
}

fn remove_spans(text: &str, mut spans: Vec<Range<usize>>) -> String {
	spans.sort_by_key(|span| span.start);

	let mut out = String::with_capacity(text.len());
	let mut cursor = 0;

	for span in spans {
		if span.start > cursor {
			out.push_str(&text[cursor..span.start]);
			out.push(' ');
		}

		cursor = cursor.max(span.end);
	}

	if cursor < text.len() {
		out.push_str(&text[cursor..]);
	}

	out.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn price_rules_all_compile() {
		assert_eq!(PRICE_RULES.len(), 5);
	}

	#[test]
	fn ceiling_is_extracted_and_removed() {
		let bounds = extract_price_bounds("frozen costume under £20");

		assert_eq!(bounds.max, Some(20.0));
		assert_eq!(bounds.min, None);
		assert_eq!(bounds.residual, "frozen costume");
	}

	#[test]
	fn range_overrides_single_bounds() {
		let bounds = extract_price_bounds("party dress over £5 £10 - £25");

		assert_eq!(bounds.min, Some(10.0));
		assert_eq!(bounds.max, Some(25.0));
		assert_eq!(bounds.residual, "party dress");
	}

	#[test]
	fn age_phrases_are_not_prices() {
		let bounds = extract_price_bounds("toys for ages up to 5 years");

		assert_eq!(bounds.max, None);
		assert_eq!(bounds.residual, "toys for ages up to 5 years");
	}

	#[test]
	fn model_numbers_after_max_are_not_prices() {
		let bounds = extract_price_bounds("nike air max 90");

		assert_eq!(bounds.max, None);
		assert_eq!(bounds.residual, "nike air max 90");
	}

	#[test]
	fn currency_words_are_part_of_the_bound() {
		let bounds = extract_price_bounds("lego under 20 pounds");

		assert_eq!(bounds.max, Some(20.0));
		assert_eq!(bounds.residual, "lego");

		let bounds = extract_price_bounds("board games over 15 quid");

		assert_eq!(bounds.min, Some(15.0));
		assert_eq!(bounds.residual, "board games");
	}

	#[test]
	fn suffix_and_budget_forms_set_a_ceiling() {
		for (query, residual) in [
			("lego £20 or less", "lego"),
			("lego 20 quid or less", "lego"),
			("lego 20 pounds or under", "lego"),
			("lego budget £20", "lego"),
			("lego budget of 20", "lego"),
		] {
			let bounds = extract_price_bounds(query);

			assert_eq!(bounds.max, Some(20.0), "{query}");
			assert_eq!(bounds.residual, residual, "{query}");
		}
	}

	#[test]
	fn age_suffixes_are_not_prices() {
		let bounds = extract_price_bounds("toys for over 3s");

		assert_eq!(bounds.min, None);
		assert_eq!(bounds.residual, "toys for over 3s");

		let bounds = extract_price_bounds("games for over 8+");

		assert_eq!(bounds.min, None);
	}

	#[test]
	fn remove_spans_merges_overlaps() {
		assert_eq!(remove_spans("abc def ghi", vec![4..7, 5..9]), "abc hi");
	}
}
