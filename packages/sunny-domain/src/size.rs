//! Size notation parsing for product names. Rules are tried in order; the first one that leaves
//! a long enough base name wins.

use std::sync::LazyLock;

use regex::Regex;

static SIZE_RULES: LazyLock<Vec<(SizeRule, Regex)>> = LazyLock::new(|| {
	SizeRule::ALL
		.iter()
		.filter_map(|rule| Regex::new(rule.pattern()).ok().map(|regex| (*rule, regex)))
		.collect()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeRule {
	/// `UK 12`, `(12 Younger)`, `(3 Older)`.
	UkShoe,
	/// `13 Small - 7 Large`, `0-3 Months`.
	AgeRange,
	/// `- Size 10`, `- 90cm`, `- 2 Pack`.
	DashUnit,
	/// `(Size 10)`, `(70cm)`, `(8 UK)`.
	Parenthesised,
	/// `- XL`, `- One Size`.
	Letter,
	/// `, Size 5`.
	Comma,
	/// Trailing `20x30cm`, `100`.
	NumericSuffix,
}
impl SizeRule {
	pub const ALL: [SizeRule; 7] = [
		SizeRule::UkShoe,
		SizeRule::AgeRange,
		SizeRule::DashUnit,
		SizeRule::Parenthesised,
		SizeRule::Letter,
		SizeRule::Comma,
		SizeRule::NumericSuffix,
	];

	fn pattern(self) -> &'static str {
		match self {
			Self::UkShoe =>
				r"(?i)\s*-?\s*\(?\s*(?:UK\s*)?(\d{1,2}(?:\.\d)?)\s*(?:Younger|Older|Infant|Junior|Toddler)?\s*\)?\s*$",
			Self::AgeRange =>
				r"(?i)\s*\(?\s*(\d+\s*(?:Small|Large)?\s*-\s*\d+\s*(?:Small|Large|Months?|Years?)?)\s*\)?\s*$",
			Self::DashUnit =>
				r"(?i)\s*-\s*((?:Size\s*)?\d+(?:\.\d+)?(?:\s*-\s*\d+(?:\.\d+)?)?(?:\s*(?:cm|mm|inch|Years?|Months?|Pack|Large|Small|Medium|XS|S|M|L|XL|XXL|XXXL))?)\s*$",
			Self::Parenthesised =>
				r"(?i)\s*\((?:Size\s*)?(\d+(?:\.\d+)?(?:\s*-\s*\d+(?:\.\d+)?)?(?:\s*(?:cm|mm|inch|Years?|Months?|UK|EU|US))?)\)\s*$",
			Self::Letter =>
				r"(?i)\s*-\s*(XS|S|M|L|XL|XXL|XXXL|One Size|Small|Medium|Large|Extra Large)\s*$",
			Self::Comma => r"(?i)\s*,\s*((?:Size\s*)?\d+(?:\.\d+)?)\s*$",
			Self::NumericSuffix => r"(?i)\s+(\d+(?:\.\d+)?(?:x\d+(?:\.\d+)?)?(?:mm|cm|inch)?)\s*$",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeMatch {
	pub rule: SizeRule,
	pub base_name: String,
	pub size: String,
}

/// First rule whose base name is longer than `min_base_chars`.
pub fn extract_size(name: &str, min_base_chars: usize) -> Option<SizeMatch> {
	SIZE_RULES
		.iter()
		.filter_map(|(rule, regex)| apply(*rule, regex, name))
		.find(|matched| matched.base_name.chars().count() > min_base_chars)
}

/// Applies one rule without the base-length guard.
#[cfg(test)]
fn apply_rule(rule: SizeRule, name: &str) -> Option<SizeMatch> {
	let (_, regex) = SIZE_RULES.iter().find(|(candidate, _)| *candidate == rule)?;

	apply(rule, regex, name)
}

fn apply(rule: SizeRule, regex: &Regex, name: &str) -> Option<SizeMatch> {
	let caps = regex.captures(name)?;
	let whole = caps.get(0)?;
	let size = caps.get(1)?.as_str().trim();

	if size.is_empty() {
		return None;
	}

	Some(SizeMatch {
		rule,
		base_name: name[..whole.start()].trim().to_string(),
		size: size.to_string(),
	})
}
