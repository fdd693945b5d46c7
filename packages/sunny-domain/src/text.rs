use unicode_segmentation::UnicodeSegmentation;

/// Lowercased Unicode words of `text`, punctuation and symbols dropped.
pub fn words(text: &str) -> Vec<String> {
	text.unicode_words().map(str::to_lowercase).collect()
}

/// Case-insensitive substring containment. `needle` must already be lowercase.
pub fn contains_lower(haystack: &str, needle: &str) -> bool {
	!needle.is_empty() && haystack.to_lowercase().contains(needle)
}

pub fn contains_lower_opt(haystack: Option<&str>, needle: &str) -> bool {
	haystack.map(|text| contains_lower(text, needle)).unwrap_or(false)
}

/// Word sequence of `text` padded with a space on both ends, for whole-word containment checks.
pub fn padded_words(text: &str) -> String {
	let mut out = String::from(" ");

	for word in words(text) {
		out.push_str(&word);
		out.push(' ');
	}

	out
}

/// Whether `term` occurs in `padded` (see [`padded_words`]) on word boundaries.
pub fn contains_words(padded: &str, term: &str) -> bool {
	let needle = padded_words(term);

	!needle.trim().is_empty() && padded.contains(needle.as_str())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn contains_words_respects_boundaries() {
		let padded = padded_words("Snuggle blanket for Peppa-Pig fans");

		assert!(contains_words(&padded, "peppa pig"));
		assert!(contains_words(&padded, "blanket"));
		assert!(!contains_words(&padded, "ugg"));
		assert!(!contains_words(&padded, ""));
	}

	#[test]
	fn contains_lower_ignores_case_of_haystack() {
		assert!(contains_lower("LEGO Star Wars X-Wing", "star wars"));
		assert!(!contains_lower("LEGO Star Wars X-Wing", ""));
		assert!(!contains_lower_opt(None, "lego"));
	}
}
