use std::collections::HashMap;

use time::OffsetDateTime;

use crate::text;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TaxonomyKind {
	/// A product category such as `Toys` or `Footwear`.
	Category(String),
	Franchise,
	AgeGroup,
	Intent,
}
impl TaxonomyKind {
	pub fn parse(raw: &str) -> Self {
		match raw.trim() {
			"Franchise" => Self::Franchise,
			"AgeGroup" => Self::AgeGroup,
			"Intent" => Self::Intent,
			other => Self::Category(other.to_string()),
		}
	}

	/// Storage label; the inverse of [`TaxonomyKind::parse`].
	pub fn as_str(&self) -> &str {
		match self {
			Self::Category(name) => name,
			Self::Franchise => "Franchise",
			Self::AgeGroup => "AgeGroup",
			Self::Intent => "Intent",
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaxonomyEntry {
	pub keyword: String,
	pub kind: TaxonomyKind,
	pub subcategory: Option<String>,
	pub weight: f32,
}
impl TaxonomyEntry {
	pub fn new(
		keyword: &str,
		kind: TaxonomyKind,
		subcategory: Option<&str>,
		weight: Option<f32>,
	) -> Self {
		Self {
			keyword: normalize_keyword(keyword),
			kind,
			subcategory: subcategory
				.map(str::trim)
				.filter(|value| !value.is_empty())
				.map(str::to_string),
			weight: weight.filter(|value| value.is_finite()).unwrap_or(1.0),
		}
	}
}

/// Immutable keyword index. Rebuilt wholesale on every refresh.
#[derive(Debug, Clone)]
pub struct TaxonomySnapshot {
	by_keyword: HashMap<String, Vec<TaxonomyEntry>>,
	entry_count: usize,
	loaded_at: OffsetDateTime,
}
impl TaxonomySnapshot {
	pub fn new(entries: Vec<TaxonomyEntry>, loaded_at: OffsetDateTime) -> Self {
		let mut by_keyword: HashMap<String, Vec<TaxonomyEntry>> = HashMap::new();
		let mut entry_count = 0;

		for entry in entries {
			if entry.keyword.is_empty() {
				continue;
			}

			let slot = by_keyword.entry(entry.keyword.clone()).or_default();

			// One entry per (keyword, kind, subcategory); a later row replaces an earlier one.
			match slot.iter_mut().find(|existing| {
				existing.kind == entry.kind && existing.subcategory == entry.subcategory
			}) {
				Some(existing) => *existing = entry,
				None => {
					slot.push(entry);

					entry_count += 1;
				},
			}
		}

		Self { by_keyword, entry_count, loaded_at }
	}

	pub fn empty() -> Self {
		Self::new(Vec::new(), OffsetDateTime::UNIX_EPOCH)
	}

	pub fn lookup(&self, ngram: &str) -> &[TaxonomyEntry] {
		self.by_keyword.get(ngram).map(Vec::as_slice).unwrap_or(&[])
	}

	pub fn len(&self) -> usize {
		self.entry_count
	}

	pub fn is_empty(&self) -> bool {
		self.entry_count == 0
	}

	pub fn loaded_at(&self) -> OffsetDateTime {
		self.loaded_at
	}
}

/// Lowercase, whitespace-collapsed word sequence.
pub fn normalize_keyword(keyword: &str) -> String {
	text::words(keyword).join(" ")
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn snapshot_keeps_distinct_kinds_for_one_keyword() {
		let snapshot = TaxonomySnapshot::new(
			vec![
				TaxonomyEntry::new("Gift", TaxonomyKind::Intent, Some("Gift"), None),
				TaxonomyEntry::new("gift", TaxonomyKind::parse("Toys"), None, Some(0.5)),
				TaxonomyEntry::new(" GIFT ", TaxonomyKind::Intent, Some("Gift"), Some(2.0)),
			],
			OffsetDateTime::UNIX_EPOCH,
		);
		let entries = snapshot.lookup("gift");

		assert_eq!(snapshot.len(), 2);
		assert_eq!(entries.len(), 2);
		assert_eq!(entries[0].weight, 2.0);
		assert_eq!(entries[1].kind, TaxonomyKind::Category("Toys".to_string()));
	}

	#[test]
	fn entry_defaults_weight_and_drops_blank_subcategory() {
		let entry = TaxonomyEntry::new("Star  Wars", TaxonomyKind::Franchise, Some(" "), None);

		assert_eq!(entry.keyword, "star wars");
		assert_eq!(entry.subcategory, None);
		assert_eq!(entry.weight, 1.0);
	}
}
