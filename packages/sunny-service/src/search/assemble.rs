use sunny_domain::{GroupedProduct, RankedProduct, dedup};

use super::{
	SearchProducts, SearchResponse,
	scoring::{ScoredCandidate, Verdict},
};

pub(crate) struct Page<T> {
	items: Vec<T>,
	total_count: u64,
	has_more: bool,
}
impl<T> Page<T> {
	pub(crate) fn into_response(
		self,
		wrap: impl FnOnce(Vec<T>) -> SearchProducts,
		degraded: bool,
	) -> SearchResponse {
		SearchResponse {
			products: wrap(self.items),
			total_count: self.total_count,
			has_more: self.has_more,
			degraded,
		}
	}
}

/// Drops excluded candidates, sorts by score (stable, so ties keep retrieval order) and keeps
/// the best of each `(name, price)` duplicate.
pub(crate) fn rank(candidates: Vec<ScoredCandidate>) -> Vec<RankedProduct> {
	let mut ranked = candidates
		.into_iter()
		.filter_map(|candidate| match candidate.verdict {
			Verdict::Ranked(score) => Some(RankedProduct { product: candidate.product, score }),
			Verdict::Excluded(_) => None,
		})
		.collect::<Vec<_>>();

	ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

	dedup::dedup_by_name_and_price(ranked, |item| &item.product)
}

/// A group loses members to the price ceiling, so its score can drop below a later group's.
pub(crate) fn sort_groups(mut groups: Vec<GroupedProduct>) -> Vec<GroupedProduct> {
	groups.sort_by(|a, b| b.score.total_cmp(&a.score));

	groups
}

pub(crate) fn paginate<T>(items: Vec<T>, offset: u32, limit: u32) -> Page<T> {
	let total = items.len();
	let items = items.into_iter().skip(offset as usize).take(limit as usize).collect::<Vec<_>>();
	let has_more = (offset as usize).saturating_add(items.len()) < total;

	Page { items, total_count: total as u64, has_more }
}

#[cfg(test)]
mod tests {
	use super::*;
	use sunny_domain::{ImageStatus, Product};

	use crate::search::Exclusion;

	fn scored(id: &str, name: &str, price: f64, verdict: Verdict) -> ScoredCandidate {
		ScoredCandidate {
			product: Product {
				id: id.to_string(),
				name: name.to_string(),
				description: None,
				merchant: id.to_string(),
				brand: None,
				category: None,
				canonical_category: None,
				canonical_franchises: Vec::new(),
				price,
				affiliate_link: String::new(),
				image_url: None,
				image_status: ImageStatus::Unknown,
				in_stock: true,
			},
			verdict,
			base_score: 0.0,
		}
	}

	#[test]
	fn rank_sorts_stably_and_dedups_after_sorting() {
		let ranked = rank(vec![
			scored("a", "Socks", 5.0, Verdict::Ranked(10.0)),
			scored("b", "Mug", 8.0, Verdict::Ranked(20.0)),
			scored("c", "Socks", 5.0, Verdict::Ranked(30.0)),
			scored("d", "Hat", 9.0, Verdict::Ranked(20.0)),
			scored("e", "Wine", 9.0, Verdict::Excluded(Exclusion::Blocked)),
		]);
		let ids = ranked.iter().map(|item| item.product.id.as_str()).collect::<Vec<_>>();

		assert_eq!(ids, vec!["c", "b", "d"]);
	}

	#[test]
	fn pagination_reports_the_full_total() {
		let page = paginate((0..45).collect::<Vec<_>>(), 20, 20);

		assert_eq!(page.items.first(), Some(&20));
		assert_eq!(page.items.len(), 20);
		assert_eq!(page.total_count, 45);
		assert!(page.has_more);

		let last = paginate((0..45).collect::<Vec<_>>(), 40, 20);

		assert_eq!(last.items.len(), 5);
		assert!(!last.has_more);

		let past_end = paginate((0..45).collect::<Vec<_>>(), 60, 20);

		assert!(past_end.items.is_empty());
		assert_eq!(past_end.total_count, 45);
		assert!(!past_end.has_more);
	}
}
