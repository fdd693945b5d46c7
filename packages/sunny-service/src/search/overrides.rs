use sunny_config::Scoring;
use sunny_domain::MustMatch;

use super::scoring::{Exclusion, ScoredCandidate, Verdict};

/// Keeps only candidates naming the brand or character in their name or brand, and gives
/// category-gate misses among them a second chance. A no-op without a must-match term.
pub(crate) fn apply_must_match(
	candidates: Vec<ScoredCandidate>,
	must_match: Option<&MustMatch>,
	scoring: &Scoring,
) -> Vec<ScoredCandidate> {
	let Some(must_match) = must_match else { return candidates };
	let before = candidates.len();
	let mut rescued = 0_usize;
	let kept = candidates
		.into_iter()
		.filter(|candidate| candidate.product.name_or_brand_contains(&must_match.term))
		.map(|mut candidate| {
			let verdict = rescue_gate_exclusion(&candidate, scoring);

			if verdict != candidate.verdict {
				rescued += 1;
			}

			candidate.verdict = verdict;

			candidate
		})
		.collect::<Vec<_>>();

	tracing::debug!(
		kind = must_match.kind.as_str(),
		removed = before - kept.len(),
		rescued,
		"Must-match filter applied."
	);

	kept
}

/// A candidate that names the requested term and failed only on category is ranked again at
/// `max(0, base) + override_rescue_bonus`. Every other verdict is returned unchanged.
pub(crate) fn rescue_gate_exclusion(candidate: &ScoredCandidate, scoring: &Scoring) -> Verdict {
	match candidate.verdict {
		Verdict::Excluded(Exclusion::CategoryMismatch) =>
			Verdict::Ranked(candidate.base_score.max(0.0) + scoring.override_rescue_bonus),
		verdict => verdict,
	}
}
