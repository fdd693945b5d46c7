use std::sync::{Arc, PoisonError, RwLock};

use sunny_domain::TaxonomySnapshot;

/// The live taxonomy. Readers take an `Arc` to the current snapshot and keep using it for the
/// whole request even if a refresh swaps the pointer meanwhile.
pub struct TaxonomyStore {
	current: RwLock<Arc<TaxonomySnapshot>>,
}
impl TaxonomyStore {
	pub fn new(snapshot: TaxonomySnapshot) -> Self {
		Self { current: RwLock::new(Arc::new(snapshot)) }
	}

	pub fn snapshot(&self) -> Arc<TaxonomySnapshot> {
		self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
	}

	pub fn replace(&self, snapshot: TaxonomySnapshot) {
		let next = Arc::new(snapshot);
		let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);

		*current = next;
	}
}

#[cfg(test)]
mod tests {
	use time::OffsetDateTime;

	use super::*;
	use sunny_domain::{TaxonomyEntry, TaxonomyKind};

	#[test]
	fn readers_keep_their_snapshot_across_a_swap() {
		let store = TaxonomyStore::new(TaxonomySnapshot::empty());
		let before = store.snapshot();

		store.replace(TaxonomySnapshot::new(
			vec![TaxonomyEntry::new("lego", TaxonomyKind::parse("Toys"), None, None)],
			OffsetDateTime::now_utc(),
		));

		assert!(before.is_empty());
		assert_eq!(store.snapshot().len(), 1);
		assert_eq!(store.snapshot().lookup("lego").len(), 1);
	}
}
