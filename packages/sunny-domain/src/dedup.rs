use std::collections::HashSet;

use unicode_normalization::UnicodeNormalization;

use crate::product::Product;

/// NFKC, lowercase, whitespace-collapsed.
pub fn normalize_name(name: &str) -> String {
	let folded = name.nfkc().collect::<String>().to_lowercase();

	folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn price_pence(price: f64) -> i64 {
	(price * 100.0).round() as i64
}

pub fn dedup_key(product: &Product) -> (String, i64) {
	(normalize_name(&product.name), price_pence(product.price))
}

/// Keeps the first item of every `(name, price)` key. Callers sort by rank first so the
/// survivor is the best-ranked duplicate.
pub fn dedup_by_name_and_price<T, F>(items: Vec<T>, product: F) -> Vec<T>
where
	F: Fn(&T) -> &Product,
{
	let mut seen = HashSet::with_capacity(items.len());

	items.into_iter().filter(|item| seen.insert(dedup_key(product(item)))).collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn normalization_folds_width_case_and_spacing() {
		assert_eq!(normalize_name("ＬＥＧＯ  Star\tWars "), "lego star wars");
	}

	#[test]
	fn pence_rounding_absorbs_float_noise() {
		assert_eq!(price_pence(19.99), 1999);
		assert_eq!(price_pence(0.1 + 0.2), 30);
	}
}
