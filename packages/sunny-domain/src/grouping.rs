use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
	product::{Product, RankedProduct},
	size, text,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
	pub id: String,
	pub size: String,
	pub price: f64,
	pub affiliate_link: String,
	pub in_stock: bool,
}

/// One physical item, possibly sold in several sizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedProduct {
	pub id: String,
	pub name: String,
	pub description: Option<String>,
	pub merchant: String,
	pub category: Option<String>,
	pub brand: Option<String>,
	pub image_url: Option<String>,
	pub score: f32,
	pub min_price: f64,
	pub max_price: f64,
	pub has_multiple_sizes: bool,
	/// Ascending by price.
	pub variants: Vec<Variant>,
}

#[derive(Debug, Clone)]
pub struct GroupingRules<'a> {
	pub groupable_categories: &'a [String],
	pub min_base_name_chars: usize,
	pub max_price: Option<f64>,
}
impl GroupingRules<'_> {
	pub fn is_groupable(&self, category: Option<&str>) -> bool {
		let Some(category) = category else { return false };

		self.groupable_categories.iter().any(|groupable| text::contains_lower(category, groupable))
	}
}

/// Groups ranked products into size-variant sets. Input must already be in rank order; groups
/// keep the position of their best member.
pub fn group_products(ranked: &[RankedProduct], rules: &GroupingRules<'_>) -> Vec<GroupedProduct> {
	let mut buckets: Vec<Vec<&RankedProduct>> = Vec::new();
	let mut by_key: HashMap<String, usize> = HashMap::new();

	for item in ranked {
		let product = &item.product;

		if !rules.is_groupable(product.category.as_deref()) {
			buckets.push(vec![item]);

			continue;
		}

		let key = group_key(product);

		match by_key.get(&key) {
			Some(index) => buckets[*index].push(item),
			None => {
				by_key.insert(key, buckets.len());
				buckets.push(vec![item]);
			},
		}
	}

	buckets.into_iter().filter_map(|members| build_group(members, rules)).collect()
}

fn group_key(product: &Product) -> String {
	format!(
		"{}|{}|{}",
		product.image_url.as_deref().filter(|url| !url.is_empty()).unwrap_or(&product.id),
		product.merchant,
		product.brand.as_deref().unwrap_or_default()
	)
}

fn build_group(members: Vec<&RankedProduct>, rules: &GroupingRules<'_>) -> Option<GroupedProduct> {
	let members = members
		.into_iter()
		.filter(|item| rules.max_price.is_none_or(|max| item.product.price <= max))
		.collect::<Vec<_>>();
	let first = members.first()?;
	let lead = &first.product;
	let score = members.iter().map(|item| item.score).fold(f32::NEG_INFINITY, f32::max);
	let min_price = members.iter().map(|item| item.product.price).fold(f64::INFINITY, f64::min);
	let max_price = members.iter().map(|item| item.product.price).fold(f64::NEG_INFINITY, f64::max);
	let mut variants = members
		.iter()
		.map(|item| Variant {
			id: item.product.id.clone(),
			size: size::extract_size(&item.product.name, rules.min_base_name_chars)
				.map(|matched| matched.size)
				.unwrap_or_else(|| format!("£{:.0}", item.product.price)),
			price: item.product.price,
			affiliate_link: item.product.affiliate_link.clone(),
			in_stock: item.product.in_stock,
		})
		.collect::<Vec<_>>();

	variants.sort_by(|a, b| a.price.total_cmp(&b.price));

	let has_multiple_sizes = variants.len() > 1 && rules.is_groupable(lead.category.as_deref());
	let name = if has_multiple_sizes {
		size::extract_size(&lead.name, rules.min_base_name_chars)
			.map(|matched| matched.base_name)
			.unwrap_or_else(|| lead.name.clone())
	} else {
		lead.name.clone()
	};

	Some(GroupedProduct {
		id: lead.id.clone(),
		name,
		description: lead.description.clone(),
		merchant: lead.merchant.clone(),
		category: lead.category.clone(),
		brand: lead.brand.clone(),
		image_url: lead.image_url.clone(),
		score,
		min_price,
		max_price,
		has_multiple_sizes,
		variants,
	})
}
