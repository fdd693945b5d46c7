use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	pub taxonomy: Taxonomy,
	pub search: Search,
	#[serde(default)]
	pub scoring: Scoring,
	#[serde(default)]
	pub grouping: Grouping,
	#[serde(default)]
	pub lexicon: Lexicon,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
	pub qdrant: Qdrant,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Qdrant {
	pub url: String,
	pub collection: String,
	pub vector_dim: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Taxonomy {
	pub refresh_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Search {
	pub max_limit: u32,
	#[serde(default = "default_limit")]
	pub default_limit: u32,
	#[serde(default = "default_max_query_chars")]
	pub max_query_chars: u32,
	pub request_timeout_ms: u64,
	#[serde(default)]
	pub retrieval: SearchRetrieval,
	#[serde(default)]
	pub semantic: SearchSemantic,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchRetrieval {
	/// Multiplier applied to `offset + limit` to size each lexical phase.
	pub fetch_multiplier: u32,
	/// Floor for the per-phase fetch cap.
	pub min_fetch: u32,
	/// The OR fallback phase runs while results are below `cap * fallback_multiplier`.
	pub fallback_multiplier: u32,
}
impl Default for SearchRetrieval {
	fn default() -> Self {
		Self { fetch_multiplier: 5, min_fetch: 100, fallback_multiplier: 2 }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchSemantic {
	pub enabled: bool,
	pub timeout_ms: u64,
	/// Candidates farther than this (`1 - cosine similarity`) are dropped.
	pub max_distance: f32,
	pub score_cap: f32,
}
impl Default for SearchSemantic {
	fn default() -> Self {
		Self { enabled: true, timeout_ms: 1_500, max_distance: 0.5, score_cap: 60.0 }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Scoring {
	pub keyword_name: f32,
	pub keyword_text: f32,
	pub category_match: f32,
	pub franchise_match: f32,
	pub gate_pass_bonus: f32,
	pub franchise_miss_penalty: f32,
	pub budget_fit: f32,
	pub over_budget_penalty: f32,
	pub under_floor_penalty: f32,
	pub image_bonus: f32,
	pub in_stock_bonus: f32,
	pub valid_image_bonus: f32,
	pub phrase_name: f32,
	pub phrase_brand: f32,
	pub token_name: f32,
	pub token_brand: f32,
	pub product_type_name: f32,
	pub product_type_category: f32,
	pub media_penalty: f32,
	pub decoration_penalty: f32,
	pub override_rescue_bonus: f32,
}
impl Default for Scoring {
	fn default() -> Self {
		Self {
			keyword_name: 15.0,
			keyword_text: 7.0,
			category_match: 25.0,
			franchise_match: 30.0,
			gate_pass_bonus: 150.0,
			franchise_miss_penalty: 100.0,
			budget_fit: 5.0,
			over_budget_penalty: 50.0,
			under_floor_penalty: 50.0,
			image_bonus: 3.0,
			in_stock_bonus: 5.0,
			valid_image_bonus: 50.0,
			phrase_name: 100.0,
			phrase_brand: 75.0,
			token_name: 30.0,
			token_brand: 20.0,
			product_type_name: 500.0,
			product_type_category: 250.0,
			media_penalty: 200.0,
			decoration_penalty: 80.0,
			override_rescue_bonus: 50.0,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Grouping {
	/// Extra retrieval headroom for grouped requests, since several rows collapse into one.
	pub fetch_multiplier: u32,
	pub min_base_name_chars: u32,
}
impl Default for Grouping {
	fn default() -> Self {
		Self { fetch_multiplier: 5, min_base_name_chars: 10 }
	}
}

/// Keyword reference data. Normalized to lowercase on load.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Lexicon {
	pub stop_words: Vec<String>,
	pub brands: Vec<String>,
	pub characters: Vec<String>,
	pub phrases: Vec<String>,
	pub lexical_synonyms: Vec<SynonymExpansion>,
	pub dialect_synonyms: Vec<SynonymExpansion>,
	pub groupable_categories: Vec<String>,
	pub media_categories: Vec<String>,
	pub decoration_category: String,
	pub home_category: String,
	pub blocked_terms: Vec<String>,
	pub blocked_merchants: Vec<String>,
	pub intent_weights: Vec<IntentCategoryWeight>,
}
impl Default for Lexicon {
	fn default() -> Self {
		Self {
			stop_words: strings(&[
				"a", "an", "the", "for", "and", "or", "in", "on", "at", "to", "is", "are", "was",
				"were", "i", "me", "my", "want", "need", "looking", "find", "get", "buy", "under",
				"over", "below", "above", "with", "from", "of", "some", "any", "size", "age",
				"year", "years",
			]),
			brands: strings(&[
				"nike",
				"adidas",
				"puma",
				"reebok",
				"new balance",
				"vans",
				"converse",
				"skechers",
				"clarks",
				"start rite",
				"geox",
				"lelli kelly",
				"kickers",
				"dr martens",
				"timberland",
				"ugg",
				"hunter",
				"joules",
				"north face",
				"columbia",
				"crocs",
				"birkenstock",
				"havaianas",
				"lego",
				"playmobil",
				"barbie",
				"hot wheels",
				"matchbox",
				"brio",
				"sylvanian",
				"vtech",
				"leapfrog",
				"micro scooter",
				"fisher price",
				"little tikes",
			]),
			characters: strings(&[
				"paw patrol",
				"peppa pig",
				"bluey",
				"hey duggee",
				"cocomelon",
				"baby shark",
				"frozen",
				"disney",
				"spiderman",
				"spider-man",
				"batman",
				"pokemon",
				"minecraft",
				"fortnite",
				"roblox",
				"mario",
				"sonic",
				"harry potter",
				"star wars",
				"marvel",
				"thomas",
				"paddington",
				"peter rabbit",
				"gruffalo",
				"hungry caterpillar",
				"postman pat",
				"fireman sam",
				"pj masks",
				"ben holly",
				"teletubbies",
				"numberblocks",
				"octonauts",
				"gabby",
				"encanto",
				"moana",
			]),
			phrases: strings(&[
				"lego star wars",
				"lego harry potter",
				"lego marvel",
				"lego disney",
				"disney toys",
				"disney princess",
				"disney frozen",
				"frozen toys",
				"star wars",
				"harry potter",
				"spider man",
				"iron man",
				"captain america",
				"board games",
				"remote control car",
				"remote control",
				"peppa pig",
				"paw patrol",
				"frozen elsa",
				"toy story",
				"sonic hedgehog",
				"super mario",
				"kids trainers",
				"teddy bear",
				"soft toy",
				"plush toy",
				"lilo stitch",
				"little mermaid",
				"lion king",
				"dr martens",
				"new balance",
				"north face",
				"start rite",
				"lelli kelly",
				"micro scooter",
				"fisher price",
				"little tikes",
				"hot wheels",
				"hey duggee",
				"baby shark",
				"hungry caterpillar",
				"postman pat",
				"fireman sam",
				"pj masks",
				"ben holly",
				"peter rabbit",
			]),
			lexical_synonyms: vec![
				synonyms("trainers", &["sneakers", "athletic shoes", "running shoes"]),
				synonyms("wellies", &["wellington boots", "rain boots"]),
				synonyms("nappies", &["diapers"]),
				synonyms("nappy", &["diaper"]),
				synonyms("pushchair", &["stroller", "pram"]),
				synonyms("pram", &["stroller", "pushchair"]),
				synonyms("buggy", &["stroller"]),
				synonyms("jumper", &["sweater", "pullover"]),
				synonyms("trousers", &["pants"]),
				synonyms("dummy", &["pacifier"]),
				synonyms("cot", &["crib"]),
				synonyms("toy car", &["remote control car", "rc car", "diecast car"]),
				synonyms("rc car", &["remote control car", "toy car"]),
				synonyms("remote control", &["rc", "radio controlled"]),
			],
			dialect_synonyms: vec![
				synonyms(
					"trainers",
					&["sneakers", "athletic shoes", "running shoes", "footwear", "sports shoes"],
				),
				synonyms(
					"running shoes",
					&["trainers", "sneakers", "athletic footwear", "jogging shoes"],
				),
				synonyms("wellies", &["wellington boots", "rain boots", "rubber boots"]),
				synonyms("nappies", &["diapers", "baby nappies"]),
				synonyms("pushchair", &["stroller", "baby pushchair", "pram"]),
				synonyms("pram", &["stroller", "pushchair", "baby carriage"]),
				synonyms("jumper", &["sweater", "pullover", "knitwear"]),
				synonyms("trousers", &["pants", "slacks"]),
				synonyms("mobile", &["cell phone", "mobile phone", "smartphone"]),
				synonyms("lorry", &["truck", "hgv"]),
				synonyms("petrol", &["gas", "fuel"]),
				synonyms("holiday", &["vacation", "trip", "getaway"]),
				synonyms("flat", &["apartment", "housing"]),
			],
			groupable_categories: strings(&[
				"clothing",
				"clothes",
				"footwear",
				"shoes",
				"trainers",
				"boots",
				"baby clothes",
				"children's footwear",
				"women's clothing",
				"men's clothing",
				"sportswear",
				"underwear",
				"nightwear",
				"outerwear",
				"accessories",
			]),
			media_categories: strings(&["blu-ray", "dvd"]),
			decoration_category: "decorations".to_string(),
			home_category: "home".to_string(),
			blocked_terms: strings(&[
				"erectile",
				"viagra",
				"sexual health",
				"sti test",
				"std test",
				"adult toy",
				"lingerie",
				"erotic",
				"wine subscription",
				"beer delivery",
				"alcohol delivery",
				"gambling",
				"casino",
				"betting",
				"weight loss pill",
				"diet pill",
				"cigarette",
				"vape juice",
				"cbd oil",
				"nicotine",
				"e-liquid",
			]),
			blocked_merchants: strings(&[
				"bottle club",
				"naked wines",
				"virgin wines",
				"laithwaites",
				"majestic wine",
				"beer hawk",
				"whisky exchange",
				"master of malt",
				"bet365",
				"ladbrokes",
				"william hill",
				"paddy power",
				"betfair",
			]),
			intent_weights: vec![
				intent_weight("gift", "toys", 1.3),
				intent_weight("gift", "games", 1.2),
				intent_weight("gift", "clothing", 1.1),
				intent_weight("budget", "toys", 1.0),
				intent_weight("budget", "clothing", 1.1),
				intent_weight("premium", "toys", 0.9),
				intent_weight("premium", "clothing", 1.2),
			],
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct SynonymExpansion {
	pub term: String,
	pub synonyms: Vec<String>,
}

/// Multiplier applied to the taxonomy score when an intent and a requested category co-occur.
#[derive(Debug, Clone, Deserialize)]
pub struct IntentCategoryWeight {
	pub intent: String,
	pub category: String,
	pub multiplier: f32,
}

fn default_limit() -> u32 {
	20
}

fn default_max_query_chars() -> u32 {
	500
}

fn strings(items: &[&str]) -> Vec<String> {
	items.iter().map(|item| item.to_string()).collect()
}

fn synonyms(term: &str, expansions: &[&str]) -> SynonymExpansion {
	SynonymExpansion { term: term.to_string(), synonyms: strings(expansions) }
}

fn intent_weight(intent: &str, category: &str, multiplier: f32) -> IntentCategoryWeight {
	IntentCategoryWeight { intent: intent.to_string(), category: category.to_string(), multiplier }
}
