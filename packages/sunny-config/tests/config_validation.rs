use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use sunny_config::{Config, Error};

const SAMPLE_CONFIG_TEMPLATE_TOML: &str = include_str!("fixtures/sample_config.template.toml");

fn sample_toml_with(section: &[&str], key: &str, value: Value) -> String {
	let mut root: Value =
		toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse template config.");
	let mut table = root.as_table_mut().expect("Template config must be a table.");

	for name in section {
		table = table
			.get_mut(*name)
			.and_then(Value::as_table_mut)
			.unwrap_or_else(|| panic!("Template config must include [{name}]."));
	}

	table.insert(key.to_string(), value);

	toml::to_string(&root).expect("Failed to render template config.")
}

fn write_temp_config(payload: String) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("sunny_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn load_payload(payload: String) -> sunny_config::Result<Config> {
	let path = write_temp_config(payload);
	let result = sunny_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	result
}

fn expect_validation_error(payload: String, expected: &str) {
	let err = load_payload(payload).expect_err("Expected validation error.");

	assert!(matches!(err, Error::Validation { .. }), "Unexpected error kind: {err:?}");

	let message = err.to_string();

	assert!(message.contains(expected), "Unexpected error message: {message}");
}

#[test]
fn sample_config_loads_with_defaults() {
	let cfg = load_payload(SAMPLE_CONFIG_TEMPLATE_TOML.to_string())
		.expect("Sample config should load.");

	assert_eq!(cfg.search.max_limit, 50);
	assert_eq!(cfg.search.max_query_chars, 500);
	assert_eq!(cfg.scoring.product_type_name, 500.0);
	assert_eq!(cfg.grouping.min_base_name_chars, 10);
	assert!(cfg.lexicon.stop_words.iter().any(|word| word == "for"));
	assert!(cfg.lexicon.groupable_categories.iter().any(|category| category == "footwear"));
}

#[test]
fn lexicon_overrides_are_normalized() {
	let cfg = load_payload(SAMPLE_CONFIG_TEMPLATE_TOML.to_string())
		.expect("Sample config should load.");

	assert_eq!(
		cfg.lexicon.brands,
		vec!["nike".to_string(), "adidas".to_string(), "lego".to_string()]
	);
	// Lists that were not overridden keep their defaults.
	assert!(cfg.lexicon.characters.iter().any(|character| character == "peppa pig"));
}

#[test]
fn semantic_timeout_must_be_below_request_timeout() {
	let payload = sample_toml_with(&["search", "semantic"], "timeout_ms", Value::Integer(5_000));

	expect_validation_error(
		payload,
		"search.semantic.timeout_ms must be less than search.request_timeout_ms.",
	);
}

#[test]
fn embedding_dimensions_must_match_vector_dim() {
	let payload = sample_toml_with(&["storage", "qdrant"], "vector_dim", Value::Integer(768));

	expect_validation_error(
		payload,
		"providers.embedding.dimensions must match storage.qdrant.vector_dim.",
	);
}

#[test]
fn default_limit_must_not_exceed_max_limit() {
	let payload = sample_toml_with(&["search"], "default_limit", Value::Integer(80));

	expect_validation_error(
		payload,
		"search.default_limit must be between 1 and search.max_limit.",
	);
}

#[test]
fn max_limit_is_capped_at_fifty() {
	let payload = sample_toml_with(&["search"], "max_limit", Value::Integer(51));

	expect_validation_error(payload, "search.max_limit must be between 1 and 50.");

	let payload = sample_toml_with(&["search"], "max_limit", Value::Integer(0));

	expect_validation_error(payload, "search.max_limit must be between 1 and 50.");
}

#[test]
fn max_distance_must_be_in_range() {
	let payload = sample_toml_with(&["search", "semantic"], "max_distance", Value::Float(3.5));

	expect_validation_error(payload, "search.semantic.max_distance must be in the range 0.0-2.0.");
}

#[test]
fn negative_scoring_weight_is_rejected() {
	let mut root: Value =
		toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse template config.");
	let mut scoring = toml::map::Map::new();

	scoring.insert("token_name".to_string(), Value::Float(-1.0));
	root.as_table_mut()
		.expect("Template config must be a table.")
		.insert("scoring".to_string(), Value::Table(scoring));

	let payload = toml::to_string(&root).expect("Failed to render template config.");

	expect_validation_error(payload, "scoring.token_name must be a finite number zero or greater.");
}

#[test]
fn refresh_interval_must_be_positive() {
	let payload =
		sample_toml_with(&["taxonomy"], "refresh_interval_secs", Value::Integer(0));

	expect_validation_error(payload, "taxonomy.refresh_interval_secs must be greater than zero.");
}

#[test]
fn missing_file_reports_read_error() {
	let path = env::temp_dir().join("sunny_config_missing_file.toml");
	let err = sunny_config::load(&path).expect_err("Expected read error.");

	assert!(matches!(err, Error::ReadConfig { .. }), "Unexpected error kind: {err:?}");
}
