use reqwest::header::AUTHORIZATION;
use serde_json::{Map, Value};

#[test]
fn builds_bearer_auth_header() {
	let headers =
		sunny_providers::auth_headers("secret", &Map::new()).expect("Failed to build headers.");
	let value = headers.get(AUTHORIZATION).expect("Missing authorization header.");

	assert_eq!(value, "Bearer secret");
}

#[test]
fn default_headers_must_be_strings() {
	let mut defaults = Map::new();

	defaults.insert("x-team".to_string(), Value::from(7));

	let err = sunny_providers::auth_headers("secret", &defaults)
		.expect_err("Expected non-string header to be rejected.");

	assert!(matches!(err, sunny_providers::Error::InvalidConfig { .. }));
}
