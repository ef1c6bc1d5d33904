#![cfg(feature = "reqwest")]

mod common;

// std
use std::collections::HashMap;
// self
use common::*;
use idp_gateway::{
	auth::ScopeList,
	config::GatewayConfig,
	error::ConfigError,
	provider::{ProviderDescriptor, ProviderDescriptorError},
	registry::Registry,
};

fn google() -> ProviderDescriptor {
	ProviderDescriptor::builder(provider_id("Google"))
		.client("abc", "google-secret")
		.redirect_url(url("https://app.example/callback/Google"))
		.authorization_endpoint(url("https://accounts.example/auth"))
		.token_endpoint(url("https://accounts.example/token"))
		.scopes(ScopeList::new(["profile"]).expect("Scope fixture should be valid."))
		.build()
		.expect("Google descriptor should build.")
}

fn named(name: &str) -> ProviderDescriptor {
	let mut descriptor = google();

	descriptor.name = provider_id(name);

	descriptor
}

#[test]
fn google_authorization_url_carries_every_parameter() {
	let registry = Registry::load([google()], verifier()).expect("Single descriptor should load.");
	let provider = registry.lookup("Google").expect("Google should be registered.");
	let url = provider.authorization_url("xyz");
	let pairs: HashMap<_, _> = url.query_pairs().into_owned().collect();

	assert_eq!(url.host_str(), Some("accounts.example"));
	assert_eq!(url.path(), "/auth");
	assert_eq!(pairs.get("client_id").map(String::as_str), Some("abc"));
	assert_eq!(
		pairs.get("redirect_uri").map(String::as_str),
		Some("https://app.example/callback/Google")
	);
	assert_eq!(pairs.get("scope").map(String::as_str), Some("profile"));
	assert_eq!(pairs.get("state").map(String::as_str), Some("xyz"));
	assert_eq!(pairs.get("response_type").map(String::as_str), Some("code"));
}

#[test]
fn authorization_urls_are_pure_in_state() {
	let registry = Registry::load([google()], verifier()).expect("Single descriptor should load.");
	let provider = registry.lookup("Google").expect("Google should be registered.");
	let first = provider.authorization_url("s-1");

	assert_eq!(first, provider.authorization_url("s-1"));

	let second = provider.authorization_url("s-2");
	let strip_state = |url: &idp_gateway::url::Url| {
		url.query_pairs().into_owned().filter(|(key, _)| key != "state").collect::<Vec<_>>()
	};

	assert_ne!(first, second);
	assert_eq!(strip_state(&first), strip_state(&second));
}

#[test]
fn lookup_reports_unregistered_names() {
	let registry = Registry::load([named("Google"), named("IDP1"), named("IDP2")], verifier())
		.expect("Unique descriptors should load.");

	for name in ["Google", "IDP1", "IDP2"] {
		let provider = registry.lookup(name).expect("Registered names should resolve.");

		assert_eq!(provider.name().as_ref(), name);
	}

	assert!(registry.lookup("google").is_none(), "Lookup is case-sensitive.");
	assert!(registry.lookup("IDP3").is_none());
}

#[test]
fn duplicate_names_reject_the_whole_set() {
	let err = Registry::load([named("IDP1"), named("IDP2"), named("IDP1")], verifier())
		.expect_err("Duplicates must fail the load.");

	match err {
		ConfigError::DuplicateProvider { provider } => assert_eq!(provider.as_ref(), "IDP1"),
		other => panic!("Unexpected error: {other:?}."),
	}
}

#[test]
fn descriptors_mutated_after_build_are_revalidated() {
	let mut broken = google();

	broken.redirect_url = url("mailto:ops@app.example");

	let err = Registry::load([named("IDP1"), broken], verifier())
		.expect_err("Invalid descriptors must fail the load.");

	match err {
		ConfigError::InvalidDescriptor { provider, source } => {
			assert_eq!(provider, "Google");
			assert!(matches!(
				source,
				ProviderDescriptorError::NotAbsolute { field: "redirect_url", .. }
			));
		},
		other => panic!("Unexpected error: {other:?}."),
	}
}

#[test]
fn configuration_documents_load_in_order() {
	let config = GatewayConfig::from_json_str(
		r#"{
			"signing_secret": "json-secret",
			"providers": [
				{
					"name": "IDP2",
					"kind": "microsoft",
					"clientID": "ms",
					"clientSecret": "ms-secret",
					"redirectURL": "https://app.example/callback/IDP2",
					"authURL": "https://login.example/authorize",
					"tokenURL": "https://login.example/token"
				},
				{
					"name": "IDP1",
					"kind": "github",
					"client_id": "gh",
					"client_secret": "gh-secret",
					"redirect_url": "https://app.example/callback/IDP1",
					"auth_url": "https://github.example/login/oauth/authorize",
					"token_url": "https://github.example/login/oauth/access_token",
					"scopes": ["read:user"]
				}
			]
		}"#,
	)
	.expect("Configuration fixture should parse.");
	let registry = Registry::load(
		config.descriptors().expect("Provider records should convert."),
		verifier(),
	)
	.expect("Configured providers should load.");

	assert_eq!(registry.names().map(|name| name.as_ref()).collect::<Vec<_>>(), ["IDP2", "IDP1"]);

	let microsoft = registry.lookup("IDP2").expect("Microsoft provider should be registered.");

	assert!(
		microsoft
			.authorization_url("s")
			.query_pairs()
			.any(|(key, value)| key == "response_mode" && value == "query")
	);
}
