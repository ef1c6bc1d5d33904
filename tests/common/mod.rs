//! Helpers shared by the integration tests.

#![allow(dead_code)]

// std
use std::sync::Arc;
// crates.io
use httpmock::MockServer;
// self
use idp_gateway::{
	auth::{ProviderId, ScopeList, SigningSecret},
	provider::{ProviderDescriptor, ProviderKind},
	registry::Registry,
	url::Url,
	verify::TokenVerifier,
};

/// Secret shared by the issuer and verifier in tests.
pub const SECRET: &str = "integration-secret";

/// Parses a fixture URL.
pub fn url(value: &str) -> Url {
	Url::parse(value).expect("Fixture URL should parse.")
}

/// Builds a provider name.
pub fn provider_id(name: &str) -> ProviderId {
	ProviderId::new(name).expect("Fixture provider name should be valid.")
}

/// Verifier bound to [`SECRET`].
pub fn verifier() -> Arc<TokenVerifier> {
	Arc::new(TokenVerifier::new(&SigningSecret::new(SECRET)))
}

/// Descriptor whose endpoints live on `server`; `userinfo` adds `/userinfo` as override.
pub fn mock_descriptor(
	server: &MockServer,
	name: &str,
	kind: ProviderKind,
	userinfo: bool,
) -> ProviderDescriptor {
	let mut builder = ProviderDescriptor::builder(provider_id(name))
		.kind(kind)
		.client("client-it", "secret-it")
		.redirect_url(url(&format!("https://app.example/callback/{name}")))
		.authorization_endpoint(url(&server.url("/authorize")))
		.token_endpoint(url(&server.url("/token")))
		.scopes(ScopeList::new(["openid", "profile"]).expect("Fixture scopes should be valid."));

	if userinfo {
		builder = builder.userinfo_endpoint(url(&server.url("/userinfo")));
	}

	builder.build().expect("Mock descriptor should build.")
}

/// Registry over the default reqwest transport.
pub fn registry(descriptors: Vec<ProviderDescriptor>) -> Registry {
	Registry::load(descriptors, verifier()).expect("Fixture registry should load.")
}
