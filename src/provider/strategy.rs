//! Provider strategy hooks that customize each provider family.
//!
//! Flow engines stay generic over the OAuth protocol; everything that differs between
//! Google, GitHub, Microsoft, and generic providers lives behind [`ProviderStrategy`] and is
//! selected from the descriptor's [`ProviderKind`] tag.

// self
use crate::{_prelude::*, provider::ProviderKind};

/// Strategy hook that lets a provider family decorate requests and interpret user info.
///
/// Implementors are required to be `Send + Sync` and must stay deterministic: the same
/// descriptor and `state` always produce the same authorization URL.
pub trait ProviderStrategy: Send + Sync {
	/// Family this strategy serves.
	fn kind(&self) -> ProviderKind;

	/// Claims consulted, in order, when extracting the subject from a user-info document.
	fn identity_claims(&self) -> &'static [&'static str];

	/// Gives providers a chance to add static query pairs to the authorization URL.
	///
	/// The default implementation does nothing, which is enough for most providers.
	fn augment_authorization(&self, _params: &mut BTreeMap<String, String>) {}

	/// Extracts the opaque subject from a user-info document.
	///
	/// String and numeric claims are accepted; the first non-empty match wins.
	fn extract_subject(&self, claims: &Value) -> Option<String> {
		self.identity_claims().iter().find_map(|claim| match claims.get(*claim)? {
			Value::String(value) if !value.is_empty() => Some(value.clone()),
			Value::Number(value) => Some(value.to_string()),
			_ => None,
		})
	}
}

/// Strategy for RFC 6749 providers without family-specific behavior.
#[derive(Debug, Default)]
pub struct GenericStrategy;
impl ProviderStrategy for GenericStrategy {
	fn kind(&self) -> ProviderKind {
		ProviderKind::Generic
	}

	fn identity_claims(&self) -> &'static [&'static str] {
		&["sub", "id", "email"]
	}
}

/// Google accounts; the OpenID Connect `sub` claim is authoritative.
#[derive(Debug, Default)]
pub struct GoogleStrategy;
impl ProviderStrategy for GoogleStrategy {
	fn kind(&self) -> ProviderKind {
		ProviderKind::Google
	}

	fn identity_claims(&self) -> &'static [&'static str] {
		&["sub"]
	}
}

/// GitHub OAuth apps; the REST user document has no `sub`, only `login` and numeric `id`.
#[derive(Debug, Default)]
pub struct GitHubStrategy;
impl ProviderStrategy for GitHubStrategy {
	fn kind(&self) -> ProviderKind {
		ProviderKind::GitHub
	}

	fn identity_claims(&self) -> &'static [&'static str] {
		&["login", "id"]
	}
}

/// Microsoft identity platform; prefers the tenant-stable object id.
#[derive(Debug, Default)]
pub struct MicrosoftStrategy;
impl ProviderStrategy for MicrosoftStrategy {
	fn kind(&self) -> ProviderKind {
		ProviderKind::Microsoft
	}

	fn identity_claims(&self) -> &'static [&'static str] {
		&["oid", "sub"]
	}

	fn augment_authorization(&self, params: &mut BTreeMap<String, String>) {
		params.insert("response_mode".into(), "query".into());
	}
}

/// Resolves the strategy registered for a provider family.
pub fn strategy_for(kind: ProviderKind) -> Arc<dyn ProviderStrategy> {
	match kind {
		ProviderKind::Generic => Arc::new(GenericStrategy),
		ProviderKind::Google => Arc::new(GoogleStrategy),
		ProviderKind::GitHub => Arc::new(GitHubStrategy),
		ProviderKind::Microsoft => Arc::new(MicrosoftStrategy),
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	#[test]
	fn tagged_lookup_returns_matching_family() {
		for kind in
			[ProviderKind::Generic, ProviderKind::Google, ProviderKind::GitHub, ProviderKind::Microsoft]
		{
			assert_eq!(strategy_for(kind).kind(), kind);
		}
	}

	#[test]
	fn subjects_follow_claim_priority() {
		let github = GitHubStrategy;

		assert_eq!(
			github.extract_subject(&json!({ "login": "octocat", "id": 1 })),
			Some("octocat".into())
		);
		assert_eq!(github.extract_subject(&json!({ "login": "", "id": 583231 })), Some("583231".into()));
		assert_eq!(GoogleStrategy.extract_subject(&json!({ "email": "a@example.com" })), None);
	}

	#[test]
	fn only_microsoft_adds_authorization_params() {
		let mut params = BTreeMap::new();

		GoogleStrategy.augment_authorization(&mut params);

		assert!(params.is_empty());

		MicrosoftStrategy.augment_authorization(&mut params);

		assert_eq!(params.get("response_mode").map(String::as_str), Some("query"));
	}
}
