//! Provider descriptor data structures and helpers shared by all flows.
//!
//! The module exposes validated metadata, supporting builder utilities, and the provider
//! family tag so each identity provider is described in a transport-agnostic way.

/// Builder API for assembling provider descriptors.
pub mod builder;
/// Provider family tags.
pub mod kind;
/// Provider-specific quirk toggles.
pub mod quirks;

pub use builder::*;
pub use kind::*;
pub use quirks::*;

// self
use crate::{
	_prelude::*,
	auth::{ClientSecret, ProviderId, ScopeList},
};

/// Endpoint set declared by a provider descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderEndpoints {
	/// Authorization endpoint end-users are redirected to.
	pub authorization: Url,
	/// Token endpoint used for the code exchange.
	pub token: Url,
	/// User-info endpoint override; falls back to the family default when absent.
	pub userinfo: Option<Url>,
}

/// Immutable, validated configuration for one identity provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderDescriptor {
	/// Unique provider name, used as the routing key.
	pub name: ProviderId,
	/// Provider family selecting the strategy.
	pub kind: ProviderKind,
	/// OAuth client identifier.
	pub client_id: String,
	/// OAuth client secret; redacted from all formatting.
	pub client_secret: ClientSecret,
	/// Callback URL registered with the provider.
	pub redirect_url: Url,
	/// Endpoint definitions exposed by the provider.
	pub endpoints: ProviderEndpoints,
	/// Requested scopes in configured order.
	pub scopes: ScopeList,
	/// Provider-specific quirks.
	pub quirks: ProviderQuirks,
}
impl ProviderDescriptor {
	/// Creates a new builder for the provided name.
	pub fn builder(name: ProviderId) -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::new(name)
	}

	/// Resolves the user-info endpoint: the explicit override, else the family default.
	pub fn userinfo_endpoint(&self) -> Option<Url> {
		self.endpoints.userinfo.clone().or_else(|| {
			self.kind.default_userinfo_endpoint().and_then(|raw| Url::parse(raw).ok())
		})
	}
}
