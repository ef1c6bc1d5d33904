//! Gateway configuration documents.
//!
//! [`GatewayConfig`] is parsed from TOML or JSON through `serde_path_to_error`, so a bad
//! field is reported with its full path (for example `providers[1].token_url`). Provider
//! records accept both `snake_case` keys and the camel-cased spellings (`clientID`,
//! `authURL`, ...) used by older configuration files, whose provider list sits under
//! `identityProviders`.

// self
use crate::{
	_prelude::*,
	auth::{ClientSecret, ProviderId, ScopeList, SigningSecret},
	error::ConfigError,
	provider::{ProviderDescriptor, ProviderKind, ProviderQuirks, parse_endpoint},
	session::DEFAULT_SESSION_TTL,
	store::memory::DEFAULT_STATE_TTL,
};

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// One provider record as written in configuration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ProviderConfig {
	/// Unique routing name.
	pub name: String,
	/// Provider family; `generic` when omitted.
	#[serde(default)]
	pub kind: ProviderKind,
	/// OAuth client identifier.
	#[serde(alias = "clientID")]
	pub client_id: String,
	/// OAuth client secret.
	#[serde(alias = "clientSecret")]
	pub client_secret: ClientSecret,
	/// Callback URL registered with the provider.
	#[serde(alias = "redirectURL")]
	pub redirect_url: String,
	/// Authorization endpoint.
	#[serde(alias = "authURL")]
	pub auth_url: String,
	/// Token endpoint.
	#[serde(alias = "tokenURL")]
	pub token_url: String,
	/// User-info endpoint override.
	#[serde(default, alias = "userinfoURL")]
	pub userinfo_url: Option<String>,
	/// Requested scopes; empty when omitted.
	#[serde(default)]
	pub scopes: ScopeList,
	/// Scope separator used in the authorization URL; a space when omitted.
	#[serde(default)]
	pub scope_delimiter: Option<char>,
}
impl ProviderConfig {
	/// Validates the record and converts it into a [`ProviderDescriptor`].
	pub fn into_descriptor(self) -> Result<ProviderDescriptor, ConfigError> {
		let name = ProviderId::new(&self.name).map_err(|source| ConfigError::InvalidProviderName {
			name: self.name.clone(),
			source,
		})?;
		let invalid = |source| ConfigError::InvalidDescriptor { provider: self.name.clone(), source };
		let mut builder = ProviderDescriptor::builder(name)
			.kind(self.kind)
			.client(self.client_id.clone(), self.client_secret.expose())
			.redirect_url(parse_endpoint("redirect_url", &self.redirect_url).map_err(invalid)?)
			.authorization_endpoint(parse_endpoint("auth_url", &self.auth_url).map_err(invalid)?)
			.token_endpoint(parse_endpoint("token_url", &self.token_url).map_err(invalid)?)
			.scopes(self.scopes.clone());

		if let Some(raw) = self.userinfo_url.as_deref() {
			builder = builder.userinfo_endpoint(parse_endpoint("userinfo_url", raw).map_err(invalid)?);
		}
		if let Some(scope_delimiter) = self.scope_delimiter {
			builder = builder.quirks(ProviderQuirks { scope_delimiter });
		}

		builder.build().map_err(invalid)
	}
}

/// Top-level gateway configuration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct GatewayConfig {
	/// Shared secret for signing and verifying session tokens.
	pub signing_secret: SigningSecret,
	/// Lifetime of issued session tokens, in seconds.
	#[serde(default = "default_session_ttl_secs")]
	pub session_ttl_secs: u64,
	/// Deadline applied to each provider call, in seconds.
	#[serde(default = "default_request_timeout_secs")]
	pub request_timeout_secs: u64,
	/// Lifetime of anti-CSRF `state` values, in seconds.
	#[serde(default = "default_state_ttl_secs")]
	pub state_ttl_secs: u64,
	/// Whether callbacks must return a `state` issued by the login route.
	#[serde(default = "default_validate_state")]
	pub validate_state: bool,
	/// Provider records in routing order.
	#[serde(default, alias = "identityProviders")]
	pub providers: Vec<ProviderConfig>,
}
impl GatewayConfig {
	/// Parses and validates a TOML document.
	pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
		let config: Self = serde_path_to_error::deserialize(toml::Deserializer::new(raw))
			.map_err(ConfigError::parse)?;

		config.validate()?;

		Ok(config)
	}

	/// Parses and validates a JSON document.
	pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
		let mut deserializer = serde_json::Deserializer::from_str(raw);
		let config: Self =
			serde_path_to_error::deserialize(&mut deserializer).map_err(ConfigError::parse)?;

		config.validate()?;

		Ok(config)
	}

	/// Checks settings that the parser cannot express.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.signing_secret.is_empty() {
			return Err(ConfigError::EmptySigningSecret);
		}

		for (field, value) in [
			("session_ttl_secs", self.session_ttl_secs),
			("request_timeout_secs", self.request_timeout_secs),
			("state_ttl_secs", self.state_ttl_secs),
		] {
			if value == 0 {
				return Err(ConfigError::NonPositiveDuration { field });
			}
		}

		Ok(())
	}

	/// Converts every provider record, failing on the first invalid one.
	pub fn descriptors(&self) -> Result<Vec<ProviderDescriptor>, ConfigError> {
		self.providers.iter().cloned().map(ProviderConfig::into_descriptor).collect()
	}

	/// Session token lifetime.
	pub fn session_ttl(&self) -> Duration {
		Duration::seconds(saturating_secs(self.session_ttl_secs))
	}

	/// Per-call provider deadline.
	pub fn request_timeout(&self) -> StdDuration {
		StdDuration::from_secs(self.request_timeout_secs)
	}

	/// Anti-CSRF `state` lifetime.
	pub fn state_ttl(&self) -> Duration {
		Duration::seconds(saturating_secs(self.state_ttl_secs))
	}
}

fn saturating_secs(secs: u64) -> i64 {
	i64::try_from(secs).unwrap_or(i64::MAX)
}

fn default_session_ttl_secs() -> u64 {
	DEFAULT_SESSION_TTL.whole_seconds().unsigned_abs()
}

fn default_request_timeout_secs() -> u64 {
	DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_state_ttl_secs() -> u64 {
	DEFAULT_STATE_TTL.whole_seconds().unsigned_abs()
}

fn default_validate_state() -> bool {
	true
}
