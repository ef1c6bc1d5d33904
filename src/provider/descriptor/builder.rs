// self
use crate::{
	_prelude::*,
	auth::{ClientSecret, ProviderId, ScopeList, ScopeValidationError},
	provider::{ProviderDescriptor, ProviderEndpoints, ProviderKind, ProviderQuirks},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ProviderDescriptorError {
	/// A required field was not supplied.
	#[error("Missing `{field}`.")]
	MissingField {
		/// Name of the missing field.
		field: &'static str,
	},
	/// A URL field failed to parse.
	#[error("The `{field}` value `{value}` is not a valid URL: {source}.")]
	InvalidUrl {
		/// Which field failed validation.
		field: &'static str,
		/// Raw value as configured.
		value: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A URL field is not an absolute hierarchical URL.
	#[error("The `{field}` value must be an absolute URL with a host: {url}.")]
	NotAbsolute {
		/// Which field failed validation.
		field: &'static str,
		/// URL that failed validation.
		url: String,
	},
	/// A URL field uses a scheme other than HTTP(S).
	#[error("The `{field}` value must use http or https: {url}.")]
	UnsupportedScheme {
		/// Which field failed validation.
		field: &'static str,
		/// URL that failed validation.
		url: String,
	},
	/// Scope list is invalid.
	#[error("The `scopes` value is invalid: {0}")]
	InvalidScope(#[from] ScopeValidationError),
	/// Reject scope delimiters that are control characters.
	#[error("Scope delimiter must be a printable character.")]
	InvalidScopeDelimiter {
		/// Invalid delimiter that was supplied.
		delimiter: char,
	},
}

/// Builder for [`ProviderDescriptor`] values.
#[derive(Debug)]
pub struct ProviderDescriptorBuilder {
	/// Name for the descriptor being constructed.
	pub name: ProviderId,
	/// Provider family.
	pub kind: ProviderKind,
	/// OAuth client identifier.
	pub client_id: Option<String>,
	/// OAuth client secret.
	pub client_secret: Option<ClientSecret>,
	/// Registered callback URL.
	pub redirect_url: Option<Url>,
	/// Authorization endpoint.
	pub authorization_endpoint: Option<Url>,
	/// Token endpoint.
	pub token_endpoint: Option<Url>,
	/// Optional user-info endpoint override.
	pub userinfo_endpoint: Option<Url>,
	/// Requested scopes.
	pub scopes: ScopeList,
	/// Provider-specific quirks.
	pub quirks: ProviderQuirks,
}
impl ProviderDescriptorBuilder {
	/// Creates a new builder seeded with the provided name.
	pub fn new(name: ProviderId) -> Self {
		Self {
			name,
			kind: ProviderKind::default(),
			client_id: None,
			client_secret: None,
			redirect_url: None,
			authorization_endpoint: None,
			token_endpoint: None,
			userinfo_endpoint: None,
			scopes: ScopeList::default(),
			quirks: ProviderQuirks::default(),
		}
	}

	/// Sets the provider family.
	pub fn kind(mut self, kind: ProviderKind) -> Self {
		self.kind = kind;

		self
	}

	/// Sets the client identifier and secret.
	pub fn client(mut self, client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
		self.client_id = Some(client_id.into());
		self.client_secret = Some(ClientSecret::new(client_secret));

		self
	}

	/// Sets the registered redirect URL.
	pub fn redirect_url(mut self, url: Url) -> Self {
		self.redirect_url = Some(url);

		self
	}

	/// Sets the authorization endpoint.
	pub fn authorization_endpoint(mut self, url: Url) -> Self {
		self.authorization_endpoint = Some(url);

		self
	}

	/// Sets the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Overrides the user-info endpoint.
	pub fn userinfo_endpoint(mut self, url: Url) -> Self {
		self.userinfo_endpoint = Some(url);

		self
	}

	/// Replaces the requested scopes.
	pub fn scopes(mut self, scopes: ScopeList) -> Self {
		self.scopes = scopes;

		self
	}

	/// Overrides the provider quirks.
	pub fn quirks(mut self, quirks: ProviderQuirks) -> Self {
		self.quirks = quirks;

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ProviderDescriptor, ProviderDescriptorError> {
		let client_id = self.client_id.ok_or(ProviderDescriptorError::MissingField { field: "client_id" })?;
		let client_secret =
			self.client_secret.ok_or(ProviderDescriptorError::MissingField { field: "client_secret" })?;
		let redirect_url =
			self.redirect_url.ok_or(ProviderDescriptorError::MissingField { field: "redirect_url" })?;
		let authorization = self
			.authorization_endpoint
			.ok_or(ProviderDescriptorError::MissingField { field: "auth_url" })?;
		let token =
			self.token_endpoint.ok_or(ProviderDescriptorError::MissingField { field: "token_url" })?;
		let descriptor = ProviderDescriptor {
			name: self.name,
			kind: self.kind,
			client_id,
			client_secret,
			redirect_url,
			endpoints: ProviderEndpoints { authorization, token, userinfo: self.userinfo_endpoint },
			scopes: self.scopes,
			quirks: self.quirks,
		};

		descriptor.validate()?;

		Ok(descriptor)
	}
}

impl ProviderDescriptor {
	/// Validates invariants for the descriptor.
	pub(crate) fn validate(&self) -> Result<(), ProviderDescriptorError> {
		if self.client_id.is_empty() {
			return Err(ProviderDescriptorError::MissingField { field: "client_id" });
		}

		validate_endpoint("redirect_url", &self.redirect_url)?;
		validate_endpoint("auth_url", &self.endpoints.authorization)?;
		validate_endpoint("token_url", &self.endpoints.token)?;

		if let Some(userinfo) = self.endpoints.userinfo.as_ref() {
			validate_endpoint("userinfo_url", userinfo)?;
		}

		validate_scope_delimiter(self.quirks.scope_delimiter)?;

		Ok(())
	}
}

/// Parses a raw configuration value into an endpoint URL, naming `field` on failure.
pub fn parse_endpoint(field: &'static str, raw: &str) -> Result<Url, ProviderDescriptorError> {
	let url = Url::parse(raw).map_err(|source| ProviderDescriptorError::InvalidUrl {
		field,
		value: raw.to_owned(),
		source,
	})?;

	validate_endpoint(field, &url)?;

	Ok(url)
}

fn validate_endpoint(field: &'static str, url: &Url) -> Result<(), ProviderDescriptorError> {
	if url.cannot_be_a_base() || !url.has_host() {
		return Err(ProviderDescriptorError::NotAbsolute { field, url: url.to_string() });
	}

	match url.scheme() {
		"https" | "http" => Ok(()),
		_ => Err(ProviderDescriptorError::UnsupportedScheme { field, url: url.to_string() }),
	}
}

fn validate_scope_delimiter(delimiter: char) -> Result<(), ProviderDescriptorError> {
	if delimiter.is_control() {
		Err(ProviderDescriptorError::InvalidScopeDelimiter { delimiter })
	} else {
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn parse_endpoint_names_the_field() {
		let err = parse_endpoint("token_url", "/relative/token")
			.expect_err("Relative URLs must be rejected.");

		assert!(matches!(err, ProviderDescriptorError::InvalidUrl { field: "token_url", .. }));

		let err = parse_endpoint("auth_url", "mailto:ops@example.com")
			.expect_err("Non-hierarchical URLs must be rejected.");

		assert!(matches!(err, ProviderDescriptorError::NotAbsolute { field: "auth_url", .. }));

		let err = parse_endpoint("auth_url", "ftp://example.com/auth")
			.expect_err("Non-HTTP schemes must be rejected.");

		assert!(matches!(err, ProviderDescriptorError::UnsupportedScheme { field: "auth_url", .. }));
	}

	#[test]
	fn build_requires_client_credentials() {
		let name = ProviderId::new("IDP1").expect("Provider fixture should be valid.");
		let err = ProviderDescriptor::builder(name)
			.redirect_url(Url::parse("https://app.example/callback/IDP1").expect("URL fixture."))
			.authorization_endpoint(Url::parse("https://idp.example/auth").expect("URL fixture."))
			.token_endpoint(Url::parse("https://idp.example/token").expect("URL fixture."))
			.build()
			.expect_err("Missing client credentials must be rejected.");

		assert_eq!(err, ProviderDescriptorError::MissingField { field: "client_id" });
	}
}
