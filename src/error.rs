//! Gateway-level error types shared across the registry, flows, and dispatcher.

// self
use crate::{
	_prelude::*,
	auth::{IdentifierError, ProviderId},
	flows::FlowState,
	provider::ProviderDescriptorError,
	store::StateError,
};

/// Gateway-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical gateway error exposed by public APIs.
///
/// Token verification failures surface as a negative
/// [`VerificationResult`](crate::verify::VerificationResult) instead.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Startup configuration problem; the gateway must refuse to start.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Authorization-code exchange failed.
	#[error(transparent)]
	Exchange(#[from] ExchangeError),
	/// User-info retrieval failed.
	#[error(transparent)]
	UserInfo(#[from] UserInfoError),
	/// Authentication attempt was driven out of order or its `state` was rejected.
	#[error(transparent)]
	Flow(#[from] FlowError),
	/// Session token could not be signed.
	#[error(transparent)]
	Session(#[from] SessionError),
}

/// Configuration and validation failures raised while loading providers.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Provider name is not a valid identifier.
	#[error("Provider name `{name}` is invalid.")]
	InvalidProviderName {
		/// Name as supplied by configuration.
		name: String,
		/// Underlying validation failure.
		#[source]
		source: IdentifierError,
	},
	/// Provider descriptor failed validation.
	#[error("Provider `{provider}` is misconfigured: {source}")]
	InvalidDescriptor {
		/// Offending provider name.
		provider: String,
		/// Field-level validation failure.
		#[source]
		source: ProviderDescriptorError,
	},
	/// Two descriptors share the same name.
	#[error("Provider `{provider}` is configured more than once.")]
	DuplicateProvider {
		/// Duplicated provider name.
		provider: ProviderId,
	},
	/// Shared signing secret is missing or empty.
	#[error("The token signing secret must not be empty.")]
	EmptySigningSecret,
	/// A duration setting is zero.
	#[error("The `{field}` setting must be greater than zero.")]
	NonPositiveDuration {
		/// Offending setting name.
		field: &'static str,
	},
	/// Configuration document could not be parsed.
	#[error("Configuration is invalid at `{path}`: {message}")]
	Parse {
		/// Path to the offending field inside the document.
		path: String,
		/// Parser message.
		message: String,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Descriptor endpoint could not be handed to the OAuth client.
	#[error("Provider `{provider}` has an endpoint the OAuth client rejects.")]
	OAuthClient {
		/// Offending provider name.
		provider: ProviderId,
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}

	pub(crate) fn parse<E>(err: serde_path_to_error::Error<E>) -> Self
	where
		E: Display,
	{
		Self::Parse { path: err.path().to_string(), message: err.inner().to_string() }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Upstream failure observed while talking to a provider endpoint.
#[derive(Debug, ThisError)]
pub enum UpstreamFailure {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Transport {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Outbound request could not be constructed.
	#[error("Request to the provider could not be constructed.")]
	Request(#[from] oauth2::http::Error),
	/// Provider answered with a non-success HTTP status.
	#[error("Provider responded with HTTP {status}{}.", describe_oauth_error(.oauth_error, .description))]
	Status {
		/// HTTP status code.
		status: u16,
		/// OAuth `error` field, when the body carried one.
		oauth_error: Option<String>,
		/// OAuth `error_description` field, when the body carried one.
		description: Option<String>,
	},
	/// Provider response body could not be decoded.
	#[error("Provider returned a malformed response.")]
	MalformedResponse {
		/// Structured decoding failure.
		#[source]
		source: BoxError,
	},
	/// Response decoded but lacked an identity claim.
	#[error("Provider response carries none of the identity claims {claims:?}.")]
	MissingIdentity {
		/// Claims that were searched for.
		claims: &'static [&'static str],
	},
	/// Caller-supplied deadline elapsed.
	#[error("Provider call timed out.")]
	Timeout,
	/// Caller cancelled the call.
	#[error("Provider call was cancelled.")]
	Cancelled,
	/// HTTP client failed without a more specific classification.
	#[error("HTTP client error occurred while calling the provider: {message}.")]
	Other {
		/// Client-supplied message.
		message: String,
	},
}
impl UpstreamFailure {
	/// Wraps a transport-specific network error.
	pub fn transport(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Transport { source: Box::new(src) }
	}

	/// Wraps a decoding failure.
	pub fn malformed(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::MalformedResponse { source: Box::new(src) }
	}

	/// Returns the upstream HTTP status, if the failure carries one.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Status { status, .. } => Some(*status),
			_ => None,
		}
	}
}

fn describe_oauth_error(error: &Option<String>, description: &Option<String>) -> String {
	match (error, description) {
		(Some(error), Some(description)) => format!(" ({error}: {description})"),
		(Some(error), None) => format!(" ({error})"),
		_ => String::new(),
	}
}

/// Authorization-code exchange failure; terminal for the attempt, never retried.
#[derive(Debug, ThisError)]
#[error("Token exchange with provider `{provider}` failed. {failure}")]
pub struct ExchangeError {
	/// Provider that was being called.
	pub provider: ProviderId,
	/// What went wrong upstream.
	#[source]
	pub failure: UpstreamFailure,
}
impl ExchangeError {
	/// Creates a new exchange error for the provider.
	pub fn new(provider: ProviderId, failure: UpstreamFailure) -> Self {
		Self { provider, failure }
	}
}

/// User-info retrieval failure.
#[derive(Debug, ThisError)]
#[error("User info retrieval from provider `{provider}` failed. {failure}")]
pub struct UserInfoError {
	/// Provider that was being called.
	pub provider: ProviderId,
	/// What went wrong upstream.
	#[source]
	pub failure: UpstreamFailure,
}
impl UserInfoError {
	/// Creates a new user-info error for the provider.
	pub fn new(provider: ProviderId, failure: UpstreamFailure) -> Self {
		Self { provider, failure }
	}
}

/// Authentication-attempt misuse.
#[derive(Debug, ThisError)]
pub enum FlowError {
	/// Operation is not permitted from the attempt's current state.
	#[error("Cannot {operation} while the attempt is {from}.")]
	InvalidTransition {
		/// State the attempt was in.
		from: FlowState,
		/// Operation that was requested.
		operation: &'static str,
	},
	/// Returned anti-CSRF `state` was not accepted.
	#[error(transparent)]
	StateRejected(#[from] StateError),
}

/// Session token signing failure.
#[derive(Debug, ThisError)]
pub enum SessionError {
	/// JWT encoding failed.
	#[error("Session token could not be signed.")]
	Sign(#[from] jsonwebtoken::errors::Error),
	/// Expiry overflowed the supported time range.
	#[error("Session expiry exceeds the supported time range.")]
	ExpiryOutOfRange,
}
