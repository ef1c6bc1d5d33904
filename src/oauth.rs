//! Internal OAuth client facade: code exchange and user-info retrieval over any
//! [`UpstreamHttpClient`].

pub use oauth2;

// crates.io
use oauth2::{
	AsyncHttpClient, AuthUrl, AuthorizationCode, ClientId, ClientSecret, EndpointNotSet,
	EndpointSet, HttpClientError, RedirectUrl, RequestTokenError, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicRequestTokenError, BasicTokenType},
	http::{
		Method, Request,
		header::{ACCEPT, AUTHORIZATION, USER_AGENT},
	},
};
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, ScopeList},
	error::{ConfigError, UpstreamFailure},
	http::{ResponseMetadata, ResponseMetadataSlot, UpstreamHttpClient},
	provider::ProviderDescriptor,
};

type ConfiguredBasicClient =
	BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;
type FacadeTokenResponse = oauth2::basic::BasicTokenResponse;

const USER_AGENT_VALUE: &str = concat!("idp-gateway/", env!("CARGO_PKG_VERSION"));

/// Maps HTTP transport failures into [`UpstreamFailure`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into an upstream failure.
	fn map_transport_error(
		&self,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> UpstreamFailure;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> UpstreamFailure {
		match err {
			HttpClientError::Reqwest(inner) =>
				if inner.is_timeout() {
					UpstreamFailure::Timeout
				} else {
					UpstreamFailure::transport(*inner)
				},
			HttpClientError::Http(inner) => UpstreamFailure::Request(inner),
			HttpClientError::Io(inner) => UpstreamFailure::transport(inner),
			HttpClientError::Other(message) => map_generic_transport_error(meta, message),
			_ => map_generic_transport_error(meta, "unrecognized transport failure"),
		}
	}
}

pub(crate) struct BasicFacade<C, M>
where
	C: ?Sized + UpstreamHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	oauth_client: ConfiguredBasicClient,
	requested_scopes: ScopeList,
	http_client: Arc<C>,
	error_mapper: Arc<M>,
}
impl<C, M> BasicFacade<C, M>
where
	C: ?Sized + UpstreamHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	pub(crate) fn from_descriptor(
		descriptor: &ProviderDescriptor,
		http_client: impl Into<Arc<C>>,
		error_mapper: impl Into<Arc<M>>,
	) -> Result<Self, ConfigError> {
		let invalid = |source| ConfigError::OAuthClient { provider: descriptor.name.clone(), source };
		let auth_url = AuthUrl::new(descriptor.endpoints.authorization.to_string()).map_err(invalid)?;
		let token_url = TokenUrl::new(descriptor.endpoints.token.to_string()).map_err(invalid)?;
		let redirect_url = RedirectUrl::new(descriptor.redirect_url.to_string()).map_err(invalid)?;
		let oauth_client = BasicClient::new(ClientId::new(descriptor.client_id.clone()))
			.set_client_secret(ClientSecret::new(descriptor.client_secret.expose().to_owned()))
			.set_auth_uri(auth_url)
			.set_token_uri(token_url)
			.set_redirect_uri(redirect_url);

		Ok(Self {
			oauth_client,
			requested_scopes: descriptor.scopes.clone(),
			http_client: http_client.into(),
			error_mapper: error_mapper.into(),
		})
	}

	/// Performs a single `authorization_code` grant; never retries.
	pub(crate) async fn exchange_code(&self, code: &str) -> Result<AccessToken, UpstreamFailure> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.with_metadata(meta.clone());
		let response = self
			.oauth_client
			.exchange_code(AuthorizationCode::new(code.to_owned()))
			.request_async(&instrumented)
			.await
			.map_err(|err| map_request_error(meta.take(), err, self.error_mapper.as_ref()))?;

		map_token_response(&self.requested_scopes, response)
	}

	/// GETs a JSON user-info document with the access token as bearer credential.
	pub(crate) async fn fetch_user_claims(
		&self,
		endpoint: &Url,
		token: &AccessToken,
	) -> Result<Value, UpstreamFailure> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.with_metadata(meta.clone());
		let request = Request::builder()
			.method(Method::GET)
			.uri(endpoint.as_str())
			.header(AUTHORIZATION, format!("Bearer {}", token.secret.expose()))
			.header(ACCEPT, "application/json")
			.header(USER_AGENT, USER_AGENT_VALUE)
			.body(Vec::new())?;
		let response = instrumented
			.call(request)
			.await
			.map_err(|err| self.error_mapper.map_transport_error(meta.take().as_ref(), err))?;
		let status = response.status();

		if !status.is_success() {
			return Err(UpstreamFailure::Status {
				status: status.as_u16(),
				oauth_error: None,
				description: None,
			});
		}

		serde_json::from_slice(response.body()).map_err(UpstreamFailure::malformed)
	}
}

fn map_token_response(
	requested: &ScopeList,
	response: FacadeTokenResponse,
) -> Result<AccessToken, UpstreamFailure> {
	let token_type = <BasicTokenType as AsRef<str>>::as_ref(response.token_type()).to_owned();
	let scopes = match response.scopes() {
		Some(granted) => ScopeList::new(granted.iter().map(|scope| scope.to_string()))
			.map_err(UpstreamFailure::malformed)?,
		None => requested.clone(),
	};
	let mut token = AccessToken::new(
		response.access_token().secret().to_owned(),
		token_type,
		scopes,
		OffsetDateTime::now_utc(),
	);

	if let Some(expires_in) = response.expires_in() {
		let secs = i64::try_from(expires_in.as_secs()).unwrap_or(i64::MAX);

		token = token.with_expires_in(Duration::seconds(secs));
	}
	if let Some(refresh) = response.refresh_token() {
		token = token.with_refresh_token(refresh.secret().to_owned());
	}

	Ok(token)
}

fn map_request_error<E, M>(
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<E>>,
	mapper: &M,
) -> UpstreamFailure
where
	E: 'static + Send + Sync + StdError,
	M: ?Sized + TransportErrorMapper<E>,
{
	let meta_ref = meta.as_ref();

	match err {
		RequestTokenError::ServerResponse(response) => UpstreamFailure::Status {
			status: meta_status(meta_ref).unwrap_or(400),
			oauth_error: Some(response.error().as_ref().to_string()),
			description: response.error_description().cloned(),
		},
		RequestTokenError::Request(error) => mapper.map_transport_error(meta_ref, error),
		RequestTokenError::Parse(error, _body) => match error_status(meta_ref) {
			Some(status) => UpstreamFailure::Status { status, oauth_error: None, description: None },
			None => UpstreamFailure::malformed(error),
		},
		RequestTokenError::Other(message) => match error_status(meta_ref) {
			Some(status) => UpstreamFailure::Status { status, oauth_error: None, description: None },
			None => UpstreamFailure::Other { message },
		},
	}
}

fn map_generic_transport_error(
	meta: Option<&ResponseMetadata>,
	message: impl Display,
) -> UpstreamFailure {
	match error_status(meta) {
		Some(status) => UpstreamFailure::Status { status, oauth_error: None, description: None },
		None => UpstreamFailure::Other { message: message.to_string() },
	}
}

fn meta_status(meta: Option<&ResponseMetadata>) -> Option<u16> {
	meta.and_then(|value| value.status)
}

fn error_status(meta: Option<&ResponseMetadata>) -> Option<u16> {
	meta.filter(|value| value.is_error_status()).and_then(|value| value.status)
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// self
	use super::*;
	use crate::{auth::ProviderId, http::ReqwestHttpClient};

	fn descriptor() -> ProviderDescriptor {
		let name = ProviderId::new("test-provider").expect("Failed to construct provider name.");

		ProviderDescriptor::builder(name)
			.client("client-id", "secret")
			.redirect_url(
				Url::parse("https://app.example.com/callback/test-provider")
					.expect("Failed to parse redirect URL."),
			)
			.authorization_endpoint(
				Url::parse("https://example.com/oauth2/authorize")
					.expect("Failed to parse authorization endpoint URL."),
			)
			.token_endpoint(
				Url::parse("https://example.com/oauth2/token")
					.expect("Failed to parse token endpoint URL."),
			)
			.scopes(ScopeList::new(["openid", "profile"]).expect("Failed to build scopes."))
			.build()
			.expect("Failed to build provider descriptor.")
	}

	#[test]
	fn builds_client_from_descriptor() {
		let facade = <BasicFacade<ReqwestHttpClient, ReqwestTransportErrorMapper>>::from_descriptor(
			&descriptor(),
			Arc::new(ReqwestHttpClient::default()),
			Arc::new(ReqwestTransportErrorMapper),
		)
		.expect("Facade should build from a valid descriptor.");

		assert_eq!(facade.requested_scopes.iter().collect::<Vec<_>>(), vec!["openid", "profile"]);
	}

	#[test]
	fn unparsable_error_bodies_keep_the_upstream_status() {
		let meta = ResponseMetadata { status: Some(500), content_type: Some("text/html".into()) };

		match map_generic_transport_error(Some(&meta), "boom") {
			UpstreamFailure::Status { status, .. } => assert_eq!(status, 500),
			other => panic!("Expected a status failure, got {other:?}."),
		}
		assert!(matches!(
			map_generic_transport_error(None, "boom"),
			UpstreamFailure::Other { .. }
		));
	}
}
