//! Transport-agnostic request dispatcher.
//!
//! [`Dispatcher::handle`] maps `http` requests onto registry operations:
//!
//! | Route | Operation |
//! | --- | --- |
//! | `GET /` | list provider names |
//! | `GET /login/{P}` | redirect to the provider's authorization URL |
//! | `GET /callback/{P}` | validate `state`, exchange the code, fetch the identity, mint a session |
//! | `GET /verify/{P}` | verify the bearer token in `Authorization` |
//!
//! Providers are resolved by their percent-decoded name on every request; nothing is
//! registered globally.

// crates.io
use oauth2::http::{
	HeaderValue, Method, Request, Response, StatusCode,
	header::{ALLOW, AUTHORIZATION, CONTENT_TYPE, LOCATION},
};
use serde_json::json;
use tokio_util::sync::CancellationToken;
// self
#[cfg(feature = "reqwest")]
use crate::{config::GatewayConfig, error::ConfigError, verify::TokenVerifier};
use crate::{
	_prelude::*,
	error::FlowError,
	flows::{CallContext, common},
	registry::{Provider, Registry},
	session::SessionIssuer,
	store::{MemoryStateStore, StateError, StateStore},
};

const JSON: &str = "application/json";
const TEXT: &str = "text/plain; charset=utf-8";
const DEFAULT_REQUEST_TIMEOUT: StdDuration = StdDuration::from_secs(30);

/// Routes requests to the providers of one [`Registry`].
#[derive(Clone)]
pub struct Dispatcher {
	registry: Arc<Registry>,
	issuer: SessionIssuer,
	states: Option<Arc<dyn StateStore>>,
	request_timeout: StdDuration,
}
impl Dispatcher {
	/// Creates a dispatcher that validates `state` with an in-memory store.
	pub fn new(registry: Arc<Registry>, issuer: SessionIssuer) -> Self {
		Self {
			registry,
			issuer,
			states: Some(Arc::new(MemoryStateStore::default())),
			request_timeout: DEFAULT_REQUEST_TIMEOUT,
		}
	}

	/// Builds the registry, issuer, and state store described by `config`.
	#[cfg(feature = "reqwest")]
	pub fn from_config(config: &GatewayConfig) -> Result<Self, ConfigError> {
		config.validate()?;

		let verifier = Arc::new(TokenVerifier::new(&config.signing_secret));
		let registry = Registry::load(config.descriptors()?, verifier)?;
		let issuer = SessionIssuer::new(&config.signing_secret, config.session_ttl());
		let states = config.validate_state.then(|| {
			Arc::new(MemoryStateStore::new(config.state_ttl())) as Arc<dyn StateStore>
		});

		Ok(Self::new(Arc::new(registry), issuer)
			.with_state_store(states)
			.with_request_timeout(config.request_timeout()))
	}

	/// Replaces the state store; `None` accepts any callback `state`.
	pub fn with_state_store(mut self, states: Option<Arc<dyn StateStore>>) -> Self {
		self.states = states;

		self
	}

	/// Sets the deadline applied to each provider call.
	pub fn with_request_timeout(mut self, timeout: StdDuration) -> Self {
		self.request_timeout = timeout;

		self
	}

	/// Registry the dispatcher routes into.
	pub fn registry(&self) -> &Registry {
		&self.registry
	}

	/// Handles one request.
	pub async fn handle<B>(&self, request: &Request<B>) -> Response<String> {
		self.handle_with(request, None).await
	}

	/// Handles one request, aborting provider calls once `cancellation` fires.
	pub async fn handle_with<B>(
		&self,
		request: &Request<B>,
		cancellation: Option<CancellationToken>,
	) -> Response<String> {
		let mut ctx = CallContext::new().with_timeout(self.request_timeout);

		ctx.cancellation = cancellation;

		self.route(request, ctx).await.unwrap_or_else(Rejection::into_response)
	}

	async fn route<B>(
		&self,
		request: &Request<B>,
		ctx: CallContext,
	) -> Result<Response<String>, Rejection> {
		if request.method() != Method::GET {
			return Err(Rejection::method_not_allowed());
		}

		let path = request.uri().path();

		if path == "/" {
			return Ok(self.home());
		}

		let mut segments = path.trim_start_matches('/').split('/');
		let (Some(route), Some(name), None) = (segments.next(), segments.next(), segments.next())
		else {
			return Err(Rejection::not_found());
		};

		if !matches!(route, "login" | "callback" | "verify") {
			return Err(Rejection::not_found());
		}

		let name = urlencoding::decode(name).map_err(|_| Rejection::not_found())?;
		let provider = self.registry.lookup(&name).ok_or_else(|| {
			Rejection::new(StatusCode::NOT_FOUND, format!("Unknown provider `{name}`."))
		})?;

		match route {
			"login" => self.login(provider),
			"callback" => self.callback(provider, request, ctx).await,
			_ => self.verify(provider, request),
		}
	}

	fn home(&self) -> Response<String> {
		let names = self.registry.names().map(|name| name.as_ref()).collect::<Vec<&str>>();

		respond(StatusCode::OK, JSON, json!({ "providers": names }).to_string())
	}

	fn login(&self, provider: &Provider) -> Result<Response<String>, Rejection> {
		let state = match self.states.as_ref() {
			Some(states) => states.issue(provider.name()),
			None => common::random_state(),
		};
		let url = provider.start_attempt().begin(state).map_err(Rejection::internal)?;
		let location = HeaderValue::from_str(url.as_str()).map_err(Rejection::internal)?;
		let mut response = respond(StatusCode::FOUND, TEXT, String::new());

		response.headers_mut().insert(LOCATION, location);

		Ok(response)
	}

	async fn callback<B>(
		&self,
		provider: &Provider,
		request: &Request<B>,
		ctx: CallContext,
	) -> Result<Response<String>, Rejection> {
		let params = url::form_urlencoded::parse(request.uri().query().unwrap_or_default().as_bytes())
			.into_owned()
			.collect::<HashMap<String, String>>();

		if let Some(error) = params.get("error") {
			let message = match params.get("error_description") {
				Some(description) => format!("Provider returned `{error}`: {description}"),
				None => format!("Provider returned `{error}`."),
			};

			return Err(Rejection::new(StatusCode::BAD_REQUEST, message));
		}

		let code = params
			.get("code")
			.filter(|code| !code.is_empty())
			.ok_or_else(|| Rejection::new(StatusCode::BAD_REQUEST, "Missing authorization code."))?;

		if let Some(states) = self.states.as_ref() {
			let state = params.get("state").ok_or(StateError::Missing);

			state
				.and_then(|state| states.consume(provider.name(), state))
				.map_err(|e| Rejection::new(StatusCode::BAD_REQUEST, FlowError::from(e).to_string()))?;
		}

		let mut attempt = provider.resume_attempt();

		if let Err(e) = attempt.exchange(code, ctx.clone()).await {
			return Err(Rejection::upstream(provider, e));
		}
		if let Err(e) = attempt.identify(ctx).await {
			return Err(Rejection::upstream(provider, e));
		}

		let (_, user) = attempt.into_identity().ok_or_else(|| {
			Rejection::new(StatusCode::INTERNAL_SERVER_ERROR, "Authentication did not complete.")
		})?;
		let session = self.issuer.issue(provider.name(), &user).map_err(Rejection::internal)?;
		let body = json!({
			"provider": provider.name().as_ref(),
			"subject": user.subject,
			"token": session.token.expose(),
			"expires_at": session.expires_at.unix_timestamp(),
		});

		Ok(respond(StatusCode::OK, JSON, body.to_string()))
	}

	fn verify<B>(
		&self,
		provider: &Provider,
		request: &Request<B>,
	) -> Result<Response<String>, Rejection> {
		let token = request
			.headers()
			.get(AUTHORIZATION)
			.and_then(|value| value.to_str().ok())
			.map(str::trim)
			.filter(|value| !value.is_empty())
			.ok_or_else(|| Rejection::new(StatusCode::UNAUTHORIZED, "Authorization token missing"))?;
		let token = token.strip_prefix("Bearer ").unwrap_or(token);
		let result = provider.verify(token);

		if let Some(reason) = result.reason.as_ref() {
			return Err(Rejection::new(StatusCode::INTERNAL_SERVER_ERROR, reason.to_string()));
		}

		let body = serde_json::to_string(&result).map_err(Rejection::internal)?;

		Ok(respond(StatusCode::OK, JSON, body))
	}
}
impl Debug for Dispatcher {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Dispatcher")
			.field("registry", &self.registry)
			.field("issuer", &self.issuer)
			.field("validate_state", &self.states.is_some())
			.field("request_timeout", &self.request_timeout)
			.finish()
	}
}

#[derive(Debug)]
struct Rejection {
	status: StatusCode,
	message: String,
}
impl Rejection {
	fn new(status: StatusCode, message: impl Into<String>) -> Self {
		Self { status, message: message.into() }
	}

	fn not_found() -> Self {
		Self::new(StatusCode::NOT_FOUND, "Not found.")
	}

	fn method_not_allowed() -> Self {
		Self::new(StatusCode::METHOD_NOT_ALLOWED, "Only GET is supported.")
	}

	fn upstream(provider: &Provider, error: Error) -> Self {
		#[cfg(feature = "tracing")]
		tracing::warn!(provider = provider.name().as_ref(), error = %error, "authentication failed");
		#[cfg(not(feature = "tracing"))]
		let _ = error;

		Self::new(
			StatusCode::BAD_GATEWAY,
			format!("Authentication with provider `{}` failed.", provider.name()),
		)
	}

	fn internal(error: impl Display) -> Self {
		#[cfg(feature = "tracing")]
		tracing::error!(error = %error, "request failed");
		#[cfg(not(feature = "tracing"))]
		let _ = error;

		Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error.")
	}

	fn into_response(self) -> Response<String> {
		let mut response = respond(self.status, TEXT, self.message);

		if self.status == StatusCode::METHOD_NOT_ALLOWED {
			response.headers_mut().insert(ALLOW, HeaderValue::from_static("GET"));
		}

		response
	}
}

fn respond(status: StatusCode, content_type: &'static str, body: String) -> Response<String> {
	let mut response = Response::new(body);

	*response.status_mut() = status;
	response.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static(content_type));

	response
}
