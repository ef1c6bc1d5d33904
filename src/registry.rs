//! Provider registry built once at startup and read-only afterwards.
//!
//! [`Registry::load`] either admits every descriptor or fails with the first
//! [`ConfigError`]; a partially populated registry is never returned.

// self
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper};
use crate::{
	_prelude::*,
	auth::{AccessToken, ProviderId, UserInfo},
	error::ConfigError,
	flows::{AuthAttempt, CallContext, FlowEngine, OAuth2Engine},
	http::UpstreamHttpClient,
	oauth::TransportErrorMapper,
	obs::{self, Step, StepOutcome, StepSpan},
	provider::ProviderDescriptor,
	verify::{TokenVerifier, VerificationResult},
};

/// One admitted provider: its descriptor, flow engine, and verifier binding.
#[derive(Clone)]
pub struct Provider {
	descriptor: Arc<ProviderDescriptor>,
	engine: Arc<dyn FlowEngine>,
	verifier: Arc<TokenVerifier>,
}
impl Provider {
	/// Binds a descriptor to an engine and verifier.
	pub fn new(
		descriptor: Arc<ProviderDescriptor>,
		engine: Arc<dyn FlowEngine>,
		verifier: Arc<TokenVerifier>,
	) -> Self {
		Self { descriptor, engine, verifier }
	}

	/// Routing key.
	pub fn name(&self) -> &ProviderId {
		&self.descriptor.name
	}

	/// Validated configuration.
	pub fn descriptor(&self) -> &ProviderDescriptor {
		&self.descriptor
	}

	/// Flow engine bound to this provider.
	pub fn engine(&self) -> &dyn FlowEngine {
		self.engine.as_ref()
	}

	/// See [`FlowEngine::authorization_url`].
	pub fn authorization_url(&self, state: &str) -> Url {
		self.engine.authorization_url(state)
	}

	/// See [`FlowEngine::exchange_code`].
	pub async fn exchange_code(&self, code: &str, ctx: CallContext) -> Result<AccessToken> {
		self.engine.exchange_code(code, ctx).await
	}

	/// See [`FlowEngine::fetch_user_info`].
	pub async fn fetch_user_info(&self, token: &AccessToken, ctx: CallContext) -> Result<UserInfo> {
		self.engine.fetch_user_info(token, ctx).await
	}

	/// Verifies a bearer token with the shared secret.
	pub fn verify(&self, token: &str) -> VerificationResult {
		const STEP: Step = Step::Verify;

		let span = StepSpan::new(STEP, &self.descriptor.name);
		let _guard = span.entered();

		obs::record_step_outcome(STEP, StepOutcome::Attempt);

		let result = self.verifier.verify(token);
		let outcome = if result.valid { StepOutcome::Success } else { StepOutcome::Failure };

		span.record_outcome(outcome);
		obs::record_step_outcome(STEP, outcome);

		result
	}

	/// Starts a fresh authentication attempt against this provider.
	pub fn start_attempt(&self) -> AuthAttempt<'_> {
		AuthAttempt::new(self.descriptor.name.clone(), self.engine.as_ref())
	}

	/// Resumes an attempt whose redirect was already issued.
	pub fn resume_attempt(&self) -> AuthAttempt<'_> {
		AuthAttempt::resume(self.descriptor.name.clone(), self.engine.as_ref())
	}
}
impl Debug for Provider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Provider")
			.field("name", &self.descriptor.name)
			.field("kind", &self.descriptor.kind)
			.finish()
	}
}

/// Immutable name-to-provider mapping consulted by the dispatcher.
#[derive(Clone, Debug, Default)]
pub struct Registry {
	providers: Vec<Provider>,
	index: HashMap<ProviderId, usize>,
}
impl Registry {
	/// Admits `descriptors` using a reqwest transport that never follows redirects.
	#[cfg(feature = "reqwest")]
	pub fn load<I>(descriptors: I, verifier: Arc<TokenVerifier>) -> Result<Self, ConfigError>
	where
		I: IntoIterator<Item = ProviderDescriptor>,
	{
		Self::load_with(
			descriptors,
			verifier,
			Arc::new(ReqwestHttpClient::without_redirects()?),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}

	/// Admits `descriptors` over a caller-supplied transport.
	///
	/// Fails on the first invalid or duplicated descriptor. No network calls are made.
	pub fn load_with<I, C, M>(
		descriptors: I,
		verifier: Arc<TokenVerifier>,
		http_client: Arc<C>,
		error_mapper: Arc<M>,
	) -> Result<Self, ConfigError>
	where
		I: IntoIterator<Item = ProviderDescriptor>,
		C: ?Sized + UpstreamHttpClient,
		M: ?Sized + TransportErrorMapper<C::TransportError>,
	{
		let mut providers = Vec::new();

		for descriptor in descriptors {
			descriptor.validate().map_err(|source| ConfigError::InvalidDescriptor {
				provider: descriptor.name.to_string(),
				source,
			})?;

			let descriptor = Arc::new(descriptor);
			let engine = OAuth2Engine::new(
				descriptor.clone(),
				http_client.clone(),
				error_mapper.clone(),
			)?;

			providers.push(Provider::new(descriptor, Arc::new(engine), verifier.clone()));
		}

		Self::from_providers(providers)
	}

	/// Builds a registry from already constructed providers.
	pub fn from_providers(providers: Vec<Provider>) -> Result<Self, ConfigError> {
		let mut index = HashMap::with_capacity(providers.len());

		for (position, provider) in providers.iter().enumerate() {
			if index.insert(provider.name().clone(), position).is_some() {
				return Err(ConfigError::DuplicateProvider { provider: provider.name().clone() });
			}
		}

		#[cfg(feature = "tracing")]
		tracing::info!(
			providers = ?providers.iter().map(|p| p.name().as_ref()).collect::<Vec<&str>>(),
			"provider registry loaded"
		);

		Ok(Self { providers, index })
	}

	/// Returns the provider registered under `name`.
	pub fn lookup(&self, name: &str) -> Option<&Provider> {
		self.index.get(name).map(|position| &self.providers[*position])
	}

	/// Registered names in load order.
	pub fn names(&self) -> impl Iterator<Item = &ProviderId> {
		self.providers.iter().map(Provider::name)
	}

	/// Registered providers in load order.
	pub fn providers(&self) -> &[Provider] {
		&self.providers
	}

	/// Number of registered providers.
	pub fn len(&self) -> usize {
		self.providers.len()
	}

	/// Returns true when no provider is registered.
	pub fn is_empty(&self) -> bool {
		self.providers.is_empty()
	}
}
