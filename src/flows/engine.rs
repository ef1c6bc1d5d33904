//! OAuth 2.0 flow engine backed by the `oauth2` crate.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, UserInfo},
	error::{ConfigError, ExchangeError, UpstreamFailure, UserInfoError},
	flows::{
		FlowEngine, FlowFuture,
		common::{self, CallContext},
	},
	http::UpstreamHttpClient,
	oauth::{BasicFacade, TransportErrorMapper},
	obs::{self, Step, StepOutcome, StepSpan},
	provider::{ProviderDescriptor, ProviderStrategy, strategy_for},
};

/// [`FlowEngine`] driving one provider over an [`UpstreamHttpClient`].
///
/// The engine owns a ready OAuth client built from the descriptor at load time, so every
/// request reuses the same immutable configuration.
pub struct OAuth2Engine<C, M>
where
	C: ?Sized + UpstreamHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	descriptor: Arc<ProviderDescriptor>,
	strategy: Arc<dyn ProviderStrategy>,
	facade: BasicFacade<C, M>,
	userinfo: Option<Url>,
}
impl<C, M> OAuth2Engine<C, M>
where
	C: ?Sized + UpstreamHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Builds an engine for `descriptor`, selecting the strategy from its family tag.
	pub fn new(
		descriptor: Arc<ProviderDescriptor>,
		http_client: Arc<C>,
		error_mapper: Arc<M>,
	) -> Result<Self, ConfigError> {
		let strategy = strategy_for(descriptor.kind);

		Self::with_strategy(descriptor, strategy, http_client, error_mapper)
	}

	/// Builds an engine with an explicit strategy.
	pub fn with_strategy(
		descriptor: Arc<ProviderDescriptor>,
		strategy: Arc<dyn ProviderStrategy>,
		http_client: Arc<C>,
		error_mapper: Arc<M>,
	) -> Result<Self, ConfigError> {
		let facade = BasicFacade::from_descriptor(&descriptor, http_client, error_mapper)?;
		let userinfo = descriptor.userinfo_endpoint();

		Ok(Self { descriptor, strategy, facade, userinfo })
	}

	/// Descriptor the engine was built from.
	pub fn descriptor(&self) -> &ProviderDescriptor {
		&self.descriptor
	}

	/// Resolved user-info endpoint, if any.
	pub fn userinfo_endpoint(&self) -> Option<&Url> {
		self.userinfo.as_ref()
	}
}
impl<C, M> FlowEngine for OAuth2Engine<C, M>
where
	C: ?Sized + UpstreamHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn authorization_url(&self, state: &str) -> Url {
		const STEP: Step = Step::Login;

		let span = StepSpan::new(STEP, &self.descriptor.name);
		let _guard = span.entered();

		obs::record_step_outcome(STEP, StepOutcome::Attempt);

		let url = common::build_authorization_url(&self.descriptor, self.strategy.as_ref(), state);

		span.record_outcome(StepOutcome::Success);
		obs::record_step_outcome(STEP, StepOutcome::Success);

		url
	}

	fn exchange_code<'a>(&'a self, code: &'a str, ctx: CallContext) -> FlowFuture<'a, AccessToken> {
		Box::pin(async move {
			const STEP: Step = Step::Exchange;

			let span = StepSpan::new(STEP, &self.descriptor.name);

			obs::record_step_outcome(STEP, StepOutcome::Attempt);

			let result: Result<AccessToken> = span
				.instrument(common::bounded(&ctx, self.facade.exchange_code(code)))
				.await
				.map_err(|failure| {
					span.record_failure(&failure);

					ExchangeError::new(self.descriptor.name.clone(), failure).into()
				});

			if result.is_ok() {
				span.record_outcome(StepOutcome::Success);
			}

			obs::record_step_outcome(STEP, StepOutcome::of(&result));

			result
		})
	}

	fn fetch_user_info<'a>(
		&'a self,
		token: &'a AccessToken,
		ctx: CallContext,
	) -> FlowFuture<'a, UserInfo> {
		Box::pin(async move {
			const STEP: Step = Step::UserInfo;

			let span = StepSpan::new(STEP, &self.descriptor.name);

			obs::record_step_outcome(STEP, StepOutcome::Attempt);

			let Some(endpoint) = self.userinfo.as_ref() else {
				span.record_outcome(StepOutcome::Success);
				obs::record_step_outcome(STEP, StepOutcome::Success);

				return Ok(UserInfo::placeholder());
			};
			let result: Result<UserInfo> = span
				.instrument(async {
					let claims =
						common::bounded(&ctx, self.facade.fetch_user_claims(endpoint, token)).await?;
					let subject = self.strategy.extract_subject(&claims).ok_or(
						UpstreamFailure::MissingIdentity { claims: self.strategy.identity_claims() },
					)?;

					Ok::<_, UpstreamFailure>(UserInfo::new(subject, claims))
				})
				.await
				.map_err(|failure| {
					span.record_failure(&failure);

					UserInfoError::new(self.descriptor.name.clone(), failure).into()
				});

			if result.is_ok() {
				span.record_outcome(StepOutcome::Success);
			}

			obs::record_step_outcome(STEP, StepOutcome::of(&result));

			result
		})
	}
}
impl<C, M> Debug for OAuth2Engine<C, M>
where
	C: ?Sized + UpstreamHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuth2Engine")
			.field("provider", &self.descriptor.name)
			.field("kind", &self.strategy.kind())
			.field("userinfo", &self.userinfo.as_ref().map(Url::as_str))
			.finish()
	}
}
