//! Per-attempt authorization-code state machine.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, ProviderId, UserInfo},
	error::FlowError,
	flows::{CallContext, FlowEngine, FlowState},
};

/// One user's journey through a single provider.
///
/// Transitions are strictly `Start → AwaitingCallback → TokenObtained → Identified`. The
/// first failing step, or any call made out of order, parks the attempt in
/// [`FlowState::Failed`]; nothing is retried.
pub struct AuthAttempt<'e> {
	provider: ProviderId,
	engine: &'e dyn FlowEngine,
	state: FlowState,
	anti_csrf: Option<String>,
	token: Option<AccessToken>,
	user: Option<UserInfo>,
}
impl<'e> AuthAttempt<'e> {
	/// Starts a fresh attempt in [`FlowState::Start`].
	pub fn new(provider: ProviderId, engine: &'e dyn FlowEngine) -> Self {
		Self { provider, engine, state: FlowState::Start, anti_csrf: None, token: None, user: None }
	}

	/// Rebuilds an attempt whose redirect was issued by an earlier request.
	///
	/// Callbacks arrive on a different request than the login redirect, so the dispatcher
	/// resumes in [`FlowState::AwaitingCallback`] once the returned `state` was accepted.
	pub fn resume(provider: ProviderId, engine: &'e dyn FlowEngine) -> Self {
		Self { state: FlowState::AwaitingCallback, ..Self::new(provider, engine) }
	}

	/// Provider this attempt talks to.
	pub fn provider(&self) -> &ProviderId {
		&self.provider
	}

	/// Current lifecycle state.
	pub fn state(&self) -> FlowState {
		self.state
	}

	/// `state` value sent with the redirect, when this attempt issued one.
	pub fn anti_csrf(&self) -> Option<&str> {
		self.anti_csrf.as_deref()
	}

	/// Token obtained by [`AuthAttempt::exchange`].
	pub fn token(&self) -> Option<&AccessToken> {
		self.token.as_ref()
	}

	/// Identity obtained by [`AuthAttempt::identify`].
	pub fn user_info(&self) -> Option<&UserInfo> {
		self.user.as_ref()
	}

	/// Consumes an identified attempt into its token and identity.
	pub fn into_identity(self) -> Option<(AccessToken, UserInfo)> {
		match (self.state, self.token, self.user) {
			(FlowState::Identified, Some(token), Some(user)) => Some((token, user)),
			_ => None,
		}
	}

	/// Builds the redirect URL and moves to [`FlowState::AwaitingCallback`].
	pub fn begin(&mut self, state: impl Into<String>) -> Result<Url> {
		self.require_state(FlowState::Start, "begin")?;

		let state = state.into();
		let url = self.engine.authorization_url(&state);

		self.anti_csrf = Some(state);
		self.state = FlowState::AwaitingCallback;

		Ok(url)
	}

	/// Exchanges `code` and moves to [`FlowState::TokenObtained`].
	pub async fn exchange(&mut self, code: &str, ctx: CallContext) -> Result<&AccessToken> {
		self.require_state(FlowState::AwaitingCallback, "exchange a code")?;

		match self.engine.exchange_code(code, ctx).await {
			Ok(token) => {
				self.state = FlowState::TokenObtained;

				Ok(self.token.insert(token))
			},
			Err(e) => {
				self.state = FlowState::Failed;

				Err(e)
			},
		}
	}

	/// Retrieves the identity and moves to [`FlowState::Identified`].
	pub async fn identify(&mut self, ctx: CallContext) -> Result<&UserInfo> {
		self.require_state(FlowState::TokenObtained, "fetch user info")?;

		let Some(token) = self.token.as_ref() else {
			self.state = FlowState::Failed;

			return Err(FlowError::InvalidTransition {
				from: FlowState::TokenObtained,
				operation: "fetch user info",
			}
			.into());
		};

		match self.engine.fetch_user_info(token, ctx).await {
			Ok(user) => {
				self.state = FlowState::Identified;

				Ok(self.user.insert(user))
			},
			Err(e) => {
				self.state = FlowState::Failed;

				Err(e)
			},
		}
	}

	fn require_state(&mut self, required: FlowState, operation: &'static str) -> Result<()> {
		if self.state == required {
			return Ok(());
		}

		let from = self.state;

		self.state = FlowState::Failed;

		Err(FlowError::InvalidTransition { from, operation }.into())
	}
}
impl Debug for AuthAttempt<'_> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthAttempt")
			.field("provider", &self.provider)
			.field("state", &self.state)
			.field("token", &self.token)
			.field("user", &self.user.as_ref().map(|user| user.subject.as_str()))
			.finish()
	}
}
