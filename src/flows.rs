//! Flow engines and the per-attempt authorization-code state machine.
//!
//! [`FlowEngine`] is the capability every registered provider exposes: build the
//! authorization URL, exchange the returned code, and fetch the caller's identity. The
//! contract is identical across providers; family differences live in the
//! [`ProviderStrategy`](crate::provider::ProviderStrategy) bound to each engine.
//! [`AuthAttempt`] drives one engine through `Start → AwaitingCallback → TokenObtained →
//! Identified`, parking in `Failed` on the first error.

pub mod attempt;
pub mod common;
pub mod engine;

pub use attempt::*;
pub use common::CallContext;
pub use engine::*;

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, UserInfo},
};

/// Boxed future returned by [`FlowEngine`] network operations.
pub type FlowFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Uniform OAuth capability implemented once per provider.
///
/// Implementations hold no mutable state after construction and are shared across
/// concurrent requests. Network operations never retry; a failure is terminal for the
/// attempt that issued it.
pub trait FlowEngine: Send + Sync {
	/// Builds the redirect target for `state`.
	///
	/// Pure: identical inputs yield identical URLs, and `state` only affects the `state`
	/// query pair. The caller generates and later validates `state`.
	fn authorization_url(&self, state: &str) -> Url;

	/// Exchanges an authorization code for an access token.
	///
	/// Fails with [`ExchangeError`](crate::error::ExchangeError) on network failure, non-2xx
	/// responses, malformed payloads, deadline expiry, or cancellation.
	fn exchange_code<'a>(&'a self, code: &'a str, ctx: CallContext) -> FlowFuture<'a, AccessToken>;

	/// Retrieves the identity associated with `token`.
	///
	/// Fails with [`UserInfoError`](crate::error::UserInfoError) on transport or decoding
	/// failure. Callers must treat [`UserInfo::subject`] as opaque.
	fn fetch_user_info<'a>(
		&'a self,
		token: &'a AccessToken,
		ctx: CallContext,
	) -> FlowFuture<'a, UserInfo>;
}

/// Lifecycle of one authentication attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowState {
	/// Nothing has happened yet.
	Start,
	/// User was redirected to the provider; waiting for the callback.
	AwaitingCallback,
	/// Code was exchanged for an access token.
	TokenObtained,
	/// Identity was retrieved; terminal success.
	Identified,
	/// A step failed; terminal.
	Failed,
}
impl FlowState {
	/// Returns a stable label.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowState::Start => "start",
			FlowState::AwaitingCallback => "awaiting_callback",
			FlowState::TokenObtained => "token_obtained",
			FlowState::Identified => "identified",
			FlowState::Failed => "failed",
		}
	}

	/// Returns true for `Identified` and `Failed`.
	pub const fn is_terminal(self) -> bool {
		matches!(self, FlowState::Identified | FlowState::Failed)
	}
}
impl Display for FlowState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
