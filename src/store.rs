//! Anti-CSRF `state` storage shared between the login and callback routes.

pub mod memory;

pub use memory::MemoryStateStore;

// self
use crate::{_prelude::*, auth::ProviderId};

/// Issues and redeems one-time `state` values bound to a provider.
///
/// Implementations must be safe to share across concurrent requests. A value is redeemable
/// at most once, and only for the provider it was issued for.
pub trait StateStore
where
	Self: Send + Sync,
{
	/// Generates a fresh `state` for `provider` and remembers it.
	fn issue(&self, provider: &ProviderId) -> String;

	/// Redeems `state`, removing it whether or not validation succeeds.
	fn consume(&self, provider: &ProviderId, state: &str) -> Result<(), StateError>;
}

/// Reasons a returned `state` is refused.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum StateError {
	/// Callback carried no `state` parameter.
	#[error("Callback is missing the `state` parameter.")]
	Missing,
	/// Value was never issued or was already redeemed.
	#[error("State `{state}` is unknown or was already used.")]
	Unknown {
		/// Offending value.
		state: String,
	},
	/// Value was issued for another provider.
	#[error("State was issued for provider `{expected}`, not `{found}`.")]
	ProviderMismatch {
		/// Provider the value was issued for.
		expected: ProviderId,
		/// Provider the callback arrived on.
		found: ProviderId,
	},
	/// Value outlived its time-to-live.
	#[error("State has expired.")]
	Expired,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn state_errors_convert_into_flow_errors() {
		let err: Error = crate::error::FlowError::from(StateError::Expired).into();

		assert!(matches!(err, Error::Flow(_)));
		assert_eq!(err.to_string(), "State has expired.");
	}
}
