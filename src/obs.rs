//! Optional observability helpers for gateway steps.
//!
//! # Feature Flags
//!
//! - Enable `tracing` (on by default) to emit structured spans named `idp_gateway.step` with the
//!   `step` and `provider` fields.
//! - Enable `metrics` to increment the `idp_gateway_step_total` counter for every
//!   attempt/success/failure, labeled by `step` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Core operations observed by the gateway.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Step {
	/// Authorization URL construction.
	Login,
	/// Authorization-code exchange.
	Exchange,
	/// User-info retrieval.
	UserInfo,
	/// Bearer token verification.
	Verify,
}
impl Step {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Step::Login => "login",
			Step::Exchange => "exchange",
			Step::UserInfo => "user_info",
			Step::Verify => "verify",
		}
	}
}
impl Display for Step {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StepOutcome {
	/// Entry to a step.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl StepOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			StepOutcome::Attempt => "attempt",
			StepOutcome::Success => "success",
			StepOutcome::Failure => "failure",
		}
	}

	/// Maps a result into the matching terminal outcome.
	pub fn of<T, E>(result: &Result<T, E>) -> Self {
		match result {
			Ok(_) => StepOutcome::Success,
			Err(_) => StepOutcome::Failure,
		}
	}
}
impl Display for StepOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
