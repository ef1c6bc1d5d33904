//! Per-step spans for provider calls and token checks.
//!
//! Every gateway step opens one `idp_gateway.step` span carrying the `step` and `provider`
//! fields. Once the step settles, the span also records `outcome` and, for upstream
//! failures that carry one, the provider's `upstream_status`. Without the `tracing` feature
//! all of this compiles down to no-ops.

// self
use crate::{
	_prelude::*,
	auth::ProviderId,
	error::UpstreamFailure,
	obs::{Step, StepOutcome},
};

/// Future returned by [`StepSpan::instrument`]; a plain passthrough without `tracing`.
#[cfg(feature = "tracing")]
pub type InstrumentedStep<F> = tracing::instrument::Instrumented<F>;
/// Future returned by [`StepSpan::instrument`]; a plain passthrough without `tracing`.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedStep<F> = F;

/// Span around one gateway step for one provider.
#[derive(Clone, Debug)]
pub struct StepSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl StepSpan {
	/// Opens the span for `step` against `provider`; outcome fields start empty.
	pub fn new(step: Step, provider: &ProviderId) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"idp_gateway.step",
				step = step.as_str(),
				provider = provider.as_ref(),
				outcome = tracing::field::Empty,
				upstream_status = tracing::field::Empty,
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (step, provider);

			Self {}
		}
	}

	/// Enters the span for a synchronous step such as URL building or verification.
	pub fn entered(&self) -> StepSpanGuard {
		#[cfg(feature = "tracing")]
		{
			StepSpanGuard { guard: self.span.clone().entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			StepSpanGuard {}
		}
	}

	/// Runs a provider call inside the span without holding a guard across `.await`.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedStep<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}

	/// Stores the terminal outcome on the span.
	pub fn record_outcome(&self, outcome: StepOutcome) {
		#[cfg(feature = "tracing")]
		self.span.record("outcome", outcome.as_str());
		#[cfg(not(feature = "tracing"))]
		let _ = outcome;
	}

	/// Marks the step failed and keeps the provider's HTTP status when the failure has one.
	pub fn record_failure(&self, failure: &UpstreamFailure) {
		self.record_outcome(StepOutcome::Failure);

		#[cfg(feature = "tracing")]
		if let Some(status) = failure.status() {
			self.span.record("upstream_status", status);
		}
		#[cfg(not(feature = "tracing"))]
		let _ = failure;
	}
}

/// Guard returned by [`StepSpan::entered`]; the span stays entered until it drops.
pub struct StepSpanGuard {
	#[cfg(feature = "tracing")]
	#[allow(dead_code)]
	guard: tracing::span::EnteredSpan,
}
impl Debug for StepSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("StepSpanGuard(..)")
	}
}
