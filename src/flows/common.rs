//! Shared helpers for flow implementations (authorization URLs, call deadlines).

// crates.io
use rand::{Rng, distr::Alphanumeric};
use tokio_util::sync::CancellationToken;
// self
use crate::{_prelude::*, error::UpstreamFailure, provider::{ProviderDescriptor, ProviderStrategy}};

const STATE_LEN: usize = 32;

/// Per-call bounds applied to network-facing flow operations.
///
/// Without a timeout a hung upstream would block the calling request indefinitely, so
/// callers should always set one; the dispatcher applies its configured default.
#[derive(Clone, Debug, Default)]
pub struct CallContext {
	/// Maximum time the provider call may take.
	pub timeout: Option<StdDuration>,
	/// Token that aborts the call when cancelled.
	pub cancellation: Option<CancellationToken>,
}
impl CallContext {
	/// Creates an unbounded context.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the deadline relative to the start of the call.
	pub fn with_timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Attaches a cancellation token.
	pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
		self.cancellation = Some(token);

		self
	}
}

/// Runs `fut` within the bounds of `ctx`; cancellation wins over completion when both are
/// ready.
pub(crate) async fn bounded<F, T>(ctx: &CallContext, fut: F) -> Result<T, UpstreamFailure>
where
	F: Future<Output = Result<T, UpstreamFailure>>,
{
	let cancelled = async {
		match ctx.cancellation.as_ref() {
			Some(token) => token.cancelled().await,
			None => std::future::pending::<()>().await,
		}
	};
	let timed = async {
		match ctx.timeout {
			Some(limit) =>
				tokio::time::timeout(limit, fut).await.unwrap_or(Err(UpstreamFailure::Timeout)),
			None => fut.await,
		}
	};

	tokio::select! {
		biased;
		_ = cancelled => Err(UpstreamFailure::Cancelled),
		result = timed => result,
	}
}

/// Builds the authorization redirect for `descriptor`.
///
/// Pair order is fixed (`response_type`, `client_id`, `redirect_uri`, `scope`, strategy
/// extras, `state`) so the output is a pure function of its inputs.
pub(crate) fn build_authorization_url(
	descriptor: &ProviderDescriptor,
	strategy: &dyn ProviderStrategy,
	state: &str,
) -> Url {
	let mut extras = BTreeMap::new();

	strategy.augment_authorization(&mut extras);

	let mut url = descriptor.endpoints.authorization.clone();
	let mut pairs = url.query_pairs_mut();

	pairs.append_pair("response_type", "code");
	pairs.append_pair("client_id", &descriptor.client_id);
	pairs.append_pair("redirect_uri", descriptor.redirect_url.as_str());

	if let Some(scope_value) = descriptor.scopes.joined(descriptor.quirks.scope_delimiter) {
		pairs.append_pair("scope", &scope_value);
	}
	for (key, value) in &extras {
		pairs.append_pair(key, value);
	}

	pairs.append_pair("state", state);

	drop(pairs);

	url
}

/// Generates a random alphanumeric anti-CSRF `state` value.
pub fn random_state() -> String {
	rand::rng().sample_iter(Alphanumeric).take(STATE_LEN).map(char::from).collect()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		auth::{ProviderId, ScopeList},
		provider::{GenericStrategy, MicrosoftStrategy, ProviderQuirks},
	};

	fn descriptor(quirks: ProviderQuirks) -> ProviderDescriptor {
		ProviderDescriptor::builder(ProviderId::new("IDP1").expect("Provider fixture."))
			.client("abc", "secret")
			.redirect_url(Url::parse("https://app.example/callback/IDP1").expect("URL fixture."))
			.authorization_endpoint(
				Url::parse("https://idp.example/auth?audience=api").expect("URL fixture."),
			)
			.token_endpoint(Url::parse("https://idp.example/token").expect("URL fixture."))
			.scopes(ScopeList::new(["read", "write"]).expect("Scope fixture."))
			.quirks(quirks)
			.build()
			.expect("Descriptor fixture should build.")
	}

	#[test]
	fn existing_query_pairs_are_preserved() {
		let url = build_authorization_url(&descriptor(ProviderQuirks::default()), &GenericStrategy, "s1");

		assert_eq!(
			url.as_str(),
			"https://idp.example/auth?audience=api&response_type=code&client_id=abc&redirect_uri=https%3A%2F%2Fapp.example%2Fcallback%2FIDP1&scope=read+write&state=s1"
		);
	}

	#[test]
	fn custom_delimiters_and_extras_apply() {
		let url = build_authorization_url(
			&descriptor(ProviderQuirks { scope_delimiter: ',' }),
			&MicrosoftStrategy,
			"s2",
		);
		let pairs: HashMap<_, _> = url.query_pairs().into_owned().collect();

		assert_eq!(pairs.get("scope").map(String::as_str), Some("read,write"));
		assert_eq!(pairs.get("response_mode").map(String::as_str), Some("query"));
	}

	#[test]
	fn random_states_are_alphanumeric() {
		let state = random_state();

		assert_eq!(state.len(), STATE_LEN);
		assert!(state.chars().all(|ch| ch.is_ascii_alphanumeric()));
		assert_ne!(state, random_state());
	}

	#[tokio::test]
	async fn bounded_reports_timeouts() {
		let ctx = CallContext::new().with_timeout(StdDuration::from_millis(10));
		let result: Result<(), _> = bounded(&ctx, async {
			tokio::time::sleep(StdDuration::from_secs(5)).await;

			Ok(())
		})
		.await;

		assert!(matches!(result, Err(UpstreamFailure::Timeout)));
	}

	#[tokio::test]
	async fn bounded_reports_cancellation() {
		let token = CancellationToken::new();
		let ctx = CallContext::new().with_cancellation(token.clone());

		token.cancel();

		let result: Result<u8, _> = bounded(&ctx, async { Ok(1) }).await;

		assert!(matches!(result, Err(UpstreamFailure::Cancelled)));
	}

	#[tokio::test]
	async fn bounded_passes_results_through() {
		let result = bounded(&CallContext::new(), async { Ok::<_, UpstreamFailure>(7) }).await;

		assert_eq!(result.expect("Unbounded call should succeed."), 7);
	}
}
