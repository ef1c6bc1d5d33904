//! Thread-safe in-memory [`StateStore`] with per-entry expiry.

// self
use crate::{
	_prelude::*,
	auth::ProviderId,
	flows::common,
	store::{StateError, StateStore},
};

/// Default lifetime of an issued `state`.
pub const DEFAULT_STATE_TTL: Duration = Duration::minutes(10);
/// Default number of unredeemed states kept before the oldest is evicted.
pub const DEFAULT_MAX_PENDING: usize = 10_000;

#[derive(Clone, Debug)]
struct PendingState {
	provider: ProviderId,
	expires_at: OffsetDateTime,
}

/// Process-local store; states do not survive restarts or span replicas.
///
/// At most `max_pending` states are held at once. Issuing past that bound evicts the state
/// closest to expiry.
#[derive(Clone, Debug)]
pub struct MemoryStateStore {
	pending: Arc<Mutex<HashMap<String, PendingState>>>,
	ttl: Duration,
	max_pending: usize,
}
impl MemoryStateStore {
	/// Creates a store whose states live for `ttl`.
	pub fn new(ttl: Duration) -> Self {
		Self { pending: Default::default(), ttl, max_pending: DEFAULT_MAX_PENDING }
	}

	/// Caps the number of unredeemed states; values below one are raised to one.
	pub fn with_max_pending(mut self, max_pending: usize) -> Self {
		self.max_pending = max_pending.max(1);

		self
	}

	/// Lifetime applied to newly issued states.
	pub fn ttl(&self) -> Duration {
		self.ttl
	}

	/// Number of states awaiting redemption, including expired ones not yet pruned.
	pub fn pending(&self) -> usize {
		self.pending.lock().len()
	}

	/// [`StateStore::issue`] with an explicit clock.
	pub fn issue_at(&self, provider: &ProviderId, now: OffsetDateTime) -> String {
		let state = common::random_state();
		let mut pending = self.pending.lock();

		pending.retain(|_, entry| entry.expires_at > now);

		while pending.len() >= self.max_pending {
			let Some(oldest) = pending
				.iter()
				.min_by_key(|(_, entry)| entry.expires_at)
				.map(|(state, _)| state.clone())
			else {
				break;
			};

			pending.remove(&oldest);
		}

		pending.insert(
			state.clone(),
			PendingState { provider: provider.clone(), expires_at: now + self.ttl },
		);

		state
	}

	/// [`StateStore::consume`] with an explicit clock.
	pub fn consume_at(
		&self,
		provider: &ProviderId,
		state: &str,
		now: OffsetDateTime,
	) -> Result<(), StateError> {
		let entry = self
			.pending
			.lock()
			.remove(state)
			.ok_or_else(|| StateError::Unknown { state: state.to_owned() })?;

		if entry.provider != *provider {
			return Err(StateError::ProviderMismatch {
				expected: entry.provider,
				found: provider.clone(),
			});
		}
		if now > entry.expires_at {
			return Err(StateError::Expired);
		}

		Ok(())
	}
}
impl Default for MemoryStateStore {
	fn default() -> Self {
		Self::new(DEFAULT_STATE_TTL)
	}
}
impl StateStore for MemoryStateStore {
	fn issue(&self, provider: &ProviderId) -> String {
		self.issue_at(provider, OffsetDateTime::now_utc())
	}

	fn consume(&self, provider: &ProviderId, state: &str) -> Result<(), StateError> {
		self.consume_at(provider, state, OffsetDateTime::now_utc())
	}
}
