//! Minimal identity returned by a provider's user-info step.

// self
use crate::_prelude::*;

/// Subject reported when a provider has no user-info endpoint to consult.
pub const PLACEHOLDER_SUBJECT: &str = "User Info";

/// Identity associated with an access token.
///
/// Only `subject` is part of the contract: an opaque identity string. `claims` carries the
/// provider's raw response for callers that know the provider's shape.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UserInfo {
	/// Opaque identity string.
	pub subject: String,
	/// Raw user-info document, or `null` when no endpoint was consulted.
	pub claims: Value,
}
impl UserInfo {
	/// Creates an identity from a subject and its raw claims.
	pub fn new(subject: impl Into<String>, claims: Value) -> Self {
		Self { subject: subject.into(), claims }
	}

	/// Identity used for providers that expose no user-info endpoint.
	pub fn placeholder() -> Self {
		Self::new(PLACEHOLDER_SUBJECT, Value::Null)
	}

	/// Returns true when this identity came from [`UserInfo::placeholder`].
	pub fn is_placeholder(&self) -> bool {
		self.subject == PLACEHOLDER_SUBJECT && self.claims.is_null()
	}
}
