//! Access tokens obtained from a provider's token endpoint.

// self
use crate::{
	_prelude::*,
	auth::{ScopeList, token::secret::TokenSecret},
};

/// Result of a successful authorization-code exchange.
///
/// The gateway holds it only for the duration of a callback; nothing is persisted and the
/// refresh token, when present, is never rotated.
#[derive(Clone)]
pub struct AccessToken {
	/// Bearer secret presented to the provider's user-info endpoint.
	pub secret: TokenSecret,
	/// Token type reported by the provider (normally `bearer`).
	pub token_type: String,
	/// Refresh token, if the provider issued one.
	pub refresh_token: Option<TokenSecret>,
	/// Scopes granted by the provider, or the requested scopes when it echoed none.
	pub scopes: ScopeList,
	/// Instant the exchange completed.
	pub issued_at: OffsetDateTime,
	/// Expiry derived from `expires_in`, when the provider sent one.
	pub expires_at: Option<OffsetDateTime>,
}
impl AccessToken {
	/// Creates a token with no refresh secret or expiry.
	pub fn new(
		secret: impl Into<String>,
		token_type: impl Into<String>,
		scopes: ScopeList,
		issued_at: OffsetDateTime,
	) -> Self {
		Self {
			secret: TokenSecret::new(secret),
			token_type: token_type.into(),
			refresh_token: None,
			scopes,
			issued_at,
			expires_at: None,
		}
	}

	/// Sets the expiry relative to `issued_at`.
	pub fn with_expires_in(mut self, expires_in: Duration) -> Self {
		self.expires_at = self.issued_at.checked_add(expires_in);

		self
	}

	/// Attaches a refresh token.
	pub fn with_refresh_token(mut self, refresh: impl Into<String>) -> Self {
		self.refresh_token = Some(TokenSecret::new(refresh));

		self
	}

	/// Returns `true` if the provider-declared expiry has passed at `instant`.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at.is_some_and(|expires_at| instant >= expires_at)
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessToken")
			.field("secret", &"<redacted>")
			.field("token_type", &self.token_type)
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("scopes", &self.scopes)
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}
