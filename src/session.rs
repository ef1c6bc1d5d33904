//! Session tokens minted after a successful callback.

// crates.io
use jsonwebtoken::{EncodingKey, Header};
// self
use crate::{
	_prelude::*,
	auth::{ProviderId, SigningSecret, TokenSecret, UserInfo},
	error::SessionError,
};

/// Default lifetime of an issued session token.
pub const DEFAULT_SESSION_TTL: Duration = Duration::hours(1);

/// Claim set carried by gateway session tokens.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
	/// Opaque subject reported by the provider.
	pub sub: String,
	/// Provider that authenticated the subject.
	pub provider: String,
	/// Issuance instant, seconds since the Unix epoch.
	pub iat: i64,
	/// Expiry instant, seconds since the Unix epoch.
	pub exp: i64,
}

/// Signed session credential handed back to the browser.
#[derive(Clone, Debug)]
pub struct SessionToken {
	/// Compact JWT.
	pub token: TokenSecret,
	/// Issuance instant.
	pub issued_at: OffsetDateTime,
	/// Expiry instant.
	pub expires_at: OffsetDateTime,
}

/// Signs HS256 session tokens with the same secret the verifier checks.
#[derive(Clone)]
pub struct SessionIssuer {
	key: EncodingKey,
	ttl: Duration,
}
impl SessionIssuer {
	/// Creates an issuer for `secret` whose tokens live for `ttl`.
	pub fn new(secret: &SigningSecret, ttl: Duration) -> Self {
		Self { key: EncodingKey::from_secret(secret.as_bytes()), ttl }
	}

	/// Lifetime applied to new tokens.
	pub fn ttl(&self) -> Duration {
		self.ttl
	}

	/// Issues a token for `user` at the current instant.
	pub fn issue(&self, provider: &ProviderId, user: &UserInfo) -> Result<SessionToken, SessionError> {
		self.issue_at(provider, user, OffsetDateTime::now_utc())
	}

	/// Issues a token for `user` with `iat = now` and `exp = now + ttl`.
	pub fn issue_at(
		&self,
		provider: &ProviderId,
		user: &UserInfo,
		now: OffsetDateTime,
	) -> Result<SessionToken, SessionError> {
		let expires_at = now.checked_add(self.ttl).ok_or(SessionError::ExpiryOutOfRange)?;
		let claims = SessionClaims {
			sub: user.subject.clone(),
			provider: provider.to_string(),
			iat: now.unix_timestamp(),
			exp: expires_at.unix_timestamp(),
		};
		let token = jsonwebtoken::encode(&Header::default(), &claims, &self.key)?;

		Ok(SessionToken { token: TokenSecret::new(token), issued_at: now, expires_at })
	}
}
impl Debug for SessionIssuer {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionIssuer").field("key", &"<redacted>").field("ttl", &self.ttl).finish()
	}
}
