//! Stateless bearer-token verification.
//!
//! Tokens are HS256 JWTs signed with the gateway's shared secret. Verification runs four
//! gates in order and the first failure wins:
//!
//! 1. decode and check the signature ([`VerifyError::Signature`]),
//! 2. require a JSON object payload ([`VerifyError::Malformed`]),
//! 3. read the numeric `exp` and `iat` claims ([`VerifyError::Claim`]),
//! 4. compare them with the current instant ([`VerifyError::ExpiredOrNotYetValid`]).
//!
//! Failures never escalate into [`Error`]; they become a negative [`VerificationResult`].

// crates.io
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
// self
use crate::{_prelude::*, auth::SigningSecret};

/// Reason a presented token was refused.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum VerifyError {
	/// Token could not be decoded or its signature does not match.
	#[error("Token verification failed: {reason}.")]
	Signature {
		/// Decoder message.
		reason: String,
	},
	/// Token decoded but its payload is not a claim set.
	#[error("Token is invalid.")]
	Malformed,
	/// A time claim is absent or not numeric.
	#[error("Token claim `{claim}` is missing or not a numeric timestamp.")]
	Claim {
		/// Offending claim name.
		claim: &'static str,
	},
	/// Current instant is after `exp` or before `iat`.
	#[error("Token is expired or not yet valid.")]
	ExpiredOrNotYetValid,
}

/// Outcome of one verification call.
///
/// Serializes as `{"valid": <bool>}`; the reason stays server-side.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VerificationResult {
	/// Whether every gate passed.
	pub valid: bool,
	/// Classified reason when `valid` is false.
	#[serde(skip)]
	pub reason: Option<VerifyError>,
}
impl VerificationResult {
	/// Positive outcome.
	pub fn valid() -> Self {
		Self { valid: true, reason: None }
	}

	/// Negative outcome carrying `reason`.
	pub fn rejected(reason: VerifyError) -> Self {
		Self { valid: false, reason: Some(reason) }
	}

	/// Converts into a plain [`std::result::Result`].
	pub fn into_result(self) -> Result<(), VerifyError> {
		match self.reason {
			Some(reason) => Err(reason),
			None => Ok(()),
		}
	}
}
impl From<Result<(), VerifyError>> for VerificationResult {
	fn from(result: Result<(), VerifyError>) -> Self {
		match result {
			Ok(()) => Self::valid(),
			Err(reason) => Self::rejected(reason),
		}
	}
}

/// HS256 verifier bound to one shared secret.
///
/// Holds no mutable state; one instance is shared by every provider and request.
#[derive(Clone)]
pub struct TokenVerifier {
	key: DecodingKey,
	validation: Validation,
}
impl TokenVerifier {
	/// Creates a verifier for tokens signed with `secret`.
	pub fn new(secret: &SigningSecret) -> Self {
		let mut validation = Validation::new(Algorithm::HS256);

		// Time claims are checked by `check_claims` with float semantics and zero leeway.
		validation.validate_exp = false;
		validation.validate_nbf = false;
		validation.validate_aud = false;
		validation.required_spec_claims.clear();
		validation.leeway = 0;

		Self { key: DecodingKey::from_secret(secret.as_bytes()), validation }
	}

	/// Verifies `token` against the current instant.
	pub fn verify(&self, token: &str) -> VerificationResult {
		self.verify_at(token, OffsetDateTime::now_utc())
	}

	/// Verifies `token` against `now`.
	pub fn verify_at(&self, token: &str, now: OffsetDateTime) -> VerificationResult {
		self.check(token, now).into()
	}

	fn check(&self, token: &str, now: OffsetDateTime) -> Result<(), VerifyError> {
		let data = jsonwebtoken::decode::<Value>(token, &self.key, &self.validation)
			.map_err(|e| VerifyError::Signature { reason: e.to_string() })?;

		check_claims(&data.claims, now)
	}
}
impl Debug for TokenVerifier {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenVerifier")
			.field("key", &"<redacted>")
			.field("algorithms", &self.validation.algorithms)
			.finish()
	}
}

fn check_claims(claims: &Value, now: OffsetDateTime) -> Result<(), VerifyError> {
	let claims = claims.as_object().ok_or(VerifyError::Malformed)?;
	let timestamp = |claim: &'static str| {
		claims.get(claim).and_then(Value::as_f64).ok_or(VerifyError::Claim { claim })
	};
	let exp = timestamp("exp")?.trunc();
	let iat = timestamp("iat")?.trunc();
	let now = now.unix_timestamp_nanos() as f64 / 1_000_000_000.;

	if now > exp || now < iat {
		return Err(VerifyError::ExpiredOrNotYetValid);
	}

	Ok(())
}
