// crates.io
use jsonwebtoken::{EncodingKey, Header};
use serde_json::{Value, json};
use time::{Duration, OffsetDateTime};
// self
use idp_gateway::{
	auth::{ProviderId, SigningSecret, UserInfo},
	session::SessionIssuer,
	verify::{TokenVerifier, VerificationResult, VerifyError},
};

const SECRET: &str = "verify-secret";

fn sign(claims: Value, secret: &str) -> String {
	jsonwebtoken::encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
		.expect("Fixture token should encode.")
}

fn verifier() -> TokenVerifier {
	TokenVerifier::new(&SigningSecret::new(SECRET))
}

#[test]
fn expired_tokens_are_rejected() {
	let now = OffsetDateTime::now_utc().unix_timestamp();
	let token = sign(json!({ "iat": now - 120, "exp": now - 60 }), SECRET);
	let result = verifier().verify(&token);

	assert!(!result.valid);
	assert_eq!(result.reason, Some(VerifyError::ExpiredOrNotYetValid));
}

#[test]
fn tokens_issued_in_the_future_are_rejected() {
	let now = OffsetDateTime::now_utc().unix_timestamp();
	let token = sign(json!({ "iat": now + 600, "exp": now + 1200 }), SECRET);

	assert_eq!(
		verifier().verify(&token),
		VerificationResult::rejected(VerifyError::ExpiredOrNotYetValid)
	);
}

#[test]
fn foreign_signatures_are_rejected_before_claims() {
	let token = sign(json!({ "sub": "no-time-claims" }), "someone-else");
	let result = verifier().verify(&token);

	match result.reason {
		Some(VerifyError::Signature { reason }) => assert!(!reason.is_empty()),
		other => panic!("Expected a signature failure, got {other:?}."),
	}
}

#[test]
fn missing_claims_are_named() {
	let now = OffsetDateTime::now_utc().unix_timestamp();
	let without_iat = sign(json!({ "exp": now + 60 }), SECRET);
	let string_exp = sign(json!({ "iat": now, "exp": "later" }), SECRET);

	assert_eq!(verifier().verify(&without_iat).reason, Some(VerifyError::Claim { claim: "iat" }));
	assert_eq!(verifier().verify(&string_exp).reason, Some(VerifyError::Claim { claim: "exp" }));
	assert_eq!(
		VerifyError::Claim { claim: "iat" }.to_string(),
		"Token claim `iat` is missing or not a numeric timestamp."
	);
}

#[test]
fn issued_sessions_round_trip_inside_their_window() {
	let secret = SigningSecret::new(SECRET);
	let issuer = SessionIssuer::new(&secret, Duration::minutes(15));
	let provider = ProviderId::new("Google").expect("Provider fixture should be valid.");
	let issued_at = OffsetDateTime::now_utc();
	let session = issuer
		.issue_at(&provider, &UserInfo::new("108", Value::Null), issued_at)
		.expect("Session should be issued.");
	let verifier = verifier();

	for offset in [Duration::ZERO, Duration::seconds(1), Duration::minutes(14)] {
		let result = verifier.verify_at(session.token.expose(), issued_at + offset);

		assert!(result.valid, "Token should be valid {offset} after issuance.");
		assert!(result.into_result().is_ok());
	}

	assert!(!verifier.verify_at(session.token.expose(), issued_at + Duration::minutes(16)).valid);
}

#[test]
fn verification_is_safe_across_threads() {
	let verifier = std::sync::Arc::new(verifier());
	let now = OffsetDateTime::now_utc().unix_timestamp();
	let token = sign(json!({ "iat": now - 1, "exp": now + 300 }), SECRET);
	let handles = (0..8)
		.map(|_| {
			let verifier = verifier.clone();
			let token = token.clone();

			std::thread::spawn(move || verifier.verify(&token).valid)
		})
		.collect::<Vec<_>>();

	for handle in handles {
		assert!(handle.join().expect("Verifier thread should not panic."));
	}
}
