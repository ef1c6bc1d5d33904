//! Secret wrappers that keep sensitive material out of logs.

// self
use crate::_prelude::*;

macro_rules! def_secret {
	($name:ident, $doc:literal) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(String);
		impl $name {
			/// Wraps a new secret string.
			pub fn new(value: impl Into<String>) -> Self {
				Self(value.into())
			}

			/// Returns the inner value. Callers must avoid logging this string.
			pub fn expose(&self) -> &str {
				&self.0
			}

			/// Returns true when no secret material is present.
			pub fn is_empty(&self) -> bool {
				self.0.is_empty()
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				self.expose()
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.debug_tuple(stringify!($name)).field(&"<redacted>").finish()
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str("<redacted>")
			}
		}
	};
}

def_secret! { TokenSecret, "Redacted bearer or refresh token issued by a provider or the gateway." }
def_secret! { ClientSecret, "Redacted OAuth client secret from a provider descriptor." }
def_secret! { SigningSecret, "Redacted symmetric key shared by the session issuer and the token verifier." }

impl SigningSecret {
	/// Raw key bytes fed to the HMAC signer and verifier.
	pub fn as_bytes(&self) -> &[u8] {
		self.0.as_bytes()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn secret_formatters_redact() {
		let secret = TokenSecret::new("super-secret");

		assert_eq!(format!("{secret:?}"), "TokenSecret(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
		assert_eq!(format!("{:?}", ClientSecret::new("abc")), "ClientSecret(\"<redacted>\")");
	}

	#[test]
	fn secrets_deserialize_from_plain_strings() {
		let secret: SigningSecret =
			serde_json::from_str("\"shared-key\"").expect("Secret should deserialize.");

		assert_eq!(secret.as_bytes(), b"shared-key");
		assert!(!secret.is_empty());
	}
}
