// self
use crate::_prelude::*;

/// Identity-provider families the gateway knows how to drive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
	/// Any RFC 6749 provider; user info is only fetched when an endpoint is configured.
	#[default]
	Generic,
	/// Google accounts (OpenID Connect user info).
	Google,
	/// GitHub OAuth apps.
	#[serde(alias = "git_hub")]
	GitHub,
	/// Microsoft identity platform.
	Microsoft,
}
impl ProviderKind {
	/// Returns a stable label for logs and configuration.
	pub const fn as_str(self) -> &'static str {
		match self {
			ProviderKind::Generic => "generic",
			ProviderKind::Google => "google",
			ProviderKind::GitHub => "github",
			ProviderKind::Microsoft => "microsoft",
		}
	}

	/// Well-known user-info endpoint used when a descriptor does not override it.
	pub const fn default_userinfo_endpoint(self) -> Option<&'static str> {
		match self {
			ProviderKind::Generic => None,
			ProviderKind::Google => Some("https://openidconnect.googleapis.com/v1/userinfo"),
			ProviderKind::GitHub => Some("https://api.github.com/user"),
			ProviderKind::Microsoft => Some("https://graph.microsoft.com/oidc/userinfo"),
		}
	}
}
impl Display for ProviderKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn kinds_deserialize_from_lowercase_labels() {
		let kind: ProviderKind =
			serde_json::from_str("\"github\"").expect("GitHub label should parse.");

		assert_eq!(kind, ProviderKind::GitHub);
		assert_eq!(kind.to_string(), "github");
		assert_eq!(ProviderKind::default(), ProviderKind::Generic);
		assert!(ProviderKind::Generic.default_userinfo_endpoint().is_none());
	}
}
