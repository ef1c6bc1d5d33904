//! Loads a gateway configuration, sends a user to the login route, and verifies a session
//! token minted for them.

// crates.io
use color_eyre::Result;
// self
use idp_gateway::{
	auth::{ProviderId, UserInfo},
	config::GatewayConfig,
	dispatch::Dispatcher,
	http_types::{Request, header::LOCATION},
	session::SessionIssuer,
	verify::TokenVerifier,
};

const CONFIG: &str = r#"
signing_secret = "demo-signing-secret"
request_timeout_secs = 10

[[providers]]
name = "Google"
kind = "google"
client_id = "demo-client"
client_secret = "demo-secret"
redirect_url = "https://app.example.com/callback/Google"
auth_url = "https://accounts.google.com/o/oauth2/v2/auth"
token_url = "https://oauth2.googleapis.com/token"
scopes = ["openid", "email", "profile"]
"#;

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let config = GatewayConfig::from_toml_str(CONFIG)?;
	let dispatcher = Dispatcher::from_config(&config)?;
	let response = dispatcher.handle(&Request::builder().uri("/login/Google").body(())?).await;
	let location = response.headers().get(LOCATION).map(|value| value.to_str()).transpose()?;

	println!("Login answered {} and redirects to {location:?}.", response.status());

	let issuer = SessionIssuer::new(&config.signing_secret, config.session_ttl());
	let session =
		issuer.issue(&ProviderId::new("Google")?, &UserInfo::new("demo-user", Default::default()))?;
	let result = TokenVerifier::new(&config.signing_secret).verify(session.token.expose());

	println!("Session for `demo-user` expires at {} (valid: {}).", session.expires_at, result.valid);

	Ok(())
}
