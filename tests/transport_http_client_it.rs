// std
use std::{
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	future::Future,
	pin::Pin,
	sync::Arc,
};
// crates.io
use parking_lot::Mutex;
// self
use idp_gateway::{
	auth::{ProviderId, SigningSecret},
	error::{Error, UpstreamFailure},
	flows::CallContext,
	http::{ResponseMetadata, ResponseMetadataSlot, UpstreamHttpClient},
	oauth::{
		TransportErrorMapper,
		oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse},
	},
	provider::ProviderDescriptor,
	registry::Registry,
	url::Url,
	verify::TokenVerifier,
};

#[derive(Debug)]
enum FakeTransportError {
	Unavailable,
}
impl Display for FakeTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Unavailable => write!(f, "Transport unavailable."),
		}
	}
}
impl StdError for FakeTransportError {}

#[derive(Clone, Copy)]
struct FakeHttpClient {
	status: u16,
}
impl UpstreamHttpClient for FakeHttpClient {
	type Handle = FakeHttpHandle;
	type TransportError = FakeTransportError;

	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle {
		FakeHttpHandle { slot, status: self.status }
	}
}

struct FakeHttpHandle {
	slot: ResponseMetadataSlot,
	status: u16,
}
impl<'a> AsyncHttpClient<'a> for FakeHttpHandle {
	type Error = HttpClientError<FakeTransportError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'a + Send + Sync>>;

	fn call(&'a self, _request: HttpRequest) -> Self::Future {
		let slot = self.slot.clone();
		let status = self.status;

		Box::pin(async move {
			assert!(
				slot.take().is_none(),
				"ResponseMetadataSlot must be clear before dispatching a request."
			);
			slot.store(ResponseMetadata {
				status: Some(status),
				content_type: Some("text/plain".into()),
			});

			Err(HttpClientError::Reqwest(Box::new(FakeTransportError::Unavailable)))
		})
	}
}

#[derive(Clone, Default)]
struct RecordingTransportErrorMapper {
	metadata: Arc<Mutex<Vec<Option<ResponseMetadata>>>>,
}
impl RecordingTransportErrorMapper {
	fn recorded_metadata(&self) -> Vec<Option<ResponseMetadata>> {
		self.metadata.lock().clone()
	}
}
impl TransportErrorMapper<FakeTransportError> for RecordingTransportErrorMapper {
	fn map_transport_error(
		&self,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<FakeTransportError>,
	) -> UpstreamFailure {
		self.metadata.lock().push(meta.cloned());

		match (meta.and_then(|value| value.status), err) {
			(Some(status), _) if status >= 400 =>
				UpstreamFailure::Status { status, oauth_error: None, description: None },
			(_, HttpClientError::Reqwest(inner)) => UpstreamFailure::transport(*inner),
			(_, other) => UpstreamFailure::Other { message: other.to_string() },
		}
	}
}

fn descriptor() -> ProviderDescriptor {
	let url = |value: &str| Url::parse(value).expect("Failed to parse fake endpoint URL.");

	ProviderDescriptor::builder(
		ProviderId::new("fake-http").expect("Failed to build fake provider identifier."),
	)
	.client("fake-client", "fake-secret")
	.redirect_url(url("https://app.example/callback/fake-http"))
	.authorization_endpoint(url("https://fake.example/authorize"))
	.token_endpoint(url("https://fake.example/token"))
	.build()
	.expect("Failed to build fake provider descriptor.")
}

fn registry(status: u16, mapper: Arc<RecordingTransportErrorMapper>) -> Registry {
	Registry::load_with(
		[descriptor()],
		Arc::new(TokenVerifier::new(&SigningSecret::new("fake-secret"))),
		Arc::new(FakeHttpClient { status }),
		mapper,
	)
	.expect("Registry over a fake transport should load.")
}

#[tokio::test]
async fn custom_transports_surface_upstream_status() {
	let mapper = Arc::new(RecordingTransportErrorMapper::default());
	let registry = registry(503, mapper.clone());
	let provider = registry.lookup("fake-http").expect("Fake provider should be registered.");
	let err = provider
		.exchange_code("code-1", CallContext::new())
		.await
		.expect_err("Fake transport always fails.");

	match err {
		Error::Exchange(err) => assert_eq!(err.failure.status(), Some(503)),
		other => panic!("Unexpected error variant: {other:?}."),
	}

	let observed = mapper.recorded_metadata();

	assert_eq!(observed.len(), 1, "Mapper must record a single request.");

	let meta = observed
		.first()
		.and_then(|value| value.clone())
		.expect("Response metadata should be recorded exactly once.");

	assert_eq!(meta.status, Some(503));
	assert_eq!(meta.content_type.as_deref(), Some("text/plain"));
}

#[tokio::test]
async fn transport_failures_without_status_stay_transport_errors() {
	let mapper = Arc::new(RecordingTransportErrorMapper::default());
	let registry = registry(200, mapper);
	let provider = registry.lookup("fake-http").expect("Fake provider should be registered.");
	let err = provider
		.exchange_code("code-1", CallContext::new())
		.await
		.expect_err("Fake transport always fails.");

	assert!(matches!(
		err,
		Error::Exchange(ref err) if matches!(err.failure, UpstreamFailure::Transport { .. })
	));
	assert!(err.to_string().contains("fake-http"));
}
