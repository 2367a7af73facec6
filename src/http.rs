//! Transport primitives for REST API calls.
//!
//! The module exposes [`HttpTransport`] alongside crate-owned [`HttpRequest`] and
//! [`HttpResponse`] values so downstream crates can plug in custom HTTP stacks (or
//! deterministic fakes in tests) without the endpoints depending on reqwest types.
//! Implementations classify their own failures into [`TransportError`] and publish
//! [`ResponseMetadata`] (status, retry hint, debug id) with every response.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
#[cfg(feature = "reqwest")] use reqwest::header::{HeaderMap, RETRY_AFTER};
#[cfg(feature = "reqwest")] use time::format_description::well_known::Rfc2822;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError, ValidationError},
};
#[cfg(feature = "reqwest")] use crate::config::GatewayConfig;

/// Boxed future returned by [`HttpTransport::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + 'a + Send>>;

/// Header carrying the API's correlation identifier.
pub const DEBUG_ID_HEADER: &str = "paypal-debug-id";

/// Abstraction over HTTP transports capable of executing REST calls.
///
/// The trait is the crate's only dependency on an HTTP stack. Implementations must be
/// `Send + Sync + 'static` so they can be shared behind `Arc<T>` between the authenticator and
/// the API client, and the futures they return must be `Send`.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Executes `request` and returns the raw response, whatever its status code.
	///
	/// Only failures that prevent a response from being read (DNS, TLS, timeouts, IO) are
	/// reported as errors; non-2xx statuses are returned as regular responses.
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_>;
}

/// HTTP methods used by the REST endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
	/// `GET`
	Get,
	/// `POST`
	Post,
	/// `PATCH`
	Patch,
}
impl HttpMethod {
	/// Returns the method token.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Get => "GET",
			Self::Post => "POST",
			Self::Patch => "PATCH",
		}
	}
}
impl Display for HttpMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outbound request handed to an [`HttpTransport`].
#[derive(Clone)]
pub struct HttpRequest {
	/// Request method.
	pub method: HttpMethod,
	/// Absolute request URL.
	pub url: Url,
	/// Header name/value pairs in insertion order.
	pub headers: Vec<(String, String)>,
	/// Optional request body.
	pub body: Option<Vec<u8>>,
}
impl HttpRequest {
	/// Creates a bodyless request.
	pub fn new(method: HttpMethod, url: Url) -> Self {
		Self { method, url, headers: Vec::new(), body: None }
	}

	/// Appends a header.
	pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.push((name.into(), value.into()));

		self
	}

	/// Attaches a body.
	pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = Some(body.into());

		self
	}

	/// Returns the first header value matching `name` (case-insensitive).
	pub fn header_value(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}
}
impl Debug for HttpRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		// Authorization headers carry credentials.
		let headers = self
			.headers
			.iter()
			.map(|(key, value)| {
				let shown =
					if key.eq_ignore_ascii_case("authorization") { "<redacted>" } else { value };

				(key.as_str(), shown)
			})
			.collect::<Vec<_>>();

		f.debug_struct("HttpRequest")
			.field("method", &self.method)
			.field("url", &self.url.as_str())
			.field("headers", &headers)
			.field("body_len", &self.body.as_ref().map(Vec::len))
			.finish()
	}
}

/// Metadata captured from an HTTP response for error mapping and logging.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseMetadata {
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
	/// Correlation identifier supplied by the API.
	pub debug_id: Option<String>,
}

/// Raw response returned by an [`HttpTransport`].
#[derive(Clone, Debug)]
pub struct HttpResponse {
	/// HTTP status code.
	pub status: u16,
	/// Metadata extracted from the response headers.
	pub metadata: ResponseMetadata,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl HttpResponse {
	/// Creates a response with empty metadata.
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self { status, metadata: ResponseMetadata::default(), body: body.into() }
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Returns a bounded, lossy UTF-8 preview of the body for logs and error payloads.
	pub fn body_preview(&self) -> Option<String> {
		const BODY_PREVIEW_LIMIT: usize = 256;

		if self.body.is_empty() {
			return None;
		}

		let text = String::from_utf8_lossy(&self.body);

		if text.chars().count() <= BODY_PREVIEW_LIMIT {
			return Some(text.into_owned());
		}

		Some(text.chars().take(BODY_PREVIEW_LIMIT).collect())
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// API calls must not follow redirects; configure any custom [`ReqwestClient`] accordingly.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client honoring the configured timeout with redirects disabled.
	pub fn from_config(config: &GatewayConfig) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder()
			.timeout(config.timeout_std())
			.redirect(reqwest::redirect::Policy::none())
			.build()?;

		Ok(Self(client))
	}

	async fn execute_now(
		client: ReqwestClient,
		request: HttpRequest,
	) -> Result<HttpResponse, TransportError> {
		let method = match request.method {
			HttpMethod::Get => reqwest::Method::GET,
			HttpMethod::Post => reqwest::Method::POST,
			HttpMethod::Patch => reqwest::Method::PATCH,
		};
		let mut builder = client.request(method, request.url);

		for (name, value) in request.headers {
			builder = builder.header(name, value);
		}
		if let Some(body) = request.body {
			builder = builder.body(body);
		}

		let response = builder.send().await?;
		let status = response.status().as_u16();
		let headers = response.headers().to_owned();
		let metadata = ResponseMetadata {
			retry_after: parse_retry_after(&headers),
			debug_id: headers
				.get(DEBUG_ID_HEADER)
				.and_then(|value| value.to_str().ok())
				.map(str::to_owned),
		};
		let body = response.bytes().await?.to_vec();

		Ok(HttpResponse { status, metadata, body })
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestHttpClient {
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(Self::execute_now(client, request))
	}
}

/// Joins an endpoint path onto the API host, treating the host as a directory.
pub(crate) fn endpoint_url(host: &Url, path: &str) -> Result<Url, ConfigError> {
	let mut base = host.clone();

	if !base.path().ends_with('/') {
		let with_slash = format!("{}/", base.path());

		base.set_path(&with_slash);
	}

	base.join(path.trim_start_matches('/'))
		.map_err(|source| ConfigError::InvalidEndpoint { path: path.to_owned(), source })
}

/// Joins `path` onto the API host, then appends each of `segments` percent-encoded.
pub(crate) fn resource_url(host: &Url, path: &str, segments: &[String]) -> Result<Url> {
	let mut url = endpoint_url(host, path)?;

	if segments.is_empty() {
		return Ok(url);
	}
	// `PathSegmentsMut` silently drops dot segments.
	if let Some(segment) = segments.iter().find(|s| matches!(s.as_str(), "" | "." | "..")) {
		return Err(ValidationError::InvalidPathSegment { segment: segment.clone() }.into());
	}

	url.path_segments_mut()
		.map_err(|()| ConfigError::InvalidEndpoint {
			path: path.to_owned(),
			source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
		})?
		.pop_if_empty()
		.extend(segments);

	Ok(url)
}

#[cfg(feature = "reqwest")]
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX)));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}
