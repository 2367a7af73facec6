//! Authenticated REST client shared by every endpoint.
//!
//! [`ApiClient`] attaches a bearer token to each call, executes it through the configured
//! [`HttpTransport`], and classifies the response into the crate's error taxonomy:
//!
//! - transport failures surface as [`Error::Transport`];
//! - `404` surfaces as [`Error::NotFound`] for the resource the caller names;
//! - any other non-2xx status is parsed from the API error envelope into [`ApiError`] (a `401`
//!   also evicts the cached bearer token);
//! - 2xx payloads are deserialized with JSON path context, malformed ones become
//!   [`ValidationError::MalformedResponse`].

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::Authenticator,
	error::{ApiError, ApiErrorDetail, ConfigError, ValidationError},
	http::{self, HttpMethod, HttpRequest, HttpResponse, HttpTransport},
};
#[cfg(feature = "reqwest")]
use crate::{auth::Credentials, cache::TokenCache, config::GatewayConfig, http::ReqwestHttpClient};

#[cfg(feature = "reqwest")]
/// API client specialized for the crate's default reqwest transport.
pub type ReqwestApiClient = ApiClient<ReqwestHttpClient>;

/// Description of a single REST call.
#[derive(Clone, Debug)]
pub struct ApiRequest {
	method: HttpMethod,
	path: String,
	segments: Vec<String>,
	resource: &'static str,
	id: String,
	body: Option<Vec<u8>>,
}
impl ApiRequest {
	/// Creates a `GET` request for `path`.
	pub fn get(path: impl Into<String>) -> Self {
		Self::new(HttpMethod::Get, path)
	}

	/// Creates a `POST` request for `path`.
	pub fn post(path: impl Into<String>) -> Self {
		Self::new(HttpMethod::Post, path)
	}

	/// Appends one percent-encoded path segment, typically a remote identifier.
	///
	/// `/`, `?`, and `#` inside `segment` stay part of the segment instead of changing the target.
	pub fn segment(mut self, segment: impl Into<String>) -> Self {
		self.segments.push(segment.into());

		self
	}

	/// Names the resource a `404` refers to (e.g., `order`, `ORDER-1`).
	pub fn resource(mut self, resource: &'static str, id: impl Into<String>) -> Self {
		self.resource = resource;
		self.id = id.into();

		self
	}

	/// Serializes `body` as the JSON request payload.
	pub fn json<B>(mut self, body: &B) -> Result<Self, ConfigError>
	where
		B: ?Sized + Serialize,
	{
		self.body = Some(serde_json::to_vec(body)?);

		Ok(self)
	}

	fn new(method: HttpMethod, path: impl Into<String>) -> Self {
		let path = path.into();

		Self {
			method,
			id: path.clone(),
			path,
			segments: Vec::new(),
			resource: "resource",
			body: None,
		}
	}
}

/// Authenticated REST client.
#[derive(Clone)]
pub struct ApiClient<C>
where
	C: ?Sized + HttpTransport,
{
	host: Url,
	authenticator: Authenticator<C>,
	http_client: Arc<C>,
}
impl<C> ApiClient<C>
where
	C: ?Sized + HttpTransport,
{
	/// Creates a client that reuses the caller-provided transport.
	pub fn with_http_client(
		host: Url,
		authenticator: Authenticator<C>,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		Self { host, authenticator, http_client: http_client.into() }
	}

	/// REST API host.
	pub fn host(&self) -> &Url {
		&self.host
	}

	/// Authenticator supplying bearer tokens for each call.
	pub fn authenticator(&self) -> &Authenticator<C> {
		&self.authenticator
	}

	/// Executes `request` and deserializes the 2xx payload into `T`.
	pub async fn send_json<T>(&self, request: ApiRequest) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let response = self.send(request).await?;
		let mut de = serde_json::Deserializer::from_slice(&response.body);

		serde_path_to_error::deserialize(&mut de)
			.map_err(|e| ValidationError::malformed(response.status, e).into())
	}

	/// Executes `request` and returns the raw 2xx response.
	pub async fn send(&self, request: ApiRequest) -> Result<HttpResponse> {
		let ApiRequest { method, path, segments, resource, id, body } = request;
		let url = http::resource_url(&self.host, &path, &segments)?;
		let bearer = self.authenticator.bearer().await?;
		let mut http_request = HttpRequest::new(method, url)
			.header("Authorization", bearer.authorization_header())
			.header("Content-Type", "application/json")
			.header("Prefer", "return=representation");

		if let Some(body) = body {
			http_request = http_request.body(body);
		}

		let response = self.http_client.execute(http_request).await?;

		if response.is_success() {
			return Ok(response);
		}

		tracing::warn!(
			method = %method,
			path = %path,
			status = response.status,
			debug_id = response.metadata.debug_id.as_deref().unwrap_or_default(),
			"API request failed."
		);

		match response.status {
			404 => Err(Error::NotFound { resource, id }),
			401 => {
				self.authenticator.invalidate().await?;

				Err(api_error(&response).into())
			},
			_ => Err(api_error(&response).into()),
		}
	}
}
#[cfg(feature = "reqwest")]
impl ReqwestApiClient {
	/// Creates a client whose authenticator and API calls share one reqwest transport.
	pub fn from_config(cache: Arc<dyn TokenCache>, config: &GatewayConfig) -> Result<Self> {
		let http_client = Arc::new(ReqwestHttpClient::from_config(config)?);
		let authenticator = Authenticator::with_http_client(
			cache,
			Credentials::from_config(config),
			http_client.clone(),
		);

		Ok(Self::with_http_client(config.host.clone(), authenticator, http_client))
	}
}
impl<C> Debug for ApiClient<C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient")
			.field("host", &self.host.as_str())
			.field("authenticator", &self.authenticator)
			.finish()
	}
}

#[derive(Deserialize)]
struct ErrorEnvelope {
	#[serde(default)]
	name: Option<String>,
	#[serde(default)]
	message: Option<String>,
	#[serde(default)]
	debug_id: Option<String>,
	#[serde(default)]
	details: Vec<ApiErrorDetail>,
}

pub(crate) fn api_error(response: &HttpResponse) -> ApiError {
	let envelope = serde_json::from_slice::<ErrorEnvelope>(&response.body).ok();
	let (name, message, debug_id, details) = match envelope {
		Some(ErrorEnvelope { name, message, debug_id, details }) =>
			(name, message, debug_id, details),
		None => (None, None, None, Vec::new()),
	};

	ApiError {
		status: response.status,
		name: name.unwrap_or_else(|| "UNKNOWN".into()),
		message: message
			.or_else(|| response.body_preview())
			.unwrap_or_else(|| format!("HTTP {}", response.status)),
		debug_id: debug_id.or_else(|| response.metadata.debug_id.clone()),
		details,
		retry_after: response.metadata.retry_after,
	}
}
