//! Crate-level error types shared across authentication, endpoints, and orchestration.

// self
use crate::{
	_prelude::*,
	auth::{CustomerId, IdentifierError, MerchantOrderId},
	order::CaptureStatus,
};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure reported by a collaborator store.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Bearer token could not be minted or parsed.
	#[error(transparent)]
	Auth(#[from] AuthError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// API answered with a non-2xx status and a structured error payload.
	#[error(transparent)]
	Api(#[from] ApiError),
	/// Malformed local input or malformed API payload.
	#[error(transparent)]
	Validation(#[from] ValidationError),

	/// Requested resource does not exist (HTTP 404 or missing local record).
	#[error("The {resource} `{id}` was not found.")]
	NotFound {
		/// Resource label (e.g., `order`, `merchant order`).
		resource: &'static str,
		/// Identifier that was looked up.
		id: String,
	},
	/// Merchant order has no customer attached, so no vaulted token can be used.
	#[error("Merchant order `{merchant_order}` has no customer attached.")]
	NoCustomer {
		/// Merchant order that lacked a customer.
		merchant_order: MerchantOrderId,
	},
	/// Customer has no vaulted payment tokens.
	#[error("Customer `{customer}` has no vaulted payment tokens.")]
	NoToken {
		/// Customer whose vault was empty.
		customer: CustomerId,
	},
	/// Capture finished with a status other than `COMPLETED`.
	#[error("Capture `{capture_id}` for order `{order_id}` ended with status {status}.")]
	CaptureNotCompleted {
		/// Remote order identifier.
		order_id: String,
		/// Remote capture identifier.
		capture_id: String,
		/// Status declared by the API.
		status: CaptureStatus,
	},
}
impl Error {
	/// Returns `true` when an outer scheduler may retry the operation later.
	///
	/// Transport failures, throttling, and upstream 5xx responses are retryable. Declines,
	/// missing customers/tokens, validation problems, and client errors are fatal.
	pub fn is_retryable(&self) -> bool {
		match self {
			Self::Transport(_) => true,
			Self::Api(err) => err.is_retryable(),
			Self::Auth(err) => err.is_retryable(),
			Self::Storage(crate::store::StoreError::Backend { .. }) => true,
			_ => false,
		}
	}

	/// Delay the API asked for before the next attempt, when it sent one.
	pub fn retry_after(&self) -> Option<Duration> {
		match self {
			Self::Api(err) => err.retry_after,
			_ => None,
		}
	}
}
impl From<IdentifierError> for Error {
	fn from(e: IdentifierError) -> Self {
		ValidationError::from(e).into()
	}
}

/// Configuration and validation failures raised while wiring the gateway.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Host URL cannot be joined with an endpoint path.
	#[error("Endpoint path `{path}` cannot be joined with the configured host.")]
	InvalidEndpoint {
		/// Path that failed to join.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Host must use HTTPS unless it points at a loopback address.
	#[error("The API host must use HTTPS: {url}.")]
	InsecureHost {
		/// Host URL that failed validation.
		url: String,
	},
	/// Required credential field is empty.
	#[error("The {field} credential must not be empty.")]
	MissingCredential {
		/// Credential field label.
		field: &'static str,
	},
	/// Timeout must be positive.
	#[error("The request timeout must be positive.")]
	NonPositiveTimeout,
	/// Request body could not be serialized.
	#[error("Request body could not be serialized.")]
	RequestSerialization(#[from] serde_json::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Bearer token minting failures.
#[derive(Debug, ThisError)]
pub enum AuthError {
	/// Token endpoint answered with a non-200 status.
	#[error("Could not create token; the token endpoint answered with HTTP {status}.")]
	TokenRequest {
		/// HTTP status code returned by the token endpoint.
		status: u16,
		/// Preview of the response body.
		body_preview: Option<String>,
	},
	/// Token endpoint could not be reached.
	#[error("Could not create token; the token endpoint is unreachable.")]
	Transport(#[source] TransportError),
	/// Token endpoint response lacked `access_token` or `expires_in`.
	#[error("Could not find token in the token endpoint response.")]
	TokenNotFound,
	/// Token endpoint returned a non-positive or oversized `expires_in`.
	#[error("The expires_in value {expires_in} is outside the supported range.")]
	InvalidExpiresIn {
		/// Raw value returned by the token endpoint.
		expires_in: i64,
	},
}
impl AuthError {
	/// Returns `true` when the failure stems from the network or an upstream outage.
	pub fn is_retryable(&self) -> bool {
		match self {
			Self::Transport(_) => true,
			Self::TokenRequest { status, .. } => is_retryable_status(*status),
			Self::TokenNotFound | Self::InvalidExpiresIn { .. } => false,
		}
	}
}

/// Transport-level failures (network, IO, timeout).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Request exceeded the configured timeout.
	#[error("Request timed out while calling the API.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the API.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Wraps a transport-specific timeout error.
	pub fn timeout(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Timeout { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::timeout(e) } else { Self::network(e) }
	}
}

/// Structured error payload returned by the REST API for non-2xx responses.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("API request failed with HTTP {status} ({name}): {message}")]
pub struct ApiError {
	/// HTTP status code.
	pub status: u16,
	/// Error name from the envelope (e.g., `UNPROCESSABLE_ENTITY`).
	pub name: String,
	/// Human-readable message from the envelope.
	pub message: String,
	/// Correlation identifier supplied by the API.
	pub debug_id: Option<String>,
	/// Issue details attached to the error.
	pub details: Vec<ApiErrorDetail>,
	/// Delay requested through `Retry-After`, if any.
	pub retry_after: Option<Duration>,
}
impl ApiError {
	/// Returns `true` when the response signals throttling or an upstream outage.
	pub fn is_retryable(&self) -> bool {
		is_retryable_status(self.status)
	}

	/// Returns `true` when any detail carries the provided issue code.
	pub fn has_issue(&self, issue: &str) -> bool {
		self.details.iter().any(|detail| detail.issue == issue)
	}
}

/// Single issue entry inside an [`ApiError`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorDetail {
	/// Issue code (e.g., `INSTRUMENT_DECLINED`).
	#[serde(default)]
	pub issue: String,
	/// Human-readable description.
	#[serde(default)]
	pub description: Option<String>,
	/// JSON pointer of the offending field.
	#[serde(default)]
	pub field: Option<String>,
	/// Offending value.
	#[serde(default)]
	pub value: Option<String>,
	/// Location of the offending field (`body`, `path`, `query`).
	#[serde(default)]
	pub location: Option<String>,
}

/// Local input or response payload validation failures.
#[derive(Debug, ThisError)]
pub enum ValidationError {
	/// An order requires at least one purchase unit.
	#[error("An order requires at least one purchase unit.")]
	MissingPurchaseUnits,
	/// A CAPTURE order came back without any capture record.
	#[error("Order `{order_id}` does not contain a capture.")]
	MissingCapture {
		/// Remote order identifier.
		order_id: String,
	},
	/// An AUTHORIZE order came back without any authorization record.
	#[error("Order `{order_id}` does not contain an authorization.")]
	MissingAuthorization {
		/// Remote order identifier.
		order_id: String,
	},
	/// Merchant order lacks the remote order reference needed for processing.
	#[error("Merchant order `{merchant_order}` is missing the `{key}` metadata.")]
	MissingMetadata {
		/// Merchant order identifier.
		merchant_order: MerchantOrderId,
		/// Metadata key that was absent.
		key: &'static str,
	},
	/// Merchant order has no line items to bill.
	#[error("Merchant order `{merchant_order}` has no line items.")]
	EmptyMerchantOrder {
		/// Merchant order identifier.
		merchant_order: MerchantOrderId,
	},
	/// Monetary value is not a valid non-negative decimal.
	#[error("Amount `{value}` is not a valid decimal value.")]
	InvalidAmount {
		/// Offending value.
		value: String,
	},
	/// Order total differs from items plus shipping and tax, minus discount.
	#[error("Merchant order `{merchant_order}` total `{total}` does not match its breakdown.")]
	AmountMismatch {
		/// Merchant order identifier.
		merchant_order: MerchantOrderId,
		/// Declared order total.
		total: String,
	},
	/// Response lacked a link with the required relation.
	#[error("Response does not contain a `{rel}` link.")]
	MissingLink {
		/// Link relation that was expected.
		rel: &'static str,
	},
	/// Remote identifier cannot be used as a URL path segment.
	#[error("`{segment}` is not a usable resource identifier.")]
	InvalidPathSegment {
		/// Offending identifier.
		segment: String,
	},
	/// Identifier failed validation.
	#[error(transparent)]
	Identifier(#[from] IdentifierError),
	/// API returned a payload that does not match the expected shape.
	#[error("API returned a malformed payload at `{path}`.")]
	MalformedResponse {
		/// JSON path to the offending field.
		path: String,
		/// HTTP status code of the response.
		status: u16,
		/// Structured parsing failure.
		#[source]
		source: serde_json::Error,
	},
}
impl ValidationError {
	/// Builds a [`ValidationError::MalformedResponse`] from a path-aware serde failure.
	pub fn malformed(status: u16, err: serde_path_to_error::Error<serde_json::Error>) -> Self {
		let path = err.path().to_string();

		Self::MalformedResponse { path, status, source: err.into_inner() }
	}
}

fn is_retryable_status(status: u16) -> bool {
	status == 429 || status >= 500
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn api_error(status: u16) -> ApiError {
		ApiError {
			status,
			name: "TEST".into(),
			message: "test".into(),
			debug_id: None,
			details: Vec::new(),
			retry_after: None,
		}
	}

	#[test]
	fn retry_classification_separates_transient_and_fatal() {
		assert!(Error::from(api_error(503)).is_retryable());
		assert!(Error::from(api_error(429)).is_retryable());
		assert!(!Error::from(api_error(422)).is_retryable());
		assert!(!Error::from(ValidationError::MissingPurchaseUnits).is_retryable());
		assert!(Error::from(TransportError::Io(std::io::Error::other("reset"))).is_retryable());
		assert!(!Error::from(AuthError::TokenNotFound).is_retryable());
		assert!(
			Error::from(AuthError::TokenRequest { status: 500, body_preview: None })
				.is_retryable()
		);

		let customer = CustomerId::new("customer-1").expect("Customer fixture should be valid.");

		assert!(!Error::NoToken { customer }.is_retryable());
	}

	#[test]
	fn malformed_response_keeps_json_path() {
		let payload = br#"{"id":"ORDER-1","intent":7}"#;
		let mut de = serde_json::Deserializer::from_slice(payload);
		let err = serde_path_to_error::deserialize::<_, crate::order::Order>(&mut de)
			.expect_err("Numeric intent should fail to deserialize.");
		let validation = ValidationError::malformed(201, err);

		match validation {
			ValidationError::MalformedResponse { path, status, .. } => {
				assert_eq!(path, "intent");
				assert_eq!(status, 201);
			},
			other => panic!("Unexpected validation error: {other:?}."),
		}
	}

	#[test]
	fn api_error_detects_issue_codes() {
		let mut err = api_error(422);

		err.details.push(ApiErrorDetail {
			issue: "INSTRUMENT_DECLINED".into(),
			..ApiErrorDetail::default()
		});

		assert!(err.has_issue("INSTRUMENT_DECLINED"));
		assert!(!err.has_issue("PAYER_ACTION_REQUIRED"));
	}
}
