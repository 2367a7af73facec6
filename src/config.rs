//! Gateway configuration: environment, API host, credentials, and transport limits.
//!
//! [`GatewayConfig`] values are validated on construction, either through
//! [`GatewayConfigBuilder`] or when deserialized with serde, so downstream components can
//! assume an HTTPS host, non-empty credentials, and a positive timeout.

pub mod environment;

pub use environment::*;

// self
use crate::{_prelude::*, auth::Secret, error::ConfigError};

/// Validated gateway configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGatewayConfig")]
pub struct GatewayConfig {
	/// Environment the credentials belong to.
	pub environment: Environment,
	/// REST API host (e.g., `https://api-m.paypal.com`).
	pub host: Url,
	/// OAuth client identifier.
	pub client_id: String,
	/// OAuth client secret.
	pub client_secret: Secret,
	/// Merchant (payer) identifier assigned during onboarding.
	pub merchant_id: Option<String>,
	/// Timeout applied to every HTTP call, in seconds.
	pub timeout_secs: u64,
}
impl GatewayConfig {
	/// Default timeout applied to API calls.
	pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

	/// Creates a builder seeded with the environment's default host.
	pub fn builder(environment: Environment) -> GatewayConfigBuilder {
		GatewayConfigBuilder::new(environment)
	}

	/// Timeout as a [`Duration`].
	pub fn timeout(&self) -> Duration {
		Duration::seconds(i64::try_from(self.timeout_secs).unwrap_or(i64::MAX))
	}

	/// Timeout as a [`std::time::Duration`] for HTTP client builders.
	pub fn timeout_std(&self) -> std::time::Duration {
		std::time::Duration::from_secs(self.timeout_secs)
	}

	/// Payment mode label written to merchant orders (`live` or `sandbox`).
	pub fn payment_mode(&self) -> &'static str {
		self.environment.payment_mode()
	}
}

#[derive(Deserialize)]
struct RawGatewayConfig {
	environment: Environment,
	#[serde(default)]
	host: Option<Url>,
	client_id: String,
	client_secret: Secret,
	#[serde(default)]
	merchant_id: Option<String>,
	#[serde(default)]
	timeout_secs: Option<u64>,
}
impl TryFrom<RawGatewayConfig> for GatewayConfig {
	type Error = ConfigError;

	fn try_from(raw: RawGatewayConfig) -> Result<Self, Self::Error> {
		let mut builder = GatewayConfig::builder(raw.environment)
			.client_id(raw.client_id)
			.client_secret(raw.client_secret.expose());

		if let Some(host) = raw.host {
			builder = builder.host(host);
		}
		if let Some(merchant_id) = raw.merchant_id {
			builder = builder.merchant_id(merchant_id);
		}
		if let Some(timeout_secs) = raw.timeout_secs {
			builder = builder.timeout_secs(timeout_secs);
		}

		builder.build()
	}
}

/// Builder for [`GatewayConfig`] values.
#[derive(Debug)]
pub struct GatewayConfigBuilder {
	environment: Environment,
	host: Url,
	client_id: String,
	client_secret: Secret,
	merchant_id: Option<String>,
	timeout_secs: u64,
}
impl GatewayConfigBuilder {
	/// Creates a new builder for the environment.
	pub fn new(environment: Environment) -> Self {
		Self {
			environment,
			host: environment.default_host(),
			client_id: String::new(),
			client_secret: Secret::new(String::new()),
			merchant_id: None,
			timeout_secs: GatewayConfig::DEFAULT_TIMEOUT_SECS,
		}
	}

	/// Overrides the API host.
	pub fn host(mut self, host: Url) -> Self {
		self.host = host;

		self
	}

	/// Sets the OAuth client identifier.
	pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
		self.client_id = client_id.into();

		self
	}

	/// Sets the OAuth client secret.
	pub fn client_secret(mut self, client_secret: impl Into<String>) -> Self {
		self.client_secret = Secret::new(client_secret);

		self
	}

	/// Sets the merchant identifier.
	pub fn merchant_id(mut self, merchant_id: impl Into<String>) -> Self {
		self.merchant_id = Some(merchant_id.into());

		self
	}

	/// Overrides the request timeout (seconds).
	pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
		self.timeout_secs = timeout_secs;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<GatewayConfig, ConfigError> {
		validate_host(&self.host)?;

		if self.client_id.trim().is_empty() {
			return Err(ConfigError::MissingCredential { field: "client_id" });
		}
		if self.client_secret.expose().trim().is_empty() {
			return Err(ConfigError::MissingCredential { field: "client_secret" });
		}
		if self.timeout_secs == 0 {
			return Err(ConfigError::NonPositiveTimeout);
		}

		Ok(GatewayConfig {
			environment: self.environment,
			host: self.host,
			client_id: self.client_id,
			client_secret: self.client_secret,
			merchant_id: self.merchant_id,
			timeout_secs: self.timeout_secs,
		})
	}
}

// Loopback hosts may use plain HTTP so local mock servers work.
fn validate_host(url: &Url) -> Result<(), ConfigError> {
	let loopback = matches!(url.host_str(), Some("localhost" | "127.0.0.1" | "[::1]"));

	match url.scheme() {
		"https" => Ok(()),
		"http" if loopback => Ok(()),
		_ => Err(ConfigError::InsecureHost { url: url.to_string() }),
	}
}
