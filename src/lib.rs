//! PayPal Commerce payment orchestration core: cached bearer tokens, order lifecycle endpoints,
//! vaulted-token subscription renewals, and the checkout gateway that ties them to a storefront.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod gateway;
pub mod http;
pub mod merchant;
pub mod obs;
pub mod onboarding;
pub mod order;
pub mod renewal;
pub mod store;
pub mod vault;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		api::ReqwestApiClient,
		auth::{Credentials, ReqwestAuthenticator},
		cache::{MemoryTokenCache, TokenCache},
		config::{Environment, GatewayConfig},
		http::ReqwestHttpClient,
	};

	/// Client ID used by integration-test configurations.
	pub const TEST_CLIENT_ID: &str = "test-client-id";
	/// Client secret used by integration-test configurations.
	pub const TEST_CLIENT_SECRET: &str = "test-client-secret";

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		build_insecure_http_client(ReqwestClient::builder())
	}

	/// Same as [`test_reqwest_http_client`] but gives up on calls slower than `timeout`.
	pub fn test_reqwest_http_client_with_timeout(timeout: std::time::Duration) -> ReqwestHttpClient {
		build_insecure_http_client(ReqwestClient::builder().timeout(timeout))
	}

	/// Builds a sandbox configuration pointing at the provided mock host.
	pub fn test_config(host: &str) -> GatewayConfig {
		GatewayConfig::builder(Environment::Sandbox)
			.host(Url::parse(host).expect("Mock host should parse as a URL."))
			.client_id(TEST_CLIENT_ID)
			.client_secret(TEST_CLIENT_SECRET)
			.build()
			.expect("Test gateway configuration should build successfully.")
	}

	/// Constructs a [`ReqwestAuthenticator`] over `cache` for the provided mock host.
	pub fn build_reqwest_test_authenticator(
		host: &str,
		cache: Arc<dyn TokenCache>,
	) -> ReqwestAuthenticator {
		let config = test_config(host);

		ReqwestAuthenticator::with_http_client(
			cache,
			Credentials::from_config(&config),
			test_reqwest_http_client(),
		)
	}

	/// Constructs a [`ReqwestApiClient`] backed by an in-memory token cache and the reqwest
	/// transport used across integration tests.
	pub fn build_reqwest_test_client(host: &str) -> (ReqwestApiClient, Arc<MemoryTokenCache>) {
		build_reqwest_test_client_over(host, test_reqwest_http_client())
	}

	/// Constructs a [`ReqwestApiClient`] whose calls time out after `timeout`.
	pub fn build_reqwest_test_client_with_timeout(
		host: &str,
		timeout: std::time::Duration,
	) -> (ReqwestApiClient, Arc<MemoryTokenCache>) {
		build_reqwest_test_client_over(host, test_reqwest_http_client_with_timeout(timeout))
	}

	fn build_reqwest_test_client_over(
		host: &str,
		http_client: ReqwestHttpClient,
	) -> (ReqwestApiClient, Arc<MemoryTokenCache>) {
		let config = test_config(host);
		let cache_backend = Arc::new(MemoryTokenCache::default());
		let cache: Arc<dyn TokenCache> = cache_backend.clone();
		let http_client = Arc::new(http_client);
		let authenticator = ReqwestAuthenticator::with_http_client(
			cache,
			Credentials::from_config(&config),
			http_client.clone(),
		);
		let client =
			ReqwestApiClient::with_http_client(config.host.clone(), authenticator, http_client);

		(client, cache_backend)
	}

	fn build_insecure_http_client(builder: reqwest::ClientBuilder) -> ReqwestHttpClient {
		let client = builder
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.redirect(reqwest::redirect::Policy::none())
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
