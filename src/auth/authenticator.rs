//! Client-credential bearer token acquisition with caching + singleflight guards.
//!
//! [`Authenticator::bearer`] serves the cached token for the configured credential pair while it
//! is unexpired and mints a new one otherwise. Mints go through a per-[`CacheKey`] async mutex so
//! concurrent callers piggy-back on the same in-flight exchange instead of stampeding the token
//! endpoint; the cache is re-checked after the guard is acquired.

mod metrics;

pub use metrics::MintMetrics;

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
// self
use crate::{
	_prelude::*,
	auth::{BearerToken, Secret},
	cache::{CacheKey, TokenCache},
	config::GatewayConfig,
	error::AuthError,
	http::{self, HttpMethod, HttpRequest, HttpTransport},
	obs::{self, OperationKind},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

#[cfg(feature = "reqwest")]
/// Authenticator specialized for the crate's default reqwest transport.
pub type ReqwestAuthenticator = Authenticator<ReqwestHttpClient>;

/// Singleflight guards shared between authenticators that mint for the same cache.
pub type MintGuards = Arc<Mutex<HashMap<CacheKey, Arc<AsyncMutex<()>>>>>;

const TOKEN_PATH: &str = "v1/oauth2/token?grant_type=client_credentials";

/// Host + client credential pair used for the client-credential exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
	/// REST API host.
	pub host: Url,
	/// OAuth client identifier.
	pub client_id: String,
	/// OAuth client secret.
	pub client_secret: Secret,
}
impl Credentials {
	/// Creates a credential pair for the provided host.
	pub fn new(host: Url, client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
		Self { host, client_id: client_id.into(), client_secret: Secret::new(client_secret) }
	}

	/// Extracts the credential pair from a validated configuration.
	pub fn from_config(config: &GatewayConfig) -> Self {
		Self {
			host: config.host.clone(),
			client_id: config.client_id.clone(),
			client_secret: config.client_secret.clone(),
		}
	}

	/// Cache key derived from the host + client id fingerprint.
	pub fn cache_key(&self) -> CacheKey {
		CacheKey::for_credentials(&self.host, &self.client_id)
	}

	/// HTTP Basic authorization header value (`Basic base64(key:secret)`).
	pub fn basic_authorization(&self) -> String {
		let raw = format!("{}:{}", self.client_id, self.client_secret.expose());

		format!("Basic {}", STANDARD.encode(raw))
	}
}

/// Obtains and caches bearer tokens for a single credential pair.
#[derive(Clone)]
pub struct Authenticator<C>
where
	C: ?Sized + HttpTransport,
{
	/// HTTP transport used for token endpoint calls.
	pub http_client: Arc<C>,
	/// Cache holding minted tokens.
	pub cache: Arc<dyn TokenCache>,
	/// Credential pair used for every mint.
	pub credentials: Credentials,
	/// Shared counters for mint outcomes.
	pub metrics: Arc<MintMetrics>,
	key: CacheKey,
	mint_guards: MintGuards,
}
impl<C> Authenticator<C>
where
	C: ?Sized + HttpTransport,
{
	/// Creates an authenticator that reuses the caller-provided transport.
	pub fn with_http_client(
		cache: Arc<dyn TokenCache>,
		credentials: Credentials,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		let key = credentials.cache_key();

		Self {
			http_client: http_client.into(),
			cache,
			credentials,
			metrics: Default::default(),
			key,
			mint_guards: Default::default(),
		}
	}

	/// Shares singleflight guards with other authenticators backed by the same cache.
	pub fn with_mint_guards(mut self, guards: MintGuards) -> Self {
		self.mint_guards = guards;

		self
	}

	/// Cache key used for this credential pair.
	pub fn cache_key(&self) -> &CacheKey {
		&self.key
	}

	/// Returns the cached token when it is still valid, minting a new one otherwise.
	pub async fn bearer(&self) -> Result<BearerToken> {
		if let Some(token) = self.cached().await? {
			return Ok(token);
		}

		let guard = self.mint_guard();
		let _singleflight = guard.lock().await;

		// Another caller may have minted while this one waited on the guard.
		if let Some(token) = self.cached().await? {
			return Ok(token);
		}

		self.mint().await
	}

	/// Mints a new token unconditionally and stores it in the cache.
	pub async fn new_bearer(&self) -> Result<BearerToken> {
		let guard = self.mint_guard();
		let _singleflight = guard.lock().await;

		self.mint().await
	}

	/// Evicts the cached token, forcing the next [`bearer`](Self::bearer) call to mint.
	pub async fn invalidate(&self) -> Result<()> {
		self.cache.evict(&self.key).await?;

		tracing::info!(cache_key = %self.key, "Evicted cached bearer token.");

		Ok(())
	}

	async fn cached(&self) -> Result<Option<BearerToken>> {
		let now = OffsetDateTime::now_utc();
		let token = self.cache.get(&self.key).await?.filter(|token| !token.is_expired_at(now));

		Ok(token)
	}

	async fn mint(&self) -> Result<BearerToken> {
		obs::observe(OperationKind::Bearer, "new_bearer", async move {
			self.metrics.record_attempt();

			let result = self.exchange().await;

			match &result {
				Ok(token) => {
					self.metrics.record_success();

					tracing::info!(
						cache_key = %self.key,
						expires_at = %token.expires_at,
						"Minted bearer token."
					);
				},
				Err(err) => {
					self.metrics.record_failure();

					tracing::warn!(cache_key = %self.key, error = %err, "Could not mint bearer token.");
				},
			}

			result
		})
		.await
	}

	async fn exchange(&self) -> Result<BearerToken> {
		let url = http::endpoint_url(&self.credentials.host, TOKEN_PATH)?;
		let request = HttpRequest::new(HttpMethod::Post, url)
			.header("Authorization", self.credentials.basic_authorization())
			.header("Accept", "application/json")
			.header("Content-Type", "application/x-www-form-urlencoded");
		let response = self.http_client.execute(request).await.map_err(AuthError::Transport)?;

		if response.status != 200 {
			return Err(AuthError::TokenRequest {
				status: response.status,
				body_preview: response.body_preview(),
			}
			.into());
		}

		let payload = serde_json::from_slice::<TokenResponse>(&response.body)
			.map_err(|_| AuthError::TokenNotFound)?;
		let (Some(access_token), Some(expires_in)) = (payload.access_token, payload.expires_in)
		else {
			return Err(AuthError::TokenNotFound.into());
		};

		if expires_in <= 0 || expires_in > MAX_EXPIRES_IN {
			return Err(AuthError::InvalidExpiresIn { expires_in }.into());
		}

		let ttl = Duration::seconds(expires_in);
		let token = BearerToken::issued_now(access_token, ttl);

		self.cache.set(self.key.clone(), token.clone(), ttl).await?;

		Ok(token)
	}

	fn mint_guard(&self) -> Arc<AsyncMutex<()>> {
		let mut guards = self.mint_guards.lock();

		guards.entry(self.key.clone()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
	}
}
#[cfg(feature = "reqwest")]
impl ReqwestAuthenticator {
	/// Creates an authenticator backed by a reqwest transport built from `config`.
	pub fn from_config(cache: Arc<dyn TokenCache>, config: &GatewayConfig) -> Result<Self> {
		let http_client = ReqwestHttpClient::from_config(config)?;

		Ok(Self::with_http_client(cache, Credentials::from_config(config), http_client))
	}
}
impl<C> Debug for Authenticator<C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Authenticator")
			.field("host", &self.credentials.host.as_str())
			.field("client_id", &self.credentials.client_id)
			.field("cache_key", &self.key)
			.finish()
	}
}

// One year; anything longer is treated as a malformed response.
const MAX_EXPIRES_IN: i64 = 31_536_000;

#[derive(Deserialize)]
struct TokenResponse {
	#[serde(default)]
	access_token: Option<String>,
	#[serde(default)]
	expires_in: Option<i64>,
}
