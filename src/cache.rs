//! Bearer token cache contract and the built-in in-memory backend.
//!
//! Tokens are cached per credential fingerprint so several credential sets (for example a
//! sandbox and a live app) can share one cache without overwriting each other.

pub mod memory;

pub use memory::MemoryTokenCache;

// crates.io
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};
// self
use crate::{
	_prelude::*,
	auth::BearerToken,
	store::StoreFuture,
};

/// Storage backend contract implemented by bearer token caches.
pub trait TokenCache
where
	Self: Send + Sync,
{
	/// Fetches the token cached under `key`, if present and not yet evicted.
	fn get<'a>(&'a self, key: &'a CacheKey) -> StoreFuture<'a, Option<BearerToken>>;

	/// Stores or replaces the token under `key`, evicting it once `ttl` elapses.
	fn set(&self, key: CacheKey, token: BearerToken, ttl: Duration) -> StoreFuture<'_, ()>;

	/// Removes the token cached under `key`, returning it when one was present.
	fn evict<'a>(&'a self, key: &'a CacheKey) -> StoreFuture<'a, Option<BearerToken>>;
}

/// Cache key derived from the credential pair that minted a token.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey(String);
impl CacheKey {
	const PREFIX: &'static str = "ppcp-bearer";

	/// Builds the key for a host + client id pair.
	///
	/// The key embeds a base64 (no padding) SHA-256 digest of the normalized host and client id,
	/// never the raw client id.
	pub fn for_credentials(host: &Url, client_id: &str) -> Self {
		let mut hasher = Sha256::new();

		hasher.update(host.as_str().trim_end_matches('/').as_bytes());
		hasher.update([0]);
		hasher.update(client_id.as_bytes());

		Self(format!("{}:{}", Self::PREFIX, URL_SAFE_NO_PAD.encode(hasher.finalize())))
	}

	/// Returns the key as a string slice.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl Debug for CacheKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "CacheKey({})", self.0)
	}
}
impl Display for CacheKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
