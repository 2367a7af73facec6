//! Thread-safe in-memory [`TokenCache`] implementation for single-process deployments and tests.

// self
use crate::{
	_prelude::*,
	auth::BearerToken,
	cache::{CacheKey, TokenCache},
	store::{StoreError, StoreFuture},
};

type CacheMap = Arc<RwLock<HashMap<CacheKey, CacheEntry>>>;

#[derive(Clone, Debug)]
struct CacheEntry {
	token: BearerToken,
	evict_at: OffsetDateTime,
}

/// Thread-safe cache backend that keeps tokens in-process until their TTL elapses.
#[derive(Clone, Debug, Default)]
pub struct MemoryTokenCache(CacheMap);
impl MemoryTokenCache {
	/// Number of entries currently held, including ones whose TTL already elapsed.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when the cache holds no entries.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}

	fn get_now(map: CacheMap, key: CacheKey, now: OffsetDateTime) -> Option<BearerToken> {
		{
			let guard = map.read();

			match guard.get(&key) {
				Some(entry) if now < entry.evict_at => return Some(entry.token.clone()),
				Some(_) => {},
				None => return None,
			}
		}

		// TTL elapsed; drop the stale entry unless a writer replaced it meanwhile.
		let mut guard = map.write();

		if guard.get(&key).is_some_and(|entry| now >= entry.evict_at) {
			guard.remove(&key);
		}

		None
	}

	fn set_now(
		map: CacheMap,
		key: CacheKey,
		token: BearerToken,
		ttl: Duration,
	) -> Result<(), StoreError> {
		if ttl.is_negative() {
			return Err(StoreError::Backend {
				message: format!("Refusing to cache {key} with a negative TTL"),
			});
		}

		let evict_at = OffsetDateTime::now_utc() + ttl;

		map.write().insert(key, CacheEntry { token, evict_at });

		Ok(())
	}
}
impl TokenCache for MemoryTokenCache {
	fn get<'a>(&'a self, key: &'a CacheKey) -> StoreFuture<'a, Option<BearerToken>> {
		let map = self.0.clone();
		let key = key.to_owned();

		Box::pin(async move { Ok(Self::get_now(map, key, OffsetDateTime::now_utc())) })
	}

	fn set(&self, key: CacheKey, token: BearerToken, ttl: Duration) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move { Self::set_now(map, key, token, ttl) })
	}

	fn evict<'a>(&'a self, key: &'a CacheKey) -> StoreFuture<'a, Option<BearerToken>> {
		let map = self.0.clone();
		let key = key.to_owned();

		Box::pin(async move { Ok(map.write().remove(&key).map(|entry| entry.token)) })
	}
}
