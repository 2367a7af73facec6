//! Storage contracts shared by collaborator stores (token cache, vault, merchant orders,
//! settings).
//!
//! Persistence is owned by the storefront. The core only consumes these traits, so every
//! backend reports failures through [`StoreError`] and returns boxed [`StoreFuture`]s that
//! stay `Send` across executors.

// self
use crate::_prelude::*;

/// Boxed future returned by collaborator stores.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Error type produced by collaborator store implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures (e.g., serde) surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
