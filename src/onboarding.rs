//! Merchant onboarding progress derived from stored settings.

// self
use crate::{_prelude::*, config::Environment, store::StoreFuture};

const ONBOARDED_KEYS: [&str; 4] = ["merchant_email", "merchant_id", "client_id", "client_secret"];

/// Read access to persisted plugin settings.
pub trait SettingsStore
where
	Self: Send + Sync,
{
	/// Returns the value stored under `key`.
	fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>>;
}

/// In-memory settings for single-process deployments and tests.
#[derive(Clone, Debug, Default)]
pub struct MemorySettingsStore(Arc<RwLock<HashMap<String, String>>>);
impl MemorySettingsStore {
	/// Stores `value` under `key`.
	pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
		self.0.write().insert(key.into(), value.into());
	}

	/// Removes `key`.
	pub fn remove(&self, key: &str) -> Option<String> {
		self.0.write().remove(key)
	}
}
impl SettingsStore for MemorySettingsStore {
	fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>> {
		let value = self.0.read().get(key).cloned();

		Box::pin(async move { Ok(value) })
	}
}

/// Onboarding progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum State {
	/// Credentials are incomplete.
	Start,
	/// Merchant e-mail, merchant id, client id, and client secret are all set.
	Onboarded,
}

/// Derives [`State`] from the stored settings.
#[derive(Clone)]
pub struct OnboardingState {
	settings: Arc<dyn SettingsStore>,
}
impl OnboardingState {
	/// Creates the state reader.
	pub fn new(settings: Arc<dyn SettingsStore>) -> Self {
		Self { settings }
	}

	/// State of the active credentials (unsuffixed keys).
	pub async fn current_state(&self) -> Result<State> {
		self.state_by_suffix("").await
	}

	/// State of the sandbox credentials.
	pub async fn sandbox_state(&self) -> Result<State> {
		self.environment_state(Environment::Sandbox).await
	}

	/// State of the production credentials.
	pub async fn production_state(&self) -> Result<State> {
		self.environment_state(Environment::Production).await
	}

	/// State of the credentials stored for `environment`.
	pub async fn environment_state(&self, environment: Environment) -> Result<State> {
		self.state_by_suffix(environment.settings_suffix()).await
	}

	async fn state_by_suffix(&self, suffix: &str) -> Result<State> {
		for key in ONBOARDED_KEYS {
			let key = format!("{key}{suffix}");
			let value = self.settings.get(&key).await?;

			if value.is_none_or(|value| is_unset(&value)) {
				return Ok(State::Start);
			}
		}

		Ok(State::Onboarded)
	}
}
impl Debug for OnboardingState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("OnboardingState(..)")
	}
}

/// Blank values and a lone `"0"` count as unset, matching how storefront settings are stored.
fn is_unset(value: &str) -> bool {
	value.is_empty() || value == "0"
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn onboarded(settings: &MemorySettingsStore, suffix: &str) {
		for key in ONBOARDED_KEYS {
			settings.insert(format!("{key}{suffix}"), "value");
		}
	}

	#[tokio::test]
	async fn states_follow_their_own_keys() {
		let settings = MemorySettingsStore::default();
		let state = OnboardingState::new(Arc::new(settings.clone()));

		assert_eq!(state.current_state().await.expect("State should load."), State::Start);

		onboarded(&settings, "_sandbox");

		assert_eq!(state.sandbox_state().await.expect("State should load."), State::Onboarded);
		assert_eq!(state.production_state().await.expect("State should load."), State::Start);
		assert_eq!(state.current_state().await.expect("State should load."), State::Start);

		onboarded(&settings, "");

		assert_eq!(state.current_state().await.expect("State should load."), State::Onboarded);
	}

	#[tokio::test]
	async fn empty_values_do_not_count() {
		let settings = MemorySettingsStore::default();

		onboarded(&settings, "_production");
		settings.insert("client_secret_production", "");

		let state = OnboardingState::new(Arc::new(settings));

		assert_eq!(state.production_state().await.expect("State should load."), State::Start);
	}

	#[tokio::test]
	async fn zero_values_do_not_count() {
		let settings = MemorySettingsStore::default();
		let state = OnboardingState::new(Arc::new(settings.clone()));

		onboarded(&settings, "_sandbox");
		settings.insert("merchant_id_sandbox", "0");

		assert_eq!(state.sandbox_state().await.expect("State should load."), State::Start);

		settings.insert("merchant_id_sandbox", "00");

		assert_eq!(state.sandbox_state().await.expect("State should load."), State::Onboarded);
	}
}
