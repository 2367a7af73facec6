//! Vaulted payment tokens owned by storefront customers.

// self
use crate::{
	_prelude::*,
	auth::{CustomerId, PaymentTokenId},
	store::StoreFuture,
};

/// Funding instrument behind a vaulted token.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenSource {
	/// Card instrument.
	Card {
		/// Card brand (e.g., `VISA`).
		#[serde(default)]
		brand: Option<String>,
		/// Last digits of the card number.
		#[serde(default)]
		last_digits: Option<String>,
	},
	/// Wallet account.
	Paypal {
		/// Wallet e-mail address.
		#[serde(default)]
		email_address: Option<String>,
	},
	/// Instrument not described by the vault.
	#[default]
	Unknown,
}

/// Vaulted payment token usable without customer interaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentToken {
	/// Token identifier sent as `payment_source.token.id`.
	pub id: PaymentTokenId,
	/// Customer owning the token.
	pub customer_id: CustomerId,
	/// Funding instrument.
	#[serde(default)]
	pub source: TokenSource,
}
impl PaymentToken {
	/// Creates a token with an unknown source.
	pub fn new(id: PaymentTokenId, customer_id: CustomerId) -> Self {
		Self { id, customer_id, source: TokenSource::Unknown }
	}

	/// Sets the funding instrument.
	pub fn with_source(mut self, source: TokenSource) -> Self {
		self.source = source;

		self
	}
}

/// Lookup of vaulted tokens per customer.
pub trait PaymentTokenRepository
where
	Self: Send + Sync,
{
	/// Returns every token of `customer` in vault order (possibly empty).
	fn all_for_customer<'a>(
		&'a self,
		customer: &'a CustomerId,
	) -> StoreFuture<'a, Vec<PaymentToken>>;
}

/// In-memory repository for single-process deployments and tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryPaymentTokenRepository(Arc<RwLock<HashMap<CustomerId, Vec<PaymentToken>>>>);
impl MemoryPaymentTokenRepository {
	/// Appends `token` to its customer's vault.
	pub fn insert(&self, token: PaymentToken) {
		self.0.write().entry(token.customer_id.clone()).or_default().push(token);
	}

	/// Removes every token of `customer`, returning how many were dropped.
	pub fn clear(&self, customer: &CustomerId) -> usize {
		self.0.write().remove(customer).map_or(0, |tokens| tokens.len())
	}
}
impl PaymentTokenRepository for MemoryPaymentTokenRepository {
	fn all_for_customer<'a>(
		&'a self,
		customer: &'a CustomerId,
	) -> StoreFuture<'a, Vec<PaymentToken>> {
		let tokens = self.0.read().get(customer).cloned().unwrap_or_default();

		Box::pin(async move { Ok(tokens) })
	}
}
