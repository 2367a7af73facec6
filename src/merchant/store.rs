//! Merchant order persistence contract and the in-memory backend.

// self
use crate::{
	_prelude::*,
	auth::MerchantOrderId,
	merchant::{MerchantOrder, MerchantOrderStatus},
	store::{StoreError, StoreFuture},
};

/// Read/write access to storefront merchant orders.
pub trait MerchantOrderStore
where
	Self: Send + Sync,
{
	/// Loads a merchant order.
	fn get<'a>(&'a self, id: &'a MerchantOrderId) -> StoreFuture<'a, Option<MerchantOrder>>;

	/// Writes one metadata entry.
	fn set_meta<'a>(
		&'a self,
		id: &'a MerchantOrderId,
		key: &'a str,
		value: String,
	) -> StoreFuture<'a, ()>;

	/// Updates the order status.
	fn set_status<'a>(
		&'a self,
		id: &'a MerchantOrderId,
		status: MerchantOrderStatus,
	) -> StoreFuture<'a, ()>;

	/// Records the processor transaction id.
	fn set_transaction_id<'a>(
		&'a self,
		id: &'a MerchantOrderId,
		transaction_id: String,
	) -> StoreFuture<'a, ()>;

	/// Marks the order paid, moving it to [`MerchantOrderStatus::Processing`].
	fn mark_paid<'a>(&'a self, id: &'a MerchantOrderId) -> StoreFuture<'a, ()>;
}

/// In-memory store for single-process deployments and tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryMerchantOrderStore(Arc<RwLock<HashMap<MerchantOrderId, MerchantOrder>>>);
impl MemoryMerchantOrderStore {
	/// Inserts or replaces an order.
	pub fn insert(&self, order: MerchantOrder) {
		self.0.write().insert(order.id.clone(), order);
	}

	/// Returns a snapshot of an order.
	pub fn snapshot(&self, id: &MerchantOrderId) -> Option<MerchantOrder> {
		self.0.read().get(id).cloned()
	}

	fn update<'a>(
		&'a self,
		id: &'a MerchantOrderId,
		f: impl 'a + Send + FnOnce(&mut MerchantOrder),
	) -> StoreFuture<'a, ()> {
		let result = match self.0.write().get_mut(id) {
			Some(order) => {
				f(order);

				Ok(())
			},
			None => Err(StoreError::Backend { message: format!("Unknown merchant order {id}") }),
		};

		Box::pin(async move { result })
	}
}
impl MerchantOrderStore for MemoryMerchantOrderStore {
	fn get<'a>(&'a self, id: &'a MerchantOrderId) -> StoreFuture<'a, Option<MerchantOrder>> {
		let order = self.snapshot(id);

		Box::pin(async move { Ok(order) })
	}

	fn set_meta<'a>(
		&'a self,
		id: &'a MerchantOrderId,
		key: &'a str,
		value: String,
	) -> StoreFuture<'a, ()> {
		self.update(id, move |order| {
			order.meta.insert(key.to_owned(), value);
		})
	}

	fn set_status<'a>(
		&'a self,
		id: &'a MerchantOrderId,
		status: MerchantOrderStatus,
	) -> StoreFuture<'a, ()> {
		self.update(id, move |order| order.status = status)
	}

	fn set_transaction_id<'a>(
		&'a self,
		id: &'a MerchantOrderId,
		transaction_id: String,
	) -> StoreFuture<'a, ()> {
		self.update(id, move |order| order.transaction_id = Some(transaction_id))
	}

	fn mark_paid<'a>(&'a self, id: &'a MerchantOrderId) -> StoreFuture<'a, ()> {
		self.update(id, |order| {
			order.paid = true;
			order.status = MerchantOrderStatus::Processing;
		})
	}
}
