//! Checkout gateway glue between the storefront and the payment core.
//!
//! [`GatewayController`] is what the storefront calls when a customer places an order. It
//! delegates the payment itself to an [`OrderProcessor`] and only reacts to the outcome:
//! user notices, session cleanup, cart cleanup, and the redirect target.

pub mod processor;

pub use processor::CheckoutOrderProcessor;

// self
use crate::{
	_prelude::*,
	auth::MerchantOrderId,
	merchant::{MerchantOrder, MerchantOrderStatus, MerchantOrderStore},
	obs::{self, OperationKind, OperationOutcome, OperationSpan},
	onboarding::{OnboardingState, State},
};

/// Boxed future returned by gateway collaborators.
pub type GatewayFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a + Send>>;

const ORDER_NOT_FOUND: &str = "Couldn't find order to process";
const PAYMENT_FAILED: &str = "The payment could not be processed. Please try again.";

/// Takes the payment for a merchant order.
pub trait OrderProcessor
where
	Self: Send + Sync,
{
	/// Processes the payment, returning `true` on success.
	fn process<'a>(&'a self, order: &'a MerchantOrder) -> GatewayFuture<'a, bool>;

	/// User-facing description of the last failure.
	fn last_error(&self) -> Option<String>;
}

/// Customer session owned by the storefront.
pub trait SessionHandler
where
	Self: Send + Sync,
{
	/// Drops the payment-selection data stored in the session.
	fn destroy_session_data(&self);
}

/// Shopping cart owned by the storefront.
pub trait Cart
where
	Self: Send + Sync,
{
	/// Removes every item from the cart.
	fn empty_cart(&self);
}

/// Severity of a user notice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NoticeKind {
	/// Error banner.
	Error,
	/// Informational banner.
	Notice,
}

/// User notice sink owned by the storefront.
pub trait Notices
where
	Self: Send + Sync,
{
	/// Queues `message` for display.
	fn add(&self, message: &str, kind: NoticeKind);
}

/// Storefront URLs used as redirect targets.
pub trait CheckoutUrls
where
	Self: Send + Sync,
{
	/// Checkout page URL.
	fn checkout_url(&self) -> String;

	/// Order-received page URL for `order`.
	fn return_url(&self, order: &MerchantOrder) -> String;
}

/// Outcome label returned to the storefront.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentResult {
	/// Payment succeeded.
	Success,
	/// Payment failed.
	Failure,
}

/// Result handed back to the storefront after processing a payment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessPaymentResult {
	/// Outcome.
	pub result: PaymentResult,
	/// Where to send the customer next.
	pub redirect: String,
}
impl ProcessPaymentResult {
	/// Successful result redirecting to `redirect`.
	pub fn success(redirect: String) -> Self {
		Self { result: PaymentResult::Success, redirect }
	}

	/// Failed result redirecting to `redirect`.
	pub fn failure(redirect: String) -> Self {
		Self { result: PaymentResult::Failure, redirect }
	}
}

/// Storefront-facing payment gateway.
#[derive(Clone)]
pub struct GatewayController {
	merchant_orders: Arc<dyn MerchantOrderStore>,
	processor: Arc<dyn OrderProcessor>,
	session: Arc<dyn SessionHandler>,
	cart: Arc<dyn Cart>,
	notices: Arc<dyn Notices>,
	urls: Arc<dyn CheckoutUrls>,
	onboarding: OnboardingState,
}
impl GatewayController {
	/// Wires the controller to its collaborators.
	pub fn new(
		merchant_orders: Arc<dyn MerchantOrderStore>,
		processor: Arc<dyn OrderProcessor>,
		session: Arc<dyn SessionHandler>,
		cart: Arc<dyn Cart>,
		notices: Arc<dyn Notices>,
		urls: Arc<dyn CheckoutUrls>,
		onboarding: OnboardingState,
	) -> Self {
		Self { merchant_orders, processor, session, cart, notices, urls, onboarding }
	}

	/// Processes the payment of merchant order `id`.
	pub async fn process_payment(&self, id: &MerchantOrderId) -> ProcessPaymentResult {
		let kind = OperationKind::ProcessPayment;
		let span = OperationSpan::new(kind, "process_payment");

		obs::record_operation_outcome(kind, OperationOutcome::Attempt);

		let result = span.instrument(self.process_now(id)).await;
		let outcome = match result.result {
			PaymentResult::Success => OperationOutcome::Success,
			PaymentResult::Failure => OperationOutcome::Failure,
		};

		obs::record_operation_outcome(kind, outcome);

		result
	}

	/// Returns `true` until the active credentials are fully onboarded.
	pub async fn needs_setup(&self) -> bool {
		match self.onboarding.current_state().await {
			Ok(state) => state != State::Onboarded,
			Err(e) => {
				tracing::warn!(error = %e, "Could not read the onboarding state.");

				true
			},
		}
	}

	async fn process_now(&self, id: &MerchantOrderId) -> ProcessPaymentResult {
		let order = match self.merchant_orders.get(id).await {
			Ok(Some(order)) => order,
			Ok(None) => {
				tracing::warn!(merchant_order = %id, "Merchant order not found.");
				self.notices.add(ORDER_NOT_FOUND, NoticeKind::Error);

				return ProcessPaymentResult::failure(self.urls.checkout_url());
			},
			Err(e) => {
				tracing::error!(merchant_order = %id, error = %e, "Could not load merchant order.");
				self.notices.add(ORDER_NOT_FOUND, NoticeKind::Error);

				return ProcessPaymentResult::failure(self.urls.checkout_url());
			},
		};

		if !self.processor.process(&order).await {
			let message = self.processor.last_error().unwrap_or_else(|| PAYMENT_FAILED.into());

			tracing::warn!(merchant_order = %id, reason = %message, "Payment failed.");
			self.notices.add(&message, NoticeKind::Error);

			if let Err(e) = self.merchant_orders.set_status(id, MerchantOrderStatus::Failed).await {
				tracing::error!(merchant_order = %id, error = %e, "Could not mark order failed.");
			}

			return ProcessPaymentResult::failure(self.urls.checkout_url());
		}

		self.session.destroy_session_data();
		self.cart.empty_cart();

		tracing::info!(merchant_order = %id, "Payment processed.");

		ProcessPaymentResult::success(self.urls.return_url(&order))
	}
}
impl Debug for GatewayController {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("GatewayController(..)")
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use super::*;
	use crate::{
		merchant::MemoryMerchantOrderStore,
		onboarding::{MemorySettingsStore, SettingsStore},
	};

	#[derive(Default)]
	struct StubProcessor {
		succeed: bool,
		calls: AtomicUsize,
	}
	impl OrderProcessor for StubProcessor {
		fn process<'a>(&'a self, _: &'a MerchantOrder) -> GatewayFuture<'a, bool> {
			self.calls.fetch_add(1, Ordering::SeqCst);

			let succeed = self.succeed;

			Box::pin(async move { succeed })
		}

		fn last_error(&self) -> Option<String> {
			(!self.succeed).then(|| "some-error".to_owned())
		}
	}

	#[derive(Default)]
	struct Storefront {
		notices: Mutex<Vec<(String, NoticeKind)>>,
		session_destroyed: AtomicUsize,
		cart_emptied: AtomicUsize,
	}
	impl SessionHandler for Storefront {
		fn destroy_session_data(&self) {
			self.session_destroyed.fetch_add(1, Ordering::SeqCst);
		}
	}
	impl Cart for Storefront {
		fn empty_cart(&self) {
			self.cart_emptied.fetch_add(1, Ordering::SeqCst);
		}
	}
	impl Notices for Storefront {
		fn add(&self, message: &str, kind: NoticeKind) {
			self.notices.lock().push((message.to_owned(), kind));
		}
	}
	impl CheckoutUrls for Storefront {
		fn checkout_url(&self) -> String {
			"http://example.com/checkout".into()
		}

		fn return_url(&self, order: &MerchantOrder) -> String {
			format!("http://example.com/order-received/{}", order.id)
		}
	}

	fn controller(
		store: &MemoryMerchantOrderStore,
		processor: Arc<StubProcessor>,
		storefront: Arc<Storefront>,
		settings: Arc<dyn SettingsStore>,
	) -> GatewayController {
		GatewayController::new(
			Arc::new(store.clone()),
			processor,
			storefront.clone(),
			storefront.clone(),
			storefront.clone(),
			storefront,
			OnboardingState::new(settings),
		)
	}

	#[tokio::test]
	async fn missing_order_fails_without_processing() {
		let store = MemoryMerchantOrderStore::default();
		let processor = Arc::new(StubProcessor { succeed: true, ..Default::default() });
		let storefront = Arc::new(Storefront::default());
		let gateway = controller(
			&store,
			processor.clone(),
			storefront.clone(),
			Arc::new(MemorySettingsStore::default()),
		);
		let result = gateway.process_payment(&MerchantOrderId::from(1)).await;

		assert_eq!(result, ProcessPaymentResult::failure("http://example.com/checkout".into()));
		assert_eq!(processor.calls.load(Ordering::SeqCst), 0);
		assert_eq!(
			storefront.notices.lock().as_slice(),
			[(ORDER_NOT_FOUND.to_owned(), NoticeKind::Error)]
		);
	}

	#[tokio::test]
	async fn successful_payment_clears_session_and_cart() {
		let store = MemoryMerchantOrderStore::default();
		let processor = Arc::new(StubProcessor { succeed: true, ..Default::default() });
		let storefront = Arc::new(Storefront::default());
		let gateway = controller(
			&store,
			processor.clone(),
			storefront.clone(),
			Arc::new(MemorySettingsStore::default()),
		);

		store.insert(MerchantOrder::new(MerchantOrderId::from(1), "USD", "10.00"));

		let result = gateway.process_payment(&MerchantOrderId::from(1)).await;

		assert_eq!(
			result,
			ProcessPaymentResult::success("http://example.com/order-received/1".into())
		);
		assert_eq!(processor.calls.load(Ordering::SeqCst), 1);
		assert_eq!(storefront.session_destroyed.load(Ordering::SeqCst), 1);
		assert_eq!(storefront.cart_emptied.load(Ordering::SeqCst), 1);
		assert!(storefront.notices.lock().is_empty());
	}

	#[tokio::test]
	async fn failed_payment_surfaces_last_error_and_marks_order_failed() {
		let store = MemoryMerchantOrderStore::default();
		let processor = Arc::new(StubProcessor::default());
		let storefront = Arc::new(Storefront::default());
		let gateway = controller(
			&store,
			processor,
			storefront.clone(),
			Arc::new(MemorySettingsStore::default()),
		);

		store.insert(MerchantOrder::new(MerchantOrderId::from(1), "USD", "10.00"));

		let result = gateway.process_payment(&MerchantOrderId::from(1)).await;

		assert_eq!(result.result, PaymentResult::Failure);
		assert_eq!(result.redirect, "http://example.com/checkout");
		assert_eq!(
			storefront.notices.lock().as_slice(),
			[("some-error".to_owned(), NoticeKind::Error)]
		);
		assert_eq!(
			store.snapshot(&MerchantOrderId::from(1)).map(|order| order.status),
			Some(MerchantOrderStatus::Failed)
		);
		assert_eq!(storefront.cart_emptied.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn needs_setup_until_onboarded() {
		let settings = MemorySettingsStore::default();
		let gateway = controller(
			&MemoryMerchantOrderStore::default(),
			Arc::new(StubProcessor::default()),
			Arc::new(Storefront::default()),
			Arc::new(settings.clone()),
		);

		assert!(gateway.needs_setup().await);

		for key in ["merchant_email", "merchant_id", "client_id", "client_secret"] {
			settings.insert(key, "value");
		}

		assert!(!gateway.needs_setup().await);
	}

	#[test]
	fn result_serializes_like_the_storefront_expects() {
		let json = serde_json::to_value(ProcessPaymentResult::failure("/checkout".into()))
			.expect("Result should serialize.");

		assert_eq!(json, serde_json::json!({"result": "failure", "redirect": "/checkout"}));
	}
}
