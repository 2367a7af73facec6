//! Default [`OrderProcessor`] completing the remote order approved at checkout.

// self
use crate::{
	_prelude::*,
	endpoint::OrderEndpoint,
	error::ValidationError,
	gateway::{GatewayFuture, OrderProcessor},
	http::HttpTransport,
	merchant::{
		self, META_CAPTURE_STATUS, MerchantOrder, MerchantOrderStatus, MerchantOrderStore,
	},
	order::{CaptureStatus, Order, OrderIntent, OrderStatus},
};

const DECLINED: &str = "Your payment was declined. Please use a different payment method.";
const TRY_AGAIN: &str = "The payment could not be processed. Please try again.";

/// Captures or authorizes the remote order recorded on a merchant order.
///
/// The remote order id is read from the [`META_ORDER_ID`](merchant::META_ORDER_ID) metadata
/// written when the order was created during checkout.
pub struct CheckoutOrderProcessor<C>
where
	C: ?Sized + HttpTransport,
{
	orders: OrderEndpoint<C>,
	merchant_orders: Arc<dyn MerchantOrderStore>,
	payment_mode: &'static str,
	last_error: Mutex<Option<String>>,
}
impl<C> CheckoutOrderProcessor<C>
where
	C: ?Sized + HttpTransport,
{
	/// Creates the processor. `payment_mode` is recorded on merchant orders.
	pub fn new(
		orders: OrderEndpoint<C>,
		merchant_orders: Arc<dyn MerchantOrderStore>,
		payment_mode: &'static str,
	) -> Self {
		Self { orders, merchant_orders, payment_mode, last_error: Mutex::new(None) }
	}

	async fn process_now(&self, merchant_order: &MerchantOrder) -> Result<()> {
		let remote_id = merchant_order.remote_order_id()?;
		let order = self.orders.order(remote_id).await?;
		let order = match order.intent {
			OrderIntent::Capture if order.status == OrderStatus::Completed => order,
			OrderIntent::Capture => self.orders.capture(remote_id).await?,
			OrderIntent::Authorize if order.status == OrderStatus::Completed => order,
			OrderIntent::Authorize => self.orders.authorize(remote_id).await?,
		};

		merchant::record_remote_order(
			self.merchant_orders.as_ref(),
			&merchant_order.id,
			&order,
			self.payment_mode,
		)
		.await?;

		match order.intent {
			OrderIntent::Capture => self.settle_capture(merchant_order, &order).await,
			OrderIntent::Authorize => {
				if order.latest_authorization().is_none() {
					return Err(
						ValidationError::MissingAuthorization { order_id: order.id.clone() }.into()
					);
				}

				self.merchant_orders
					.set_status(&merchant_order.id, MerchantOrderStatus::OnHold)
					.await?;

				Ok(())
			},
		}
	}

	async fn settle_capture(&self, merchant_order: &MerchantOrder, order: &Order) -> Result<()> {
		let id = &merchant_order.id;
		let capture = order
			.latest_capture()
			.ok_or_else(|| ValidationError::MissingCapture { order_id: order.id.clone() })?;

		if capture.status != CaptureStatus::Completed {
			self.merchant_orders
				.set_meta(id, META_CAPTURE_STATUS, capture.status.to_string())
				.await?;

			return Err(Error::CaptureNotCompleted {
				order_id: order.id.clone(),
				capture_id: capture.id.clone(),
				status: capture.status,
			});
		}

		self.merchant_orders.set_transaction_id(id, capture.id.clone()).await?;
		self.merchant_orders.mark_paid(id).await?;

		Ok(())
	}
}
impl<C> OrderProcessor for CheckoutOrderProcessor<C>
where
	C: ?Sized + HttpTransport,
{
	fn process<'a>(&'a self, order: &'a MerchantOrder) -> GatewayFuture<'a, bool> {
		Box::pin(async move {
			*self.last_error.lock() = None;

			match self.process_now(order).await {
				Ok(()) => true,
				Err(e) => {
					tracing::error!(
						merchant_order = %order.id,
						error = %e,
						"Could not process payment."
					);

					*self.last_error.lock() = Some(user_message(&e).to_owned());

					false
				},
			}
		})
	}

	fn last_error(&self) -> Option<String> {
		self.last_error.lock().clone()
	}
}
impl<C> Debug for CheckoutOrderProcessor<C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CheckoutOrderProcessor")
			.field("payment_mode", &self.payment_mode)
			.field("last_error", &self.last_error.lock())
			.finish()
	}
}

// Raw API payloads never reach the customer.
fn user_message(error: &Error) -> &'static str {
	match error {
		Error::CaptureNotCompleted { .. } => DECLINED,
		Error::Api(api) if api.has_issue("INSTRUMENT_DECLINED") => DECLINED,
		_ => TRY_AGAIN,
	}
}
