//! Subscription renewals paid from a vaulted payment token.
//!
//! A renewal walks `START → TOKEN_SELECTED → ORDER_SUBMITTED → ORDER_CREATED →
//! CAPTURE_VERIFIED → ORDER_COMPLETED` and stops at the first failure. There is no failed state:
//! a [`RenewalFailure`] carries the last state reached instead. Each attempt is a single pass;
//! nothing is retried here, and the outer scheduler is expected to run at most one attempt per
//! billing cycle.
//! [`RenewalFailure::is_retryable`] tells that scheduler whether another attempt is safe.

// self
use crate::{
	_prelude::*,
	auth::MerchantOrderId,
	endpoint::OrderEndpoint,
	error::ValidationError,
	http::HttpTransport,
	merchant::{
		self, META_CAPTURE_STATUS, MerchantOrder, MerchantOrderStatus, MerchantOrderStore,
		PayerFactory, PurchaseUnitFactory,
	},
	obs::{self, OperationKind, OperationOutcome, OperationSpan},
	order::{CaptureStatus, Order, OrderIntent},
	vault::PaymentTokenRepository,
};

/// Progress of a renewal attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RenewalState {
	/// Nothing happened yet.
	Start,
	/// A vaulted token was chosen and a bearer token is at hand.
	TokenSelected,
	/// The create-order request is being sent; money may move from here on.
	OrderSubmitted,
	/// The remote order exists.
	OrderCreated,
	/// A completed capture was found.
	CaptureVerified,
	/// The merchant order was marked paid.
	OrderCompleted,
}
impl RenewalState {
	/// Returns a stable label suitable for logs.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Start => "START",
			Self::TokenSelected => "TOKEN_SELECTED",
			Self::OrderSubmitted => "ORDER_SUBMITTED",
			Self::OrderCreated => "ORDER_CREATED",
			Self::CaptureVerified => "CAPTURE_VERIFIED",
			Self::OrderCompleted => "ORDER_COMPLETED",
		}
	}
}
impl Display for RenewalState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Successful end of a renewal attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenewalOutcome {
	/// Funds were captured and the merchant order was marked paid.
	Completed {
		/// Remote order identifier.
		order_id: String,
		/// Capture identifier recorded as the transaction id.
		capture_id: String,
	},
	/// Funds were authorized; the merchant order is on hold until captured.
	AwaitingCapture {
		/// Remote order identifier.
		order_id: String,
		/// Authorization identifier, when the API returned one.
		authorization_id: Option<String>,
	},
}

/// Failed renewal attempt together with the last state it reached.
#[derive(Debug, ThisError)]
#[error("Renewal stopped after {state}: {error}")]
pub struct RenewalFailure {
	/// Last state reached before failing.
	pub state: RenewalState,
	/// Underlying error.
	#[source]
	pub error: Error,
}
impl RenewalFailure {
	/// Returns `true` when another attempt may be scheduled.
	///
	/// Once the create-order request may have reached the API the customer may already have
	/// been charged, so failures from [`RenewalState::OrderSubmitted`] onwards are never
	/// retryable, timeouts and 5xx answers included.
	pub fn is_retryable(&self) -> bool {
		self.state < RenewalState::OrderSubmitted && self.error.is_retryable()
	}

	/// Delay the API asked for before the next attempt, for retryable failures only.
	pub fn retry_after(&self) -> Option<Duration> {
		if self.is_retryable() { self.error.retry_after() } else { None }
	}
}

/// Renews subscriptions by charging the customer's vaulted token.
pub struct RenewalHandler<C>
where
	C: ?Sized + HttpTransport,
{
	orders: OrderEndpoint<C>,
	tokens: Arc<dyn PaymentTokenRepository>,
	merchant_orders: Arc<dyn MerchantOrderStore>,
	purchase_units: Arc<dyn PurchaseUnitFactory>,
	payers: Arc<dyn PayerFactory>,
	payment_mode: &'static str,
}
impl<C> RenewalHandler<C>
where
	C: ?Sized + HttpTransport,
{
	/// Creates a handler. `payment_mode` is recorded on merchant orders (`live` or `sandbox`).
	pub fn new(
		orders: OrderEndpoint<C>,
		tokens: Arc<dyn PaymentTokenRepository>,
		merchant_orders: Arc<dyn MerchantOrderStore>,
		purchase_units: Arc<dyn PurchaseUnitFactory>,
		payers: Arc<dyn PayerFactory>,
		payment_mode: &'static str,
	) -> Self {
		Self { orders, tokens, merchant_orders, purchase_units, payers, payment_mode }
	}

	/// Charges the renewal order `merchant_order_id`.
	pub async fn renew(
		&self,
		merchant_order_id: &MerchantOrderId,
	) -> Result<RenewalOutcome, RenewalFailure> {
		let kind = OperationKind::Renewal;
		let span = OperationSpan::new(kind, "renew");

		obs::record_operation_outcome(kind, OperationOutcome::Attempt);

		let mut state = RenewalState::Start;
		let result = span
			.instrument(self.run(merchant_order_id, &mut state))
			.await
			.map_err(|error| RenewalFailure { state, error });

		match &result {
			Ok(_) => obs::record_operation_outcome(kind, OperationOutcome::Success),
			Err(failure) => {
				obs::record_operation_outcome(kind, OperationOutcome::Failure);

				tracing::error!(
					merchant_order = %merchant_order_id,
					state = %failure.state,
					retryable = failure.is_retryable(),
					error = %failure.error,
					"Could not renew subscription."
				);
			},
		}

		result
	}

	async fn run(
		&self,
		merchant_order_id: &MerchantOrderId,
		state: &mut RenewalState,
	) -> Result<RenewalOutcome> {
		let merchant_order = self.merchant_orders.get(merchant_order_id).await?.ok_or_else(|| {
			Error::NotFound { resource: "merchant order", id: merchant_order_id.to_string() }
		})?;
		let customer = merchant_order
			.customer_id
			.clone()
			.ok_or_else(|| Error::NoCustomer { merchant_order: merchant_order_id.clone() })?;
		let tokens = self.tokens.all_for_customer(&customer).await?;
		// First available token; the vault returns them in the customer's preferred order.
		let token = tokens
			.into_iter()
			.next()
			.ok_or_else(|| Error::NoToken { customer: customer.clone() })?;
		let unit = self.purchase_units.from_merchant_order(&merchant_order)?;
		let payer = self.payers.from_customer(&customer).await?;

		// Mint up front so token endpoint outages fail before anything is submitted.
		self.orders.api().authenticator().bearer().await?;

		*state = RenewalState::TokenSelected;

		tracing::info!(
			merchant_order = %merchant_order_id,
			customer = %customer,
			token = %token.id,
			"Selected vaulted token."
		);

		*state = RenewalState::OrderSubmitted;

		let order = self.orders.create(&[unit], payer.as_ref(), Some(&token)).await?;

		*state = RenewalState::OrderCreated;

		match order.intent {
			OrderIntent::Capture => self.settle_capture(&merchant_order, &order, state).await,
			OrderIntent::Authorize => self.hold_authorization(&merchant_order, &order).await,
		}
	}

	async fn settle_capture(
		&self,
		merchant_order: &MerchantOrder,
		order: &Order,
		state: &mut RenewalState,
	) -> Result<RenewalOutcome> {
		let id = &merchant_order.id;
		let capture = order
			.latest_capture()
			.ok_or_else(|| ValidationError::MissingCapture { order_id: order.id.clone() })?;

		merchant::record_remote_order(self.merchant_orders.as_ref(), id, order, self.payment_mode)
			.await?;

		if capture.status != CaptureStatus::Completed {
			self.merchant_orders
				.set_meta(id, META_CAPTURE_STATUS, capture.status.to_string())
				.await?;
			self.merchant_orders.set_status(id, MerchantOrderStatus::Failed).await?;

			return Err(Error::CaptureNotCompleted {
				order_id: order.id.clone(),
				capture_id: capture.id.clone(),
				status: capture.status,
			});
		}

		*state = RenewalState::CaptureVerified;

		self.merchant_orders.set_transaction_id(id, capture.id.clone()).await?;
		self.merchant_orders.mark_paid(id).await?;

		*state = RenewalState::OrderCompleted;

		tracing::info!(
			merchant_order = %id,
			remote_order = %order.id,
			capture = %capture.id,
			"Renewal payment completed."
		);

		Ok(RenewalOutcome::Completed { order_id: order.id.clone(), capture_id: capture.id.clone() })
	}

	async fn hold_authorization(
		&self,
		merchant_order: &MerchantOrder,
		order: &Order,
	) -> Result<RenewalOutcome> {
		let id = &merchant_order.id;

		merchant::record_remote_order(self.merchant_orders.as_ref(), id, order, self.payment_mode)
			.await?;
		self.merchant_orders.set_status(id, MerchantOrderStatus::OnHold).await?;

		tracing::info!(
			merchant_order = %id,
			remote_order = %order.id,
			"Renewal payment authorized; awaiting capture."
		);

		Ok(RenewalOutcome::AwaitingCapture {
			order_id: order.id.clone(),
			authorization_id: order.latest_authorization().map(|auth| auth.id.clone()),
		})
	}
}
impl<C> Debug for RenewalHandler<C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RenewalHandler")
			.field("intent", &self.orders.intent())
			.field("payment_mode", &self.payment_mode)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::TransportError;

	fn failure(state: RenewalState) -> RenewalFailure {
		RenewalFailure { state, error: TransportError::Io(std::io::Error::other("reset")).into() }
	}

	#[test]
	fn failures_after_order_submission_are_not_retryable() {
		assert!(failure(RenewalState::Start).is_retryable());
		assert!(failure(RenewalState::TokenSelected).is_retryable());
		assert!(!failure(RenewalState::OrderSubmitted).is_retryable());
		assert!(!failure(RenewalState::OrderCreated).is_retryable());
		assert!(!failure(RenewalState::CaptureVerified).is_retryable());
	}

	#[test]
	fn retry_hint_is_dropped_once_submitted() {
		let throttled = |state| RenewalFailure {
			state,
			error: crate::error::ApiError {
				status: 429,
				name: "RATE_LIMIT_REACHED".into(),
				message: "Too many requests.".into(),
				debug_id: None,
				details: Vec::new(),
				retry_after: Some(Duration::seconds(60)),
			}
			.into(),
		};

		assert_eq!(
			throttled(RenewalState::TokenSelected).retry_after(),
			Some(Duration::seconds(60))
		);
		assert_eq!(throttled(RenewalState::OrderSubmitted).retry_after(), None);
	}

	#[test]
	fn failure_message_names_the_state() {
		let rendered = failure(RenewalState::TokenSelected).to_string();

		assert!(rendered.contains("TOKEN_SELECTED"));
	}
}
