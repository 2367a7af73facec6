//! Orders API: create, capture, authorize, and fetch checkout orders.

// self
use crate::{
	_prelude::*,
	api::{ApiClient, ApiRequest},
	error::ValidationError,
	http::HttpTransport,
	obs::{self, OperationKind},
	order::{Order, OrderIntent, Payer, PurchaseUnit},
	vault::PaymentToken,
};

const ORDERS_PATH: &str = "v2/checkout/orders";

/// Client for `/v2/checkout/orders`.
#[derive(Clone, Debug)]
pub struct OrderEndpoint<C>
where
	C: ?Sized + HttpTransport,
{
	api: ApiClient<C>,
	intent: OrderIntent,
}
impl<C> OrderEndpoint<C>
where
	C: ?Sized + HttpTransport,
{
	/// Creates an endpoint that creates `CAPTURE` orders.
	pub fn new(api: ApiClient<C>) -> Self {
		Self { api, intent: OrderIntent::Capture }
	}

	/// Overrides the intent used by [`create`](Self::create).
	pub fn with_intent(mut self, intent: OrderIntent) -> Self {
		self.intent = intent;

		self
	}

	/// Intent used for new orders.
	pub fn intent(&self) -> OrderIntent {
		self.intent
	}

	/// Underlying API client.
	pub fn api(&self) -> &ApiClient<C> {
		&self.api
	}

	/// Creates an order.
	///
	/// When `payment_token` is present the order is paid from the vaulted token; a `CAPTURE`
	/// order created that way may already carry its captures in the response.
	pub async fn create(
		&self,
		purchase_units: &[PurchaseUnit],
		payer: Option<&Payer>,
		payment_token: Option<&PaymentToken>,
	) -> Result<Order> {
		if purchase_units.is_empty() {
			return Err(ValidationError::MissingPurchaseUnits.into());
		}

		let body = CreateOrderRequest {
			intent: self.intent,
			purchase_units,
			payer,
			payment_source: payment_token.map(|token| PaymentSource {
				token: TokenSource { id: &token.id, kind: "PAYMENT_METHOD_TOKEN" },
			}),
		};
		let request = ApiRequest::post(ORDERS_PATH).json(&body)?;

		obs::observe(OperationKind::CreateOrder, "create", async move {
			let order = self.api.send_json::<Order>(request).await?;

			tracing::info!(
				remote_order = %order.id,
				intent = %order.intent,
				status = ?order.status,
				"Created order."
			);

			Ok(order)
		})
		.await
	}

	/// Captures the payment of an approved `CAPTURE` order.
	pub async fn capture(&self, order_id: &str) -> Result<Order> {
		let request = ApiRequest::post(ORDERS_PATH)
			.segment(order_id)
			.segment("capture")
			.resource("order", order_id);

		obs::observe(OperationKind::CaptureOrder, "capture", self.api.send_json(request)).await
	}

	/// Authorizes the payment of an approved `AUTHORIZE` order.
	pub async fn authorize(&self, order_id: &str) -> Result<Order> {
		let request = ApiRequest::post(ORDERS_PATH)
			.segment(order_id)
			.segment("authorize")
			.resource("order", order_id);

		obs::observe(OperationKind::AuthorizeOrder, "authorize", self.api.send_json(request)).await
	}

	/// Fetches an order by id.
	pub async fn order(&self, order_id: &str) -> Result<Order> {
		let request = ApiRequest::get(ORDERS_PATH).segment(order_id).resource("order", order_id);

		obs::observe(OperationKind::GetOrder, "get", self.api.send_json(request)).await
	}
}

#[derive(Serialize)]
struct CreateOrderRequest<'a> {
	intent: OrderIntent,
	purchase_units: &'a [PurchaseUnit],
	#[serde(skip_serializing_if = "Option::is_none")]
	payer: Option<&'a Payer>,
	#[serde(skip_serializing_if = "Option::is_none")]
	payment_source: Option<PaymentSource<'a>>,
}

#[derive(Serialize)]
struct PaymentSource<'a> {
	token: TokenSource<'a>,
}

#[derive(Serialize)]
struct TokenSource<'a> {
	id: &'a str,
	#[serde(rename = "type")]
	kind: &'static str,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		auth::{CustomerId, PaymentTokenId},
		order::Amount,
	};

	#[test]
	fn create_body_carries_vaulted_token() {
		let units =
			vec![PurchaseUnit::new(Amount::new("USD", "10.00").expect("Amount should be valid."))];
		let token = PaymentToken::new(
			PaymentTokenId::new("8kk8451t").expect("Token fixture should be valid."),
			CustomerId::new("customer-1").expect("Customer fixture should be valid."),
		);
		let body = CreateOrderRequest {
			intent: OrderIntent::Capture,
			purchase_units: &units,
			payer: None,
			payment_source: Some(PaymentSource {
				token: TokenSource { id: &token.id, kind: "PAYMENT_METHOD_TOKEN" },
			}),
		};
		let json = serde_json::to_value(&body).expect("Body should serialize.");

		assert_eq!(json["intent"], "CAPTURE");
		assert_eq!(json["payment_source"]["token"]["id"], "8kk8451t");
		assert_eq!(json["payment_source"]["token"]["type"], "PAYMENT_METHOD_TOKEN");
		assert!(json.get("payer").is_none());
	}
}
