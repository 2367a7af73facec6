// crates.io
use httpmock::prelude::*;
// self
use paypal_commerce_core::{
	_preludet::*,
	auth::{CustomerId, MerchantOrderId, PaymentTokenId},
	api::ReqwestApiClient,
	endpoint::OrderEndpoint,
	error::{TransportError, ValidationError},
	http::ReqwestHttpClient,
	merchant::{
		DefaultPurchaseUnitFactory, META_CAPTURE_STATUS, META_INTENT, META_ORDER_ID,
		META_PAYMENT_MODE, MemoryCustomerDirectory, MemoryMerchantOrderStore, MerchantOrder,
		MerchantOrderItem, MerchantOrderStatus,
	},
	order::{CaptureStatus, OrderIntent, Payer},
	renewal::{RenewalHandler, RenewalOutcome, RenewalState},
	vault::{MemoryPaymentTokenRepository, PaymentToken, TokenSource},
};

const TOKEN_PATH: &str = "/v1/oauth2/token";
const ORDERS_PATH: &str = "/v2/checkout/orders";

struct Fixture {
	server: MockServer,
	merchant_orders: MemoryMerchantOrderStore,
	tokens: MemoryPaymentTokenRepository,
}
impl Fixture {
	async fn start() -> Self {
		let fixture = Self::without_token_endpoint().await;

		fixture
			.server
			.mock_async(|when, then| {
				when.method(POST).path(TOKEN_PATH);
				then.status(200)
					.header("content-type", "application/json")
					.body("{\"access_token\":\"A21AA-renewal\",\"expires_in\":32400}");
			})
			.await;

		fixture
	}

	async fn without_token_endpoint() -> Self {
		let fixture = Self {
			server: MockServer::start_async().await,
			merchant_orders: MemoryMerchantOrderStore::default(),
			tokens: MemoryPaymentTokenRepository::default(),
		};

		fixture.merchant_orders.insert(MerchantOrder {
			shipping_total: Some("5.00".into()),
			..MerchantOrder::new(order_id(), "USD", "19.99")
				.with_customer(customer())
				.with_item(MerchantOrderItem {
					name: "Monthly plan".into(),
					quantity: 1,
					unit_price: "14.99".into(),
					sku: Some("PLAN-M".into()),
				})
		});
		fixture.tokens.insert(
			PaymentToken::new(
				PaymentTokenId::new("7ab1234c").expect("Token fixture should be valid."),
				customer(),
			)
			.with_source(TokenSource::Card {
				brand: Some("VISA".into()),
				last_digits: Some("4242".into()),
			}),
		);

		fixture
	}

	fn handler(&self, intent: OrderIntent) -> RenewalHandler<ReqwestHttpClient> {
		let (client, _cache) = build_reqwest_test_client(&self.server.base_url());

		self.handler_over(client, intent)
	}

	fn handler_over(
		&self,
		client: ReqwestApiClient,
		intent: OrderIntent,
	) -> RenewalHandler<ReqwestHttpClient> {
		let payers = MemoryCustomerDirectory::default();

		payers.insert(
			customer(),
			Payer { email_address: Some("subscriber@example.com".into()), ..Default::default() },
		);

		RenewalHandler::new(
			OrderEndpoint::new(client).with_intent(intent),
			Arc::new(self.tokens.clone()),
			Arc::new(self.merchant_orders.clone()),
			Arc::new(DefaultPurchaseUnitFactory::with_invoice_prefix("WC-")),
			Arc::new(payers),
			"sandbox",
		)
	}

	async fn mock_create(&self, status: u16, body: impl Into<String>) -> httpmock::Mock<'_> {
		let body = body.into();

		self.server
			.mock_async(move |when, then| {
				when.method(POST).path(ORDERS_PATH);
				then.status(status).header("content-type", "application/json").body(body);
			})
			.await
	}

	fn merchant_order(&self) -> MerchantOrder {
		self.merchant_orders.snapshot(&order_id()).expect("Merchant order should exist.")
	}
}

fn order_id() -> MerchantOrderId {
	MerchantOrderId::from(1042)
}

fn customer() -> CustomerId {
	CustomerId::new("customer-9").expect("Customer fixture should be valid.")
}

fn capture_order(status: &str) -> String {
	format!(
		r#"{{"id":"8RU61172JS455403V","intent":"CAPTURE","status":"COMPLETED","purchase_units":[{{"reference_id":"default","payments":{{"captures":[{{"id":"9TT36593GH451472A","status":"{status}"}}]}}}}]}}"#
	)
}

#[tokio::test]
async fn completed_capture_marks_order_paid() {
	let fixture = Fixture::start().await;
	let body = capture_order("COMPLETED");
	let create_mock = fixture
		.server
		.mock_async(move |when, then| {
			when.method(POST)
				.path(ORDERS_PATH)
				.body_includes("\"id\":\"7ab1234c\"")
				.body_includes("\"invoice_id\":\"WC-1042\"")
				.body_includes("\"email_address\":\"subscriber@example.com\"");
			then.status(201).header("content-type", "application/json").body(body);
		})
		.await;
	let outcome = fixture
		.handler(OrderIntent::Capture)
		.renew(&order_id())
		.await
		.expect("Renewal should complete.");

	assert_eq!(
		outcome,
		RenewalOutcome::Completed {
			order_id: "8RU61172JS455403V".into(),
			capture_id: "9TT36593GH451472A".into(),
		}
	);

	let order = fixture.merchant_order();

	assert!(order.paid);
	assert_eq!(order.status, MerchantOrderStatus::Processing);
	assert_eq!(order.transaction_id.as_deref(), Some("9TT36593GH451472A"));
	assert_eq!(order.meta(META_ORDER_ID), Some("8RU61172JS455403V"));
	assert_eq!(order.meta(META_INTENT), Some("CAPTURE"));
	assert_eq!(order.meta(META_PAYMENT_MODE), Some("sandbox"));

	create_mock.assert_async().await;
}

#[tokio::test]
async fn declined_capture_fails_the_order() {
	let fixture = Fixture::start().await;

	fixture.mock_create(201, capture_order("DECLINED")).await;

	let failure = fixture
		.handler(OrderIntent::Capture)
		.renew(&order_id())
		.await
		.expect_err("Declined capture should fail the renewal.");

	assert_eq!(failure.state, RenewalState::OrderCreated);
	assert!(!failure.is_retryable());
	assert!(matches!(
		failure.error,
		Error::CaptureNotCompleted { status: CaptureStatus::Declined, .. }
	));

	let order = fixture.merchant_order();

	assert!(!order.paid);
	assert_eq!(order.status, MerchantOrderStatus::Failed);
	assert_eq!(order.transaction_id, None);
	assert_eq!(order.meta(META_CAPTURE_STATUS), Some("DECLINED"));
	assert_eq!(order.meta(META_ORDER_ID), Some("8RU61172JS455403V"));
}

#[tokio::test]
async fn customer_without_tokens_never_calls_the_api() {
	let fixture = Fixture::start().await;

	fixture.tokens.clear(&customer());

	let create_mock = fixture.mock_create(201, "{}").await;
	let failure = fixture
		.handler(OrderIntent::Capture)
		.renew(&order_id())
		.await
		.expect_err("Missing token should fail the renewal.");

	assert_eq!(failure.state, RenewalState::Start);
	assert!(matches!(
		failure.error,
		Error::NoToken { ref customer } if customer.to_string() == "customer-9"
	));
	assert!(!failure.is_retryable());

	let order = fixture.merchant_order();

	assert!(!order.paid);
	assert_eq!(order.status, MerchantOrderStatus::Pending);

	create_mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn guest_order_fails_without_customer() {
	let fixture = Fixture::start().await;

	fixture.merchant_orders.insert(MerchantOrder::new(order_id(), "USD", "19.99"));

	let failure = fixture
		.handler(OrderIntent::Capture)
		.renew(&order_id())
		.await
		.expect_err("Guest order should fail the renewal.");

	assert_eq!(failure.state, RenewalState::Start);
	assert!(matches!(failure.error, Error::NoCustomer { .. }));
}

#[tokio::test]
async fn unknown_merchant_order_is_not_found() {
	let fixture = Fixture::start().await;
	let failure = fixture
		.handler(OrderIntent::Capture)
		.renew(&MerchantOrderId::from(7))
		.await
		.expect_err("Unknown order should fail the renewal.");

	assert!(matches!(failure.error, Error::NotFound { resource: "merchant order", .. }));
}

#[tokio::test]
async fn authorize_intent_puts_order_on_hold() {
	let fixture = Fixture::start().await;

	fixture
		.mock_create(
			201,
			r#"{"id":"4AB09473PJ8829516","intent":"AUTHORIZE","status":"COMPLETED","purchase_units":[{"payments":{"authorizations":[{"id":"6DR96510MS1349828","status":"CREATED"}]}}]}"#,
		)
		.await;

	let outcome = fixture
		.handler(OrderIntent::Authorize)
		.renew(&order_id())
		.await
		.expect("Authorized renewal should succeed.");

	assert_eq!(
		outcome,
		RenewalOutcome::AwaitingCapture {
			order_id: "4AB09473PJ8829516".into(),
			authorization_id: Some("6DR96510MS1349828".into()),
		}
	);

	let order = fixture.merchant_order();

	assert!(!order.paid);
	assert_eq!(order.status, MerchantOrderStatus::OnHold);
	assert_eq!(order.meta(META_INTENT), Some("AUTHORIZE"));
}

#[tokio::test]
async fn rejected_order_creation_stops_after_submission() {
	let fixture = Fixture::start().await;

	fixture
		.mock_create(
			422,
			r#"{"name":"UNPROCESSABLE_ENTITY","message":"The requested action could not be performed.","details":[{"issue":"INSTRUMENT_DECLINED"}]}"#,
		)
		.await;

	let failure = fixture
		.handler(OrderIntent::Capture)
		.renew(&order_id())
		.await
		.expect_err("Rejected order creation should fail the renewal.");

	assert_eq!(failure.state, RenewalState::OrderSubmitted);
	assert!(!failure.is_retryable());
	assert!(matches!(failure.error, Error::Api(ref api) if api.has_issue("INSTRUMENT_DECLINED")));

	let order = fixture.merchant_order();

	assert!(!order.paid);
	assert_eq!(order.meta(META_ORDER_ID), None);
}

#[tokio::test]
async fn upstream_outage_during_order_creation_is_not_retryable() {
	let fixture = Fixture::start().await;
	let create_mock = fixture
		.mock_create(503, r#"{"name":"SERVICE_UNAVAILABLE","message":"Service Unavailable."}"#)
		.await;
	let failure = fixture
		.handler(OrderIntent::Capture)
		.renew(&order_id())
		.await
		.expect_err("Outage should fail the renewal.");

	// A bare 503 is retryable, but the order may exist remotely all the same.
	assert!(failure.error.is_retryable());
	assert_eq!(failure.state, RenewalState::OrderSubmitted);
	assert!(!failure.is_retryable());
	assert_eq!(failure.retry_after(), None);

	create_mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn order_creation_timeout_is_not_retryable() {
	let fixture = Fixture::start().await;
	let create_mock = fixture
		.server
		.mock_async(|when, then| {
			when.method(POST).path(ORDERS_PATH);
			then.status(201)
				.header("content-type", "application/json")
				.body(capture_order("COMPLETED"))
				.delay(std::time::Duration::from_secs(3));
		})
		.await;
	let (client, _cache) = build_reqwest_test_client_with_timeout(
		&fixture.server.base_url(),
		std::time::Duration::from_millis(500),
	);
	let failure = fixture
		.handler_over(client, OrderIntent::Capture)
		.renew(&order_id())
		.await
		.expect_err("Timed out order creation should fail the renewal.");

	assert!(matches!(failure.error, Error::Transport(TransportError::Timeout { .. })));
	assert_eq!(failure.state, RenewalState::OrderSubmitted);
	assert!(!failure.is_retryable());

	let order = fixture.merchant_order();

	assert!(!order.paid);
	assert_eq!(order.status, MerchantOrderStatus::Pending);

	create_mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn token_endpoint_outage_is_retryable() {
	let fixture = Fixture::without_token_endpoint().await;

	fixture
		.server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(503).body("Service Unavailable");
		})
		.await;

	let create_mock = fixture.mock_create(201, capture_order("COMPLETED")).await;
	let failure = fixture
		.handler(OrderIntent::Capture)
		.renew(&order_id())
		.await
		.expect_err("Token endpoint outage should fail the renewal.");

	assert!(matches!(failure.error, Error::Auth(_)));
	assert_eq!(failure.state, RenewalState::Start);
	assert!(failure.is_retryable());

	create_mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn order_without_items_is_rejected_locally() {
	let fixture = Fixture::start().await;

	fixture
		.merchant_orders
		.insert(MerchantOrder::new(order_id(), "USD", "0.00").with_customer(customer()));

	let create_mock = fixture.mock_create(201, "{}").await;
	let failure = fixture
		.handler(OrderIntent::Capture)
		.renew(&order_id())
		.await
		.expect_err("Empty order should fail the renewal.");

	assert!(matches!(
		failure.error,
		Error::Validation(ValidationError::EmptyMerchantOrder { .. })
	));

	create_mock.assert_calls_async(0).await;
}
