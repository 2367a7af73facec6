//! Renews a subscription order from a vaulted card against a mocked Orders API, then shows the
//! bearer token being reused for a follow-up lookup.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use paypal_commerce_core::{
	api::ReqwestApiClient,
	auth::{CustomerId, MerchantOrderId, PaymentTokenId},
	cache::{MemoryTokenCache, TokenCache},
	config::{Environment, GatewayConfig},
	endpoint::OrderEndpoint,
	merchant::{
		DefaultPurchaseUnitFactory, MemoryCustomerDirectory, MemoryMerchantOrderStore,
		MerchantOrder, MerchantOrderItem,
	},
	renewal::RenewalHandler,
	vault::{MemoryPaymentTokenRepository, PaymentToken, TokenSource},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/v1/oauth2/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"A21AA-demo\",\"token_type\":\"Bearer\",\"expires_in\":32400}",
			);
		})
		.await;
	let order_body = r#"{
		"id": "8RU61172JS455403V",
		"intent": "CAPTURE",
		"status": "COMPLETED",
		"purchase_units": [{
			"reference_id": "default",
			"payments": {"captures": [{"id": "9TT36593GH451472A", "status": "COMPLETED"}]}
		}]
	}"#;
	let create_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/v2/checkout/orders");
			then.status(201).header("content-type", "application/json").body(order_body);
		})
		.await;
	let lookup_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v2/checkout/orders/8RU61172JS455403V");
			then.status(200).header("content-type", "application/json").body(order_body);
		})
		.await;
	let config = GatewayConfig::builder(Environment::Sandbox)
		.host(Url::parse(&server.base_url())?)
		.client_id("demo-client")
		.client_secret("demo-secret")
		.build()?;
	let cache: Arc<dyn TokenCache> = Arc::new(MemoryTokenCache::default());
	let orders = OrderEndpoint::new(ReqwestApiClient::from_config(cache, &config)?);
	let customer = CustomerId::new("customer-42")?;
	let merchant_order_id = MerchantOrderId::from(1001);
	let merchant_orders = MemoryMerchantOrderStore::default();
	let tokens = MemoryPaymentTokenRepository::default();

	merchant_orders.insert(
		MerchantOrder::new(merchant_order_id.clone(), "USD", "9.99")
			.with_customer(customer.clone())
			.with_item(MerchantOrderItem {
				name: "Coffee subscription".into(),
				quantity: 1,
				unit_price: "9.99".into(),
				sku: None,
			}),
	);
	tokens.insert(PaymentToken::new(PaymentTokenId::new("7ab1234c")?, customer).with_source(
		TokenSource::Card { brand: Some("VISA".into()), last_digits: Some("4242".into()) },
	));

	let handler = RenewalHandler::new(
		orders.clone(),
		Arc::new(tokens),
		Arc::new(merchant_orders.clone()),
		Arc::new(DefaultPurchaseUnitFactory::with_invoice_prefix("DEMO-")),
		Arc::new(MemoryCustomerDirectory::default()),
		config.payment_mode(),
	);
	let outcome = handler.renew(&merchant_order_id).await?;

	println!("Renewal outcome: {outcome:?}.");

	if let Some(order) = merchant_orders.snapshot(&merchant_order_id) {
		println!(
			"Merchant order {} is {} (transaction {}).",
			order.id,
			order.status,
			order.transaction_id.as_deref().unwrap_or("-")
		);
	}

	let order = orders.order("8RU61172JS455403V").await?;

	println!("Remote order {} is {:?}.", order.id, order.status);

	token_mock.assert_async().await;
	create_mock.assert_async().await;
	lookup_mock.assert_async().await;

	Ok(())
}
