// crates.io
use httpmock::prelude::*;
// self
use paypal_commerce_core::{
	_preludet::*,
	endpoint::{PartnerReferrals, PartnerReferralsData, PaymentsEndpoint},
	error::ValidationError,
	order::{CaptureStatus, Money, RefundStatus},
};

const TOKEN_PATH: &str = "/v1/oauth2/token";

async fn mock_token(server: &MockServer) {
	server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"A21AA-payments\",\"expires_in\":32400}");
		})
		.await;
}

#[tokio::test]
async fn authorization_capture_void_and_refund() {
	let server = MockServer::start_async().await;

	mock_token(&server).await;

	let capture_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/v2/payments/authorizations/0VF52814937998046/capture");
			then.status(201).header("content-type", "application/json").body(
				r#"{"id":"2GG279541U471931P","status":"COMPLETED","amount":{"currency_code":"USD","value":"10.99"},"final_capture":true}"#,
			);
		})
		.await;
	let void_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/v2/payments/authorizations/0VF52814937998046/void");
			then.status(204);
		})
		.await;
	let refund_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/v2/payments/captures/2GG279541U471931P/refund")
				.body_includes("\"value\":\"5.00\"");
			then.status(201)
				.header("content-type", "application/json")
				.body(r#"{"id":"1JU08902781691411","status":"COMPLETED","amount":{"currency_code":"USD","value":"5.00"}}"#);
		})
		.await;
	let (client, _cache) = build_reqwest_test_client(&server.base_url());
	let payments = PaymentsEndpoint::new(client);
	let capture = payments
		.capture_authorization("0VF52814937998046")
		.await
		.expect("Authorization capture should succeed.");

	assert_eq!(capture.id, "2GG279541U471931P");
	assert_eq!(capture.status, CaptureStatus::Completed);
	assert_eq!(capture.final_capture, Some(true));

	payments.void_authorization("0VF52814937998046").await.expect("Void should accept 204.");

	let refund = payments
		.refund(
			"2GG279541U471931P",
			Some(Money::new("USD", "5.00").expect("Money fixture should be valid.")),
		)
		.await
		.expect("Refund should succeed.");

	assert_eq!(refund.id, "1JU08902781691411");
	assert_eq!(refund.status, RefundStatus::Completed);

	capture_mock.assert_async().await;
	void_mock.assert_async().await;
	refund_mock.assert_async().await;
}

#[tokio::test]
async fn unknown_capture_refund_is_not_found() {
	let server = MockServer::start_async().await;

	mock_token(&server).await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/v2/payments/captures/MISSING/refund");
			then.status(404)
				.header("content-type", "application/json")
				.body(r#"{"name":"RESOURCE_NOT_FOUND","message":"The specified resource does not exist."}"#);
		})
		.await;

	let (client, _cache) = build_reqwest_test_client(&server.base_url());
	let err = PaymentsEndpoint::new(client)
		.refund("MISSING", None)
		.await
		.expect_err("Unknown capture should fail.");

	assert!(matches!(err, Error::NotFound { resource: "capture", ref id } if id == "MISSING"));
}

#[tokio::test]
async fn signup_link_returns_action_url() {
	let server = MockServer::start_async().await;

	mock_token(&server).await;

	let referral_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/v2/customer/partner-referrals")
				.body_includes("\"tracking_id\":\"seller-42\"")
				.body_includes("\"EXPRESS_CHECKOUT\"");
			then.status(201).header("content-type", "application/json").body(
				r#"{"links":[
					{"href":"https://api-m.paypal.com/v1/customer/partner-referrals/ZjcyODU4ZWYtYTA1OC00ODIwLTk2M2EtOTZkZWQ4NmQwYzI3","rel":"self","method":"GET"},
					{"href":"https://www.paypal.com/merchantsignup/partner/onboardingentry?token=ZjcyODU4ZWYtYTA1OC00ODIw","rel":"action_url","method":"GET"}
				]}"#,
			);
		})
		.await;
	let (client, _cache) = build_reqwest_test_client(&server.base_url());
	let referrals = PartnerReferrals::new(client);
	let data = PartnerReferralsData { tracking_id: Some("seller-42".into()), ..Default::default() };
	let link = referrals.signup_link(&data).await.expect("Signup link should be returned.");

	assert_eq!(
		link,
		"https://www.paypal.com/merchantsignup/partner/onboardingentry?token=ZjcyODU4ZWYtYTA1OC00ODIw"
	);

	referral_mock.assert_async().await;
}

#[tokio::test]
async fn signup_link_requires_created_status_and_action_url() {
	let server = MockServer::start_async().await;

	mock_token(&server).await;

	let mut mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/v2/customer/partner-referrals");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"links":[{"href":"https://example.com","rel":"action_url"}]}"#);
		})
		.await;
	let (client, _cache) = build_reqwest_test_client(&server.base_url());
	let referrals = PartnerReferrals::new(client);
	let err = referrals
		.signup_link(&PartnerReferralsData::default())
		.await
		.expect_err("Only 201 should be accepted.");

	assert!(matches!(err, Error::Api(ref api) if api.status == 200));

	mock.delete_async().await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/v2/customer/partner-referrals");
			then.status(201)
				.header("content-type", "application/json")
				.body(r#"{"links":[{"href":"https://example.com/self","rel":"self"}]}"#);
		})
		.await;

	let err = referrals
		.signup_link(&PartnerReferralsData::default())
		.await
		.expect_err("Missing action_url should fail.");

	assert!(matches!(
		err,
		Error::Validation(ValidationError::MissingLink { rel: "action_url" })
	));
}
