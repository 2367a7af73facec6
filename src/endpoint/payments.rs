//! Payments API: capture or void authorizations and refund captures.

// self
use crate::{
	_prelude::*,
	api::{ApiClient, ApiRequest},
	http::HttpTransport,
	obs::{self, OperationKind},
	order::{Capture, Money, Refund},
};

const AUTHORIZATIONS_PATH: &str = "v2/payments/authorizations";
const CAPTURES_PATH: &str = "v2/payments/captures";

/// Client for `/v2/payments`.
#[derive(Clone, Debug)]
pub struct PaymentsEndpoint<C>
where
	C: ?Sized + HttpTransport,
{
	api: ApiClient<C>,
}
impl<C> PaymentsEndpoint<C>
where
	C: ?Sized + HttpTransport,
{
	/// Creates the endpoint.
	pub fn new(api: ApiClient<C>) -> Self {
		Self { api }
	}

	/// Captures the full amount of an authorization.
	pub async fn capture_authorization(&self, authorization_id: &str) -> Result<Capture> {
		let request = ApiRequest::post(AUTHORIZATIONS_PATH)
			.segment(authorization_id)
			.segment("capture")
			.resource("authorization", authorization_id);

		obs::observe(OperationKind::CaptureAuthorization, "capture", async move {
			let capture = self.api.send_json::<Capture>(request).await?;

			tracing::info!(
				authorization = authorization_id,
				capture = %capture.id,
				status = %capture.status,
				"Captured authorization."
			);

			Ok(capture)
		})
		.await
	}

	/// Voids an authorization. The API answers `204 No Content`.
	pub async fn void_authorization(&self, authorization_id: &str) -> Result<()> {
		let request = ApiRequest::post(AUTHORIZATIONS_PATH)
			.segment(authorization_id)
			.segment("void")
			.resource("authorization", authorization_id);

		obs::observe(OperationKind::VoidAuthorization, "void", async move {
			self.api.send(request).await?;

			tracing::info!(authorization = authorization_id, "Voided authorization.");

			Ok(())
		})
		.await
	}

	/// Refunds a capture, fully when `amount` is `None`.
	pub async fn refund(&self, capture_id: &str, amount: Option<Money>) -> Result<Refund> {
		let request = ApiRequest::post(CAPTURES_PATH)
			.segment(capture_id)
			.segment("refund")
			.resource("capture", capture_id)
			.json(&RefundRequest { amount })?;

		obs::observe(OperationKind::Refund, "refund", async move {
			let refund = self.api.send_json::<Refund>(request).await?;

			tracing::info!(capture = capture_id, refund = %refund.id, "Refunded capture.");

			Ok(refund)
		})
		.await
	}
}

#[derive(Serialize)]
struct RefundRequest {
	#[serde(skip_serializing_if = "Option::is_none")]
	amount: Option<Money>,
}
