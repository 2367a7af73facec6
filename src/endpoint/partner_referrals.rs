//! Partner Referrals API used to obtain the merchant signup link.

// self
use crate::{
	_prelude::*,
	api::{self, ApiClient, ApiRequest},
	error::ValidationError,
	http::HttpTransport,
	obs::{self, OperationKind},
	order::Link,
};

const PARTNER_REFERRALS_PATH: &str = "v2/customer/partner-referrals";
const ACTION_URL: &str = "action_url";

/// Seller data sent when requesting a signup link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartnerReferralsData {
	/// Seller e-mail, when already known.
	pub email: Option<String>,
	/// Partner-side tracking id for the seller.
	pub tracking_id: Option<String>,
	/// URL the seller returns to after signup.
	pub return_url: Option<Url>,
	/// Products requested for the seller.
	pub products: Vec<String>,
	/// Features the partner may use on the seller's behalf.
	pub features: Vec<String>,
}
impl PartnerReferralsData {
	/// Request payload in the API's shape.
	pub fn payload(&self) -> serde_json::Value {
		let mut payload = serde_json::json!({
			"products": self.products,
			"legal_consents": [{"type": "SHARE_DATA_CONSENT", "granted": true}],
			"operations": [{
				"operation": "API_INTEGRATION",
				"api_integration_preference": {
					"rest_api_integration": {
						"integration_method": "PAYPAL",
						"integration_type": "THIRD_PARTY",
						"third_party_details": {"features": self.features},
					},
				},
			}],
		});

		if let Some(email) = &self.email {
			payload["email"] = email.as_str().into();
		}
		if let Some(tracking_id) = &self.tracking_id {
			payload["tracking_id"] = tracking_id.as_str().into();
		}
		if let Some(return_url) = &self.return_url {
			payload["partner_config_override"] = serde_json::json!({
				"return_url": return_url.as_str(),
				"return_url_description": "the url to return the merchant after the paypal onboarding process.",
			});
		}

		payload
	}
}
impl Default for PartnerReferralsData {
	fn default() -> Self {
		Self {
			email: None,
			tracking_id: None,
			return_url: None,
			products: vec!["EXPRESS_CHECKOUT".into()],
			features: ["PAYMENT", "REFUND", "PARTNER_FEE", "ACCESS_MERCHANT_INFORMATION"]
				.into_iter()
				.map(Into::into)
				.collect(),
		}
	}
}

/// Client for `/v2/customer/partner-referrals`.
#[derive(Clone, Debug)]
pub struct PartnerReferrals<C>
where
	C: ?Sized + HttpTransport,
{
	api: ApiClient<C>,
}
impl<C> PartnerReferrals<C>
where
	C: ?Sized + HttpTransport,
{
	/// Creates the endpoint.
	pub fn new(api: ApiClient<C>) -> Self {
		Self { api }
	}

	/// Creates a referral and returns its `action_url` signup link.
	///
	/// Only `201 Created` is accepted; any other status surfaces as an API error.
	pub async fn signup_link(&self, data: &PartnerReferralsData) -> Result<String> {
		let request = ApiRequest::post(PARTNER_REFERRALS_PATH).json(&data.payload())?;

		obs::observe(OperationKind::SignupLink, "signup_link", async move {
			let response = self.api.send(request).await?;

			if response.status != 201 {
				tracing::warn!(status = response.status, "Could not create referral.");

				return Err(api::api_error(&response).into());
			}

			let mut de = serde_json::Deserializer::from_slice(&response.body);
			let referral = serde_path_to_error::deserialize::<_, Referral>(&mut de)
				.map_err(|e| ValidationError::malformed(response.status, e))?;

			match Link::find(&referral.links, ACTION_URL) {
				Some(href) => Ok(href.to_owned()),
				None => {
					tracing::warn!("Action URL not found in referral response.");

					Err(ValidationError::MissingLink { rel: ACTION_URL }.into())
				},
			}
		})
		.await
	}
}

#[derive(Deserialize)]
struct Referral {
	#[serde(default)]
	links: Vec<Link>,
}
