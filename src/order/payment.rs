//! Captures, authorizations, and refunds attached to purchase units.

// self
use crate::{
	_prelude::*,
	order::{Link, Money},
};

/// Payments recorded against a purchase unit.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payments {
	/// Captures in creation order.
	#[serde(default)]
	pub captures: Vec<Capture>,
	/// Authorizations in creation order.
	#[serde(default)]
	pub authorizations: Vec<Authorization>,
	/// Refunds in creation order.
	#[serde(default)]
	pub refunds: Vec<Refund>,
}

/// Capture status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaptureStatus {
	/// Funds were captured.
	Completed,
	/// Capture was declined.
	Declined,
	/// Part of the capture was refunded.
	PartiallyRefunded,
	/// Capture is pending.
	Pending,
	/// Capture was fully refunded.
	Refunded,
	/// Capture failed.
	Failed,
}
impl CaptureStatus {
	/// Returns the wire label.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Completed => "COMPLETED",
			Self::Declined => "DECLINED",
			Self::PartiallyRefunded => "PARTIALLY_REFUNDED",
			Self::Pending => "PENDING",
			Self::Refunded => "REFUNDED",
			Self::Failed => "FAILED",
		}
	}
}
impl Display for CaptureStatus {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Capture record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capture {
	/// Capture identifier; used as the merchant order's transaction id.
	pub id: String,
	/// Capture status.
	pub status: CaptureStatus,
	/// Captured amount.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub amount: Option<Money>,
	/// Whether this is the final capture for the authorization.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub final_capture: Option<bool>,
	/// HATEOAS links.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub links: Vec<Link>,
}

/// Authorization status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthorizationStatus {
	/// Funds are authorized but not captured.
	Created,
	/// Authorized funds were captured.
	Captured,
	/// Authorization was denied.
	Denied,
	/// Part of the authorized funds were captured.
	PartiallyCaptured,
	/// Authorization was voided.
	Voided,
	/// Authorization is pending.
	Pending,
	/// Authorization expired.
	Expired,
}

/// Authorization record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorization {
	/// Authorization identifier.
	pub id: String,
	/// Authorization status.
	pub status: AuthorizationStatus,
	/// Authorized amount.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub amount: Option<Money>,
	/// Expiry of the authorization.
	#[serde(
		default,
		with = "time::serde::rfc3339::option",
		skip_serializing_if = "Option::is_none"
	)]
	pub expiration_time: Option<OffsetDateTime>,
	/// HATEOAS links.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub links: Vec<Link>,
}

/// Refund status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefundStatus {
	/// Refund was cancelled.
	Cancelled,
	/// Refund failed.
	Failed,
	/// Refund is pending.
	Pending,
	/// Funds were refunded.
	Completed,
}

/// Refund record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refund {
	/// Refund identifier.
	pub id: String,
	/// Refund status.
	pub status: RefundStatus,
	/// Refunded amount.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub amount: Option<Money>,
}
