//! Order snapshots deserialized from the Orders API.
//!
//! Orders are immutable values; nothing here is persisted locally beyond the merchant-order
//! metadata written by the renewal and checkout flows.

pub mod payment;
pub mod unit;

pub use payment::*;
pub use unit::*;

// self
use crate::_prelude::*;

/// Whether an order captures immediately or only authorizes funds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderIntent {
	/// Funds are captured as part of order completion.
	#[default]
	Capture,
	/// Funds are authorized and captured later.
	Authorize,
}
impl OrderIntent {
	/// Returns the wire label.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Capture => "CAPTURE",
			Self::Authorize => "AUTHORIZE",
		}
	}
}
impl Display for OrderIntent {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for OrderIntent {
	type Err = UnknownIntent;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"CAPTURE" => Ok(Self::Capture),
			"AUTHORIZE" => Ok(Self::Authorize),
			other => Err(UnknownIntent(other.to_owned())),
		}
	}
}

/// Raised when a stored intent label is not recognized.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Unknown order intent `{0}`.")]
pub struct UnknownIntent(pub String);

/// Lifecycle status of an order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
	/// Order was created with the provided data.
	Created,
	/// Order was saved and persisted for later completion.
	Saved,
	/// Payer approved the order.
	Approved,
	/// All purchase units were voided.
	Voided,
	/// Payment was authorized or captured.
	Completed,
	/// Payer must complete an additional action (e.g., 3-D Secure).
	PayerActionRequired,
}

/// Order snapshot returned by the Orders API.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
	/// Remote order identifier.
	pub id: String,
	/// Capture or authorize.
	pub intent: OrderIntent,
	/// Lifecycle status.
	pub status: OrderStatus,
	/// Purchase units in request order.
	#[serde(default)]
	pub purchase_units: Vec<PurchaseUnit>,
	/// Payer details, when known.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub payer: Option<Payer>,
	/// HATEOAS links.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub links: Vec<Link>,
}
impl Order {
	/// Returns the last capture of the first purchase unit that carries captures.
	pub fn latest_capture(&self) -> Option<&Capture> {
		self.purchase_units
			.iter()
			.find_map(|unit| unit.payments.as_ref().and_then(|payments| payments.captures.last()))
	}

	/// Returns the last authorization of the first purchase unit that carries authorizations.
	pub fn latest_authorization(&self) -> Option<&Authorization> {
		self.purchase_units.iter().find_map(|unit| {
			unit.payments.as_ref().and_then(|payments| payments.authorizations.last())
		})
	}

	/// Returns the `href` of the first link with the provided relation.
	pub fn link(&self, rel: &str) -> Option<&str> {
		Link::find(&self.links, rel)
	}
}

/// Payer attached to an order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payer {
	/// Payer e-mail address.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub email_address: Option<String>,
	/// Payer name.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<PayerName>,
	/// Processor-assigned payer identifier.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub payer_id: Option<String>,
}

/// Payer name parts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayerName {
	/// First name.
	#[serde(default)]
	pub given_name: String,
	/// Last name.
	#[serde(default)]
	pub surname: String,
}

/// HATEOAS link returned alongside API resources.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
	/// Target URL.
	pub href: String,
	/// Link relation.
	pub rel: String,
	/// HTTP method, when declared.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub method: Option<String>,
}
impl Link {
	/// Returns the `href` of the first link in `links` with relation `rel`.
	pub fn find<'a>(links: &'a [Link], rel: &str) -> Option<&'a str> {
		links.iter().find(|link| link.rel == rel).map(|link| link.href.as_str())
	}
}
