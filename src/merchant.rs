//! Storefront-owned merchant orders as seen by the payment core.
//!
//! The core never persists merchant orders itself; it reads and writes them through
//! [`MerchantOrderStore`] and derives API payloads through the factories in [`factory`].

pub mod factory;
pub mod store;

pub use factory::*;
pub use store::*;

// self
use crate::{
	_prelude::*,
	auth::{CustomerId, MerchantOrderId},
	error::ValidationError,
	order::Order,
};

/// Metadata key holding the remote order id.
pub const META_ORDER_ID: &str = "_ppcp_paypal_order_id";
/// Metadata key holding the remote order intent.
pub const META_INTENT: &str = "_ppcp_paypal_intent";
/// Metadata key holding the payment mode (`live` or `sandbox`).
pub const META_PAYMENT_MODE: &str = "_ppcp_paypal_payment_mode";
/// Metadata key holding the declared status of a capture that did not complete.
pub const META_CAPTURE_STATUS: &str = "_ppcp_paypal_capture_status";

/// Merchant order status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MerchantOrderStatus {
	/// Awaiting payment.
	#[default]
	Pending,
	/// Paid and awaiting fulfillment.
	Processing,
	/// Payment authorized; awaiting capture.
	OnHold,
	/// Fulfilled.
	Completed,
	/// Payment failed.
	Failed,
	/// Cancelled by the merchant or customer.
	Cancelled,
	/// Refunded.
	Refunded,
}
impl MerchantOrderStatus {
	/// Returns the storefront label.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Pending => "pending",
			Self::Processing => "processing",
			Self::OnHold => "on-hold",
			Self::Completed => "completed",
			Self::Failed => "failed",
			Self::Cancelled => "cancelled",
			Self::Refunded => "refunded",
		}
	}
}
impl Display for MerchantOrderStatus {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Line item of a merchant order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchantOrderItem {
	/// Product name.
	pub name: String,
	/// Quantity ordered.
	pub quantity: u32,
	/// Price per unit as a decimal string.
	pub unit_price: String,
	/// Stock keeping unit.
	#[serde(default)]
	pub sku: Option<String>,
}

/// Merchant order owned by the storefront.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchantOrder {
	/// Merchant order identifier.
	pub id: MerchantOrderId,
	/// Customer who placed the order, when not a guest checkout.
	#[serde(default)]
	pub customer_id: Option<CustomerId>,
	/// Order status.
	#[serde(default)]
	pub status: MerchantOrderStatus,
	/// ISO-4217 currency code.
	pub currency: String,
	/// Line items.
	#[serde(default)]
	pub items: Vec<MerchantOrderItem>,
	/// Shipping total as a decimal string.
	#[serde(default)]
	pub shipping_total: Option<String>,
	/// Tax total as a decimal string.
	#[serde(default)]
	pub tax_total: Option<String>,
	/// Discount granted on the order as a decimal string.
	#[serde(default)]
	pub discount_total: Option<String>,
	/// Order total as a decimal string.
	pub total: String,
	/// Metadata written by payment flows.
	#[serde(default)]
	pub meta: BTreeMap<String, String>,
	/// Processor transaction id (the capture id).
	#[serde(default)]
	pub transaction_id: Option<String>,
	/// Whether payment completed.
	#[serde(default)]
	pub paid: bool,
}
impl MerchantOrder {
	/// Creates a pending order with no items.
	pub fn new(
		id: MerchantOrderId,
		currency: impl Into<String>,
		total: impl Into<String>,
	) -> Self {
		Self {
			id,
			customer_id: None,
			status: MerchantOrderStatus::Pending,
			currency: currency.into(),
			items: Vec::new(),
			shipping_total: None,
			tax_total: None,
			discount_total: None,
			total: total.into(),
			meta: BTreeMap::new(),
			transaction_id: None,
			paid: false,
		}
	}

	/// Attaches the customer.
	pub fn with_customer(mut self, customer_id: CustomerId) -> Self {
		self.customer_id = Some(customer_id);

		self
	}

	/// Appends a line item.
	pub fn with_item(mut self, item: MerchantOrderItem) -> Self {
		self.items.push(item);

		self
	}

	/// Returns a metadata value.
	pub fn meta(&self, key: &str) -> Option<&str> {
		self.meta.get(key).map(String::as_str)
	}

	/// Returns the remote order id recorded by a previous checkout step.
	pub fn remote_order_id(&self) -> Result<&str, ValidationError> {
		self.meta(META_ORDER_ID).ok_or_else(|| ValidationError::MissingMetadata {
			merchant_order: self.id.clone(),
			key: META_ORDER_ID,
		})
	}
}

/// Writes the remote order id, intent, and payment mode onto a merchant order.
pub(crate) async fn record_remote_order(
	store: &dyn MerchantOrderStore,
	id: &MerchantOrderId,
	order: &Order,
	payment_mode: &str,
) -> Result<()> {
	store.set_meta(id, META_ORDER_ID, order.id.clone()).await?;
	store.set_meta(id, META_INTENT, order.intent.to_string()).await?;
	store.set_meta(id, META_PAYMENT_MODE, payment_mode.to_owned()).await?;

	Ok(())
}
