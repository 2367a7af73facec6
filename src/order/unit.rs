//! Purchase units, amounts, and line items.

// self
use crate::{_prelude::*, error::ValidationError, order::Payments};

/// One purchase unit of an order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseUnit {
	/// Merchant-side reference for the unit.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub reference_id: Option<String>,
	/// Total amount for the unit; capture responses may omit it.
	#[serde(default)]
	pub amount: Amount,
	/// Line items.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub items: Vec<Item>,
	/// Merchant invoice identifier.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub invoice_id: Option<String>,
	/// Merchant-defined custom identifier.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub custom_id: Option<String>,
	/// Captures/authorizations attached by the API.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub payments: Option<Payments>,
}
impl PurchaseUnit {
	/// Creates a unit with the provided amount and no items.
	pub fn new(amount: Amount) -> Self {
		Self {
			reference_id: None,
			amount,
			items: Vec::new(),
			invoice_id: None,
			custom_id: None,
			payments: None,
		}
	}
}

/// Currency code + decimal value pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
	/// ISO-4217 currency code.
	pub currency_code: String,
	/// Decimal value as a string (e.g., `"10.00"`).
	pub value: String,
}
impl Money {
	/// Creates a money value after checking that `value` is a non-negative decimal.
	pub fn new(
		currency_code: impl Into<String>,
		value: impl Into<String>,
	) -> Result<Self, ValidationError> {
		let value = value.into();

		validate_decimal(&value)?;

		Ok(Self { currency_code: currency_code.into(), value })
	}
}

/// Amount of a purchase unit, optionally broken down.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
	/// ISO-4217 currency code.
	pub currency_code: String,
	/// Decimal value as a string.
	pub value: String,
	/// Breakdown of the total.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub breakdown: Option<AmountBreakdown>,
}
impl Amount {
	/// Creates an amount after checking that `value` is a non-negative decimal.
	pub fn new(
		currency_code: impl Into<String>,
		value: impl Into<String>,
	) -> Result<Self, ValidationError> {
		let Money { currency_code, value } = Money::new(currency_code, value)?;

		Ok(Self { currency_code, value, breakdown: None })
	}

	/// Attaches a breakdown.
	pub fn with_breakdown(mut self, breakdown: AmountBreakdown) -> Self {
		self.breakdown = Some(breakdown);

		self
	}
}

/// Breakdown of an [`Amount`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountBreakdown {
	/// Sum of item prices.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub item_total: Option<Money>,
	/// Shipping fee.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub shipping: Option<Money>,
	/// Tax total.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tax_total: Option<Money>,
	/// Discount.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub discount: Option<Money>,
}

/// Line item of a purchase unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
	/// Item name.
	pub name: String,
	/// Quantity as a decimal string, per the API.
	pub quantity: String,
	/// Price per unit.
	pub unit_amount: Money,
	/// Stock keeping unit.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sku: Option<String>,
}

fn validate_decimal(value: &str) -> Result<(), ValidationError> {
	let (whole, fraction) = match value.split_once('.') {
		Some((whole, fraction)) => (whole, Some(fraction)),
		None => (value, None),
	};
	let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
	let valid = digits(whole) && fraction.is_none_or(|f| digits(f) && f.len() <= 3);

	if valid { Ok(()) } else { Err(ValidationError::InvalidAmount { value: value.to_owned() }) }
}
