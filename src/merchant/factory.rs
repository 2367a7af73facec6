//! Builders that turn storefront records into API payloads.

// self
use crate::{
	_prelude::*,
	auth::CustomerId,
	error::ValidationError,
	merchant::MerchantOrder,
	order::{Amount, AmountBreakdown, Item, Money, Payer, PurchaseUnit},
	store::StoreFuture,
};

/// Builds the purchase unit billed for a merchant order.
pub trait PurchaseUnitFactory
where
	Self: Send + Sync,
{
	/// Converts `order` into a purchase unit.
	fn from_merchant_order(&self, order: &MerchantOrder) -> Result<PurchaseUnit, ValidationError>;
}

/// Resolves the payer attached to orders placed by a customer.
pub trait PayerFactory
where
	Self: Send + Sync,
{
	/// Returns the payer for `customer`, or `None` when nothing is known about them.
	fn from_customer<'a>(&'a self, customer: &'a CustomerId) -> StoreFuture<'a, Option<Payer>>;
}

/// Purchase unit factory that bills every line item plus shipping and tax, minus discount.
///
/// The order total must equal that breakdown to the minor unit of its currency, otherwise the
/// Orders API would reject the payload.
#[derive(Clone, Debug, Default)]
pub struct DefaultPurchaseUnitFactory {
	/// Prefix prepended to the merchant order id to form the invoice id.
	pub invoice_prefix: String,
}
impl DefaultPurchaseUnitFactory {
	/// Creates a factory with the provided invoice prefix.
	pub fn with_invoice_prefix(prefix: impl Into<String>) -> Self {
		Self { invoice_prefix: prefix.into() }
	}
}
impl PurchaseUnitFactory for DefaultPurchaseUnitFactory {
	fn from_merchant_order(&self, order: &MerchantOrder) -> Result<PurchaseUnit, ValidationError> {
		if order.items.is_empty() {
			return Err(ValidationError::EmptyMerchantOrder { merchant_order: order.id.clone() });
		}

		let currency = order.currency.as_str();
		let precision = minor_digits(currency);
		let money = |minor| Money::new(currency, format_minor(minor, precision));
		let mut item_total = 0_u64;
		let mut items = Vec::with_capacity(order.items.len());

		for item in &order.items {
			let unit_price = to_minor(&item.unit_price, precision)?;

			item_total = unit_price
				.checked_mul(u64::from(item.quantity))
				.and_then(|line| item_total.checked_add(line))
				.ok_or_else(|| ValidationError::InvalidAmount { value: item.unit_price.clone() })?;
			items.push(Item {
				name: item.name.clone(),
				quantity: item.quantity.to_string(),
				unit_amount: money(unit_price)?,
				sku: item.sku.clone(),
			});
		}

		let shipping = optional_minor(order.shipping_total.as_deref(), precision)?;
		let tax = optional_minor(order.tax_total.as_deref(), precision)?;
		let discount = optional_minor(order.discount_total.as_deref(), precision)?;
		let total = to_minor(&order.total, precision)?;
		let breakdown_total = item_total
			.checked_add(shipping.unwrap_or_default())
			.and_then(|sum| sum.checked_add(tax.unwrap_or_default()))
			.and_then(|sum| sum.checked_sub(discount.unwrap_or_default()));

		if breakdown_total != Some(total) {
			return Err(ValidationError::AmountMismatch {
				merchant_order: order.id.clone(),
				total: order.total.clone(),
			});
		}

		let breakdown = AmountBreakdown {
			item_total: Some(money(item_total)?),
			shipping: shipping.map(money).transpose()?,
			tax_total: tax.map(money).transpose()?,
			discount: discount.map(money).transpose()?,
		};
		let mut unit = PurchaseUnit::new(
			Amount::new(currency, format_minor(total, precision))?.with_breakdown(breakdown),
		);

		unit.reference_id = Some("default".into());
		unit.custom_id = Some(order.id.to_string());
		unit.invoice_id = Some(format!("{}{}", self.invoice_prefix, order.id));
		unit.items = items;

		Ok(unit)
	}
}

/// In-memory payer directory keyed by customer.
#[derive(Clone, Debug, Default)]
pub struct MemoryCustomerDirectory(Arc<RwLock<HashMap<CustomerId, Payer>>>);
impl MemoryCustomerDirectory {
	/// Registers the payer details of `customer`.
	pub fn insert(&self, customer: CustomerId, payer: Payer) {
		self.0.write().insert(customer, payer);
	}
}
impl PayerFactory for MemoryCustomerDirectory {
	fn from_customer<'a>(&'a self, customer: &'a CustomerId) -> StoreFuture<'a, Option<Payer>> {
		let payer = self.0.read().get(customer).cloned();

		Box::pin(async move { Ok(payer) })
	}
}

/// Currencies the Orders API accepts without decimals.
const ZERO_DECIMAL_CURRENCIES: [&str; 3] = ["HUF", "JPY", "TWD"];

fn minor_digits(currency: &str) -> u32 {
	let zero_decimal = ZERO_DECIMAL_CURRENCIES.iter().any(|code| code.eq_ignore_ascii_case(currency));

	if zero_decimal { 0 } else { 2 }
}

fn to_minor(value: &str, precision: u32) -> Result<u64, ValidationError> {
	let invalid = || ValidationError::InvalidAmount { value: value.to_owned() };
	let (whole, fraction) = value.split_once('.').unwrap_or((value, ""));

	if whole.is_empty()
		|| !whole.bytes().all(|b| b.is_ascii_digit())
		|| !fraction.bytes().all(|b| b.is_ascii_digit())
	{
		return Err(invalid());
	}

	// Trailing zeros beyond the currency precision are harmless ("1000.00" yen).
	let fraction = fraction.trim_end_matches('0');
	let fraction_len = u32::try_from(fraction.len()).map_err(|_| invalid())?;

	if fraction_len > precision {
		return Err(invalid());
	}

	let scale = 10_u64.pow(precision);
	let whole = whole.parse::<u64>().map_err(|_| invalid())?;
	let fraction = if fraction.is_empty() {
		0
	} else {
		fraction.parse::<u64>().map_err(|_| invalid())? * 10_u64.pow(precision - fraction_len)
	};

	whole.checked_mul(scale).and_then(|minor| minor.checked_add(fraction)).ok_or_else(invalid)
}

fn optional_minor(value: Option<&str>, precision: u32) -> Result<Option<u64>, ValidationError> {
	value.map(|value| to_minor(value, precision)).transpose()
}

fn format_minor(minor: u64, precision: u32) -> String {
	if precision == 0 {
		return minor.to_string();
	}

	let scale = 10_u64.pow(precision);
	let width = precision as usize;

	format!("{}.{:0width$}", minor / scale, minor % scale)
}
