//! Strongly typed identifiers for storefront-owned records (customers, merchant orders,
//! vaulted payment tokens).

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal, $accepts:path, numeric) => {
		def_id! { $name, $doc, $kind, $accepts }

		impl From<u64> for $name {
			fn from(value: u64) -> Self {
				let id = value.to_string();

				debug_assert!(validate_view($kind, &id, $accepts).is_ok());

				Self(id)
			}
		}
	};
	($name:ident, $doc:literal, $kind:literal, $accepts:path) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Creates a new identifier after validation.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				let view = value.as_ref();

				validate_view($kind, view, $accepts)?;

				Ok(Self(view.to_owned()))
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				validate_view($kind, &value, $accepts)?;

				Ok(Self(value))
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
	};
}

const IDENTIFIER_MAX_LEN: usize = 64;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier (customer, merchant order, payment token).
		kind: &'static str,
	},
	/// The identifier contains a character its kind does not allow.
	#[error("{kind} identifier contains the disallowed character {found:?}.")]
	InvalidCharacter {
		/// Kind of identifier (customer, merchant order, payment token).
		kind: &'static str,
		/// First offending character.
		found: char,
	},
	/// The identifier exceeded the allowed character count.
	#[error("{kind} identifier exceeds {max} characters.")]
	TooLong {
		/// Kind of identifier (customer, merchant order, payment token).
		kind: &'static str,
		/// Maximum permitted character count.
		max: usize,
	},
}

def_id! { CustomerId, "Storefront customer identifier.", "Customer", storefront_char, numeric }
def_id! {
	MerchantOrderId,
	"Storefront (merchant) order identifier.",
	"MerchantOrder",
	storefront_char,
	numeric
}
def_id! {
	PaymentTokenId,
	"Identifier of a payment method vaulted with the processor.",
	"PaymentToken",
	vault_char
}

/// Storefront ids are free-form apart from whitespace and control characters.
fn storefront_char(c: char) -> bool {
	!c.is_whitespace() && !c.is_control()
}

/// Vault token ids are opaque ASCII tokens minted by the processor.
fn vault_char(c: char) -> bool {
	c.is_ascii_alphanumeric() || matches!(c, '-' | '_')
}

fn validate_view(
	kind: &'static str,
	view: &str,
	accepts: fn(char) -> bool,
) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if let Some(found) = view.chars().find(|&c| !accepts(c)) {
		return Err(IdentifierError::InvalidCharacter { kind, found });
	}
	if view.len() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}
