//! Processor environments with their default API hosts and settings keys.

// self
use crate::_prelude::*;

/// Processor environment the credentials belong to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
	/// Live payments.
	Production,
	/// Sandbox payments.
	#[default]
	Sandbox,
}
impl Environment {
	const PRODUCTION_HOST: &'static str = "https://api-m.paypal.com";
	const SANDBOX_HOST: &'static str = "https://api-m.sandbox.paypal.com";

	/// Returns the default REST API host for the environment.
	pub fn default_host(self) -> Url {
		let raw = match self {
			Self::Production => Self::PRODUCTION_HOST,
			Self::Sandbox => Self::SANDBOX_HOST,
		};

		Url::parse(raw).unwrap_or_else(|_| unreachable!("Static host URLs are valid."))
	}

	/// Payment mode label stored on merchant orders.
	pub const fn payment_mode(self) -> &'static str {
		match self {
			Self::Production => "live",
			Self::Sandbox => "sandbox",
		}
	}

	/// Returns the settings key suffix used for per-environment credentials.
	pub const fn settings_suffix(self) -> &'static str {
		match self {
			Self::Production => "_production",
			Self::Sandbox => "_sandbox",
		}
	}
}
impl Display for Environment {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.payment_mode())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn environments_map_to_hosts_and_labels() {
		assert_eq!(Environment::Production.default_host().as_str(), "https://api-m.paypal.com/");
		assert_eq!(
			Environment::Sandbox.default_host().as_str(),
			"https://api-m.sandbox.paypal.com/"
		);
		assert_eq!(Environment::default(), Environment::Sandbox);
		assert_eq!(Environment::Production.to_string(), "live");
		assert_eq!(Environment::Sandbox.settings_suffix(), "_sandbox");
	}
}
