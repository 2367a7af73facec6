//! Bearer token values minted by the client-credential exchange.

// self
use crate::{_prelude::*, auth::token::secret::Secret};

/// Lifecycle status for a bearer token at a given instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenStatus {
	/// Token is usable.
	Active,
	/// Token reached its expiry instant and must not be reused.
	Expired,
}

/// Short-lived OAuth2 access token plus its validity window.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BearerToken {
	/// Access token value; callers must avoid logging it.
	pub value: Secret,
	/// Instant the token was minted.
	pub issued_at: OffsetDateTime,
	/// Instant at which the token stops being usable.
	pub expires_at: OffsetDateTime,
}
impl BearerToken {
	/// Creates a token valid for `ttl` starting at `issued_at`.
	pub fn new(value: impl Into<String>, issued_at: OffsetDateTime, ttl: Duration) -> Self {
		Self { value: Secret::new(value), issued_at, expires_at: issued_at + ttl }
	}

	/// Creates a token minted now and valid for `ttl`.
	pub fn issued_now(value: impl Into<String>, ttl: Duration) -> Self {
		Self::new(value, OffsetDateTime::now_utc(), ttl)
	}

	/// Returns the access token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		self.value.expose()
	}

	/// Total lifetime granted by the token endpoint.
	pub fn ttl(&self) -> Duration {
		self.expires_at - self.issued_at
	}

	/// Computes the lifecycle status at a given instant.
	///
	/// A token is expired at exactly `expires_at`.
	pub fn status_at(&self, instant: OffsetDateTime) -> TokenStatus {
		if instant >= self.expires_at { TokenStatus::Expired } else { TokenStatus::Active }
	}

	/// Returns `true` if the token has expired at the provided instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		matches!(self.status_at(instant), TokenStatus::Expired)
	}

	/// Returns `true` if the token is expired relative to the current clock.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}

	/// Formats the `Authorization` header value.
	pub fn authorization_header(&self) -> String {
		format!("Bearer {}", self.expose())
	}
}
impl Debug for BearerToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("BearerToken")
			.field("value", &"<redacted>")
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn token_expires_exactly_at_deadline() {
		let issued = macros::datetime!(2025-01-01 00:00 UTC);
		let token = BearerToken::new("A21AA-token", issued, Duration::seconds(32_400));

		assert_eq!(token.expires_at, macros::datetime!(2025-01-01 09:00 UTC));
		assert_eq!(token.ttl(), Duration::seconds(32_400));
		assert_eq!(
			token.status_at(macros::datetime!(2025-01-01 08:59:59 UTC)),
			TokenStatus::Active
		);
		assert_eq!(token.status_at(macros::datetime!(2025-01-01 09:00 UTC)), TokenStatus::Expired);
	}

	#[test]
	fn debug_output_redacts_value() {
		let token = BearerToken::issued_now("visible?", Duration::minutes(5));
		let rendered = format!("{token:?}");

		assert!(!rendered.contains("visible?"));
		assert_eq!(token.authorization_header(), "Bearer visible?");
		assert!(!token.is_expired());
	}
}
