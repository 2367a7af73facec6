//! Observability helpers shared by endpoints and orchestrators.
//!
//! # Feature Flags
//!
//! - Spans named `paypal_commerce.operation` with `operation` and `stage` fields are always
//!   emitted through `tracing`.
//! - Enable `metrics` to increment the `paypal_commerce_operation_total` counter for every
//!   attempt/success/failure, labeled by `operation` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
	/// Client-credential token mint.
	Bearer,
	/// `POST /v2/checkout/orders`.
	CreateOrder,
	/// `POST /v2/checkout/orders/{id}/capture`.
	CaptureOrder,
	/// `POST /v2/checkout/orders/{id}/authorize`.
	AuthorizeOrder,
	/// `GET /v2/checkout/orders/{id}`.
	GetOrder,
	/// `POST /v2/payments/authorizations/{id}/capture`.
	CaptureAuthorization,
	/// `POST /v2/payments/authorizations/{id}/void`.
	VoidAuthorization,
	/// `POST /v2/payments/captures/{id}/refund`.
	Refund,
	/// `POST /v2/customer/partner-referrals`.
	SignupLink,
	/// Subscription renewal orchestration.
	Renewal,
	/// Checkout-time payment processing.
	ProcessPayment,
}
impl OperationKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationKind::Bearer => "bearer",
			OperationKind::CreateOrder => "create_order",
			OperationKind::CaptureOrder => "capture_order",
			OperationKind::AuthorizeOrder => "authorize_order",
			OperationKind::GetOrder => "get_order",
			OperationKind::CaptureAuthorization => "capture_authorization",
			OperationKind::VoidAuthorization => "void_authorization",
			OperationKind::Refund => "refund",
			OperationKind::SignupLink => "signup_link",
			OperationKind::Renewal => "renewal",
			OperationKind::ProcessPayment => "process_payment",
		}
	}
}
impl Display for OperationKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationOutcome {
	/// Entry to an operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl OperationOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationOutcome::Attempt => "attempt",
			OperationOutcome::Success => "success",
			OperationOutcome::Failure => "failure",
		}
	}
}
impl Display for OperationOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `fut` inside an operation span and records attempt + outcome counters.
pub(crate) async fn observe<T, Fut>(
	kind: OperationKind,
	stage: &'static str,
	fut: Fut,
) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let span = OperationSpan::new(kind, stage);

	record_operation_outcome(kind, OperationOutcome::Attempt);

	let result = span.instrument(fut).await;

	match &result {
		Ok(_) => record_operation_outcome(kind, OperationOutcome::Success),
		Err(_) => record_operation_outcome(kind, OperationOutcome::Failure),
	}

	result
}
