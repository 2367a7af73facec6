//! Typed wrappers over the REST resources used by checkout and renewals.

pub mod orders;
pub mod partner_referrals;
pub mod payments;

pub use orders::*;
pub use partner_referrals::*;
pub use payments::*;
