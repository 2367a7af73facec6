//! Bearer token model and the redacting secret wrapper.

pub mod bearer;
pub mod secret;
