//! Credentials, bearer tokens, storefront identifiers, and the client-credential
//! [`Authenticator`].

pub mod authenticator;
pub mod id;
pub mod token;

pub use authenticator::*;
pub use id::*;
pub use token::{bearer::*, secret::*};
