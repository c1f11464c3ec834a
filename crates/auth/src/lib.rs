//! `loanflow-auth` — authentication boundary.
//!
//! Claims, token signing/verification, and password hashing. This crate is
//! intentionally decoupled from HTTP and storage; the API middleware turns a
//! verified token into an [`Actor`] once and passes it down explicitly.

pub mod actor;
pub mod claims;
pub mod password;
pub mod token;

pub use actor::Actor;
pub use claims::{Claims, validate_claims};
pub use password::{hash_password, verify_password, PasswordError};
pub use token::{Hs256TokenCodec, TokenError, TokenVerifier};
