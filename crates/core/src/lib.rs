//! `loanflow-core` — domain types shared across the workspace.
//!
//! This crate contains **pure domain** primitives (no infrastructure
//! concerns): typed identifiers, the closed role/status enumerations, the
//! domain error taxonomy, and the validation layer.

pub mod error;
pub mod id;
pub mod role;
pub mod status;
pub mod validation;

pub use error::{DomainError, DomainResult};
pub use id::{ApplicationId, UserId};
pub use role::Role;
pub use status::ApplicationStatus;
