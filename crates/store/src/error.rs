//! Store error model.

use thiserror::Error;

/// Failure inside a store backend.
///
/// "Record missing" is not an error here; traits express it through their
/// return types so the service layer owns the NotFound decision.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}
