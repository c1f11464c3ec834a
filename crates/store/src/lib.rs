//! `loanflow-store` — persistence boundary.
//!
//! Object-safe async store traits with an in-memory implementation for
//! tests/dev and a feature-gated Postgres implementation for deployments.
//! The store exclusively owns record persistence; services mutate through
//! the transition operations, never via arbitrary field writes.

pub mod application_store;
pub mod error;
pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod records;
pub mod user_store;

pub use application_store::{
    ActorStamp, ApplicationStore, DashboardStats, StatusFilter, TransitionOutcome,
    TransitionUpdate,
};
pub use error::StoreError;
pub use in_memory::{InMemoryApplicationStore, InMemoryUserStore};
pub use records::{ApplicationRecord, UserRecord};
pub use user_store::UserStore;
