//! User record store.

use async_trait::async_trait;

use loanflow_core::UserId;

use crate::error::StoreError;
use crate::records::UserRecord;

/// Persistence seam for user accounts.
///
/// Callers pass emails already lowercased; lookups are exact-match against
/// the normalized column.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: UserRecord) -> Result<(), StoreError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    /// All users, oldest first.
    async fn list(&self) -> Result<Vec<UserRecord>, StoreError>;

    /// Delete and return the record, or `None` if the id is unknown.
    async fn delete(&self, id: UserId) -> Result<Option<UserRecord>, StoreError>;
}
