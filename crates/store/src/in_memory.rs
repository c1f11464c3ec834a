//! In-memory stores.
//!
//! Intended for tests/dev. Not optimized for performance.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use loanflow_core::{ApplicationId, ApplicationStatus, UserId};

use crate::application_store::{
    ActorStamp, ApplicationStore, DashboardStats, StatusFilter, TransitionOutcome,
    TransitionUpdate,
};
use crate::error::StoreError;
use crate::records::{ApplicationRecord, UserRecord};
use crate::user_store::UserStore;

fn poisoned() -> StoreError {
    StoreError::backend("lock poisoned")
}

/// In-memory user store keyed by id.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<UserId, UserRecord>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: UserRecord) -> Result<(), StoreError> {
        let mut users = self.users.write().map_err(|_| poisoned())?;
        users.insert(user.id, user);
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>, StoreError> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn list(&self) -> Result<Vec<UserRecord>, StoreError> {
        let users = self.users.read().map_err(|_| poisoned())?;
        let mut all: Vec<_> = users.values().cloned().collect();
        all.sort_by_key(|u| u.created_at);
        Ok(all)
    }

    async fn delete(&self, id: UserId) -> Result<Option<UserRecord>, StoreError> {
        let mut users = self.users.write().map_err(|_| poisoned())?;
        Ok(users.remove(&id))
    }
}

/// In-memory application store keyed by id.
#[derive(Debug, Default)]
pub struct InMemoryApplicationStore {
    applications: RwLock<HashMap<ApplicationId, ApplicationRecord>>,
}

impl InMemoryApplicationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ApplicationStore for InMemoryApplicationStore {
    async fn insert(&self, application: ApplicationRecord) -> Result<(), StoreError> {
        let mut apps = self.applications.write().map_err(|_| poisoned())?;
        apps.insert(application.id, application);
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: ApplicationId,
    ) -> Result<Option<ApplicationRecord>, StoreError> {
        let apps = self.applications.read().map_err(|_| poisoned())?;
        Ok(apps.get(&id).cloned())
    }

    async fn list(&self, filter: StatusFilter) -> Result<Vec<ApplicationRecord>, StoreError> {
        let apps = self.applications.read().map_err(|_| poisoned())?;
        let mut matching: Vec<_> = apps
            .values()
            .filter(|a| match filter {
                StatusFilter::All => true,
                StatusFilter::Only(status) => a.status == status,
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }

    async fn apply_transition(
        &self,
        id: ApplicationId,
        expected: ApplicationStatus,
        update: TransitionUpdate,
        now: DateTime<Utc>,
    ) -> Result<TransitionOutcome, StoreError> {
        // One write-lock section: check and mutation are atomic.
        let mut apps = self.applications.write().map_err(|_| poisoned())?;

        let Some(record) = apps.get_mut(&id) else {
            return Ok(TransitionOutcome::NotFound);
        };

        if record.status != expected {
            return Ok(TransitionOutcome::PreconditionFailed(record.status));
        }

        record.status = update.status;
        match update.stamp {
            ActorStamp::Verifier => {
                record.verified_by = Some(update.actor);
                record.verified_at = Some(now);
            }
            ActorStamp::Admin => {
                record.admin_action_by = Some(update.actor);
                record.admin_action_at = Some(now);
            }
        }
        if let Some(reason) = update.rejection_reason {
            record.rejection_reason = Some(reason);
        }
        record.updated_at = now;

        Ok(TransitionOutcome::Applied(record.clone()))
    }

    async fn set_status(
        &self,
        id: ApplicationId,
        status: ApplicationStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<ApplicationRecord>, StoreError> {
        let mut apps = self.applications.write().map_err(|_| poisoned())?;
        let Some(record) = apps.get_mut(&id) else {
            return Ok(None);
        };
        record.status = status;
        record.updated_at = now;
        Ok(Some(record.clone()))
    }

    async fn stats(&self) -> Result<DashboardStats, StoreError> {
        let apps = self.applications.read().map_err(|_| poisoned())?;

        let mut stats = DashboardStats::default();
        for app in apps.values() {
            stats.total_applications += 1;
            stats.total_loan_amount += app.amount;
            match app.status {
                ApplicationStatus::Pending => stats.pending_applications += 1,
                ApplicationStatus::Verified => stats.verified_applications += 1,
                ApplicationStatus::Approved => {
                    stats.approved_applications += 1;
                    stats.approved_loan_amount += app.amount;
                }
                ApplicationStatus::Rejected => stats.rejected_applications += 1,
            }
        }

        if stats.total_applications > 0 {
            stats.average_loan_amount =
                stats.total_loan_amount / stats.total_applications as f64;
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use loanflow_core::Role;

    use super::*;

    fn user(email: &str) -> UserRecord {
        let now = Utc::now();
        UserRecord {
            id: UserId::new(),
            name: "Test User".to_string(),
            email: email.to_string(),
            password_hash: "$2b$04$hash".to_string(),
            role: Role::Verifier,
            created_at: now,
            updated_at: now,
        }
    }

    fn application(amount: f64, created_at: DateTime<Utc>) -> ApplicationRecord {
        ApplicationRecord {
            id: ApplicationId::new(),
            name: "Asha Rao".to_string(),
            email: "asha@example.com".to_string(),
            phone: "9876543210".to_string(),
            amount,
            purpose: "Home renovation".to_string(),
            tenure_months: 12,
            monthly_income: 20_000.0,
            employment_type: "Salaried".to_string(),
            pan: None,
            aadhar: None,
            status: ApplicationStatus::Pending,
            verified_by: None,
            verified_at: None,
            admin_action_by: None,
            admin_action_at: None,
            rejection_reason: None,
            submitted_by: "127.0.0.1".to_string(),
            created_at,
            updated_at: created_at,
        }
    }

    #[tokio::test]
    async fn find_by_email_matches_exactly() {
        let store = InMemoryUserStore::new();
        store.insert(user("admin@example.com")).await.unwrap();

        assert!(store.find_by_email("admin@example.com").await.unwrap().is_some());
        assert!(store.find_by_email("other@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_returns_removed_record_once() {
        let store = InMemoryUserStore::new();
        let record = user("gone@example.com");
        let id = record.id;
        store.insert(record).await.unwrap();

        assert!(store.delete(id).await.unwrap().is_some());
        assert!(store.delete(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let store = InMemoryApplicationStore::new();
        let now = Utc::now();
        let older = application(10_000.0, now - chrono::Duration::hours(1));
        let newer = application(20_000.0, now);
        store.insert(older.clone()).await.unwrap();
        store.insert(newer.clone()).await.unwrap();

        let listed = store.list(StatusFilter::All).await.unwrap();
        assert_eq!(listed[0].id, newer.id);
        assert_eq!(listed[1].id, older.id);
    }

    #[tokio::test]
    async fn transition_applies_only_from_expected_status() {
        let store = InMemoryApplicationStore::new();
        let record = application(50_000.0, Utc::now());
        let id = record.id;
        store.insert(record).await.unwrap();

        let actor = UserId::new();
        let update = TransitionUpdate {
            status: ApplicationStatus::Verified,
            actor,
            stamp: ActorStamp::Verifier,
            rejection_reason: None,
        };

        let outcome = store
            .apply_transition(id, ApplicationStatus::Pending, update.clone(), Utc::now())
            .await
            .unwrap();
        let TransitionOutcome::Applied(applied) = outcome else {
            panic!("expected transition to apply");
        };
        assert_eq!(applied.status, ApplicationStatus::Verified);
        assert_eq!(applied.verified_by, Some(actor));
        assert!(applied.verified_at.is_some());
        assert!(applied.admin_action_by.is_none());

        // Second attempt loses the compare-and-swap.
        let outcome = store
            .apply_transition(id, ApplicationStatus::Pending, update, Utc::now())
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            TransitionOutcome::PreconditionFailed(ApplicationStatus::Verified)
        ));
    }

    #[tokio::test]
    async fn transition_on_unknown_id_is_not_found() {
        let store = InMemoryApplicationStore::new();
        let outcome = store
            .apply_transition(
                ApplicationId::new(),
                ApplicationStatus::Pending,
                TransitionUpdate {
                    status: ApplicationStatus::Approved,
                    actor: UserId::new(),
                    stamp: ActorStamp::Admin,
                    rejection_reason: None,
                },
                Utc::now(),
            )
            .await
            .unwrap();
        assert!(matches!(outcome, TransitionOutcome::NotFound));
    }

    #[tokio::test]
    async fn set_status_bypasses_precondition_and_stamps() {
        let store = InMemoryApplicationStore::new();
        let record = application(50_000.0, Utc::now());
        let id = record.id;
        store.insert(record).await.unwrap();

        let updated = store
            .set_status(id, ApplicationStatus::Approved, Utc::now())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, ApplicationStatus::Approved);
        assert!(updated.admin_action_by.is_none());
        assert!(updated.verified_by.is_none());
    }

    #[tokio::test]
    async fn stats_on_empty_store_are_all_zero() {
        let store = InMemoryApplicationStore::new();
        let stats = store.stats().await.unwrap();
        assert_eq!(stats, DashboardStats::default());
        assert_eq!(stats.average_loan_amount, 0.0);
    }

    #[tokio::test]
    async fn stats_aggregate_counts_and_sums() {
        let store = InMemoryApplicationStore::new();
        let now = Utc::now();

        let pending = application(10_000.0, now);
        let mut approved = application(30_000.0, now);
        approved.status = ApplicationStatus::Approved;
        let mut rejected = application(20_000.0, now);
        rejected.status = ApplicationStatus::Rejected;

        store.insert(pending).await.unwrap();
        store.insert(approved).await.unwrap();
        store.insert(rejected).await.unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total_applications, 3);
        assert_eq!(stats.pending_applications, 1);
        assert_eq!(stats.approved_applications, 1);
        assert_eq!(stats.rejected_applications, 1);
        assert_eq!(stats.verified_applications, 0);
        assert_eq!(stats.total_loan_amount, 60_000.0);
        assert_eq!(stats.approved_loan_amount, 30_000.0);
        assert_eq!(stats.average_loan_amount, 20_000.0);
    }
}
