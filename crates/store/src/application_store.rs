//! Application record store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use loanflow_core::{ApplicationId, ApplicationStatus, UserId};

use crate::error::StoreError;
use crate::records::ApplicationRecord;

/// Listing filter derived from the caller's role.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StatusFilter {
    /// Everything, unfiltered (admin `?status=all`).
    All,
    /// Only records in one status.
    Only(ApplicationStatus),
}

/// Which actor-stamp pair a transition writes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ActorStamp {
    Verifier,
    Admin,
}

/// A status transition expressed as one conditional write.
///
/// The stamp kind decides whether `verified_by`/`verified_at` or
/// `admin_action_by`/`admin_action_at` get set; both members of a pair are
/// always written together.
#[derive(Debug, Clone)]
pub struct TransitionUpdate {
    pub status: ApplicationStatus,
    pub actor: UserId,
    pub stamp: ActorStamp,
    pub rejection_reason: Option<String>,
}

/// Outcome of a conditional transition.
#[derive(Debug, Clone)]
pub enum TransitionOutcome {
    Applied(ApplicationRecord),
    /// No record with that id.
    NotFound,
    /// Record exists but its status did not match the precondition.
    PreconditionFailed(ApplicationStatus),
}

/// Dashboard aggregate over all applications.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_applications: u64,
    pub pending_applications: u64,
    pub verified_applications: u64,
    pub approved_applications: u64,
    pub rejected_applications: u64,
    pub total_loan_amount: f64,
    pub approved_loan_amount: f64,
    /// 0 when there are no applications.
    pub average_loan_amount: f64,
}

/// Persistence seam for loan applications.
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    async fn insert(&self, application: ApplicationRecord) -> Result<(), StoreError>;

    async fn find_by_id(&self, id: ApplicationId)
        -> Result<Option<ApplicationRecord>, StoreError>;

    /// Matching records, newest first by creation time.
    async fn list(&self, filter: StatusFilter) -> Result<Vec<ApplicationRecord>, StoreError>;

    /// Apply `update` iff the record exists and its current status equals
    /// `expected`. A single compare-and-swap write, so two racing callers
    /// cannot both transition the same record.
    async fn apply_transition(
        &self,
        id: ApplicationId,
        expected: ApplicationStatus,
        update: TransitionUpdate,
        now: DateTime<Utc>,
    ) -> Result<TransitionOutcome, StoreError>;

    /// Administrative override: write `status` directly, no precondition,
    /// no actor stamps. Returns the updated record, or `None` for an
    /// unknown id.
    async fn set_status(
        &self,
        id: ApplicationId,
        status: ApplicationStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<ApplicationRecord>, StoreError>;

    /// Aggregate counts and loan-amount sums across all applications.
    async fn stats(&self) -> Result<DashboardStats, StoreError>;
}
