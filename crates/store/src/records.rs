//! Persisted record shapes.

use chrono::{DateTime, Utc};
use serde::Serialize;

use loanflow_core::{ApplicationId, ApplicationStatus, Role, UserId};

/// A stored user account.
///
/// `email` is normalized to lowercase at write time; uniqueness checks are
/// case-insensitive because of that normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A stored loan application.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    pub id: ApplicationId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub amount: f64,
    pub purpose: String,
    #[serde(rename = "tenure")]
    pub tenure_months: i64,
    pub monthly_income: f64,
    pub employment_type: String,
    #[serde(rename = "panCard")]
    pub pan: Option<String>,
    #[serde(rename = "aadharCard")]
    pub aadhar: Option<String>,
    pub status: ApplicationStatus,
    pub verified_by: Option<UserId>,
    pub verified_at: Option<DateTime<Utc>>,
    pub admin_action_by: Option<UserId>,
    pub admin_action_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    /// Originating address (or "unknown") of the public submission.
    pub submitted_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
