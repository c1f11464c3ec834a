//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::Serialize;

use loanflow_core::{ApplicationId, ApplicationStatus, Role, UserId};
use loanflow_store::{ApplicationRecord, UserRecord};

/// Public user fields; never carries the password hash.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<UserRecord> for UserSummary {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserSummary,
}

/// What a public submission gets back: id, status, and nothing else.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub id: ApplicationId,
    pub status: ApplicationStatus,
    pub submitted_at: DateTime<Utc>,
}

/// A workflow actor resolved to name + email for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorRef {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl From<UserRecord> for ActorRef {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

/// An application with its actor ids resolved for display.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationView {
    pub id: ApplicationId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub amount: f64,
    pub purpose: String,
    pub tenure: i64,
    pub monthly_income: f64,
    pub employment_type: String,
    pub pan_card: Option<String>,
    pub aadhar_card: Option<String>,
    pub status: ApplicationStatus,
    pub verified_by: Option<ActorRef>,
    pub verified_at: Option<DateTime<Utc>>,
    pub admin_action_by: Option<ActorRef>,
    pub admin_action_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub submitted_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ApplicationView {
    pub fn new(
        record: ApplicationRecord,
        verified_by: Option<ActorRef>,
        admin_action_by: Option<ActorRef>,
    ) -> Self {
        Self {
            id: record.id,
            name: record.name,
            email: record.email,
            phone: record.phone,
            amount: record.amount,
            purpose: record.purpose,
            tenure: record.tenure_months,
            monthly_income: record.monthly_income,
            employment_type: record.employment_type,
            pan_card: record.pan,
            aadhar_card: record.aadhar,
            status: record.status,
            verified_by,
            verified_at: record.verified_at,
            admin_action_by,
            admin_action_at: record.admin_action_at,
            rejection_reason: record.rejection_reason,
            submitted_by: record.submitted_by,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}
