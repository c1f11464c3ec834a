//! Postgres-backed stores (feature `postgres`).
//!
//! Runtime queries over a sqlx pool; rows are mapped by hand so the crate
//! builds without a live database. Transitions are single conditional
//! UPDATEs (id + current status in the WHERE clause), the same
//! compare-and-swap the in-memory store performs under its write lock.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use loanflow_core::{ApplicationId, ApplicationStatus, Role, UserId};

use crate::application_store::{
    ActorStamp, ApplicationStore, DashboardStats, StatusFilter, TransitionOutcome,
    TransitionUpdate,
};
use crate::error::StoreError;
use crate::records::{ApplicationRecord, UserRecord};
use crate::user_store::UserStore;

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::backend(err.to_string())
}

/// Create tables and indexes if they do not exist yet.
pub async fn init_schema(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(backend)?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS applications (
            id UUID PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            phone TEXT NOT NULL,
            amount DOUBLE PRECISION NOT NULL,
            purpose TEXT NOT NULL,
            tenure_months BIGINT NOT NULL,
            monthly_income DOUBLE PRECISION NOT NULL,
            employment_type TEXT NOT NULL,
            pan TEXT,
            aadhar TEXT,
            status TEXT NOT NULL,
            verified_by UUID,
            verified_at TIMESTAMPTZ,
            admin_action_by UUID,
            admin_action_at TIMESTAMPTZ,
            rejection_reason TEXT,
            submitted_by TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(backend)?;

    sqlx::query("CREATE INDEX IF NOT EXISTS applications_status_idx ON applications (status)")
        .execute(pool)
        .await
        .map_err(backend)?;

    Ok(())
}

fn row_to_user(row: &PgRow) -> Result<UserRecord, StoreError> {
    let role: String = row.try_get("role").map_err(backend)?;
    Ok(UserRecord {
        id: UserId::from_uuid(row.try_get::<Uuid, _>("id").map_err(backend)?),
        name: row.try_get("name").map_err(backend)?,
        email: row.try_get("email").map_err(backend)?,
        password_hash: row.try_get("password_hash").map_err(backend)?,
        role: role.parse::<Role>().map_err(StoreError::backend)?,
        created_at: row.try_get("created_at").map_err(backend)?,
        updated_at: row.try_get("updated_at").map_err(backend)?,
    })
}

fn row_to_application(row: &PgRow) -> Result<ApplicationRecord, StoreError> {
    let status: String = row.try_get("status").map_err(backend)?;
    Ok(ApplicationRecord {
        id: ApplicationId::from_uuid(row.try_get::<Uuid, _>("id").map_err(backend)?),
        name: row.try_get("name").map_err(backend)?,
        email: row.try_get("email").map_err(backend)?,
        phone: row.try_get("phone").map_err(backend)?,
        amount: row.try_get("amount").map_err(backend)?,
        purpose: row.try_get("purpose").map_err(backend)?,
        tenure_months: row.try_get("tenure_months").map_err(backend)?,
        monthly_income: row.try_get("monthly_income").map_err(backend)?,
        employment_type: row.try_get("employment_type").map_err(backend)?,
        pan: row.try_get("pan").map_err(backend)?,
        aadhar: row.try_get("aadhar").map_err(backend)?,
        status: status.parse::<ApplicationStatus>().map_err(StoreError::backend)?,
        verified_by: row
            .try_get::<Option<Uuid>, _>("verified_by")
            .map_err(backend)?
            .map(UserId::from_uuid),
        verified_at: row.try_get("verified_at").map_err(backend)?,
        admin_action_by: row
            .try_get::<Option<Uuid>, _>("admin_action_by")
            .map_err(backend)?
            .map(UserId::from_uuid),
        admin_action_at: row.try_get("admin_action_at").map_err(backend)?,
        rejection_reason: row.try_get("rejection_reason").map_err(backend)?,
        submitted_by: row.try_get("submitted_by").map_err(backend)?,
        created_at: row.try_get("created_at").map_err(backend)?,
        updated_at: row.try_get("updated_at").map_err(backend)?,
    })
}

/// Postgres-backed user store.
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: UserRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(*user.id.as_uuid())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query("SELECT * FROM users WHERE id = $1")
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        row.as_ref().map(row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        row.as_ref().map(row_to_user).transpose()
    }

    async fn list(&self) -> Result<Vec<UserRecord>, StoreError> {
        let rows = sqlx::query("SELECT * FROM users ORDER BY created_at ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        rows.iter().map(row_to_user).collect()
    }

    async fn delete(&self, id: UserId) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query("DELETE FROM users WHERE id = $1 RETURNING *")
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        row.as_ref().map(row_to_user).transpose()
    }
}

/// Postgres-backed application store.
pub struct PgApplicationStore {
    pool: PgPool,
}

impl PgApplicationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationStore for PgApplicationStore {
    async fn insert(&self, application: ApplicationRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO applications (
                id, name, email, phone, amount, purpose, tenure_months,
                monthly_income, employment_type, pan, aadhar, status,
                verified_by, verified_at, admin_action_by, admin_action_at,
                rejection_reason, submitted_by, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                    $13, $14, $15, $16, $17, $18, $19, $20)
            "#,
        )
        .bind(*application.id.as_uuid())
        .bind(&application.name)
        .bind(&application.email)
        .bind(&application.phone)
        .bind(application.amount)
        .bind(&application.purpose)
        .bind(application.tenure_months)
        .bind(application.monthly_income)
        .bind(&application.employment_type)
        .bind(&application.pan)
        .bind(&application.aadhar)
        .bind(application.status.as_str())
        .bind(application.verified_by.map(|u| *u.as_uuid()))
        .bind(application.verified_at)
        .bind(application.admin_action_by.map(|u| *u.as_uuid()))
        .bind(application.admin_action_at)
        .bind(&application.rejection_reason)
        .bind(&application.submitted_by)
        .bind(application.created_at)
        .bind(application.updated_at)
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: ApplicationId,
    ) -> Result<Option<ApplicationRecord>, StoreError> {
        let row = sqlx::query("SELECT * FROM applications WHERE id = $1")
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        row.as_ref().map(row_to_application).transpose()
    }

    async fn list(&self, filter: StatusFilter) -> Result<Vec<ApplicationRecord>, StoreError> {
        let rows = match filter {
            StatusFilter::All => {
                sqlx::query("SELECT * FROM applications ORDER BY created_at DESC")
                    .fetch_all(&self.pool)
                    .await
            }
            StatusFilter::Only(status) => {
                sqlx::query(
                    "SELECT * FROM applications WHERE status = $1 ORDER BY created_at DESC",
                )
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(backend)?;
        rows.iter().map(row_to_application).collect()
    }

    async fn apply_transition(
        &self,
        id: ApplicationId,
        expected: ApplicationStatus,
        update: TransitionUpdate,
        now: DateTime<Utc>,
    ) -> Result<TransitionOutcome, StoreError> {
        let sql = match update.stamp {
            ActorStamp::Verifier => {
                r#"
                UPDATE applications
                SET status = $3,
                    verified_by = $4,
                    verified_at = $5,
                    rejection_reason = COALESCE($6, rejection_reason),
                    updated_at = $5
                WHERE id = $1 AND status = $2
                RETURNING *
                "#
            }
            ActorStamp::Admin => {
                r#"
                UPDATE applications
                SET status = $3,
                    admin_action_by = $4,
                    admin_action_at = $5,
                    rejection_reason = COALESCE($6, rejection_reason),
                    updated_at = $5
                WHERE id = $1 AND status = $2
                RETURNING *
                "#
            }
        };

        let row = sqlx::query(sql)
            .bind(*id.as_uuid())
            .bind(expected.as_str())
            .bind(update.status.as_str())
            .bind(*update.actor.as_uuid())
            .bind(now)
            .bind(&update.rejection_reason)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        if let Some(row) = row {
            return Ok(TransitionOutcome::Applied(row_to_application(&row)?));
        }

        // The conditional update matched nothing; find out which
        // precondition failed.
        let current = sqlx::query("SELECT status FROM applications WHERE id = $1")
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        match current {
            None => Ok(TransitionOutcome::NotFound),
            Some(row) => {
                let status: String = row.try_get("status").map_err(backend)?;
                Ok(TransitionOutcome::PreconditionFailed(
                    status.parse::<ApplicationStatus>().map_err(StoreError::backend)?,
                ))
            }
        }
    }

    async fn set_status(
        &self,
        id: ApplicationId,
        status: ApplicationStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<ApplicationRecord>, StoreError> {
        let row = sqlx::query(
            "UPDATE applications SET status = $2, updated_at = $3 WHERE id = $1 RETURNING *",
        )
        .bind(*id.as_uuid())
        .bind(status.as_str())
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;
        row.as_ref().map(row_to_application).transpose()
    }

    async fn stats(&self) -> Result<DashboardStats, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = 'pending') AS pending,
                COUNT(*) FILTER (WHERE status = 'verified') AS verified,
                COUNT(*) FILTER (WHERE status = 'approved') AS approved,
                COUNT(*) FILTER (WHERE status = 'rejected') AS rejected,
                COALESCE(SUM(amount), 0) AS total_amount,
                COALESCE(SUM(amount) FILTER (WHERE status = 'approved'), 0) AS approved_amount
            FROM applications
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(backend)?;

        let total: i64 = row.try_get("total").map_err(backend)?;
        let total_amount: f64 = row.try_get("total_amount").map_err(backend)?;

        Ok(DashboardStats {
            total_applications: total as u64,
            pending_applications: row.try_get::<i64, _>("pending").map_err(backend)? as u64,
            verified_applications: row.try_get::<i64, _>("verified").map_err(backend)? as u64,
            approved_applications: row.try_get::<i64, _>("approved").map_err(backend)? as u64,
            rejected_applications: row.try_get::<i64, _>("rejected").map_err(backend)? as u64,
            total_loan_amount: total_amount,
            approved_loan_amount: row.try_get("approved_amount").map_err(backend)?,
            average_loan_amount: if total > 0 {
                total_amount / total as f64
            } else {
                0.0
            },
        })
    }
}
