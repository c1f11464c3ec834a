//! Auth, workflow, and user-management services.
//!
//! Handlers stay thin: every operation here takes validated-or-raw input
//! plus the caller's [`Actor`] and returns a `DomainResult`. The HTTP layer
//! only translates the result into an envelope.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{Duration, Utc};

use loanflow_auth::{hash_password, verify_password, Actor, Hs256TokenCodec, TokenVerifier};
use loanflow_core::validation::{self, LoanApplicationInput, LoginInput, NewUserInput};
use loanflow_core::{ApplicationId, ApplicationStatus, DomainError, DomainResult, Role, UserId};
use loanflow_store::{
    ActorStamp, ApplicationRecord, ApplicationStore, DashboardStats, InMemoryApplicationStore,
    InMemoryUserStore, StatusFilter, StoreError, TransitionOutcome, TransitionUpdate, UserRecord,
    UserStore,
};

use crate::app::dto::{ActorRef, ApplicationView, LoginResponse, SubmissionReceipt, UserSummary};

fn store_err(err: StoreError) -> DomainError {
    DomainError::internal(err.to_string())
}

/// Run bcrypt off the async runtime; cost-12 hashing takes long enough to
/// stall a worker thread.
async fn hash_blocking(password: String) -> DomainResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| DomainError::internal(format!("hashing task failed: {e}")))?
        .map_err(|e| DomainError::internal(e.to_string()))
}

async fn verify_blocking(password: String, hash: String) -> DomainResult<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| DomainError::internal(format!("hashing task failed: {e}")))
}

/// Shared service state: store handles, token codec, token lifetime.
pub struct AppServices {
    users: Arc<dyn UserStore>,
    applications: Arc<dyn ApplicationStore>,
    tokens: Arc<Hs256TokenCodec>,
    token_ttl: Duration,
}

impl AppServices {
    pub fn new(
        users: Arc<dyn UserStore>,
        applications: Arc<dyn ApplicationStore>,
        tokens: Hs256TokenCodec,
        token_ttl: Duration,
    ) -> Self {
        Self {
            users,
            applications,
            tokens: Arc::new(tokens),
            token_ttl,
        }
    }

    /// In-memory stores; used by tests/dev and the default binary setup.
    pub fn in_memory(jwt_secret: &[u8], token_ttl: Duration) -> Self {
        Self::new(
            Arc::new(InMemoryUserStore::new()),
            Arc::new(InMemoryApplicationStore::new()),
            Hs256TokenCodec::new(jwt_secret),
            token_ttl,
        )
    }

    /// The verifier handle the access-control middleware uses.
    pub fn token_verifier(&self) -> Arc<dyn TokenVerifier> {
        self.tokens.clone()
    }

    // ---------------------------------------------------------------------
    // Auth
    // ---------------------------------------------------------------------

    /// Register or provision a user. Shared by the public registration
    /// endpoint and the admin add-user endpoint.
    pub async fn create_user(&self, input: NewUserInput) -> DomainResult<UserSummary> {
        let errors = validation::validate_user_input(&input);
        if !errors.is_empty() {
            return Err(DomainError::validation(errors));
        }

        let email = input.email.trim().to_lowercase();
        if self
            .users
            .find_by_email(&email)
            .await
            .map_err(store_err)?
            .is_some()
        {
            return Err(DomainError::conflict("User with this email already exists"));
        }

        let role = match input.role.as_deref() {
            // Unknown strings were already rejected by validation.
            Some(raw) => Role::from_str(raw)
                .map_err(|_| DomainError::validation(vec![
                    "Role must be either admin or verifier".to_string(),
                ]))?,
            None => Role::Verifier,
        };

        let password_hash = hash_blocking(input.password).await?;
        let now = Utc::now();
        let user = UserRecord {
            id: UserId::new(),
            name: validation::sanitize_string(&input.name),
            email,
            password_hash,
            role,
            created_at: now,
            updated_at: now,
        };
        self.users.insert(user.clone()).await.map_err(store_err)?;

        Ok(user.into())
    }

    /// Authenticate and issue a session token.
    pub async fn login(&self, input: LoginInput) -> DomainResult<LoginResponse> {
        let errors = validation::validate_login_input(&input);
        if !errors.is_empty() {
            return Err(DomainError::validation(errors));
        }

        let email = input.email.trim().to_lowercase();
        // Unknown email and wrong password fail identically so callers
        // cannot enumerate accounts.
        let Some(user) = self.users.find_by_email(&email).await.map_err(store_err)? else {
            return Err(DomainError::Unauthorized);
        };
        if !verify_blocking(input.password, user.password_hash.clone()).await? {
            return Err(DomainError::Unauthorized);
        }

        let token = self
            .tokens
            .issue(user.id, &user.email, user.role, self.token_ttl, Utc::now())
            .map_err(|e| DomainError::internal(format!("token signing failed: {e}")))?;

        Ok(LoginResponse {
            token,
            user: user.into(),
        })
    }

    // ---------------------------------------------------------------------
    // Application workflow
    // ---------------------------------------------------------------------

    /// Public submission: validate, sanitize, persist as `pending`.
    pub async fn submit_application(
        &self,
        input: LoanApplicationInput,
        submitted_by: String,
    ) -> DomainResult<SubmissionReceipt> {
        let errors = validation::validate_application_input(&input);
        if !errors.is_empty() {
            return Err(DomainError::validation(errors));
        }

        let now = Utc::now();
        let record = ApplicationRecord {
            id: ApplicationId::new(),
            name: validation::sanitize_string(&input.name),
            email: input.email.trim().to_lowercase(),
            phone: validation::sanitize_string(&input.phone),
            // Validation guarantees the numeric fields are present.
            amount: input.amount.unwrap_or_default(),
            purpose: validation::sanitize_string(&input.purpose),
            tenure_months: input.tenure.unwrap_or_default(),
            monthly_income: input.monthly_income.unwrap_or_default(),
            employment_type: validation::sanitize_string(&input.employment_type),
            pan: input.pan_card.as_deref().map(validation::sanitize_string),
            aadhar: input.aadhar_card.as_deref().map(validation::sanitize_string),
            status: ApplicationStatus::Pending,
            verified_by: None,
            verified_at: None,
            admin_action_by: None,
            admin_action_at: None,
            rejection_reason: None,
            submitted_by,
            created_at: now,
            updated_at: now,
        };
        self.applications
            .insert(record.clone())
            .await
            .map_err(store_err)?;

        Ok(SubmissionReceipt {
            id: record.id,
            status: record.status,
            submitted_at: record.created_at,
        })
    }

    /// Role-filtered listing, newest first, actors resolved to name+email.
    ///
    /// A verifier's queue is always the pending set. An admin defaults to
    /// pending too, may narrow to one status, or pass `all`.
    pub async fn list_applications(
        &self,
        actor: &Actor,
        status_query: Option<&str>,
    ) -> DomainResult<Vec<ApplicationView>> {
        let filter = match actor.role {
            Role::Verifier => StatusFilter::Only(ApplicationStatus::Pending),
            Role::Admin => match status_query {
                None => StatusFilter::Only(ApplicationStatus::Pending),
                Some("all") => StatusFilter::All,
                Some(raw) => StatusFilter::Only(raw.parse::<ApplicationStatus>().map_err(
                    |_| DomainError::validation(vec![format!("Unknown status filter: {raw}")]),
                )?),
            },
        };

        let records = self.applications.list(filter).await.map_err(store_err)?;

        let mut cache = HashMap::new();
        let mut views = Vec::with_capacity(records.len());
        for record in records {
            views.push(self.resolve_view(record, &mut cache).await?);
        }
        Ok(views)
    }

    pub async fn verify_application(
        &self,
        raw_id: &str,
        actor: &Actor,
    ) -> DomainResult<ApplicationView> {
        // The route gate admits admins too; verification itself is strictly
        // a verifier action.
        if !actor.is_verifier() {
            return Err(DomainError::forbidden("Only verifiers can verify applications"));
        }
        self.transition(
            raw_id,
            TransitionUpdate {
                status: ApplicationStatus::Verified,
                actor: actor.id,
                stamp: ActorStamp::Verifier,
                rejection_reason: None,
            },
            "Only pending applications can be verified",
        )
        .await
    }

    pub async fn reject_application(
        &self,
        raw_id: &str,
        reason: Option<String>,
        actor: &Actor,
    ) -> DomainResult<ApplicationView> {
        if !actor.is_verifier() {
            return Err(DomainError::forbidden("Only verifiers can reject applications"));
        }
        let reason = reason
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| "Application rejected by verifier".to_string());
        self.transition(
            raw_id,
            TransitionUpdate {
                status: ApplicationStatus::Rejected,
                actor: actor.id,
                stamp: ActorStamp::Verifier,
                rejection_reason: Some(reason),
            },
            "Only pending applications can be rejected",
        )
        .await
    }

    /// Admin approval. Requires `pending`, not `verified`: the verifier
    /// step is advisory on this path.
    pub async fn approve_application(
        &self,
        raw_id: &str,
        actor: &Actor,
    ) -> DomainResult<ApplicationView> {
        if !actor.is_admin() {
            return Err(DomainError::forbidden("Only admins can approve applications"));
        }
        self.transition(
            raw_id,
            TransitionUpdate {
                status: ApplicationStatus::Approved,
                actor: actor.id,
                stamp: ActorStamp::Admin,
                rejection_reason: None,
            },
            "Only pending applications can be approved",
        )
        .await
    }

    pub async fn admin_reject_application(
        &self,
        raw_id: &str,
        reason: Option<String>,
        actor: &Actor,
    ) -> DomainResult<ApplicationView> {
        if !actor.is_admin() {
            return Err(DomainError::forbidden("Only admins can reject applications"));
        }
        let reason = reason
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| "Application rejected by admin".to_string());
        self.transition(
            raw_id,
            TransitionUpdate {
                status: ApplicationStatus::Rejected,
                actor: actor.id,
                stamp: ActorStamp::Admin,
                rejection_reason: Some(reason),
            },
            "Only pending applications can be rejected by admin",
        )
        .await
    }

    /// Administrative override: writes the status directly, bypassing the
    /// transition precondition and actor stamping. Kept segregated from the
    /// validated transitions on purpose.
    pub async fn override_status(
        &self,
        raw_id: &str,
        status: ApplicationStatus,
    ) -> DomainResult<ApplicationRecord> {
        let id = parse_application_id(raw_id)?;
        self.applications
            .set_status(id, status, Utc::now())
            .await
            .map_err(store_err)?
            .ok_or_else(|| DomainError::not_found("Application not found"))
    }

    pub async fn dashboard_stats(&self) -> DomainResult<DashboardStats> {
        self.applications.stats().await.map_err(store_err)
    }

    async fn transition(
        &self,
        raw_id: &str,
        update: TransitionUpdate,
        precondition_msg: &str,
    ) -> DomainResult<ApplicationView> {
        let id = parse_application_id(raw_id)?;
        let outcome = self
            .applications
            .apply_transition(id, ApplicationStatus::Pending, update, Utc::now())
            .await
            .map_err(store_err)?;

        match outcome {
            TransitionOutcome::Applied(record) => {
                let mut cache = HashMap::new();
                self.resolve_view(record, &mut cache).await
            }
            TransitionOutcome::NotFound => Err(DomainError::not_found("Application not found")),
            TransitionOutcome::PreconditionFailed(_) => {
                Err(DomainError::invalid_transition(precondition_msg))
            }
        }
    }

    async fn resolve_view(
        &self,
        record: ApplicationRecord,
        cache: &mut HashMap<UserId, Option<ActorRef>>,
    ) -> DomainResult<ApplicationView> {
        let verified_by = match record.verified_by {
            Some(id) => self.resolve_actor(id, cache).await?,
            None => None,
        };
        let admin_action_by = match record.admin_action_by {
            Some(id) => self.resolve_actor(id, cache).await?,
            None => None,
        };
        Ok(ApplicationView::new(record, verified_by, admin_action_by))
    }

    async fn resolve_actor(
        &self,
        id: UserId,
        cache: &mut HashMap<UserId, Option<ActorRef>>,
    ) -> DomainResult<Option<ActorRef>> {
        if let Some(cached) = cache.get(&id) {
            return Ok(cached.clone());
        }
        let resolved = self
            .users
            .find_by_id(id)
            .await
            .map_err(store_err)?
            .map(ActorRef::from);
        cache.insert(id, resolved.clone());
        Ok(resolved)
    }

    // ---------------------------------------------------------------------
    // User management
    // ---------------------------------------------------------------------

    pub async fn list_users(&self) -> DomainResult<Vec<UserSummary>> {
        let users = self.users.list().await.map_err(store_err)?;
        Ok(users.into_iter().map(UserSummary::from).collect())
    }

    pub async fn delete_user(&self, actor: &Actor, raw_id: &str) -> DomainResult<ActorRef> {
        let id: UserId = raw_id
            .parse()
            .map_err(|_| DomainError::not_found("User not found."))?;

        if actor.id == id {
            return Err(DomainError::bad_request("You cannot delete yourself."));
        }

        self.users
            .delete(id)
            .await
            .map_err(store_err)?
            .map(ActorRef::from)
            .ok_or_else(|| DomainError::not_found("User not found."))
    }

    pub async fn profile(&self, actor: &Actor) -> DomainResult<UserSummary> {
        self.users
            .find_by_id(actor.id)
            .await
            .map_err(store_err)?
            .map(UserSummary::from)
            .ok_or_else(|| DomainError::not_found("User not found"))
    }

    // ---------------------------------------------------------------------
    // Bootstrap
    // ---------------------------------------------------------------------

    /// Seed one demo admin and one demo verifier. Idempotent on the admin
    /// email; meant for local/dev environments only.
    pub async fn seed_demo_users(&self) -> DomainResult<()> {
        const ADMIN_EMAIL: &str = "admin@loanflow.local";

        if self
            .users
            .find_by_email(ADMIN_EMAIL)
            .await
            .map_err(store_err)?
            .is_some()
        {
            tracing::info!("seed admin already present, skipping");
            return Ok(());
        }

        let demo = [
            ("Admin User", ADMIN_EMAIL, "admin123", Role::Admin),
            ("Verifier User", "verifier@loanflow.local", "verifier123", Role::Verifier),
        ];
        for (name, email, password, role) in demo {
            let password_hash = hash_blocking(password.to_string()).await?;
            let now = Utc::now();
            self.users
                .insert(UserRecord {
                    id: UserId::new(),
                    name: name.to_string(),
                    email: email.to_string(),
                    password_hash,
                    role,
                    created_at: now,
                    updated_at: now,
                })
                .await
                .map_err(store_err)?;
            tracing::info!(email, role = %role, "seeded demo user");
        }
        Ok(())
    }
}

fn parse_application_id(raw: &str) -> DomainResult<ApplicationId> {
    raw.parse()
        .map_err(|_| DomainError::not_found("Application not found"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn services() -> AppServices {
        AppServices::in_memory(b"test-secret", Duration::days(7))
    }

    fn admin() -> Actor {
        Actor {
            id: UserId::new(),
            email: "admin@example.com".to_string(),
            role: Role::Admin,
        }
    }

    fn verifier() -> Actor {
        Actor {
            id: UserId::new(),
            email: "verifier@example.com".to_string(),
            role: Role::Verifier,
        }
    }

    fn application_input() -> LoanApplicationInput {
        LoanApplicationInput {
            name: "Asha Rao".to_string(),
            email: "asha@example.com".to_string(),
            phone: "9876543210".to_string(),
            amount: Some(50_000.0),
            purpose: "Home renovation".to_string(),
            tenure: Some(12),
            monthly_income: Some(20_000.0),
            employment_type: "Salaried".to_string(),
            pan_card: None,
            aadhar_card: None,
        }
    }

    fn user_input(email: &str) -> NewUserInput {
        NewUserInput {
            name: "Test User".to_string(),
            email: email.to_string(),
            password: "secret1".to_string(),
            role: None,
        }
    }

    async fn submit(services: &AppServices) -> String {
        services
            .submit_application(application_input(), "127.0.0.1".to_string())
            .await
            .unwrap()
            .id
            .to_string()
    }

    #[tokio::test]
    async fn transitions_require_pending_prestate() {
        let services = services();
        let admin = admin();
        let verifier = verifier();

        for pre_state in [
            ApplicationStatus::Verified,
            ApplicationStatus::Rejected,
            ApplicationStatus::Approved,
        ] {
            let id = submit(&services).await;
            services.override_status(&id, pre_state).await.unwrap();

            let results = [
                services.verify_application(&id, &verifier).await.err(),
                services.reject_application(&id, None, &verifier).await.err(),
                services.approve_application(&id, &admin).await.err(),
                services
                    .admin_reject_application(&id, None, &admin)
                    .await
                    .err(),
            ];
            for err in results {
                assert!(
                    matches!(err, Some(DomainError::InvalidTransition(_))),
                    "expected InvalidTransition from {pre_state}, got {err:?}"
                );
            }
        }
    }

    #[tokio::test]
    async fn verify_stamps_verifier_and_leaves_admin_fields_empty() {
        let services = services();
        let verifier = verifier();
        let id = submit(&services).await;

        let view = services.verify_application(&id, &verifier).await.unwrap();
        assert_eq!(view.status, ApplicationStatus::Verified);
        assert!(view.verified_at.is_some());
        assert!(view.admin_action_by.is_none());
        assert!(view.admin_action_at.is_none());
    }

    #[tokio::test]
    async fn approve_stamps_admin_action() {
        let services = services();
        let admin = admin();
        let id = submit(&services).await;

        let view = services.approve_application(&id, &admin).await.unwrap();
        assert_eq!(view.status, ApplicationStatus::Approved);
        assert!(view.admin_action_at.is_some());
        assert!(view.verified_by.is_none());
    }

    #[tokio::test]
    async fn reject_without_reason_stores_default_reason() {
        let services = services();
        let verifier = verifier();
        let id = submit(&services).await;

        let view = services.reject_application(&id, None, &verifier).await.unwrap();
        assert_eq!(view.status, ApplicationStatus::Rejected);
        assert_eq!(
            view.rejection_reason.as_deref(),
            Some("Application rejected by verifier")
        );
    }

    #[tokio::test]
    async fn admin_cannot_verify_even_though_route_gate_admits_them() {
        let services = services();
        let admin = admin();
        let id = submit(&services).await;

        let err = services.verify_application(&id, &admin).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn duplicate_email_conflicts_case_insensitively() {
        let services = services();
        services.create_user(user_input("Dana@Example.com")).await.unwrap();

        let err = services
            .create_user(user_input("dana@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let services = services();
        services.create_user(user_input("dana@example.com")).await.unwrap();

        let wrong_password = services
            .login(LoginInput {
                email: "dana@example.com".to_string(),
                password: "wrong-password".to_string(),
            })
            .await
            .unwrap_err();
        let unknown_email = services
            .login(LoginInput {
                email: "nobody@example.com".to_string(),
                password: "secret1".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(wrong_password, DomainError::Unauthorized);
        assert_eq!(unknown_email, DomainError::Unauthorized);
    }

    #[tokio::test]
    async fn admins_cannot_delete_themselves() {
        let services = services();
        let created = services.create_user(user_input("root@example.com")).await.unwrap();
        let actor = Actor {
            id: created.id,
            email: created.email.clone(),
            role: Role::Admin,
        };

        let err = services
            .delete_user(&actor, &created.id.to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::BadRequest(_)));

        // Account is still there.
        assert!(services.profile(&actor).await.is_ok());
    }

    #[tokio::test]
    async fn verifier_listing_is_always_the_pending_queue() {
        let services = services();
        let admin = admin();
        let verifier = verifier();

        let pending_id = submit(&services).await;
        let approved_id = submit(&services).await;
        services.approve_application(&approved_id, &admin).await.unwrap();

        // Verifier sees pending only, even with a filter supplied.
        let listed = services
            .list_applications(&verifier, Some("all"))
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id.to_string(), pending_id);

        // Admin can widen to everything.
        let listed = services.list_applications(&admin, Some("all")).await.unwrap();
        assert_eq!(listed.len(), 2);

        // Admin default is the pending queue.
        let listed = services.list_applications(&admin, None).await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn admin_status_filter_must_be_known() {
        let services = services();
        let err = services
            .list_applications(&admin(), Some("archived"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ValidationFailed(_)));
    }

    #[tokio::test]
    async fn override_status_skips_stamps_and_precondition() {
        let services = services();
        let id = submit(&services).await;

        let record = services
            .override_status(&id, ApplicationStatus::Approved)
            .await
            .unwrap();
        assert_eq!(record.status, ApplicationStatus::Approved);
        assert!(record.admin_action_by.is_none());

        // And again, from a terminal state.
        let record = services
            .override_status(&id, ApplicationStatus::Pending)
            .await
            .unwrap();
        assert_eq!(record.status, ApplicationStatus::Pending);
    }
}
