//! Process configuration from the environment.

use anyhow::Context;
use chrono::Duration;

/// Runtime configuration.
///
/// The signing secret has no default: a process without `JWT_SECRET` must
/// refuse to start rather than fall back to something guessable.
#[derive(Debug, Clone)]
pub struct Config {
    /// Listen port (`PORT`, default 8080).
    pub port: u16,
    /// Token signing secret (`JWT_SECRET`, required).
    pub jwt_secret: String,
    /// Session token lifetime (`JWT_TTL_DAYS`, default 7).
    pub token_ttl: Duration,
    /// Postgres connection string (`DATABASE_URL`), used when the
    /// `postgres` feature is enabled.
    pub database_url: Option<String>,
    /// Seed demo admin/verifier accounts at startup (`LOANFLOW_SEED_USERS`).
    pub seed_users: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt_secret = std::env::var("JWT_SECRET")
            .context("JWT_SECRET must be set; refusing to start without a signing secret")?;

        let port = match std::env::var("PORT") {
            Ok(raw) => raw.parse::<u16>().context("PORT must be a valid port number")?,
            Err(_) => 8080,
        };

        let ttl_days = match std::env::var("JWT_TTL_DAYS") {
            Ok(raw) => raw
                .parse::<i64>()
                .context("JWT_TTL_DAYS must be a whole number of days")?,
            Err(_) => 7,
        };

        let seed_users = std::env::var("LOANFLOW_SEED_USERS")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        Ok(Self {
            port,
            jwt_secret,
            token_ttl: Duration::days(ttl_days),
            database_url: std::env::var("DATABASE_URL").ok(),
            seed_users,
        })
    }
}
