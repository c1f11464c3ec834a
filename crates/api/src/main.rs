use std::net::SocketAddr;
use std::sync::Arc;

use loanflow_api::app::services::AppServices;
use loanflow_api::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    loanflow_api::telemetry::init();

    let config = Config::from_env()?;

    let services = Arc::new(build_services(&config).await?);
    if config.seed_users {
        services.seed_demo_users().await?;
    }

    let app = loanflow_api::app::build_app(services);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

async fn build_services(config: &Config) -> anyhow::Result<AppServices> {
    #[cfg(feature = "postgres")]
    if let Some(url) = &config.database_url {
        use loanflow_auth::Hs256TokenCodec;
        use loanflow_store::postgres::{init_schema, PgApplicationStore, PgUserStore};

        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(8)
            .connect(url)
            .await?;
        init_schema(&pool).await?;
        tracing::info!("using postgres stores");

        return Ok(AppServices::new(
            Arc::new(PgUserStore::new(pool.clone())),
            Arc::new(PgApplicationStore::new(pool)),
            Hs256TokenCodec::new(config.jwt_secret.as_bytes()),
            config.token_ttl,
        ));
    }

    #[cfg(not(feature = "postgres"))]
    if config.database_url.is_some() {
        tracing::warn!("DATABASE_URL set but the postgres feature is not enabled, using in-memory stores");
    }

    Ok(AppServices::in_memory(
        config.jwt_secret.as_bytes(),
        config.token_ttl,
    ))
}
