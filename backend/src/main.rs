use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stratus_backend::{
    app,
    config::Config,
    db::connection::{create_pool, DbPool},
    identity,
    state::AppState,
};

fn mask_secret(s: &str) -> String {
    if s.is_empty() {
        return "<empty>".into();
    }
    let prefix = s.chars().take(4).collect::<String>();
    format!("{}*** (len={})", prefix, s.len())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stratus_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load()?;
    tracing::info!(
        database_url = %config.database_url,
        session_ttl_hours = config.session_ttl_hours,
        session_active_interval = config.session_active_interval,
        deployment_token_ttl_days = config.deployment_token_ttl_days,
        subdomain_suffix = %config.subdomain_suffix,
        identity_base_url = %config.identity_base_url,
        identity_secret_key = %mask_secret(&config.identity_secret_key),
        "Loaded configuration from environment/.env"
    );

    // Initialize database
    let pool: DbPool = create_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&*pool).await?;

    let identity = Arc::new(identity::from_config(&config));
    let state = AppState::new(pool, config, identity);
    let router = app(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
