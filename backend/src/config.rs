use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database_url: String,
    /// Hard lifetime of a session token in hours; 0 disables the hard expiry.
    pub session_ttl_hours: i64,
    /// Sliding window (seconds) during which a verified session is trusted
    /// without re-contacting the identity provider.
    pub session_active_interval: i64,
    /// Lifetime of deployment (API) tokens in days.
    pub deployment_token_ttl_days: i64,
    /// Suffix appended to project subdomains, e.g. "local.dev".
    pub subdomain_suffix: String,
    pub identity_base_url: String,
    pub identity_secret_key: String,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/stratus".to_string());

        let session_ttl_hours = env::var("SESSION_TTL_HOURS")
            .unwrap_or_else(|_| "23".to_string())
            .parse()
            .unwrap_or(23);

        let session_active_interval = env::var("SESSION_ACTIVE_INTERVAL_SECONDS")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .unwrap_or(60);

        let deployment_token_ttl_days = env::var("DEPLOYMENT_TOKEN_TTL_DAYS")
            .unwrap_or_else(|_| "365".to_string())
            .parse()
            .unwrap_or(365);

        let subdomain_suffix =
            env::var("SUBDOMAIN_SUFFIX").unwrap_or_else(|_| "local.dev".to_string());

        let identity_base_url = env::var("IDENTITY_BASE_URL")
            .unwrap_or_else(|_| "https://identity.local.dev".to_string());

        let identity_secret_key = env::var("IDENTITY_SECRET_KEY").unwrap_or_default();

        Ok(Config {
            database_url,
            session_ttl_hours,
            session_active_interval,
            deployment_token_ttl_days,
            subdomain_suffix,
            identity_base_url,
            identity_secret_key,
        })
    }
}
