//! External identity collaborator.
//!
//! The dashboards may sign users in through different providers; the control
//! plane sees a single capability pair: `exchange` validates sign-in claims
//! and mints a provider-backed session seed, `verify` re-checks a previously
//! exchanged seed. Which provider answers is a matter of configuration, not
//! of branching in callers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::Config;
use crate::error::AppError;

pub mod http;

pub use http::HttpIdentityProvider;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
/// Claims describing an externally authenticated identity.
pub struct IdentityClaims {
    /// Provider name, e.g. "clerk" or "self-hosted".
    pub provider: String,
    /// Provider-assigned stable user identifier.
    pub provider_user_id: String,
    /// Provider-side session reference backing this sign-in.
    pub provider_session: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub avatar_url: String,
}

#[derive(Debug, Clone, Deserialize)]
/// Provider-backed seed stored as the session secret.
pub struct SessionSeed {
    pub value: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Re-verify a previously exchanged session seed upstream.
    ///
    /// Network failures and timeouts surface as `VerificationFailed`; they
    /// are never retried here, since a silent retry could mask a revoked
    /// credential.
    async fn verify(&self, seed: &str) -> Result<IdentityClaims, AppError>;

    /// Validate sign-in claims and mint a session seed for them.
    async fn exchange(&self, claims: &IdentityClaims) -> Result<SessionSeed, AppError>;
}

/// Builds the configured identity provider.
pub fn from_config(config: &Config) -> HttpIdentityProvider {
    HttpIdentityProvider::new(
        config.identity_base_url.clone(),
        config.identity_secret_key.clone(),
    )
}
