//! Deployment (API) tokens for non-interactive clients.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::types::{DeploymentTokenId, UserId};
use crate::validation::rules::validate_token_name;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
/// Database representation of a deployment token.
pub struct DeploymentToken {
    pub id: DeploymentTokenId,
    pub owner_id: UserId,
    pub name: String,
    pub value: String,
    pub created_at: DateTime<Utc>,
    pub expired_at: DateTime<Utc>,
}

impl DeploymentToken {
    pub fn new(owner_id: UserId, name: String, ttl_days: i64) -> Self {
        let now = Utc::now();
        Self {
            id: DeploymentTokenId::new(),
            owner_id,
            name,
            value: random_secret(40),
            created_at: now,
            expired_at: now + Duration::days(ttl_days),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expired_at <= now
    }
}

/// Generates an alphanumeric secret of the given length.
pub fn random_secret(len: usize) -> String {
    use rand::{distributions::Alphanumeric, Rng};
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
/// Payload for creating a new deployment token.
pub struct CreateTokenRequest {
    #[validate(custom(function = validate_token_name))]
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
/// Deployment token metadata.
///
/// The secret `value` is present only in the creation response; listings
/// omit it.
pub struct TokenResponse {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expired_at: DateTime<Utc>,
}

impl TokenResponse {
    /// Response for a freshly created token, secret included.
    pub fn created(token: DeploymentToken) -> Self {
        Self {
            id: token.id.to_string(),
            name: token.name,
            value: Some(token.value),
            created_at: token.created_at,
            expired_at: token.expired_at,
        }
    }

    /// Metadata-only response used by listings.
    pub fn metadata(token: DeploymentToken) -> Self {
        Self {
            id: token.id.to_string(),
            name: token.name,
            value: None,
            created_at: token.created_at,
            expired_at: token.expired_at,
        }
    }
}
