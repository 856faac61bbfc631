//! HTTP identity provider client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::AppError;
use crate::identity::{IdentityClaims, IdentityProvider, SessionSeed};

pub struct HttpIdentityProvider {
    client: reqwest::Client,
    base_url: String,
    secret_key: String,
}

impl HttpIdentityProvider {
    pub fn new(base_url: String, secret_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            secret_key,
        }
    }
}

#[derive(Serialize)]
struct VerifySessionRequest<'a> {
    token: &'a str,
}

#[derive(Debug, Deserialize)]
struct VerifySessionResponse {
    provider: String,
    user_id: String,
    session_id: String,
    name: String,
    email: String,
    #[serde(default)]
    avatar_url: String,
}

#[derive(Debug, Deserialize)]
struct ExchangeSessionResponse {
    seed: String,
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn verify(&self, seed: &str) -> Result<IdentityClaims, AppError> {
        let verify_api = format!("{}/v1/sessions/verify", self.base_url);
        debug!("Verify session api: {}", verify_api);

        let resp = self
            .client
            .post(&verify_api)
            .bearer_auth(&self.secret_key)
            .json(&VerifySessionRequest { token: seed })
            .send()
            .await
            .map_err(|e| {
                warn!("Verify session request failed: {}", e);
                AppError::VerificationFailed
            })?;
        if !resp.status().is_success() {
            warn!("Verify session rejected: {}", resp.status());
            return Err(AppError::VerificationFailed);
        }
        let resp: VerifySessionResponse = resp.json().await.map_err(|e| {
            warn!("Verify session response malformed: {}", e);
            AppError::VerificationFailed
        })?;
        Ok(IdentityClaims {
            provider: resp.provider,
            provider_user_id: resp.user_id,
            provider_session: resp.session_id,
            name: resp.name,
            email: resp.email,
            avatar_url: resp.avatar_url,
        })
    }

    async fn exchange(&self, claims: &IdentityClaims) -> Result<SessionSeed, AppError> {
        let exchange_api = format!("{}/v1/sessions/exchange", self.base_url);
        debug!("Exchange session api: {}", exchange_api);

        let resp = self
            .client
            .post(&exchange_api)
            .bearer_auth(&self.secret_key)
            .json(claims)
            .send()
            .await
            .map_err(|e| {
                warn!("Exchange session request failed: {}", e);
                AppError::VerificationFailed
            })?;
        if !resp.status().is_success() {
            warn!("Exchange session rejected: {}", resp.status());
            return Err(AppError::VerificationFailed);
        }
        let resp: ExchangeSessionResponse = resp.json().await.map_err(|e| {
            warn!("Exchange session response malformed: {}", e);
            AppError::VerificationFailed
        })?;
        Ok(SessionSeed { value: resp.seed })
    }
}
