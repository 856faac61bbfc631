//! Credential store seam.
//!
//! Durable keyed storage for session material, behind a trait so the session
//! lifecycle logic can be exercised against a mock. The store holds no
//! validity logic of its own; writes are immediately visible to reads.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::db::connection::DbPool;
use crate::error::AppError;
use crate::identity::IdentityClaims;
use crate::models::session_token::SessionToken;
use crate::models::user::User;
use crate::repositories::transaction::{begin_transaction, commit_transaction};
use crate::repositories::{session_tokens, users};
use crate::types::{SessionTokenId, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_session_by_value(&self, value: &str)
        -> Result<Option<SessionToken>, AppError>;

    async fn touch_session(
        &self,
        id: SessionTokenId,
        active_at: DateTime<Utc>,
    ) -> Result<(), AppError>;

    async fn delete_session(&self, id: SessionTokenId) -> Result<(), AppError>;

    async fn find_user(&self, id: UserId) -> Result<Option<User>, AppError>;

    /// Finds or creates the user for an external identity, refreshing the
    /// mutable profile fields from the latest claims.
    async fn upsert_user_by_identity(&self, claims: &IdentityClaims) -> Result<User, AppError>;

    /// Atomically replaces any prior session tokens of the owning user with
    /// the given one. This is what makes reissue idempotent per identity.
    async fn replace_session(&self, token: &SessionToken) -> Result<SessionToken, AppError>;
}

pub struct PgCredentialStore {
    pool: DbPool,
}

impl PgCredentialStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_session_by_value(
        &self,
        value: &str,
    ) -> Result<Option<SessionToken>, AppError> {
        Ok(session_tokens::find_session_by_value(&self.pool, value).await?)
    }

    async fn touch_session(
        &self,
        id: SessionTokenId,
        active_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        session_tokens::touch_session(&self.pool, id, active_at).await?;
        Ok(())
    }

    async fn delete_session(&self, id: SessionTokenId) -> Result<(), AppError> {
        session_tokens::delete_session_by_id(&self.pool, id).await?;
        Ok(())
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, AppError> {
        Ok(users::find_user_by_id(&self.pool, id).await?)
    }

    async fn upsert_user_by_identity(&self, claims: &IdentityClaims) -> Result<User, AppError> {
        if let Some(user) =
            users::find_user_by_origin(&self.pool, &claims.provider, &claims.provider_user_id)
                .await?
        {
            users::update_user_profile(
                &self.pool,
                user.id,
                &claims.name,
                &claims.email,
                &claims.avatar_url,
            )
            .await?;
            return Ok(User {
                name: claims.name.clone(),
                email: claims.email.clone(),
                avatar_url: claims.avatar_url.clone(),
                ..user
            });
        }

        let user = User::new(
            claims.name.clone(),
            claims.email.clone(),
            claims.avatar_url.clone(),
            claims.provider.clone(),
            claims.provider_user_id.clone(),
        );
        match users::insert_user(&self.pool, &user).await {
            Ok(user) => Ok(user),
            // unique_violation: another request signed this identity in first
            Err(sqlx::Error::Database(db)) if db.code().as_deref() == Some("23505") => {
                users::find_user_by_origin(&self.pool, &claims.provider, &claims.provider_user_id)
                    .await?
                    .ok_or(AppError::ConcurrentModification)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn replace_session(&self, token: &SessionToken) -> Result<SessionToken, AppError> {
        let mut tx = begin_transaction(&self.pool).await?;
        sqlx::query("DELETE FROM session_tokens WHERE user_id = $1")
            .bind(token.user_id)
            .execute(&mut *tx)
            .await?;
        let inserted = sqlx::query_as::<_, SessionToken>(
            "INSERT INTO session_tokens \
                (id, user_id, value, issued_at, expires_at, active_at, active_interval) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING id, user_id, value, issued_at, expires_at, active_at, active_interval",
        )
        .bind(token.id)
        .bind(token.user_id)
        .bind(&token.value)
        .bind(token.issued_at)
        .bind(token.expires_at)
        .bind(token.active_at)
        .bind(token.active_interval)
        .fetch_one(&mut *tx)
        .await?;
        commit_transaction(tx).await?;
        Ok(inserted)
    }
}
