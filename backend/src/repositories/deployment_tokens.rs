use sqlx::PgPool;

use crate::models::deployment_token::DeploymentToken;
use crate::types::{DeploymentTokenId, UserId};

const SELECT_COLUMNS: &str = "id, owner_id, name, value, created_at, expired_at";

pub async fn insert_token(
    pool: &PgPool,
    token: &DeploymentToken,
) -> Result<DeploymentToken, sqlx::Error> {
    let query = format!(
        "INSERT INTO deployment_tokens (id, owner_id, name, value, created_at, expired_at) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING {}",
        SELECT_COLUMNS
    );
    sqlx::query_as::<_, DeploymentToken>(&query)
        .bind(token.id)
        .bind(token.owner_id)
        .bind(&token.name)
        .bind(&token.value)
        .bind(token.created_at)
        .bind(token.expired_at)
        .fetch_one(pool)
        .await
}

pub async fn find_token_by_value(
    pool: &PgPool,
    value: &str,
) -> Result<Option<DeploymentToken>, sqlx::Error> {
    let query = format!(
        "SELECT {} FROM deployment_tokens WHERE value = $1",
        SELECT_COLUMNS
    );
    sqlx::query_as::<_, DeploymentToken>(&query)
        .bind(value)
        .fetch_optional(pool)
        .await
}

pub async fn find_token_by_name(
    pool: &PgPool,
    owner_id: UserId,
    name: &str,
) -> Result<Option<DeploymentToken>, sqlx::Error> {
    let query = format!(
        "SELECT {} FROM deployment_tokens WHERE owner_id = $1 AND name = $2",
        SELECT_COLUMNS
    );
    sqlx::query_as::<_, DeploymentToken>(&query)
        .bind(owner_id)
        .bind(name)
        .fetch_optional(pool)
        .await
}

pub async fn list_tokens_for_owner(
    pool: &PgPool,
    owner_id: UserId,
) -> Result<Vec<DeploymentToken>, sqlx::Error> {
    let query = format!(
        "SELECT {} FROM deployment_tokens WHERE owner_id = $1 ORDER BY created_at DESC",
        SELECT_COLUMNS
    );
    sqlx::query_as::<_, DeploymentToken>(&query)
        .bind(owner_id)
        .fetch_all(pool)
        .await
}

/// Deletes a token; scoped to the owner so one user cannot revoke another's.
pub async fn delete_token(
    pool: &PgPool,
    owner_id: UserId,
    id: DeploymentTokenId,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM deployment_tokens WHERE id = $1 AND owner_id = $2")
        .bind(id)
        .bind(owner_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
