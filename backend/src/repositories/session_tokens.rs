use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::session_token::SessionToken;
use crate::types::SessionTokenId;

const SELECT_COLUMNS: &str =
    "id, user_id, value, issued_at, expires_at, active_at, active_interval";

pub async fn find_session_by_value(
    pool: &PgPool,
    value: &str,
) -> Result<Option<SessionToken>, sqlx::Error> {
    let query = format!(
        "SELECT {} FROM session_tokens WHERE value = $1",
        SELECT_COLUMNS
    );
    sqlx::query_as::<_, SessionToken>(&query)
        .bind(value)
        .fetch_optional(pool)
        .await
}

/// Records a successful verification round trip.
pub async fn touch_session(
    pool: &PgPool,
    id: SessionTokenId,
    active_at: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE session_tokens SET active_at = $2 WHERE id = $1")
        .bind(id)
        .bind(active_at)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_session_by_id(pool: &PgPool, id: SessionTokenId) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM session_tokens WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map(|_| ())
}
