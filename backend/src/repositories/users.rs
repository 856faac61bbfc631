use chrono::Utc;
use sqlx::PgPool;

use crate::models::user::User;
use crate::types::UserId;

const SELECT_COLUMNS: &str = "id, name, email, avatar_url, role, origin_provider, origin_user_id, \
                              created_at, updated_at";

pub async fn find_user_by_id(pool: &PgPool, id: UserId) -> Result<Option<User>, sqlx::Error> {
    let query = format!("SELECT {} FROM users WHERE id = $1", SELECT_COLUMNS);
    sqlx::query_as::<_, User>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_user_by_origin(
    pool: &PgPool,
    origin_provider: &str,
    origin_user_id: &str,
) -> Result<Option<User>, sqlx::Error> {
    let query = format!(
        "SELECT {} FROM users WHERE origin_provider = $1 AND origin_user_id = $2",
        SELECT_COLUMNS
    );
    sqlx::query_as::<_, User>(&query)
        .bind(origin_provider)
        .bind(origin_user_id)
        .fetch_optional(pool)
        .await
}

pub async fn insert_user(pool: &PgPool, user: &User) -> Result<User, sqlx::Error> {
    let query = format!(
        "INSERT INTO users \
            (id, name, email, avatar_url, role, origin_provider, origin_user_id, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         RETURNING {}",
        SELECT_COLUMNS
    );
    sqlx::query_as::<_, User>(&query)
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.avatar_url)
        .bind(user.role)
        .bind(&user.origin_provider)
        .bind(&user.origin_user_id)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(pool)
        .await
}

/// Refreshes the mutable profile fields from the latest sign-in claims.
pub async fn update_user_profile(
    pool: &PgPool,
    id: UserId,
    name: &str,
    email: &str,
    avatar_url: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE users SET name = $2, email = $3, avatar_url = $4, updated_at = $5 WHERE id = $1",
    )
    .bind(id)
    .bind(name)
    .bind(email)
    .bind(avatar_url)
    .bind(Utc::now())
    .execute(pool)
    .await
    .map(|_| ())
}

pub async fn count_users(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
}
