//! Models for user accounts created from external identity sign-ins.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::types::UserId;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
/// Database representation of a user account.
///
/// Users are created on first successful sign-in through the identity
/// provider; the `origin_*` pair is the external-identity reference.
pub struct User {
    pub id: UserId,
    /// Display name shown in the dashboard.
    pub name: String,
    pub email: String,
    pub avatar_url: String,
    /// Role describing the user's privileges.
    pub role: UserRole,
    /// Name of the identity provider that vouches for this user.
    pub origin_provider: String,
    /// Provider-assigned identifier, stable across sign-ins.
    pub origin_user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default, ToSchema)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
/// Supported user roles stored in the database.
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl UserRole {
    /// Returns the canonical lowercase representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }
}

impl User {
    /// Constructs a new user from identity-provider claims.
    pub fn new(
        name: String,
        email: String,
        avatar_url: String,
        origin_provider: String,
        origin_user_id: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            name,
            email,
            avatar_url,
            role: UserRole::User,
            origin_provider,
            origin_user_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns `true` when the user holds the `Admin` role.
    pub fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
/// Public-facing representation of a user returned by the API.
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar_url: String,
    pub role: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id.to_string(),
            name: user.name,
            email: user.email,
            avatar_url: user.avatar_url,
            role: user.role.as_str().to_string(),
        }
    }
}
