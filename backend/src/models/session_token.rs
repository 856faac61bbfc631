//! Session token model and the pure timestamp logic behind session trust.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::user::UserResponse;
use crate::types::{SessionTokenId, UserId};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
/// Database representation of an interactive session token.
///
/// The secret `value` is the provider-backed seed obtained at sign-in; it is
/// both the lookup key presented by clients and the credential re-verified
/// against the identity provider once the active interval lapses.
pub struct SessionToken {
    pub id: SessionTokenId,
    pub user_id: UserId,
    pub value: String,
    pub issued_at: DateTime<Utc>,
    /// Hard expiry; `None` means the token has no fixed lifetime.
    pub expires_at: Option<DateTime<Utc>>,
    /// Timestamp of the last successful verification round trip.
    pub active_at: DateTime<Utc>,
    /// Sliding trust window in seconds.
    pub active_interval: i64,
}

impl SessionToken {
    /// Constructs a freshly verified session token.
    pub fn new(
        user_id: UserId,
        value: String,
        expires_at: Option<DateTime<Utc>>,
        active_interval: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: SessionTokenId::new(),
            user_id,
            value,
            issued_at: now,
            expires_at,
            active_at: now,
            active_interval,
        }
    }

    /// A token with a hard expiry in the past is never valid, regardless of
    /// the active interval.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at <= now,
            None => false,
        }
    }

    /// Returns `true` while the last verification is recent enough that the
    /// token is trusted without another provider round trip.
    pub fn within_active_interval(&self, now: DateTime<Utc>) -> bool {
        now - self.active_at < Duration::seconds(self.active_interval)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
/// Session metadata returned on issue and authorize.
pub struct SessionResponse {
    /// The opaque session secret. Presented as a bearer token thereafter.
    pub value: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub active_at: DateTime<Utc>,
    pub active_interval: i64,
    pub user: UserResponse,
}

impl SessionResponse {
    pub fn new(user: crate::models::user::User, token: SessionToken) -> Self {
        Self {
            value: token.value,
            expires_at: token.expires_at,
            active_at: token.active_at,
            active_interval: token.active_interval,
            user: user.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_active_at(active_at: DateTime<Utc>, interval: i64) -> SessionToken {
        SessionToken {
            active_at,
            active_interval: interval,
            ..SessionToken::new(UserId::new(), "seed".into(), None, interval)
        }
    }

    #[test]
    fn fast_path_holds_strictly_below_the_interval() {
        let now = Utc::now();
        let token = token_active_at(now - Duration::seconds(59), 60);
        assert!(token.within_active_interval(now));
    }

    #[test]
    fn fast_path_closes_exactly_at_the_interval() {
        let now = Utc::now();
        let token = token_active_at(now - Duration::seconds(60), 60);
        assert!(!token.within_active_interval(now));

        let token = token_active_at(now - Duration::seconds(61), 60);
        assert!(!token.within_active_interval(now));
    }

    #[test]
    fn hard_expiry_beats_the_active_interval() {
        let now = Utc::now();
        let mut token = token_active_at(now, 60);
        token.expires_at = Some(now - Duration::seconds(1));
        assert!(token.is_expired(now));
        // still inside the sliding window, but expired wins
        assert!(token.within_active_interval(now));
    }

    #[test]
    fn no_hard_expiry_never_expires() {
        let now = Utc::now();
        let token = token_active_at(now - Duration::days(400), 60);
        assert!(!token.is_expired(now));
    }
}
