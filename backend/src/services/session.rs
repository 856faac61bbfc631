//! Session lifecycle manager.
//!
//! Decides, for an incoming session secret, whether it is usable as-is,
//! needs a verification round trip against the identity provider, or must
//! be reissued. Expiry and the active interval are evaluated lazily at
//! request time from the stored timestamps; no background sweep exists.

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use crate::error::AppError;
use crate::identity::{IdentityClaims, IdentityProvider};
use crate::models::session_token::SessionToken;
use crate::models::user::User;
use crate::repositories::CredentialStore;
use crate::types::SessionTokenId;

/// Outcome of the pure timestamp evaluation behind [`authorize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCheck {
    /// Trusted as-is; the last verification is inside the active interval.
    Valid,
    /// Stale; a provider round trip is required before trusting it.
    NeedsVerification,
    /// Hard expiry passed; the session must be reissued.
    Expired,
}

impl SessionCheck {
    pub fn evaluate(token: &SessionToken, now: DateTime<Utc>) -> Self {
        if token.is_expired(now) {
            SessionCheck::Expired
        } else if token.within_active_interval(now) {
            SessionCheck::Valid
        } else {
            SessionCheck::NeedsVerification
        }
    }
}

/// Authorizes a presented session secret.
///
/// The provider round trip happens outside any store transaction; `touch`
/// is a single write issued only after the provider has answered.
pub async fn authorize(
    store: &dyn CredentialStore,
    identity: &dyn IdentityProvider,
    value: &str,
) -> Result<(User, SessionToken), AppError> {
    let token = store
        .find_session_by_value(value)
        .await?
        .ok_or(AppError::NoSession)?;

    let now = Utc::now();
    let token = match SessionCheck::evaluate(&token, now) {
        SessionCheck::Expired => return Err(AppError::SessionExpired),
        SessionCheck::Valid => token,
        SessionCheck::NeedsVerification => {
            identity.verify(&token.value).await?;
            store.touch_session(token.id, now).await?;
            SessionToken {
                active_at: now,
                ..token
            }
        }
    };

    let user = store
        .find_user(token.user_id)
        .await?
        .ok_or(AppError::NoSession)?;
    Ok((user, token))
}

/// Reissues a session from externally authenticated identity claims.
///
/// The only place a new session token is minted. Reissuing for the same
/// external identity replaces the prior token instead of accumulating them.
pub async fn issue(
    store: &dyn CredentialStore,
    identity: &dyn IdentityProvider,
    claims: &IdentityClaims,
    ttl_hours: i64,
    active_interval: i64,
) -> Result<(User, SessionToken), AppError> {
    let seed = identity.exchange(claims).await?;

    let user = store.upsert_user_by_identity(claims).await?;
    let expires_at = if ttl_hours > 0 {
        Some(Utc::now() + Duration::hours(ttl_hours))
    } else {
        None
    };
    let token = SessionToken::new(user.id, seed.value, expires_at, active_interval);
    let token = store.replace_session(&token).await?;

    info!(
        user_id = %user.id,
        provider = %claims.provider,
        "Issued session for external identity"
    );
    Ok((user, token))
}

/// Destroys a session token (sign-out or explicit revocation).
pub async fn revoke(store: &dyn CredentialStore, id: SessionTokenId) -> Result<(), AppError> {
    store.delete_session(id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{MockIdentityProvider, SessionSeed};
    use crate::repositories::credential_store::MockCredentialStore;
    use crate::types::UserId;
    use mockall::predicate::eq;

    fn fixture_user() -> User {
        User::new(
            "Alice".into(),
            "alice@example.com".into(),
            String::new(),
            "clerk".into(),
            "user_abc123".into(),
        )
    }

    fn fixture_token(user_id: UserId, active_ago_secs: i64, interval: i64) -> SessionToken {
        SessionToken {
            active_at: Utc::now() - Duration::seconds(active_ago_secs),
            ..SessionToken::new(user_id, "seed-value".into(), None, interval)
        }
    }

    fn fixture_claims() -> IdentityClaims {
        IdentityClaims {
            provider: "clerk".into(),
            provider_user_id: "user_abc123".into(),
            provider_session: "sess_1".into(),
            name: "Alice".into(),
            email: "alice@example.com".into(),
            avatar_url: String::new(),
        }
    }

    #[test]
    fn evaluate_maps_timestamps_to_decisions() {
        let now = Utc::now();
        let mut token = fixture_token(UserId::new(), 0, 60);

        token.active_at = now - Duration::seconds(59);
        assert_eq!(SessionCheck::evaluate(&token, now), SessionCheck::Valid);

        token.active_at = now - Duration::seconds(60);
        assert_eq!(
            SessionCheck::evaluate(&token, now),
            SessionCheck::NeedsVerification
        );

        token.active_at = now;
        token.expires_at = Some(now - Duration::seconds(1));
        assert_eq!(SessionCheck::evaluate(&token, now), SessionCheck::Expired);
    }

    #[tokio::test]
    async fn fast_path_skips_the_provider_round_trip() {
        let user = fixture_user();
        let token = fixture_token(user.id, 10, 60);

        let mut store = MockCredentialStore::new();
        let lookup = token.clone();
        store
            .expect_find_session_by_value()
            .with(eq("seed-value"))
            .returning(move |_| Ok(Some(lookup.clone())));
        store.expect_touch_session().never();
        let found = user.clone();
        store
            .expect_find_user()
            .returning(move |_| Ok(Some(found.clone())));

        let mut identity = MockIdentityProvider::new();
        identity.expect_verify().never();

        let (authorized, refreshed) = authorize(&store, &identity, "seed-value")
            .await
            .expect("authorize");
        assert_eq!(authorized.id, user.id);
        assert_eq!(refreshed.active_at, token.active_at);
    }

    #[tokio::test]
    async fn stale_session_triggers_verification_and_touch() {
        let user = fixture_user();
        let token = fixture_token(user.id, 120, 60);
        let token_id = token.id;

        let mut store = MockCredentialStore::new();
        let lookup = token.clone();
        store
            .expect_find_session_by_value()
            .returning(move |_| Ok(Some(lookup.clone())));
        store
            .expect_touch_session()
            .withf(move |id, _| *id == token_id)
            .times(1)
            .returning(|_, _| Ok(()));
        let found = user.clone();
        store
            .expect_find_user()
            .returning(move |_| Ok(Some(found.clone())));

        let mut identity = MockIdentityProvider::new();
        identity
            .expect_verify()
            .with(eq("seed-value"))
            .times(1)
            .returning(|_| Ok(fixture_claims()));

        let (_, refreshed) = authorize(&store, &identity, "seed-value")
            .await
            .expect("authorize");
        assert!(refreshed.active_at > token.active_at);
    }

    #[tokio::test]
    async fn missing_session_is_no_session() {
        let mut store = MockCredentialStore::new();
        store
            .expect_find_session_by_value()
            .returning(|_| Ok(None));
        let identity = MockIdentityProvider::new();

        let err = authorize(&store, &identity, "unknown").await.unwrap_err();
        assert!(matches!(err, AppError::NoSession));
    }

    #[tokio::test]
    async fn hard_expiry_wins_over_the_active_interval() {
        let user = fixture_user();
        let mut token = fixture_token(user.id, 0, 60);
        token.expires_at = Some(Utc::now() - Duration::seconds(5));

        let mut store = MockCredentialStore::new();
        let lookup = token.clone();
        store
            .expect_find_session_by_value()
            .returning(move |_| Ok(Some(lookup.clone())));
        let mut identity = MockIdentityProvider::new();
        identity.expect_verify().never();

        let err = authorize(&store, &identity, "seed-value").await.unwrap_err();
        assert!(matches!(err, AppError::SessionExpired));
    }

    #[tokio::test]
    async fn failed_verification_is_surfaced_not_retried() {
        let user = fixture_user();
        let token = fixture_token(user.id, 120, 60);

        let mut store = MockCredentialStore::new();
        let lookup = token.clone();
        store
            .expect_find_session_by_value()
            .returning(move |_| Ok(Some(lookup.clone())));
        store.expect_touch_session().never();

        let mut identity = MockIdentityProvider::new();
        identity
            .expect_verify()
            .times(1)
            .returning(|_| Err(AppError::VerificationFailed));

        let err = authorize(&store, &identity, "seed-value").await.unwrap_err();
        assert!(matches!(err, AppError::VerificationFailed));
    }

    #[tokio::test]
    async fn issue_replaces_the_prior_token_for_the_identity() {
        let user = fixture_user();
        let user_id = user.id;

        let mut identity = MockIdentityProvider::new();
        identity
            .expect_exchange()
            .times(1)
            .returning(|_| Ok(SessionSeed {
                value: "fresh-seed".into(),
            }));

        let mut store = MockCredentialStore::new();
        let upserted = user.clone();
        store
            .expect_upsert_user_by_identity()
            .returning(move |_| Ok(upserted.clone()));
        store
            .expect_replace_session()
            .withf(move |token| token.user_id == user_id && token.value == "fresh-seed")
            .times(1)
            .returning(|token| Ok(token.clone()));

        let (issued_for, token) = issue(&store, &identity, &fixture_claims(), 23, 60)
            .await
            .expect("issue");
        assert_eq!(issued_for.id, user_id);
        assert_eq!(token.value, "fresh-seed");
        assert!(token.expires_at.is_some());
    }

    #[tokio::test]
    async fn issue_without_ttl_creates_open_ended_sessions() {
        let user = fixture_user();

        let mut identity = MockIdentityProvider::new();
        identity.expect_exchange().returning(|_| Ok(SessionSeed {
            value: "fresh-seed".into(),
        }));

        let mut store = MockCredentialStore::new();
        let upserted = user.clone();
        store
            .expect_upsert_user_by_identity()
            .returning(move |_| Ok(upserted.clone()));
        store
            .expect_replace_session()
            .returning(|token| Ok(token.clone()));

        let (_, token) = issue(&store, &identity, &fixture_claims(), 0, 60)
            .await
            .expect("issue");
        assert!(token.expires_at.is_none());
    }

    #[tokio::test]
    async fn issue_fails_when_the_provider_rejects_the_claims() {
        let mut identity = MockIdentityProvider::new();
        identity
            .expect_exchange()
            .returning(|_| Err(AppError::VerificationFailed));
        let mut store = MockCredentialStore::new();
        store.expect_upsert_user_by_identity().never();
        store.expect_replace_session().never();

        let err = issue(&store, &identity, &fixture_claims(), 23, 60)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::VerificationFailed));
    }
}
