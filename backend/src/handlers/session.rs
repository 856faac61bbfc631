use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::{
    error::AppError,
    identity::IdentityClaims,
    models::session_token::{SessionResponse, SessionToken},
    models::user::User,
    repositories::PgCredentialStore,
    services::session,
    state::AppState,
};

/// POST /api/session — reissue a session from identity claims.
///
/// Invoked by the dashboard after the identity provider has authenticated
/// the user; this is the only place a session secret is minted.
pub async fn issue(
    State(state): State<AppState>,
    Json(claims): Json<IdentityClaims>,
) -> Result<Json<SessionResponse>, AppError> {
    let store = PgCredentialStore::new(state.pool.clone());
    let (user, token) = session::issue(
        &store,
        state.identity.as_ref(),
        &claims,
        state.config.session_ttl_hours,
        state.config.session_active_interval,
    )
    .await?;
    info!(user_id = %user.id, email = %user.email, "Session issued");
    Ok(Json(SessionResponse::new(user, token)))
}

/// GET /api/session — the auth middleware has already run `authorize`;
/// return the (possibly refreshed) session metadata.
pub async fn current(
    Extension(user): Extension<User>,
    Extension(token): Extension<SessionToken>,
) -> Result<Json<SessionResponse>, AppError> {
    Ok(Json(SessionResponse::new(user, token)))
}

/// DELETE /api/session — sign out, destroying the session token.
pub async fn revoke(
    State(state): State<AppState>,
    Extension(token): Extension<SessionToken>,
) -> Result<StatusCode, AppError> {
    let store = PgCredentialStore::new(state.pool.clone());
    session::revoke(&store, token.id).await?;
    info!(user_id = %token.user_id, "Session revoked");
    Ok(StatusCode::NO_CONTENT)
}
