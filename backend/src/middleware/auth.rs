use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use crate::{
    error::AppError,
    repositories::{deployment_tokens, users, PgCredentialStore},
    services::session,
    state::AppState,
};

/// Session auth: resolves the bearer secret through the session lifecycle
/// manager and stores the user and token in request extensions.
pub async fn auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let value = bearer_value(&request)?;
    let store = PgCredentialStore::new(state.pool.clone());
    let (user, token) = session::authorize(&store, state.identity.as_ref(), &value).await?;
    request.extensions_mut().insert(user);
    request.extensions_mut().insert(token);
    Ok(next.run(request).await)
}

/// Session auth + admin role, for platform-wide aggregate routes.
pub async fn auth_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let value = bearer_value(&request)?;
    let store = PgCredentialStore::new(state.pool.clone());
    let (user, token) = session::authorize(&store, state.identity.as_ref(), &value).await?;
    if !user.is_admin() {
        return Err(AppError::Forbidden("Admin role required".to_string()));
    }
    request.extensions_mut().insert(user);
    request.extensions_mut().insert(token);
    Ok(next.run(request).await)
}

/// Deployment-token auth for the build collaborator. End-user sessions are
/// not accepted here; the bearer secret must be a live deployment token.
pub async fn auth_worker(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let value = bearer_value(&request)?;
    let token = deployment_tokens::find_token_by_value(&state.pool, &value)
        .await
        .map_err(AppError::from)?
        .ok_or(AppError::NoSession)?;
    if token.is_expired(Utc::now()) {
        return Err(AppError::SessionExpired);
    }
    let owner = users::find_user_by_id(&state.pool, token.owner_id)
        .await
        .map_err(AppError::from)?
        .ok_or(AppError::NoSession)?;
    request.extensions_mut().insert(owner);
    request.extensions_mut().insert(token);
    Ok(next.run(request).await)
}

fn bearer_value(request: &Request) -> Result<String, AppError> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_bearer_token)
        .map(|value| value.to_string())
        .ok_or(AppError::NoSession)
}

fn parse_bearer_token(header: &str) -> Option<&str> {
    if let Some(rest) = header.strip_prefix("Bearer ") {
        return Some(rest);
    }
    if let Some(space_idx) = header.find(' ') {
        let (scheme, rest) = header.split_at(space_idx);
        if scheme.eq_ignore_ascii_case("bearer") {
            return Some(rest.trim_start());
        }
    }
    None
}
