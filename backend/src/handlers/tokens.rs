use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use validator::Validate;

use crate::{
    error::AppError,
    models::deployment_token::{CreateTokenRequest, DeploymentToken, TokenResponse},
    models::user::User,
    repositories::deployment_tokens,
    state::AppState,
    types::DeploymentTokenId,
};

/// POST /api/tokens — the only response that ever carries the secret.
pub async fn create_token(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(payload): Json<CreateTokenRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    payload.validate()?;

    let existing = deployment_tokens::find_token_by_name(&state.pool, user.id, &payload.name)
        .await
        .map_err(AppError::from)?;
    if existing.is_some() {
        return Err(AppError::Validation(vec!["name: already_taken".to_string()]));
    }

    let token = DeploymentToken::new(
        user.id,
        payload.name,
        state.config.deployment_token_ttl_days,
    );
    let token = deployment_tokens::insert_token(&state.pool, &token)
        .await
        .map_err(AppError::from)?;
    info!(owner_id = %user.id, token_name = %token.name, "Created deployment token");
    Ok(Json(TokenResponse::created(token)))
}

/// GET /api/tokens — metadata only, secrets are never listed.
pub async fn list_tokens(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<TokenResponse>>, AppError> {
    let tokens = deployment_tokens::list_tokens_for_owner(&state.pool, user.id)
        .await
        .map_err(AppError::from)?;
    Ok(Json(tokens.into_iter().map(TokenResponse::metadata).collect()))
}

/// DELETE /api/tokens/{id}
pub async fn delete_token(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<DeploymentTokenId>,
) -> Result<StatusCode, AppError> {
    let deleted = deployment_tokens::delete_token(&state.pool, user.id, id)
        .await
        .map_err(AppError::from)?;
    if !deleted {
        return Err(AppError::NotFound("Token not found".to_string()));
    }
    info!(owner_id = %user.id, token_id = %id, "Removed deployment token");
    Ok(StatusCode::NO_CONTENT)
}
