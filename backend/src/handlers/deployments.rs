use axum::{
    extract::{Extension, Path, State},
    Json,
};

use crate::{
    error::AppError,
    models::deployment::{BuildResultRequest, Deployment, DeploymentResponse},
    models::project::ProjectResponse,
    models::user::User,
    repositories::{deployments, projects, PgDeploymentStore},
    services,
    state::AppState,
    types::DeploymentId,
};

/// POST /api/projects/{name}/deployments — trigger a new build.
pub async fn create_deployment(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(name): Path<String>,
) -> Result<Json<DeploymentResponse>, AppError> {
    let project = projects::find_project_by_name(&state.pool, &name, Some(user.id))
        .await
        .map_err(AppError::from)?
        .ok_or(AppError::ProjectNotFound)?;

    let store = PgDeploymentStore::new(state.pool.clone());
    let deployment = services::deployments::create(&store, project.id).await?;
    Ok(Json(deployment.into()))
}

pub async fn list_deployments(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(name): Path<String>,
) -> Result<Json<Vec<DeploymentResponse>>, AppError> {
    let project = projects::find_project_by_name(&state.pool, &name, Some(user.id))
        .await
        .map_err(AppError::from)?
        .ok_or(AppError::ProjectNotFound)?;

    let deployments = deployments::list_deployments_for_project(&state.pool, project.id)
        .await
        .map_err(AppError::from)?;
    Ok(Json(deployments.into_iter().map(Into::into).collect()))
}

/// POST /api/deployments/{id}/result — build collaborator reports the
/// terminal outcome. Authenticated with a deployment token, not a session.
pub async fn build_result(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<DeploymentId>,
    Json(payload): Json<BuildResultRequest>,
) -> Result<Json<DeploymentResponse>, AppError> {
    let deployment = owned_deployment(&state, &user, id).await?;

    let message = payload
        .message
        .unwrap_or_else(|| payload.outcome.as_deploy_status().as_str().to_string());
    let store = PgDeploymentStore::new(state.pool.clone());
    let updated =
        services::deployments::mark_build_result(&store, deployment.id, payload.outcome, &message)
            .await?;
    Ok(Json(updated.into()))
}

/// POST /api/deployments/{id}/enable
pub async fn enable_deployment(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<DeploymentId>,
) -> Result<Json<DeploymentResponse>, AppError> {
    let deployment = owned_deployment(&state, &user, id).await?;
    let store = PgDeploymentStore::new(state.pool.clone());
    let updated = services::deployments::enable(&store, deployment.id).await?;
    Ok(Json(updated.into()))
}

/// POST /api/deployments/{id}/disable
pub async fn disable_deployment(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<DeploymentId>,
) -> Result<Json<DeploymentResponse>, AppError> {
    let deployment = owned_deployment(&state, &user, id).await?;
    let store = PgDeploymentStore::new(state.pool.clone());
    let updated = services::deployments::disable(&store, deployment.id).await?;
    Ok(Json(updated.into()))
}

/// POST /api/deployments/{id}/promote — make this deployment production.
pub async fn promote_deployment(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<DeploymentId>,
) -> Result<Json<ProjectResponse>, AppError> {
    let deployment = owned_deployment(&state, &user, id).await?;
    let store = PgDeploymentStore::new(state.pool.clone());
    let project =
        services::promotion::promote(&store, deployment.project_id, deployment.id).await?;
    Ok(Json(project.into()))
}

/// Loads a deployment and enforces ownership: mutating someone else's
/// deployment is forbidden rather than not-found.
async fn owned_deployment(
    state: &AppState,
    user: &User,
    id: DeploymentId,
) -> Result<Deployment, AppError> {
    let deployment = deployments::find_deployment_by_id(&state.pool, id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::NotFound("Deployment not found".to_string()))?;
    if deployment.owner_id != user.id {
        return Err(AppError::Forbidden(
            "Deployment belongs to another user".to_string(),
        ));
    }
    Ok(deployment)
}
