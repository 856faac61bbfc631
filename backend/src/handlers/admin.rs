use axum::{
    extract::{Query, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppError,
    models::project::ProjectResponse,
    models::{PaginatedResponse, PaginationQuery},
    repositories::{deployments, projects, users},
    state::AppState,
};

#[derive(Debug, Serialize, ToSchema)]
/// Platform-wide counters for the admin overview page.
pub struct AdminOverviewResponse {
    pub users: i64,
    pub projects: i64,
    pub deployments: i64,
}

/// GET /api/admin/overview
pub async fn overview(
    State(state): State<AppState>,
) -> Result<Json<AdminOverviewResponse>, AppError> {
    let users = users::count_users(&state.pool).await.map_err(AppError::from)?;
    let projects = projects::count_projects(&state.pool)
        .await
        .map_err(AppError::from)?;
    let deployments = deployments::count_deployments(&state.pool)
        .await
        .map_err(AppError::from)?;
    Ok(Json(AdminOverviewResponse {
        users,
        projects,
        deployments,
    }))
}

/// GET /api/admin/projects — paginated, across all owners.
pub async fn list_projects(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<PaginatedResponse<ProjectResponse>>, AppError> {
    let limit = pagination.limit();
    let offset = pagination.offset();
    let items = projects::list_all_projects(&state.pool, limit, offset)
        .await
        .map_err(AppError::from)?;
    let total = projects::count_projects(&state.pool)
        .await
        .map_err(AppError::from)?;
    let data = items.into_iter().map(ProjectResponse::from).collect();
    Ok(Json(PaginatedResponse::new(data, total, limit, offset)))
}
