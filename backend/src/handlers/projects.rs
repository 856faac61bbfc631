use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use validator::Validate;

use crate::{
    error::AppError,
    models::project::{CreateProjectRequest, Project, ProjectResponse, RenameProjectRequest},
    models::user::User,
    repositories::projects,
    state::AppState,
};

pub async fn create_project(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(payload): Json<CreateProjectRequest>,
) -> Result<Json<ProjectResponse>, AppError> {
    payload.validate()?;

    let name = match payload.name {
        Some(name) => {
            if !projects::is_unique_name(&state.pool, &name).await.map_err(AppError::from)? {
                return Err(AppError::Validation(vec!["name: already_taken".to_string()]));
            }
            name
        }
        None => projects::random_unique_name(&state.pool)
            .await
            .map_err(AppError::from)?,
    };

    let project = Project::new(
        user.id,
        name,
        payload.language,
        state.config.subdomain_suffix.clone(),
    );
    let project = match projects::insert_project(&state.pool, &project).await {
        Ok(project) => project,
        // unique_violation: another request claimed the name in between
        Err(sqlx::Error::Database(db)) if db.code().as_deref() == Some("23505") => {
            return Err(AppError::Validation(vec!["name: already_taken".to_string()]));
        }
        Err(e) => return Err(e.into()),
    };

    info!(owner_id = %user.id, project_name = %project.name, "Created project");
    Ok(Json(project.into()))
}

pub async fn list_projects(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<ProjectResponse>>, AppError> {
    let projects = projects::list_projects_for_owner(&state.pool, user.id)
        .await
        .map_err(AppError::from)?;
    Ok(Json(projects.into_iter().map(Into::into).collect()))
}

pub async fn get_project(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(name): Path<String>,
) -> Result<Json<ProjectResponse>, AppError> {
    let project = projects::find_project_by_name(&state.pool, &name, Some(user.id))
        .await
        .map_err(AppError::from)?
        .ok_or(AppError::ProjectNotFound)?;
    Ok(Json(project.into()))
}

/// Renames a project. The write carries the production pointer the caller
/// read, so a promotion racing this rename surfaces as a 409 to retry.
pub async fn rename_project(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(name): Path<String>,
    Json(payload): Json<RenameProjectRequest>,
) -> Result<Json<ProjectResponse>, AppError> {
    payload.validate()?;

    let project = projects::find_project_by_name(&state.pool, &name, Some(user.id))
        .await
        .map_err(AppError::from)?
        .ok_or(AppError::ProjectNotFound)?;

    if payload.name != project.name
        && !projects::is_unique_name(&state.pool, &payload.name)
            .await
            .map_err(AppError::from)?
    {
        return Err(AppError::Validation(vec!["name: already_taken".to_string()]));
    }

    let renamed = projects::rename_project_guarded(
        &state.pool,
        project.id,
        &payload.name,
        project.prod_deployment_id,
    )
    .await?;
    info!(
        project_id = %renamed.id,
        old_name = %name,
        new_name = %renamed.name,
        "Renamed project"
    );
    Ok(Json(renamed.into()))
}

/// Deletes a project and its deployments, guarded like rename.
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(name): Path<String>,
) -> Result<StatusCode, AppError> {
    let project = projects::find_project_by_name(&state.pool, &name, Some(user.id))
        .await
        .map_err(AppError::from)?
        .ok_or(AppError::ProjectNotFound)?;

    projects::delete_project_guarded(&state.pool, project.id, project.prod_deployment_id).await?;
    info!(project_id = %project.id, project_name = %name, "Removed project");
    Ok(StatusCode::NO_CONTENT)
}
