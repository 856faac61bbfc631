//! Promotion coordinator.
//!
//! Enforces the project-level invariant that at most one deployment is
//! production at a time. The swap is a single transaction compare-and-set
//! against the `prod_deployment_id` the coordinator read; a losing racer
//! observes `ConcurrentModification` and retries against fresh state
//! instead of overwriting it.

use tracing::info;

use crate::error::AppError;
use crate::models::deployment::DeployStatus;
use crate::models::project::Project;
use crate::repositories::DeploymentStore;
use crate::types::{DeploymentId, ProjectId};

/// Promotes a deployment to production for its project.
///
/// Promoting the deployment that is already production is an idempotent
/// no-op, which guards the dashboard re-submitting a promotion.
pub async fn promote(
    store: &dyn DeploymentStore,
    project_id: ProjectId,
    deployment_id: DeploymentId,
) -> Result<Project, AppError> {
    let project = store
        .find_project(project_id)
        .await?
        .ok_or(AppError::ProjectNotFound)?;
    let deployment = store
        .find_deployment(deployment_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Deployment not found".to_string()))?;

    if deployment.project_id != project.id {
        return Err(AppError::ProjectMismatch);
    }
    if deployment.deploy_status != DeployStatus::Success {
        return Err(AppError::DeploymentNotReady);
    }
    if !deployment.is_serving() {
        return Err(AppError::DeploymentNotReady);
    }

    if project.prod_deployment_id == Some(deployment_id) {
        return Ok(project);
    }

    let updated = store.swap_production(&project, &deployment).await?;
    info!(
        project_id = %updated.id,
        deployment_id = %deployment_id,
        previous = ?project.prod_deployment_id,
        "Promoted deployment to production"
    );
    Ok(updated)
}
