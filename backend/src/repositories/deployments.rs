use sqlx::PgPool;

use crate::models::deployment::Deployment;
use crate::types::{DeploymentId, ProjectId};

pub const SELECT_COLUMNS: &str = "id, project_id, owner_id, sequence, preview_url, status, \
                                  deploy_status, deploy_message, is_prod, created_at, updated_at";

pub async fn find_deployment_by_id(
    pool: &PgPool,
    id: DeploymentId,
) -> Result<Option<Deployment>, sqlx::Error> {
    let query = format!("SELECT {} FROM deployments WHERE id = $1", SELECT_COLUMNS);
    sqlx::query_as::<_, Deployment>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_deployments_for_project(
    pool: &PgPool,
    project_id: ProjectId,
) -> Result<Vec<Deployment>, sqlx::Error> {
    let query = format!(
        "SELECT {} FROM deployments WHERE project_id = $1 ORDER BY sequence DESC",
        SELECT_COLUMNS
    );
    sqlx::query_as::<_, Deployment>(&query)
        .bind(project_id)
        .fetch_all(pool)
        .await
}

pub async fn count_deployments(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM deployments")
        .fetch_one(pool)
        .await
}
