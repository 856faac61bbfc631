//! Deployment/project store seam.
//!
//! The deployment state machine and the promotion coordinator read records,
//! check preconditions, then delegate to one of these atomic write
//! operations. Every write that depends on previously read state carries
//! that state in its WHERE clause, so a racing writer is detected by an
//! empty update instead of silently overwritten.

use async_trait::async_trait;
use chrono::Utc;

use crate::db::connection::DbPool;
use crate::error::AppError;
use crate::models::deployment::{DeployStatus, Deployment};
use crate::models::project::Project;
use crate::repositories::deployments::SELECT_COLUMNS as DEPLOYMENT_COLUMNS;
use crate::repositories::transaction::{begin_transaction, commit_transaction};
use crate::repositories::{deployments, projects};
use crate::types::{DeploymentId, ProjectId};

const PROJECT_COLUMNS: &str = "id, owner_id, name, language, status, subdomain_suffix, \
                               prod_deployment_id, deployment_counter, created_at, updated_at";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeploymentStore: Send + Sync {
    async fn find_project(&self, id: ProjectId) -> Result<Option<Project>, AppError>;

    async fn find_deployment(&self, id: DeploymentId) -> Result<Option<Deployment>, AppError>;

    /// Inserts a deployment in the `deploying` state, drawing the next
    /// sequence number from the project counter and flipping a pending
    /// project to ready, all in one transaction.
    async fn create_deployment(&self, project: &Project) -> Result<Deployment, AppError>;

    /// Records the terminal build outcome. Returns `None` when the
    /// deployment is no longer in the `deploying` state, i.e. the
    /// transition already happened.
    async fn mark_build_result(
        &self,
        id: DeploymentId,
        deploy_status: DeployStatus,
        message: &str,
    ) -> Result<Option<Deployment>, AppError>;

    /// Re-activates an inactive, successfully built deployment. Returns
    /// `None` when the expected state moved underneath the caller.
    async fn activate_deployment(&self, id: DeploymentId)
        -> Result<Option<Deployment>, AppError>;

    /// Deactivates a deployment; when it is the project's production
    /// deployment, clears `prod_deployment_id` in the same transaction so
    /// production never points at disabled code.
    async fn disable_deployment(&self, deployment: &Deployment) -> Result<Deployment, AppError>;

    /// Atomically points the project at `target` and flips the `is_prod`
    /// markers, compare-and-set against the `prod_deployment_id` the caller
    /// read. A lost race fails with `ConcurrentModification`.
    async fn swap_production(
        &self,
        project: &Project,
        target: &Deployment,
    ) -> Result<Project, AppError>;
}

pub struct PgDeploymentStore {
    pool: DbPool,
}

impl PgDeploymentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeploymentStore for PgDeploymentStore {
    async fn find_project(&self, id: ProjectId) -> Result<Option<Project>, AppError> {
        Ok(projects::find_project_by_id(&self.pool, id).await?)
    }

    async fn find_deployment(&self, id: DeploymentId) -> Result<Option<Deployment>, AppError> {
        Ok(deployments::find_deployment_by_id(&self.pool, id).await?)
    }

    async fn create_deployment(&self, project: &Project) -> Result<Deployment, AppError> {
        let now = Utc::now();
        let mut tx = begin_transaction(&self.pool).await?;

        let sequence: Option<i32> = sqlx::query_scalar(
            "UPDATE projects \
             SET deployment_counter = deployment_counter + 1, status = 'ready', updated_at = $2 \
             WHERE id = $1 \
             RETURNING deployment_counter",
        )
        .bind(project.id)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;
        let sequence = sequence.ok_or(AppError::ProjectNotFound)?;

        let deployment = Deployment::new(project, sequence);
        let query = format!(
            "INSERT INTO deployments \
                (id, project_id, owner_id, sequence, preview_url, status, deploy_status, \
                 deploy_message, is_prod, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {}",
            DEPLOYMENT_COLUMNS
        );
        let inserted = sqlx::query_as::<_, Deployment>(&query)
            .bind(deployment.id)
            .bind(deployment.project_id)
            .bind(deployment.owner_id)
            .bind(deployment.sequence)
            .bind(&deployment.preview_url)
            .bind(deployment.status)
            .bind(deployment.deploy_status)
            .bind(&deployment.deploy_message)
            .bind(deployment.is_prod)
            .bind(deployment.created_at)
            .bind(deployment.updated_at)
            .fetch_one(&mut *tx)
            .await?;

        commit_transaction(tx).await?;
        Ok(inserted)
    }

    async fn mark_build_result(
        &self,
        id: DeploymentId,
        deploy_status: DeployStatus,
        message: &str,
    ) -> Result<Option<Deployment>, AppError> {
        let query = format!(
            "UPDATE deployments \
             SET deploy_status = $2, deploy_message = $3, updated_at = $4 \
             WHERE id = $1 AND deploy_status = 'deploying' \
             RETURNING {}",
            DEPLOYMENT_COLUMNS
        );
        let updated = sqlx::query_as::<_, Deployment>(&query)
            .bind(id)
            .bind(deploy_status)
            .bind(message)
            .bind(Utc::now())
            .fetch_optional(&*self.pool)
            .await?;
        Ok(updated)
    }

    async fn activate_deployment(
        &self,
        id: DeploymentId,
    ) -> Result<Option<Deployment>, AppError> {
        let query = format!(
            "UPDATE deployments \
             SET status = 'active', updated_at = $2 \
             WHERE id = $1 AND deploy_status = 'success' AND status = 'inactive' \
             RETURNING {}",
            DEPLOYMENT_COLUMNS
        );
        let updated = sqlx::query_as::<_, Deployment>(&query)
            .bind(id)
            .bind(Utc::now())
            .fetch_optional(&*self.pool)
            .await?;
        Ok(updated)
    }

    async fn disable_deployment(&self, deployment: &Deployment) -> Result<Deployment, AppError> {
        let now = Utc::now();
        let mut tx = begin_transaction(&self.pool).await?;

        // lock the row so the prod check and the demotion see one state
        let lock_query = format!(
            "SELECT {} FROM deployments WHERE id = $1 FOR UPDATE",
            DEPLOYMENT_COLUMNS
        );
        let locked = sqlx::query_as::<_, Deployment>(&lock_query)
            .bind(deployment.id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Deployment not found".to_string()))?;

        if locked.deploy_status != DeployStatus::Success {
            return Err(AppError::DeploymentNotReady);
        }
        if !locked.is_serving() {
            // it was serving when the caller read it
            return Err(AppError::ConcurrentModification);
        }

        let update_query = format!(
            "UPDATE deployments \
             SET status = 'inactive', is_prod = FALSE, updated_at = $2 \
             WHERE id = $1 \
             RETURNING {}",
            DEPLOYMENT_COLUMNS
        );
        let updated = sqlx::query_as::<_, Deployment>(&update_query)
            .bind(deployment.id)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;

        if locked.is_prod {
            let result = sqlx::query(
                "UPDATE projects SET prod_deployment_id = NULL, updated_at = $2 \
                 WHERE id = $1 AND prod_deployment_id = $3",
            )
            .bind(locked.project_id)
            .bind(now)
            .bind(locked.id)
            .execute(&mut *tx)
            .await?;
            if result.rows_affected() == 0 {
                // a promotion moved the pointer; dropping tx rolls back
                return Err(AppError::ConcurrentModification);
            }
        }

        commit_transaction(tx).await?;
        Ok(updated)
    }

    async fn swap_production(
        &self,
        project: &Project,
        target: &Deployment,
    ) -> Result<Project, AppError> {
        let now = Utc::now();
        let mut tx = begin_transaction(&self.pool).await?;

        let project_query = format!(
            "UPDATE projects SET prod_deployment_id = $2, updated_at = $3 \
             WHERE id = $1 AND prod_deployment_id IS NOT DISTINCT FROM $4 \
             RETURNING {}",
            PROJECT_COLUMNS
        );
        let updated = sqlx::query_as::<_, Project>(&project_query)
            .bind(project.id)
            .bind(target.id)
            .bind(now)
            .bind(project.prod_deployment_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(AppError::ConcurrentModification)?;

        let result = sqlx::query(
            "UPDATE deployments SET is_prod = TRUE, updated_at = $2 \
             WHERE id = $1 AND project_id = $3 \
               AND deploy_status = 'success' AND status = 'active'",
        )
        .bind(target.id)
        .bind(now)
        .bind(project.id)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            // the target stopped being promotable since the caller read it
            return Err(AppError::DeploymentNotReady);
        }

        if let Some(prev) = project.prod_deployment_id {
            sqlx::query("UPDATE deployments SET is_prod = FALSE, updated_at = $2 WHERE id = $1")
                .bind(prev)
                .bind(now)
                .execute(&mut *tx)
                .await?;
        }

        commit_transaction(tx).await?;
        Ok(updated)
    }
}
