//! Deployment state machine.
//!
//! `deploy_status` moves exactly once from `deploying` to a terminal
//! outcome; `status` toggles between serving and disabled once the build
//! has succeeded. Disabling the production deployment clears the project's
//! production pointer in the same atomic operation.

use tracing::info;

use crate::error::AppError;
use crate::models::deployment::{BuildOutcome, DeployStatus, Deployment};
use crate::repositories::DeploymentStore;
use crate::types::{DeploymentId, ProjectId};

/// Creates a deployment in the `deploying` state.
pub async fn create(
    store: &dyn DeploymentStore,
    project_id: ProjectId,
) -> Result<Deployment, AppError> {
    let project = store
        .find_project(project_id)
        .await?
        .ok_or(AppError::ProjectNotFound)?;
    let deployment = store.create_deployment(&project).await?;
    info!(
        project_id = %project.id,
        deployment_id = %deployment.id,
        sequence = deployment.sequence,
        "Created deployment"
    );
    Ok(deployment)
}

/// Records the terminal build outcome reported by the build collaborator.
pub async fn mark_build_result(
    store: &dyn DeploymentStore,
    id: DeploymentId,
    outcome: BuildOutcome,
    message: &str,
) -> Result<Deployment, AppError> {
    store
        .find_deployment(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Deployment not found".to_string()))?;

    let updated = store
        .mark_build_result(id, outcome.as_deploy_status(), message)
        .await?
        .ok_or_else(|| {
            AppError::InvalidTransition("build result already recorded".to_string())
        })?;
    info!(
        deployment_id = %updated.id,
        deploy_status = updated.deploy_status.as_str(),
        "Recorded build result"
    );
    Ok(updated)
}

/// Re-activates a disabled deployment. Does not restore production status.
pub async fn enable(store: &dyn DeploymentStore, id: DeploymentId) -> Result<Deployment, AppError> {
    let deployment = store
        .find_deployment(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Deployment not found".to_string()))?;

    if deployment.deploy_status != DeployStatus::Success {
        return Err(AppError::DeploymentNotReady);
    }
    if deployment.is_serving() {
        return Err(AppError::InvalidTransition(
            "deployment is already active".to_string(),
        ));
    }

    store
        .activate_deployment(id)
        .await?
        .ok_or(AppError::ConcurrentModification)
}

/// Stops a deployment from serving. When it is the production deployment,
/// production is cleared in the same atomic operation rather than left
/// pointing at disabled code.
pub async fn disable(
    store: &dyn DeploymentStore,
    id: DeploymentId,
) -> Result<Deployment, AppError> {
    let deployment = store
        .find_deployment(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Deployment not found".to_string()))?;

    if deployment.deploy_status != DeployStatus::Success {
        return Err(AppError::DeploymentNotReady);
    }
    if !deployment.is_serving() {
        return Err(AppError::InvalidTransition(
            "deployment is already inactive".to_string(),
        ));
    }

    let updated = store.disable_deployment(&deployment).await?;
    if deployment.is_prod {
        info!(
            deployment_id = %updated.id,
            project_id = %updated.project_id,
            "Disabled production deployment, production cleared"
        );
    }
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::deployment::DeploymentStatus;
    use crate::models::project::{Language, Project};
    use crate::repositories::deployment_store::MockDeploymentStore;
    use crate::types::UserId;

    fn fixture_project() -> Project {
        Project::new(
            UserId::new(),
            "misty-valley-42".into(),
            Language::Javascript,
            "local.dev".into(),
        )
    }

    fn fixture_deployment(project: &Project, deploy_status: DeployStatus) -> Deployment {
        Deployment {
            deploy_status,
            ..Deployment::new(project, 1)
        }
    }

    #[tokio::test]
    async fn create_requires_an_existing_project() {
        let mut store = MockDeploymentStore::new();
        store.expect_find_project().returning(|_| Ok(None));
        store.expect_create_deployment().never();

        let err = create(&store, ProjectId::new()).await.unwrap_err();
        assert!(matches!(err, AppError::ProjectNotFound));
    }

    #[tokio::test]
    async fn create_starts_in_deploying() {
        let project = fixture_project();
        let project_id = project.id;

        let mut store = MockDeploymentStore::new();
        let found = project.clone();
        store
            .expect_find_project()
            .returning(move |_| Ok(Some(found.clone())));
        store
            .expect_create_deployment()
            .times(1)
            .returning(|p| Ok(Deployment::new(p, 1)));

        let deployment = create(&store, project_id).await.expect("create");
        assert_eq!(deployment.deploy_status, DeployStatus::Deploying);
        assert_eq!(deployment.project_id, project_id);
    }

    #[tokio::test]
    async fn build_result_is_recorded_once() {
        let project = fixture_project();
        let deployment = fixture_deployment(&project, DeployStatus::Deploying);
        let id = deployment.id;

        let mut store = MockDeploymentStore::new();
        let found = deployment.clone();
        store
            .expect_find_deployment()
            .returning(move |_| Ok(Some(found.clone())));
        // the conditional update misses: the transition already happened
        store
            .expect_mark_build_result()
            .times(1)
            .returning(|_, _, _| Ok(None));

        let err = mark_build_result(&store, id, BuildOutcome::Success, "built")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
    }

    #[tokio::test]
    async fn enable_rejects_unbuilt_deployments() {
        let project = fixture_project();
        let deployment = fixture_deployment(&project, DeployStatus::Deploying);
        let id = deployment.id;

        let mut store = MockDeploymentStore::new();
        let found = deployment.clone();
        store
            .expect_find_deployment()
            .returning(move |_| Ok(Some(found.clone())));
        store.expect_activate_deployment().never();

        let err = enable(&store, id).await.unwrap_err();
        assert!(matches!(err, AppError::DeploymentNotReady));
    }

    #[tokio::test]
    async fn enable_rejects_already_active_deployments() {
        let project = fixture_project();
        let deployment = fixture_deployment(&project, DeployStatus::Success);
        let id = deployment.id;

        let mut store = MockDeploymentStore::new();
        let found = deployment.clone();
        store
            .expect_find_deployment()
            .returning(move |_| Ok(Some(found.clone())));
        store.expect_activate_deployment().never();

        let err = enable(&store, id).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
    }

    #[tokio::test]
    async fn enable_reactivates_inactive_builds() {
        let project = fixture_project();
        let mut deployment = fixture_deployment(&project, DeployStatus::Success);
        deployment.status = DeploymentStatus::Inactive;
        let id = deployment.id;

        let mut store = MockDeploymentStore::new();
        let found = deployment.clone();
        store
            .expect_find_deployment()
            .returning(move |_| Ok(Some(found.clone())));
        let activated = Deployment {
            status: DeploymentStatus::Active,
            ..deployment.clone()
        };
        store
            .expect_activate_deployment()
            .times(1)
            .returning(move |_| Ok(Some(activated.clone())));

        let result = enable(&store, id).await.expect("enable");
        assert_eq!(result.status, DeploymentStatus::Active);
        assert!(!result.is_prod);
    }

    #[tokio::test]
    async fn disable_rejects_failed_builds() {
        let project = fixture_project();
        let deployment = fixture_deployment(&project, DeployStatus::Failed);
        let id = deployment.id;

        let mut store = MockDeploymentStore::new();
        let found = deployment.clone();
        store
            .expect_find_deployment()
            .returning(move |_| Ok(Some(found.clone())));
        store.expect_disable_deployment().never();

        let err = disable(&store, id).await.unwrap_err();
        assert!(matches!(err, AppError::DeploymentNotReady));
    }

    #[tokio::test]
    async fn disable_cascades_through_the_store_for_prod_deployments() {
        let project = fixture_project();
        let mut deployment = fixture_deployment(&project, DeployStatus::Success);
        deployment.is_prod = true;
        let id = deployment.id;

        let mut store = MockDeploymentStore::new();
        let found = deployment.clone();
        store
            .expect_find_deployment()
            .returning(move |_| Ok(Some(found.clone())));
        let disabled = Deployment {
            status: DeploymentStatus::Inactive,
            is_prod: false,
            ..deployment.clone()
        };
        store
            .expect_disable_deployment()
            .withf(move |d| d.id == id && d.is_prod)
            .times(1)
            .returning(move |_| Ok(disabled.clone()));

        let result = disable(&store, id).await.expect("disable");
        assert_eq!(result.status, DeploymentStatus::Inactive);
        assert!(!result.is_prod);
    }

    #[tokio::test]
    async fn disable_surfaces_a_lost_race() {
        let project = fixture_project();
        let deployment = fixture_deployment(&project, DeployStatus::Success);
        let id = deployment.id;

        let mut store = MockDeploymentStore::new();
        let found = deployment.clone();
        store
            .expect_find_deployment()
            .returning(move |_| Ok(Some(found.clone())));
        store
            .expect_disable_deployment()
            .returning(|_| Err(AppError::ConcurrentModification));

        let err = disable(&store, id).await.unwrap_err();
        assert!(matches!(err, AppError::ConcurrentModification));
    }
}
