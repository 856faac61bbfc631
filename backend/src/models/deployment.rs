//! Deployment model and its two independent state dimensions.
//!
//! `deploy_status` records the build outcome and transitions exactly once
//! out of `deploying`. `status` records whether the deployment is serving
//! and may toggle freely once the build has succeeded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::project::Project;
use crate::types::{DeploymentId, ProjectId, UserId};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
/// Database representation of a deployment.
pub struct Deployment {
    pub id: DeploymentId,
    pub project_id: ProjectId,
    pub owner_id: UserId,
    /// Per-project sequence number, handed out by the project counter.
    pub sequence: i32,
    pub preview_url: String,
    pub status: DeploymentStatus,
    pub deploy_status: DeployStatus,
    pub deploy_message: String,
    /// Cached mirror of `Project.prod_deployment_id` pointing here.
    pub is_prod: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DeployStatus {
    Deploying,
    Success,
    Failed,
}

impl DeployStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeployStatus::Deploying => "deploying",
            DeployStatus::Success => "success",
            DeployStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DeploymentStatus {
    Active,
    Inactive,
}

impl DeploymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentStatus::Active => "active",
            DeploymentStatus::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
/// Terminal build outcome reported by the build collaborator.
pub enum BuildOutcome {
    Success,
    Failed,
}

impl BuildOutcome {
    pub fn as_deploy_status(&self) -> DeployStatus {
        match self {
            BuildOutcome::Success => DeployStatus::Success,
            BuildOutcome::Failed => DeployStatus::Failed,
        }
    }
}

impl Deployment {
    /// Constructs a deployment in the `deploying` state for the given
    /// project and sequence number.
    pub fn new(project: &Project, sequence: i32) -> Self {
        let now = Utc::now();
        Self {
            id: DeploymentId::new(),
            project_id: project.id,
            owner_id: project.owner_id,
            sequence,
            preview_url: format!(
                "https://{}-{}.{}",
                project.name, sequence, project.subdomain_suffix
            ),
            status: DeploymentStatus::Active,
            deploy_status: DeployStatus::Deploying,
            deploy_message: "waiting for build".to_string(),
            is_prod: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// A deployment is ready once its build has succeeded.
    pub fn is_ready(&self) -> bool {
        self.deploy_status == DeployStatus::Success
    }

    pub fn is_serving(&self) -> bool {
        self.status == DeploymentStatus::Active
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
/// Payload reporting a build outcome.
pub struct BuildResultRequest {
    pub outcome: BuildOutcome,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
/// Public-facing representation of a deployment.
pub struct DeploymentResponse {
    pub id: String,
    pub project_id: String,
    pub sequence: i32,
    pub preview_url: String,
    pub status: String,
    pub deploy_status: String,
    pub deploy_message: String,
    pub is_prod: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Deployment> for DeploymentResponse {
    fn from(d: Deployment) -> Self {
        DeploymentResponse {
            id: d.id.to_string(),
            project_id: d.project_id.to_string(),
            sequence: d.sequence,
            preview_url: d.preview_url,
            status: d.status.as_str().to_string(),
            deploy_status: d.deploy_status.as_str().to_string(),
            deploy_message: d.deploy_message,
            is_prod: d.is_prod,
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::project::Language;
    use crate::types::UserId;

    fn fixture_project() -> Project {
        Project::new(
            UserId::new(),
            "misty-valley-42".into(),
            Language::Javascript,
            "local.dev".into(),
        )
    }

    #[test]
    fn new_deployment_starts_deploying_and_serving() {
        let deployment = Deployment::new(&fixture_project(), 3);
        assert_eq!(deployment.deploy_status, DeployStatus::Deploying);
        assert_eq!(deployment.status, DeploymentStatus::Active);
        assert!(!deployment.is_prod);
        assert!(!deployment.is_ready());
    }

    #[test]
    fn preview_url_includes_sequence() {
        let deployment = Deployment::new(&fixture_project(), 7);
        assert_eq!(
            deployment.preview_url,
            "https://misty-valley-42-7.local.dev"
        );
    }

    #[test]
    fn build_outcome_maps_to_terminal_states() {
        assert_eq!(
            BuildOutcome::Success.as_deploy_status(),
            DeployStatus::Success
        );
        assert_eq!(BuildOutcome::Failed.as_deploy_status(), DeployStatus::Failed);
    }

    #[test]
    fn deploy_status_serde_round_trip() {
        let status: DeployStatus = serde_json::from_str("\"deploying\"").unwrap();
        assert_eq!(status, DeployStatus::Deploying);
        assert_eq!(
            serde_json::to_value(DeployStatus::Failed).unwrap(),
            serde_json::json!("failed")
        );
    }
}
