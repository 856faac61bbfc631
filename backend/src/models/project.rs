//! Project model: the unit that owns deployments and a production pointer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::types::{DeploymentId, ProjectId, UserId};
use crate::validation::rules::validate_project_name;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
/// Database representation of a project.
///
/// `prod_deployment_id` is mutated only by the promotion coordinator and the
/// disable cascade; all writers compare-and-set against the value they read.
pub struct Project {
    pub id: ProjectId,
    pub owner_id: UserId,
    pub name: String,
    pub language: Language,
    pub status: ProjectStatus,
    pub subdomain_suffix: String,
    pub prod_deployment_id: Option<DeploymentId>,
    /// Monotonic counter handing out deployment sequence numbers.
    pub deployment_counter: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default, ToSchema)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Javascript,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Javascript => "javascript",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default, ToSchema)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
/// A project starts `pending` and becomes `ready` once its first deployment
/// is created.
pub enum ProjectStatus {
    #[default]
    Pending,
    Ready,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Pending => "pending",
            ProjectStatus::Ready => "ready",
        }
    }
}

impl Project {
    pub fn new(
        owner_id: UserId,
        name: String,
        language: Language,
        subdomain_suffix: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ProjectId::new(),
            owner_id,
            name,
            language,
            status: ProjectStatus::Pending,
            subdomain_suffix,
            prod_deployment_id: None,
            deployment_counter: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// URL the production deployment serves at.
    pub fn prod_url(&self) -> String {
        format!("https://{}.{}", self.name, self.subdomain_suffix)
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
/// Payload for creating a project. A missing name is generated server-side.
pub struct CreateProjectRequest {
    #[validate(custom(function = validate_project_name))]
    pub name: Option<String>,
    #[serde(default)]
    pub language: Language,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
/// Payload for renaming a project.
pub struct RenameProjectRequest {
    #[validate(custom(function = validate_project_name))]
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
/// Public-facing representation of a project.
pub struct ProjectResponse {
    pub id: String,
    pub name: String,
    pub language: String,
    pub status: String,
    pub prod_deployment_id: Option<String>,
    pub prod_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Project> for ProjectResponse {
    fn from(project: Project) -> Self {
        let prod_url = project.prod_url();
        ProjectResponse {
            id: project.id.to_string(),
            name: project.name,
            language: project.language.as_str().to_string(),
            status: project.status.as_str().to_string(),
            prod_deployment_id: project.prod_deployment_id.map(|id| id.to_string()),
            prod_url,
            created_at: project.created_at,
            updated_at: project.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_project_is_pending_without_production() {
        let project = Project::new(
            UserId::new(),
            "misty-valley-42".into(),
            Language::Javascript,
            "local.dev".into(),
        );
        assert_eq!(project.status, ProjectStatus::Pending);
        assert!(project.prod_deployment_id.is_none());
        assert_eq!(project.deployment_counter, 0);
    }

    #[test]
    fn prod_url_combines_name_and_suffix() {
        let project = Project::new(
            UserId::new(),
            "misty-valley-42".into(),
            Language::Javascript,
            "local.dev".into(),
        );
        assert_eq!(project.prod_url(), "https://misty-valley-42.local.dev");
    }

    #[test]
    fn status_serde_is_lowercase() {
        assert_eq!(
            serde_json::to_value(ProjectStatus::Pending).unwrap(),
            serde_json::json!("pending")
        );
        assert_eq!(
            serde_json::to_value(ProjectStatus::Ready).unwrap(),
            serde_json::json!("ready")
        );
    }
}
