#![allow(dead_code)] // OpenAPI doc stubs are only referenced by utoipa macros.

use crate::{
    handlers::admin::AdminOverviewResponse,
    identity::IdentityClaims,
    models::{
        deployment::{
            BuildOutcome, BuildResultRequest, DeployStatus, DeploymentResponse, DeploymentStatus,
        },
        deployment_token::{CreateTokenRequest, TokenResponse},
        project::{
            CreateProjectRequest, Language, ProjectResponse, ProjectStatus, RenameProjectRequest,
        },
        session_token::SessionResponse,
        user::{UserResponse, UserRole},
        PaginationQuery,
    },
};
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        issue_session_doc,
        current_session_doc,
        revoke_session_doc,
        create_project_doc,
        list_projects_doc,
        get_project_doc,
        rename_project_doc,
        delete_project_doc,
        create_deployment_doc,
        list_deployments_doc,
        build_result_doc,
        enable_deployment_doc,
        disable_deployment_doc,
        promote_deployment_doc,
        create_token_doc,
        list_tokens_doc,
        delete_token_doc,
        admin_overview_doc,
        admin_projects_doc
    ),
    components(
        schemas(
            // session
            IdentityClaims,
            SessionResponse,
            UserResponse,
            UserRole,
            // projects
            CreateProjectRequest,
            RenameProjectRequest,
            ProjectResponse,
            ProjectStatus,
            Language,
            // deployments
            DeploymentResponse,
            DeployStatus,
            DeploymentStatus,
            BuildOutcome,
            BuildResultRequest,
            // tokens
            CreateTokenRequest,
            TokenResponse,
            // admin
            AdminOverviewResponse,
            PaginationQuery
        )
    ),
    modifiers(&SecuritySchemes),
    tags(
        (name = "Session", description = "Session issue, authorize and sign-out"),
        (name = "Projects", description = "Project CRUD"),
        (name = "Deployments", description = "Deployment lifecycle and promotion"),
        (name = "Tokens", description = "Deployment token CRUD"),
        (name = "Admin", description = "Platform-wide aggregates")
    ),
    security(("BearerAuth" = []))
)]
pub struct ApiDoc;

struct SecuritySchemes;

impl Modify for SecuritySchemes {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();

        let mut bearer = Http::new(HttpAuthScheme::Bearer);
        bearer.bearer_format = Some("opaque".to_string());

        components.add_security_scheme("BearerAuth", SecurityScheme::Http(bearer));
    }
}

#[utoipa::path(
    post,
    path = "/api/session",
    request_body = IdentityClaims,
    responses(
        (status = 200, description = "Session issued", body = SessionResponse),
        (status = 401, description = "Identity claims rejected")
    ),
    tag = "Session",
    security(())
)]
fn issue_session_doc() {}

#[utoipa::path(
    get,
    path = "/api/session",
    responses(
        (status = 200, description = "Current session", body = SessionResponse),
        (status = 401, description = "No usable session")
    ),
    tag = "Session"
)]
fn current_session_doc() {}

#[utoipa::path(
    delete,
    path = "/api/session",
    responses((status = 204, description = "Session revoked")),
    tag = "Session"
)]
fn revoke_session_doc() {}

#[utoipa::path(
    post,
    path = "/api/projects",
    request_body = CreateProjectRequest,
    responses((status = 200, description = "Project created", body = ProjectResponse)),
    tag = "Projects"
)]
fn create_project_doc() {}

#[utoipa::path(
    get,
    path = "/api/projects",
    responses((status = 200, body = Vec<ProjectResponse>)),
    tag = "Projects"
)]
fn list_projects_doc() {}

#[utoipa::path(
    get,
    path = "/api/projects/{name}",
    responses((status = 200, body = ProjectResponse), (status = 404, description = "Unknown project")),
    tag = "Projects"
)]
fn get_project_doc() {}

#[utoipa::path(
    put,
    path = "/api/projects/{name}/name",
    request_body = RenameProjectRequest,
    responses(
        (status = 200, body = ProjectResponse),
        (status = 409, description = "A promotion raced the rename; retry")
    ),
    tag = "Projects"
)]
fn rename_project_doc() {}

#[utoipa::path(
    delete,
    path = "/api/projects/{name}",
    responses(
        (status = 204, description = "Project and deployments removed"),
        (status = 409, description = "A promotion raced the removal; retry")
    ),
    tag = "Projects"
)]
fn delete_project_doc() {}

#[utoipa::path(
    post,
    path = "/api/projects/{name}/deployments",
    responses((status = 200, description = "Deployment created in deploying state", body = DeploymentResponse)),
    tag = "Deployments"
)]
fn create_deployment_doc() {}

#[utoipa::path(
    get,
    path = "/api/projects/{name}/deployments",
    responses((status = 200, body = Vec<DeploymentResponse>)),
    tag = "Deployments"
)]
fn list_deployments_doc() {}

#[utoipa::path(
    post,
    path = "/api/deployments/{id}/result",
    request_body = BuildResultRequest,
    responses(
        (status = 200, body = DeploymentResponse),
        (status = 422, description = "Build result already recorded")
    ),
    tag = "Deployments"
)]
fn build_result_doc() {}

#[utoipa::path(
    post,
    path = "/api/deployments/{id}/enable",
    responses(
        (status = 200, body = DeploymentResponse),
        (status = 422, description = "Deployment not ready or already active")
    ),
    tag = "Deployments"
)]
fn enable_deployment_doc() {}

#[utoipa::path(
    post,
    path = "/api/deployments/{id}/disable",
    responses(
        (status = 200, body = DeploymentResponse),
        (status = 422, description = "Deployment not ready or already inactive")
    ),
    tag = "Deployments"
)]
fn disable_deployment_doc() {}

#[utoipa::path(
    post,
    path = "/api/deployments/{id}/promote",
    responses(
        (status = 200, description = "Project with the new production pointer", body = ProjectResponse),
        (status = 409, description = "Lost a promotion race; retry"),
        (status = 422, description = "Deployment not promotable")
    ),
    tag = "Deployments"
)]
fn promote_deployment_doc() {}

#[utoipa::path(
    post,
    path = "/api/tokens",
    request_body = CreateTokenRequest,
    responses((status = 200, description = "Token with its secret, shown once", body = TokenResponse)),
    tag = "Tokens"
)]
fn create_token_doc() {}

#[utoipa::path(
    get,
    path = "/api/tokens",
    responses((status = 200, description = "Token metadata, no secrets", body = Vec<TokenResponse>)),
    tag = "Tokens"
)]
fn list_tokens_doc() {}

#[utoipa::path(
    delete,
    path = "/api/tokens/{id}",
    responses((status = 204, description = "Token removed")),
    tag = "Tokens"
)]
fn delete_token_doc() {}

#[utoipa::path(
    get,
    path = "/api/admin/overview",
    responses((status = 200, body = AdminOverviewResponse)),
    tag = "Admin"
)]
fn admin_overview_doc() {}

#[utoipa::path(
    get,
    path = "/api/admin/projects",
    params(PaginationQuery),
    responses((status = 200, description = "Paginated platform-wide project list")),
    tag = "Admin"
)]
fn admin_projects_doc() {}
