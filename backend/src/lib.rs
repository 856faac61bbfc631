pub mod config;
pub mod db;
pub mod docs;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod services;
pub mod state;
pub mod types;
pub mod validation;

use axum::{
    http::Method,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::state::AppState;

/// Builds the control-plane router with all route groups and shared layers.
pub fn app(state: AppState) -> Router {
    // Session reissue is the only public mutating route
    let public_routes = Router::new().route("/api/session", post(handlers::session::issue));

    // User routes (session auth required)
    let session_routes = Router::new()
        .route(
            "/api/session",
            get(handlers::session::current).delete(handlers::session::revoke),
        )
        .route(
            "/api/projects",
            post(handlers::projects::create_project).get(handlers::projects::list_projects),
        )
        .route(
            "/api/projects/{name}",
            get(handlers::projects::get_project).delete(handlers::projects::delete_project),
        )
        .route(
            "/api/projects/{name}/name",
            put(handlers::projects::rename_project),
        )
        .route(
            "/api/projects/{name}/deployments",
            post(handlers::deployments::create_deployment)
                .get(handlers::deployments::list_deployments),
        )
        .route(
            "/api/deployments/{id}/enable",
            post(handlers::deployments::enable_deployment),
        )
        .route(
            "/api/deployments/{id}/disable",
            post(handlers::deployments::disable_deployment),
        )
        .route(
            "/api/deployments/{id}/promote",
            post(handlers::deployments::promote_deployment),
        )
        .route(
            "/api/tokens",
            post(handlers::tokens::create_token).get(handlers::tokens::list_tokens),
        )
        .route("/api/tokens/{id}", delete(handlers::tokens::delete_token))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth,
        ));

    // Build collaborator routes (deployment token auth)
    let worker_routes = Router::new()
        .route(
            "/api/deployments/{id}/result",
            post(handlers::deployments::build_result),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_worker,
        ));

    // Admin routes (session auth + admin role)
    let admin_routes = Router::new()
        .route("/api/admin/overview", get(handlers::admin::overview))
        .route("/api/admin/projects", get(handlers::admin::list_projects))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_admin,
        ));

    Router::new()
        .merge(public_routes)
        .merge(session_routes)
        .merge(worker_routes)
        .merge(admin_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods([
                            Method::GET,
                            Method::POST,
                            Method::PUT,
                            Method::DELETE,
                            Method::OPTIONS,
                        ])
                        .allow_headers(Any)
                        .max_age(std::time::Duration::from_secs(24 * 60 * 60)),
                ),
        )
        .layer(axum_middleware::from_fn(middleware::request_id))
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
}
