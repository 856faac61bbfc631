//! Router-level auth behavior: every protected route rejects requests that
//! present no usable credential, before touching any store.

mod support;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use tower::ServiceExt;

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

fn request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

#[tokio::test]
async fn session_routes_reject_missing_bearer() {
    let app = stratus_backend::app(support::test_state());

    for (method, uri) in [
        (Method::GET, "/api/session"),
        (Method::GET, "/api/projects"),
        (Method::GET, "/api/tokens"),
        (
            Method::DELETE,
            "/api/tokens/7e2c9f6a-0000-0000-0000-000000000001",
        ),
        (
            Method::POST,
            "/api/deployments/7e2c9f6a-0000-0000-0000-000000000001/promote",
        ),
    ] {
        let response = app
            .clone()
            .oneshot(request(method.clone(), uri))
            .await
            .expect("response");
        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "{} {} should 401",
            method,
            uri
        );
        let json = response_json(response).await;
        assert_eq!(json["code"], "NO_SESSION");
    }
}

#[tokio::test]
async fn non_bearer_schemes_are_rejected() {
    let app = stratus_backend::app(support::test_state());

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/api/projects")
                .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn worker_route_requires_a_deployment_token() {
    let app = stratus_backend::app(support::test_state());

    let response = app
        .oneshot(request(
            Method::POST,
            "/api/deployments/7e2c9f6a-0000-0000-0000-000000000001/result",
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = response_json(response).await;
    assert_eq!(json["code"], "NO_SESSION");
}

#[tokio::test]
async fn admin_routes_require_a_session() {
    let app = stratus_backend::app(support::test_state());

    for uri in ["/api/admin/overview", "/api/admin/projects"] {
        let response = app
            .clone()
            .oneshot(request(Method::GET, uri))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
    }
}

#[tokio::test]
async fn unknown_routes_are_not_found() {
    let app = stratus_backend::app(support::test_state());

    let response = app
        .oneshot(request(Method::GET, "/api/unknown"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
