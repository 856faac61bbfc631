use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Error taxonomy of the control plane.
///
/// Auth failures map to 401, ownership failures to 403, missing records to
/// 404, lost read-modify-write races to 409, and deterministic rejections of
/// illegal state-machine requests to 422. Only `ConcurrentModification` is
/// meant to be retried by callers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("No session")]
    NoSession,
    #[error("Session expired")]
    SessionExpired,
    #[error("Session verification failed")]
    VerificationFailed,
    #[error("Project not found")]
    ProjectNotFound,
    #[error("Deployment is not ready to serve")]
    DeploymentNotReady,
    #[error("Deployment does not belong to this project")]
    ProjectMismatch,
    #[error("{0}")]
    InvalidTransition(String),
    #[error("Concurrent modification, retry the request")]
    ConcurrentModification,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("Validation failed")]
    Validation(Vec<String>),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn code(&self) -> &'static str {
        match self {
            AppError::NoSession => "NO_SESSION",
            AppError::SessionExpired => "SESSION_EXPIRED",
            AppError::VerificationFailed => "VERIFICATION_FAILED",
            AppError::ProjectNotFound => "PROJECT_NOT_FOUND",
            AppError::DeploymentNotReady => "DEPLOYMENT_NOT_READY",
            AppError::ProjectMismatch => "PROJECT_MISMATCH",
            AppError::InvalidTransition(_) => "INVALID_TRANSITION",
            AppError::ConcurrentModification => "CONCURRENT_MODIFICATION",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::NoSession | AppError::SessionExpired | AppError::VerificationFailed => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::ProjectNotFound | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ConcurrentModification => StatusCode::CONFLICT,
            AppError::DeploymentNotReady
            | AppError::ProjectMismatch
            | AppError::InvalidTransition(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code().to_string();
        let (error, details) = match &self {
            AppError::Internal(err) => {
                tracing::error!("Internal server error: {:?}", err);
                ("Internal server error".to_string(), None)
            }
            AppError::Validation(errors) => (
                "Validation failed".to_string(),
                Some(serde_json::json!({ "errors": errors })),
            ),
            other => (other.to_string(), None),
        };

        let body = Json(ErrorResponse {
            error,
            code,
            details,
        });

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db) => {
                // serialization_failure / deadlock_detected surface as lost races
                let lost_race = matches!(db.code().as_deref(), Some("40001") | Some("40P01"));
                if lost_race {
                    AppError::ConcurrentModification
                } else {
                    AppError::Internal(sqlx::Error::Database(db).into())
                }
            }
            other => AppError::Internal(other.into()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    let code = e.code.as_ref();
                    format!("{}: {}", field, code)
                })
            })
            .collect();
        AppError::Validation(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn response_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json")
    }

    #[tokio::test]
    async fn auth_errors_map_to_unauthorized() {
        for (err, code) in [
            (AppError::NoSession, "NO_SESSION"),
            (AppError::SessionExpired, "SESSION_EXPIRED"),
            (AppError::VerificationFailed, "VERIFICATION_FAILED"),
        ] {
            let response = err.into_response();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            let json = response_json(response).await;
            assert_eq!(json["code"], code);
        }
    }

    #[tokio::test]
    async fn state_machine_errors_map_to_unprocessable() {
        let response = AppError::DeploymentNotReady.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = response_json(response).await;
        assert_eq!(json["code"], "DEPLOYMENT_NOT_READY");

        let response = AppError::InvalidTransition("build result already recorded".into())
            .into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = response_json(response).await;
        assert_eq!(json["error"], "build result already recorded");
        assert_eq!(json["code"], "INVALID_TRANSITION");

        let response = AppError::ProjectMismatch.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn concurrent_modification_maps_to_conflict() {
        let response = AppError::ConcurrentModification.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let json = response_json(response).await;
        assert_eq!(json["code"], "CONCURRENT_MODIFICATION");
    }

    #[tokio::test]
    async fn ownership_and_missing_records() {
        let response = AppError::Forbidden("not your project".into()).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = AppError::ProjectNotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = response_json(response).await;
        assert_eq!(json["code"], "PROJECT_NOT_FOUND");
    }

    #[tokio::test]
    async fn validation_includes_details() {
        let response = AppError::Validation(vec!["name: dns_label".to_string()]).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = response_json(response).await;
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["details"]["errors"][0], "name: dns_label");
    }

    #[tokio::test]
    async fn internal_maps_to_generic_message() {
        let response = AppError::Internal(anyhow::anyhow!("boom")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = response_json(response).await;
        assert_eq!(json["error"], "Internal server error");
        assert!(json["details"].is_null());
    }

    #[test]
    fn row_not_found_becomes_not_found() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
