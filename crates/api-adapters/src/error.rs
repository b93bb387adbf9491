//! Maps `AppError` onto HTTP status codes and JSON bodies.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use domains::AppError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub AppError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(..) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self.0 {
            AppError::Validation(errors) => json!({ "errors": errors }),
            AppError::NotFound(what, _) => json!({ "message": format!("{what} not found") }),
            AppError::Unauthorized(message) => json!({ "message": message }),
            AppError::Forbidden(message) => {
                warn!(reason = %message, "request forbidden");
                json!({ "message": message })
            }
            AppError::Conflict(message) => json!({ "message": message }),
            AppError::Internal(detail) => {
                error!(detail = %detail, "request failed");
                json!({ "message": "Server error" })
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use domains::FieldViolation;
    use serde_json::Value;

    async fn render(err: AppError) -> (StatusCode, Value) {
        let response = ApiError(err).into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_lists_every_field() {
        let (status, body) = render(AppError::Validation(vec![
            FieldViolation::new("status", "Status is required"),
            FieldViolation::new("skills", "Skills is required"),
        ]))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["field"], "status");
        assert_eq!(body["errors"][1]["message"], "Skills is required");
    }

    #[tokio::test]
    async fn internal_detail_is_not_leaked() {
        let (status, body) = render(AppError::Internal("pool timed out".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "message": "Server error" }));
    }

    #[tokio::test]
    async fn not_found_names_the_entity() {
        let (status, body) = render(AppError::not_found("post", "abc")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "post not found");
    }

    #[test]
    fn conflict_and_forbidden_statuses() {
        assert_eq!(
            ApiError(AppError::Conflict("post already liked".into())).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError(AppError::Forbidden("not yours".into())).status(),
            StatusCode::FORBIDDEN
        );
    }
}
