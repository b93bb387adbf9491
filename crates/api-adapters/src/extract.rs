//! # Extractors
//!
//! `AuthUser` resolves the caller from the request token before a handler
//! runs. `JsonBody` reports undecodable bodies in the same shape as field
//! validation failures.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::Json;
use domains::{AppError, FieldViolation, UserId};
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

pub const TOKEN_HEADER: &str = "x-auth-token";

/// The authenticated caller.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub UserId);

/// Accepts `x-auth-token: <jwt>` or `Authorization: Bearer <jwt>`.
fn token_from(parts: &Parts) -> Option<&str> {
    if let Some(token) = parts.headers.get(TOKEN_HEADER).and_then(|v| v.to_str().ok()) {
        return Some(token.trim());
    }
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = token_from(parts)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Unauthorized("no token, authorization denied".into()))?;
        let user = state.tokens.verify(token)?;
        debug!(user_id = %user, "request authenticated");
        Ok(AuthUser(user))
    }
}

/// `axum::Json` with its rejection mapped onto a 400 field violation.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(AppError::Validation(vec![FieldViolation::new(
                "body",
                rejection.body_text(),
            )])
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request as HttpRequest;

    fn parts(header: &str, value: &str) -> Parts {
        let (parts, _) = HttpRequest::builder()
            .header(header, value)
            .body(())
            .unwrap()
            .into_parts();
        parts
    }

    #[test]
    fn custom_header_is_read() {
        assert_eq!(token_from(&parts(TOKEN_HEADER, "abc")), Some("abc"));
    }

    #[test]
    fn bearer_header_is_read() {
        assert_eq!(token_from(&parts("authorization", "Bearer abc")), Some("abc"));
    }

    #[test]
    fn other_schemes_are_ignored() {
        assert_eq!(token_from(&parts("authorization", "Basic abc")), None);
    }
}
