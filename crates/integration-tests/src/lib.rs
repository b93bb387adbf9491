//! # integration-tests
//!
//! Shared harness: the real services wired to in-memory stores, Argon2 and
//! JWT, plus (with `web-axum`) the full router driven in-process.

use std::sync::Arc;

use auth_adapters::{Argon2PasswordHasher, JwtTokenService};
use domains::{PostRepository, ProfileRepository, TokenService, UserRepository};
use services::{AccountService, PostService, ProfileService};
use storage_adapters::{InMemoryPostRepository, InMemoryProfileRepository, InMemoryUserRepository};

pub const TEST_SECRET: &[u8] = b"integration-test-secret";

/// Services over fresh in-memory stores. Repositories are exposed so tests
/// can inspect stored state directly.
#[derive(Clone)]
pub struct Backend {
    pub users: InMemoryUserRepository,
    pub profiles: InMemoryProfileRepository,
    pub posts: InMemoryPostRepository,
    pub tokens: Arc<dyn TokenService>,
    pub accounts: AccountService,
    pub profile_service: ProfileService,
    pub post_service: PostService,
}

impl Backend {
    pub fn new() -> Self {
        let users = InMemoryUserRepository::new();
        let profiles = InMemoryProfileRepository::new();
        let posts = InMemoryPostRepository::new();
        let tokens: Arc<dyn TokenService> =
            Arc::new(JwtTokenService::new(TEST_SECRET, 3600).expect("static secret is valid"));

        let user_port: Arc<dyn UserRepository> = Arc::new(users.clone());
        let profile_port: Arc<dyn ProfileRepository> = Arc::new(profiles.clone());
        let post_port: Arc<dyn PostRepository> = Arc::new(posts.clone());

        Self {
            accounts: AccountService::new(
                user_port.clone(),
                Arc::new(Argon2PasswordHasher::new()),
                tokens.clone(),
            ),
            profile_service: ProfileService::new(user_port.clone(), profile_port),
            post_service: PostService::new(user_port, post_port),
            users,
            profiles,
            posts,
            tokens,
        }
    }
}

impl Default for Backend {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "web-axum")]
pub mod http {
    use std::sync::Arc;

    use api_adapters::{build_router, AppState, Metrics};
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::Backend;

    pub struct TestApp {
        pub backend: Backend,
        router: Router,
    }

    impl TestApp {
        pub fn new() -> Self {
            let backend = Backend::new();
            let router = build_router(AppState {
                accounts: backend.accounts.clone(),
                profiles: backend.profile_service.clone(),
                posts: backend.post_service.clone(),
                tokens: backend.tokens.clone(),
                metrics: Arc::new(Metrics::new()),
            });
            Self { backend, router }
        }

        /// Sends one request; the body is `Value::Null` when empty.
        pub async fn call(
            &self,
            method: Method,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                builder = builder.header("x-auth-token", token);
            }
            let request = match body {
                Some(body) => builder
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string())),
                None => builder.body(Body::empty()),
            }
            .unwrap();

            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let value = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, value)
        }

        /// Registers an account and returns its token.
        pub async fn register(&self, name: &str, email: &str) -> String {
            let (status, body) = self
                .call(
                    Method::POST,
                    "/api/users",
                    None,
                    Some(json!({ "name": name, "email": email, "password": "secret1" })),
                )
                .await;
            assert_eq!(status, StatusCode::OK, "register failed: {body}");
            body["token"].as_str().unwrap().to_owned()
        }

        /// The caller's user id as a string.
        pub async fn user_id(&self, token: &str) -> String {
            let (status, body) = self.call(Method::GET, "/api/auth", Some(token), None).await;
            assert_eq!(status, StatusCode::OK, "current user failed: {body}");
            body["id"].as_str().unwrap().to_owned()
        }

        pub async fn create_profile(&self, token: &str, status: &str, skills: &str) -> Value {
            let (code, body) = self
                .call(
                    Method::POST,
                    "/api/profile",
                    Some(token),
                    Some(json!({ "status": status, "skills": skills })),
                )
                .await;
            assert_eq!(code, StatusCode::OK, "profile upsert failed: {body}");
            body
        }

        pub async fn create_post(&self, token: &str, text: &str) -> Value {
            let (code, body) = self
                .call(Method::POST, "/api/posts", Some(token), Some(json!({ "text": text })))
                .await;
            assert_eq!(code, StatusCode::OK, "post creation failed: {body}");
            body
        }
    }

    impl Default for TestApp {
        fn default() -> Self {
            Self::new()
        }
    }
}
