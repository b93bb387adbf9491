use std::sync::Arc;
use std::time::Duration;

use axum::extract::{MatchedPath, Request, State};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method};
use axum::middleware::{from_fn_with_state, Next};
use axum::response::Response;
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::extract::TOKEN_HEADER;
use crate::handlers::{posts, profile, system, users};
use crate::metrics::Metrics;
use crate::state::AppState;

/// Builds the full HTTP surface: `/api/*`, `/health` and `/metrics`.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            HeaderName::from_static(TOKEN_HEADER),
        ])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        // Accounts
        .route("/api/users", post(users::register))
        .route("/api/auth", post(users::login).get(users::current_user))
        // Profiles
        .route(
            "/api/profile",
            post(profile::upsert)
                .get(profile::list)
                .delete(profile::delete_account),
        )
        .route("/api/profile/me", get(profile::me))
        .route("/api/profile/user/{user_id}", get(profile::by_user))
        .route("/api/profile/experience", put(profile::add_experience))
        .route(
            "/api/profile/experience/{exp_id}",
            delete(profile::remove_experience),
        )
        .route("/api/profile/education", put(profile::add_education))
        .route(
            "/api/profile/education/{edu_id}",
            delete(profile::remove_education),
        )
        // Posts
        .route("/api/posts", post(posts::create).get(posts::list))
        .route("/api/posts/{id}", get(posts::get).delete(posts::delete))
        .route(
            "/api/posts/{id}/likes",
            put(posts::like).delete(posts::unlike),
        )
        .route("/api/posts/{id}/comments", post(posts::comment))
        .route(
            "/api/posts/{id}/comments/{comment_id}",
            delete(posts::delete_comment),
        )
        // Operations
        .route("/health", get(system::health))
        .route("/metrics", get(system::metrics))
        .route_layer(from_fn_with_state(state.metrics.clone(), track_requests))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Counts every routed request under its route template.
async fn track_requests(State(metrics): State<Arc<Metrics>>, req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());
    let response = next.run(req).await;
    metrics.record(&method, &route, response.status().as_u16());
    response
}
