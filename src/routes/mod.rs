//! Router assembly.

pub mod auth;
pub mod pages;
pub mod render;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::home))
        .route("/auth", get(auth::auth_page))
        .route("/auth/sign-in", post(auth::sign_in))
        .route("/auth/sign-up", post(auth::sign_up))
        .route("/auth/sign-out", post(auth::sign_out))
        .route("/admin-signup", get(auth::admin_signup_page).post(auth::admin_sign_up))
        .route("/protected", get(pages::protected))
        .route("/messages", post(pages::post_message))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
