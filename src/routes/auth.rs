//! Auth pages — sign-in, sign-up, sign-out, and the admin sign-up flow.

use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;

use super::render;
use crate::services::signup::{SignupError, normalize_email};
use crate::state::AppState;

const CONFIRMATION_TEXT: &str = "Check your email to confirm—then you're an admin!";
const SIGNUP_UNAVAILABLE: &str = "Admin sign-up not configured";

// =============================================================================
// FORMS
// =============================================================================

#[derive(Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct AdminSignupForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub code: String,
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `GET /auth` — combined sign-in / sign-up page.
pub async fn auth_page() -> Html<String> {
    render::page("Sign In", &auth_body(None))
}

/// `POST /auth/sign-in` — password-grant sign-in.
pub async fn sign_in(State(state): State<AppState>, Form(form): Form<CredentialsForm>) -> Response {
    if form.email.trim().is_empty() || form.password.is_empty() {
        return render::page("Sign In", &auth_body(Some("Email and password are required.")))
            .into_response();
    }

    match state.backend.sign_in(form.email.trim(), &form.password).await {
        Ok(_) => Redirect::to("/").into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "sign-in failed");
            render::page("Sign In", &auth_body(Some(&e.to_string()))).into_response()
        }
    }
}

/// `POST /auth/sign-up` — plain sign-up; the store assigns its default role.
pub async fn sign_up(State(state): State<AppState>, Form(form): Form<CredentialsForm>) -> Response {
    let Some(email) = normalize_email(&form.email) else {
        return render::page("Sign In", &auth_body(Some("Email address looks invalid.")))
            .into_response();
    };
    if form.password.is_empty() {
        return render::page("Sign In", &auth_body(Some("Email and password are required.")))
            .into_response();
    }

    match state.backend.sign_up(&email, &form.password, serde_json::json!({})).await {
        Ok(Some(_)) => Redirect::to("/").into_response(),
        Ok(None) => render::page(
            "Check your email",
            "<p>Check your email to confirm your account.</p>\n<p><a href=\"/\">Home</a></p>",
        )
        .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "sign-up failed");
            render::page("Sign In", &auth_body(Some(&e.to_string()))).into_response()
        }
    }
}

/// `POST /auth/sign-out` — clear the session, back to the home page.
pub async fn sign_out(State(state): State<AppState>) -> Response {
    if let Err(e) = state.backend.sign_out().await {
        tracing::warn!(error = %e, "sign-out failed");
    }
    Redirect::to("/").into_response()
}

/// `GET /admin-signup` — role-tagged sign-up form.
pub async fn admin_signup_page(State(state): State<AppState>) -> Response {
    if !state.signup.enabled() {
        return (StatusCode::SERVICE_UNAVAILABLE, SIGNUP_UNAVAILABLE).into_response();
    }
    render::page("Sign Up as Admin", &admin_body(None)).into_response()
}

/// `POST /admin-signup` — create an admin-tagged account.
pub async fn admin_sign_up(
    State(state): State<AppState>,
    Form(form): Form<AdminSignupForm>,
) -> Response {
    match state.signup.sign_up_admin(&form.email, &form.password, &form.code).await {
        Ok(_) => {
            let body = format!(
                "<p>{}</p>\n<p><a href=\"/\">Home</a></p>",
                render::escape(CONFIRMATION_TEXT),
            );
            render::page_with_head(
                "Sign Up as Admin",
                "<meta http-equiv=\"refresh\" content=\"2; url=/\">",
                &body,
            )
            .into_response()
        }
        Err(SignupError::Disabled) => {
            (StatusCode::SERVICE_UNAVAILABLE, SIGNUP_UNAVAILABLE).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "admin sign-up rejected");
            render::page("Sign Up as Admin", &admin_body(Some(&e.to_string()))).into_response()
        }
    }
}

// =============================================================================
// BODIES
// =============================================================================

fn error_banner(error: Option<&str>) -> String {
    error
        .map(|msg| format!("<p class=\"error\">{}</p>\n", render::escape(msg)))
        .unwrap_or_default()
}

fn auth_body(error: Option<&str>) -> String {
    format!(
        "{}<h1>Sign In</h1>\n\
         <form method=\"post\" action=\"/auth/sign-in\">\n\
         <label>Email<input type=\"email\" name=\"email\" required></label>\n\
         <label>Password<input type=\"password\" name=\"password\" required></label>\n\
         <button type=\"submit\">Sign In</button>\n\
         </form>\n\
         <h1>Sign Up</h1>\n\
         <form method=\"post\" action=\"/auth/sign-up\">\n\
         <label>Email<input type=\"email\" name=\"email\" required></label>\n\
         <label>Password<input type=\"password\" name=\"password\" required></label>\n\
         <button type=\"submit\">Sign Up</button>\n\
         </form>",
        error_banner(error),
    )
}

fn admin_body(error: Option<&str>) -> String {
    format!(
        "{}<h1>Sign Up as Admin</h1>\n\
         <form method=\"post\" action=\"/admin-signup\">\n\
         <label>Email<input type=\"email\" name=\"email\" required></label>\n\
         <label>Password<input type=\"password\" name=\"password\" required></label>\n\
         <label>Sign-up code<input type=\"password\" name=\"code\" required></label>\n\
         <button type=\"submit\">Sign Up as Admin</button>\n\
         </form>",
        error_banner(error),
    )
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
