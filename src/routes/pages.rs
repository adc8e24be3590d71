//! Home and protected pages plus the message-send action.

use axum::extract::{Form, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;
use time::format_description::well_known::Rfc3339;

use super::render;
use crate::backend::Message;
use crate::services::gate::GateState;
use crate::services::messages;
use crate::state::AppState;

/// `GET /` — session-gated greeting plus the message feed.
pub async fn home(State(state): State<AppState>) -> Html<String> {
    let Some(session) = state.sessions.current() else {
        return render::page(
            "Welcome",
            "<h1>Welcome</h1>\n<p><a href=\"/auth\">Sign In / Sign Up</a></p>",
        );
    };

    let feed = match state.backend.list_messages().await {
        Ok(rows) => feed_html(&rows),
        Err(e) => {
            // Collapsed into an inline notice; the feed itself stays empty.
            tracing::error!(error = %e, "message feed fetch failed");
            format!("<p class=\"error\">{}</p>", render::escape(&e.to_string()))
        }
    };

    let body = format!(
        "<h1>Home</h1>\n\
         <p>Welcome, <strong>{}</strong>!</p>\n\
         <p><a href=\"/protected\">Go to Protected</a></p>\n\
         {feed}\n\
         <form method=\"post\" action=\"/auth/sign-out\">\
         <button type=\"submit\">Sign Out</button></form>",
        render::escape(&session.email),
    );
    render::page("Home", &body)
}

fn feed_html(rows: &[Message]) -> String {
    let mut out = String::from("<h2>Your Messages</h2>\n<ul>\n");
    for msg in rows {
        let when = msg.created_at.format(&Rfc3339).unwrap_or_default();
        out.push_str(&format!(
            "<li>{} <span class=\"timestamp\">{}</span></li>\n",
            render::escape(&msg.content),
            render::escape(&when),
        ));
    }
    out.push_str("</ul>\n");
    out.push_str(
        "<form method=\"post\" action=\"/messages\">\n\
         <input name=\"content\" placeholder=\"Type a message\">\n\
         <button type=\"submit\">Send</button>\n\
         </form>",
    );
    out
}

/// `GET /protected` — admin-gated content.
pub async fn protected(State(state): State<AppState>) -> Response {
    // An unauthenticated visitor is redirected before any gate state is
    // consulted.
    if state.sessions.current().is_none() {
        return Redirect::temporary("/auth").into_response();
    }

    match state.gate.state() {
        GateState::SignInRequired => Redirect::temporary("/auth").into_response(),
        GateState::Loading => render::page_with_head(
            "Loading",
            "<meta http-equiv=\"refresh\" content=\"1\">",
            "<p>Loading…</p>",
        )
        .into_response(),
        GateState::Authorized => render::page(
            "Protected Admin Page",
            "<h1>Protected Admin Page</h1>\n\
             <p>Only users with <code>role='admin'</code> in the user store see this.</p>",
        )
        .into_response(),
        GateState::DeniedRole(_) | GateState::DeniedLookup(_) => {
            render::page("Access denied", "<p>Access denied. Admins only.</p>").into_response()
        }
    }
}

#[derive(Deserialize)]
pub struct MessageForm {
    #[serde(default)]
    pub content: String,
}

/// `POST /messages` — insert a message, then back to the feed.
pub async fn post_message(State(state): State<AppState>, Form(form): Form<MessageForm>) -> Response {
    let Some(session) = state.sessions.current() else {
        return Redirect::temporary("/auth").into_response();
    };

    match messages::send_message(state.backend.as_ref(), session.user_id, &form.content).await {
        Ok(_) => Redirect::to("/").into_response(),
        Err(e) => {
            tracing::error!(error = %e, "message send failed");
            let body = format!(
                "<p class=\"error\">{}</p>\n<p><a href=\"/\">Back</a></p>",
                render::escape(&e.to_string()),
            );
            render::page("Home", &body).into_response()
        }
    }
}

#[cfg(test)]
#[path = "pages_test.rs"]
mod tests;
