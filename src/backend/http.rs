//! HTTP implementation of the backend surface.
//!
//! ARCHITECTURE
//! ============
//! Auth operations speak the backend's token endpoints under `/auth/v1`,
//! row operations the row API under `/rest/v1`. The client holds the one
//! live session for this process and emits a [`SessionEvent`] on every
//! local auth transition, which is what the session provider subscribes to.
//!
//! ERROR HANDLING
//! ==============
//! Non-success statuses become [`BackendError::Rejected`] carrying the
//! backend-provided message verbatim; transport failures pass through as
//! [`BackendError::Http`]. Nothing is retried.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::sync::{RwLock, broadcast};
use uuid::Uuid;

use super::config::BackendConfig;
use super::types::{Backend, BackendError, Message, Role, Session, SessionEvent};

const EVENT_CHANNEL_CAPACITY: usize = 16;

pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    /// The one session this client holds. Single writer: local auth calls.
    session: RwLock<Option<Session>>,
    events: broadcast::Sender<SessionEvent>,
}

impl HttpBackend {
    /// Build a client from connection settings.
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying HTTP client cannot be built.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            anon_key: config.anon_key.clone(),
            session: RwLock::new(None),
            events,
        })
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base_url)
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    async fn bearer_token(&self) -> Option<String> {
        self.session.read().await.as_ref().map(|s| s.access_token.clone())
    }

    /// Replace the held session and notify the change stream.
    async fn install(&self, session: Option<Session>, event: SessionEvent) {
        *self.session.write().await = session;
        // No subscribers is fine; the stream is best-effort by contract.
        let _ = self.events.send(event);
    }
}

/// Reject non-success responses, surfacing the backend's own message.
async fn check(resp: reqwest::Response) -> Result<reqwest::Response, BackendError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(BackendError::Rejected {
        status: status.as_u16(),
        message: backend_message(status.as_u16(), &body),
    })
}

/// Extract the human-readable message from an error body.
///
/// The auth and row APIs disagree on the field name, so try the known
/// spellings before falling back to the raw body.
fn backend_message(status: u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["msg", "message", "error_description", "error"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                return text.to_owned();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("backend returned status {status}")
    } else {
        trimmed.to_owned()
    }
}

// =============================================================================
// RESPONSE MAPPING
// =============================================================================

#[derive(Debug, Deserialize)]
struct UserPayload {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    user: Option<UserPayload>,
}

/// Sign-up answers come in two shapes: a full token grant when the
/// deployment auto-confirms, or a bare user object while verification is
/// pending.
#[derive(Debug, Deserialize)]
struct SignUpResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    user: Option<UserPayload>,
    #[serde(default)]
    id: Option<Uuid>,
    #[serde(default)]
    email: Option<String>,
}

const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

fn expiry_from(expires_at: Option<i64>, expires_in: Option<i64>) -> OffsetDateTime {
    if let Some(at) = expires_at {
        if let Ok(t) = OffsetDateTime::from_unix_timestamp(at) {
            return t;
        }
    }
    OffsetDateTime::now_utc() + time::Duration::seconds(expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS))
}

fn session_from_token(resp: TokenResponse) -> Result<Session, BackendError> {
    let user = resp
        .user
        .ok_or_else(|| BackendError::Decode("token response missing user".into()))?;
    Ok(Session {
        user_id: user.id,
        email: user.email.unwrap_or_default(),
        access_token: resp.access_token,
        expires_at: expiry_from(resp.expires_at, resp.expires_in),
    })
}

fn session_from_sign_up(resp: SignUpResponse) -> Option<Session> {
    let access_token = resp.access_token?;
    let (user_id, email) = match resp.user {
        Some(user) => (user.id, user.email.unwrap_or_default()),
        None => (resp.id?, resp.email.unwrap_or_default()),
    };
    Some(Session {
        user_id,
        email,
        access_token,
        expires_at: expiry_from(resp.expires_at, resp.expires_in),
    })
}

#[derive(Debug, Deserialize)]
struct RoleRow {
    role: Role,
}

fn single_role(mut rows: Vec<RoleRow>) -> Result<Option<Role>, BackendError> {
    match rows.len() {
        0 => Ok(None),
        1 => Ok(Some(rows.remove(0).role)),
        n => Err(BackendError::AmbiguousRow(n)),
    }
}

#[derive(Debug, Serialize)]
struct NewMessageRow<'a> {
    user_id: Uuid,
    content: &'a str,
}

// =============================================================================
// TRAIT IMPLEMENTATION
// =============================================================================

#[async_trait::async_trait]
impl Backend for HttpBackend {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: serde_json::Value,
    ) -> Result<Option<Session>, BackendError> {
        let resp = self
            .http
            .post(self.auth_url("signup"))
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password, "data": metadata }))
            .send()
            .await?;
        let parsed: SignUpResponse = check(resp).await?.json().await?;

        match session_from_sign_up(parsed) {
            Some(session) => {
                self.install(Some(session.clone()), SessionEvent::SignedIn(session.clone()))
                    .await;
                Ok(Some(session))
            }
            None => Ok(None),
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, BackendError> {
        let resp = self
            .http
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;
        let parsed: TokenResponse = check(resp).await?.json().await?;
        let session = session_from_token(parsed)?;

        self.install(Some(session.clone()), SessionEvent::SignedIn(session.clone()))
            .await;
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        let Some(token) = self.bearer_token().await else {
            return Ok(());
        };

        // Local sign-out wins regardless of what the backend says; the
        // revocation call is best-effort.
        self.install(None, SessionEvent::SignedOut).await;

        let result = self
            .http
            .post(self.auth_url("logout"))
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await;
        if let Err(e) = result {
            tracing::debug!(error = %e, "token revocation failed");
        }
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<Session>, BackendError> {
        Ok(self.session.read().await.clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    async fn fetch_user_role(&self, user_id: Uuid) -> Result<Option<Role>, BackendError> {
        let mut request = self
            .http
            .get(self.rest_url("users"))
            .query(&[("id", format!("eq.{user_id}")), ("select", "role".to_owned())])
            .header("apikey", &self.anon_key);
        if let Some(token) = self.bearer_token().await {
            request = request.bearer_auth(token);
        }

        let rows: Vec<RoleRow> = check(request.send().await?).await?.json().await?;
        single_role(rows)
    }

    async fn insert_message(&self, user_id: Uuid, content: &str) -> Result<(), BackendError> {
        let token = self.bearer_token().await.ok_or(BackendError::NotSignedIn)?;
        let resp = self
            .http
            .post(self.rest_url("messages"))
            .header("apikey", &self.anon_key)
            .header("Prefer", "return=minimal")
            .bearer_auth(token)
            .json(&[NewMessageRow { user_id, content }])
            .send()
            .await?;
        check(resp).await?;
        Ok(())
    }

    async fn list_messages(&self) -> Result<Vec<Message>, BackendError> {
        let mut request = self
            .http
            .get(self.rest_url("messages"))
            .query(&[("select", "*"), ("order", "created_at.desc")])
            .header("apikey", &self.anon_key);
        if let Some(token) = self.bearer_token().await {
            request = request.bearer_auth(token);
        }

        let rows: Vec<Message> = check(request.send().await?).await?.json().await?;
        Ok(rows)
    }
}

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;
