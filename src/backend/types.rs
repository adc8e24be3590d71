//! Shared types for the hosted backend collaborator.
//!
//! DESIGN
//! ======
//! The `Backend` trait is the full surface this application consumes from
//! the hosted auth + row store. Services and routes depend on
//! `Arc<dyn Backend>` so tests can swap in a scripted mock; the production
//! implementation lives in [`super::http`].

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::sync::broadcast;
use uuid::Uuid;

// =============================================================================
// SESSION
// =============================================================================

/// Authenticated identity plus token material, held only in memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Backend user identifier.
    pub user_id: Uuid,
    /// Email the account was created with.
    pub email: String,
    /// Opaque access token sent as a bearer on row reads/writes.
    pub access_token: String,
    /// Token expiry as reported by the backend.
    #[serde(with = "time::serde::timestamp")]
    pub expires_at: OffsetDateTime,
}

/// True when two sessions refer to the same sign-in (same user, same token).
///
/// Used to discard role lookups that resolve after the published session
/// has moved on.
#[must_use]
pub fn same_session(a: &Session, b: &Session) -> bool {
    a.user_id == b.user_id && a.access_token == b.access_token
}

// =============================================================================
// SESSION CHANGE STREAM
// =============================================================================

/// One notification on the session-change stream.
///
/// Every event fully replaces the published session value; there is no
/// merging.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    SignedIn(Session),
    TokenRefreshed(Session),
    SignedOut,
}

impl SessionEvent {
    /// The replacement value this event carries.
    #[must_use]
    pub fn into_session(self) -> Option<Session> {
        match self {
            Self::SignedIn(s) | Self::TokenRefreshed(s) => Some(s),
            Self::SignedOut => None,
        }
    }
}

// =============================================================================
// ROLE
// =============================================================================

/// Role attribute on a user record.
///
/// The store's role column is an open set; values other than the two this
/// application knows about are preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    Member,
    Other(String),
}

impl Role {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => "admin",
            Self::Member => "member",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for Role {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "admin" => Self::Admin,
            "member" => Self::Member,
            _ => Self::Other(raw),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_owned()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// MESSAGE
// =============================================================================

/// One row of the `messages` table. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    /// Owner, foreign key to the user record.
    pub user_id: Uuid,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The backend answered with a non-success status; `message` is the
    /// backend-provided text, surfaced verbatim where the contract asks
    /// for it.
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("unexpected response shape: {0}")]
    Decode(String),
    #[error("expected at most one row, got {0}")]
    AmbiguousRow(usize),
    #[error("not signed in")]
    NotSignedIn,
}

// =============================================================================
// BACKEND TRAIT
// =============================================================================

/// Surface of the hosted auth + row store consumed by this application.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// Create an account. `metadata` is attached to the new user verbatim.
    ///
    /// Returns `None` when the deployment requires email verification
    /// before a session is issued. A returned session is also emitted on
    /// the change stream as [`SessionEvent::SignedIn`].
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: serde_json::Value,
    ) -> Result<Option<Session>, BackendError>;

    /// Password-grant sign-in. Emits [`SessionEvent::SignedIn`] on success.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, BackendError>;

    /// Invalidate the current session. Emits [`SessionEvent::SignedOut`].
    async fn sign_out(&self) -> Result<(), BackendError>;

    /// The session currently held by this client, if any.
    ///
    /// Idempotent: repeated calls with no intervening sign-in/out return
    /// an equivalent session.
    async fn current_session(&self) -> Result<Option<Session>, BackendError>;

    /// Subscribe to the session-change stream. Events are delivered in
    /// emission order.
    fn subscribe(&self) -> broadcast::Receiver<SessionEvent>;

    /// Read the `role` column of the user record for `user_id`.
    ///
    /// `Ok(None)` when no row exists; an error when the lookup is
    /// ambiguous or fails in transport.
    async fn fetch_user_role(&self, user_id: Uuid) -> Result<Option<Role>, BackendError>;

    /// Insert one message row owned by `user_id`.
    async fn insert_message(&self, user_id: Uuid, content: &str) -> Result<(), BackendError>;

    /// All messages, newest first.
    async fn list_messages(&self) -> Result<Vec<Message>, BackendError>;
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
