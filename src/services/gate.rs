//! Authorization gate — role-gates a page on the published session.
//!
//! ARCHITECTURE
//! ============
//! A spawned task watches the session provider's channel. Each published
//! session triggers exactly one role lookup against the backend; the
//! outcome drives a small state machine published on the gate's own watch
//! channel. A session change while a lookup is in flight drops the lookup,
//! and a lookup that resolves anyway is discarded unless the published
//! session still carries the same user and access token.
//!
//! STATES
//! ======
//! `SignInRequired` (no session), `Loading` (lookup in flight),
//! `Authorized`, `DeniedRole` (row found, wrong role), `DeniedLookup`
//! (no row, ambiguous rows, or transport failure). The two denied states
//! render identically; the split exists for diagnostics and tests.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::backend::{Backend, BackendError, Role, Session, same_session};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    Loading,
    SignInRequired,
    Authorized,
    DeniedRole(Role),
    DeniedLookup(String),
}

impl GateState {
    /// True for both denied variants; the page renders them the same way.
    #[must_use]
    pub fn is_denied(&self) -> bool {
        matches!(self, Self::DeniedRole(_) | Self::DeniedLookup(_))
    }
}

/// Clone-able handle to the gate's published state.
#[derive(Clone)]
pub struct AccessGate {
    inner: Arc<GateInner>,
}

struct GateInner {
    states: watch::Receiver<GateState>,
    task: JoinHandle<()>,
}

impl Drop for GateInner {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl AccessGate {
    /// Spawn a gate requiring `required` over the given session channel.
    #[must_use]
    pub fn spawn(
        backend: Arc<dyn Backend>,
        sessions: watch::Receiver<Option<Session>>,
        required: Role,
    ) -> Self {
        let (tx, rx) = watch::channel(GateState::Loading);
        let task = tokio::spawn(run(backend, sessions, required, tx));
        Self { inner: Arc::new(GateInner { states: rx, task }) }
    }

    /// Latest published gate state.
    #[must_use]
    pub fn state(&self) -> GateState {
        self.inner.states.borrow().clone()
    }

    /// A watch receiver over the gate state.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<GateState> {
        self.inner.states.clone()
    }

    /// Stop evaluating. Idempotent.
    pub fn shutdown(&self) {
        self.inner.task.abort();
    }
}

async fn run(
    backend: Arc<dyn Backend>,
    mut sessions: watch::Receiver<Option<Session>>,
    required: Role,
    tx: watch::Sender<GateState>,
) {
    loop {
        let snapshot = sessions.borrow_and_update().clone();
        match snapshot {
            None => {
                let _ = tx.send(GateState::SignInRequired);
            }
            Some(session) => {
                let _ = tx.send(GateState::Loading);
                let lookup = backend.fetch_user_role(session.user_id);
                let outcome = tokio::select! {
                    changed = sessions.changed() => {
                        if changed.is_err() {
                            return;
                        }
                        // Session moved on; the in-flight lookup is dropped.
                        continue;
                    }
                    outcome = lookup => outcome,
                };

                let published = sessions.borrow().clone();
                if !published.as_ref().is_some_and(|cur| same_session(cur, &session)) {
                    // Stale resolution for a session no longer published.
                    continue;
                }
                let _ = tx.send(resolve(outcome, &required));
            }
        }
        if sessions.changed().await.is_err() {
            return;
        }
    }
}

fn resolve(outcome: Result<Option<Role>, BackendError>, required: &Role) -> GateState {
    match outcome {
        Ok(Some(role)) if role == *required => {
            tracing::debug!(%role, "role lookup authorized");
            GateState::Authorized
        }
        Ok(Some(role)) => {
            tracing::debug!(%role, required = %required, "role mismatch");
            GateState::DeniedRole(role)
        }
        Ok(None) => {
            tracing::debug!("no user record for session");
            GateState::DeniedLookup("user record not found".to_owned())
        }
        Err(e) => {
            tracing::debug!(error = %e, "role lookup failed");
            GateState::DeniedLookup(e.to_string())
        }
    }
}

#[cfg(test)]
#[path = "gate_test.rs"]
mod tests;
