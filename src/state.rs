//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the backend handle plus the spawned session provider and
//! authorization gate, so every handler reads the same published session.

use std::sync::Arc;

use crate::backend::{Backend, Role};
use crate::services::gate::AccessGate;
use crate::services::session::SessionProvider;
use crate::services::signup::AdminSignup;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum — all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn Backend>,
    /// Publisher of the current session; the only writer of that value.
    pub sessions: SessionProvider,
    /// Gate for the protected page; requires the admin role.
    pub gate: AccessGate,
    pub signup: AdminSignup,
}

impl AppState {
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>, admin_signup_code: Option<String>) -> Self {
        let sessions = SessionProvider::spawn(backend.clone());
        let gate = AccessGate::spawn(backend.clone(), sessions.watch(), Role::Admin);
        let signup = AdminSignup::new(backend.clone(), admin_signup_code);
        Self { backend, sessions, gate, signup }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
mod tests {
    use super::test_helpers::*;
    use crate::services::gate::GateState;

    #[tokio::test(start_paused = true)]
    async fn app_state_clones_share_the_published_session() {
        let (mock, state) = mock_app_state();
        let other = state.clone();
        let session = session_for("a@b.com");
        settle().await;
        mock.emit(crate::backend::SessionEvent::SignedIn(session.clone()));

        let mut watch = state.sessions.watch();
        wait_until(&mut watch, |v| v.is_some()).await;
        assert_eq!(other.sessions.current(), Some(session));
    }

    #[tokio::test]
    async fn gate_starts_loading() {
        let (_mock, state) = mock_app_state();
        // Before any session resolves the gate has published Loading or
        // already moved to SignInRequired for the initial None.
        let s = state.gate.state();
        assert!(matches!(s, GateState::Loading | GateState::SignInRequired));
    }
}
