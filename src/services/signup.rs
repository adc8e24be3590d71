//! Admin sign-up flow.
//!
//! The privileged role is not self-service: the flow only runs when the
//! operator has configured a sign-up code and the submitted code matches.
//! Accepted attempts create the account with a `role = "admin"` metadata
//! attribute; the store keeps that attribute on the user record.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::backend::{Backend, BackendError, Session};

#[derive(Debug, thiserror::Error)]
pub enum SignupError {
    #[error("email and password are required")]
    MissingFields,
    #[error("email address looks invalid")]
    InvalidEmail,
    #[error("admin sign-up is not enabled")]
    Disabled,
    #[error("invalid sign-up code")]
    BadCode,
    #[error("a sign-up attempt is already in progress")]
    InFlight,
    #[error("{0}")]
    Backend(#[from] BackendError),
}

/// Result of an accepted sign-up attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignupOutcome {
    /// The deployment auto-confirms accounts; a live session was issued.
    Confirmed(Session),
    /// The backend sent a verification email; no session yet.
    VerificationPending,
}

/// Lower-case and sanity-check an email address. Strength of validation is
/// deliberately shallow; the backend re-validates.
#[must_use]
pub fn normalize_email(email: &str) -> Option<String> {
    let normalized = email.trim().to_ascii_lowercase();
    let (local, domain) = normalized.split_once('@')?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return None;
    }
    Some(normalized)
}

#[derive(Clone)]
pub struct AdminSignup {
    backend: Arc<dyn Backend>,
    signup_code: Option<String>,
    in_flight: Arc<AtomicBool>,
}

impl AdminSignup {
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>, signup_code: Option<String>) -> Self {
        Self { backend, signup_code, in_flight: Arc::new(AtomicBool::new(false)) }
    }

    /// Whether the operator has enabled admin sign-up at all.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.signup_code.is_some()
    }

    /// Create an admin-tagged account.
    ///
    /// Single-flight: while one attempt is awaiting the backend, further
    /// submissions fail fast with [`SignupError::InFlight`]. Validation
    /// failures never occupy the flight slot.
    ///
    /// # Errors
    ///
    /// Validation, gating, and backend errors; backend messages are
    /// surfaced verbatim.
    pub async fn sign_up_admin(
        &self,
        email: &str,
        password: &str,
        code: &str,
    ) -> Result<SignupOutcome, SignupError> {
        let Some(expected) = self.signup_code.as_deref() else {
            return Err(SignupError::Disabled);
        };
        if email.trim().is_empty() || password.is_empty() {
            return Err(SignupError::MissingFields);
        }
        let email = normalize_email(email).ok_or(SignupError::InvalidEmail)?;
        if code != expected {
            return Err(SignupError::BadCode);
        }

        let _guard = self.begin().ok_or(SignupError::InFlight)?;
        let metadata = serde_json::json!({ "role": "admin" });
        match self.backend.sign_up(&email, password, metadata).await? {
            Some(session) => Ok(SignupOutcome::Confirmed(session)),
            None => Ok(SignupOutcome::VerificationPending),
        }
    }

    fn begin(&self) -> Option<FlightGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| FlightGuard(&self.in_flight))
    }
}

/// Clears the in-flight flag when the attempt finishes, success or not.
struct FlightGuard<'a>(&'a AtomicBool);

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
#[path = "signup_test.rs"]
mod tests;
