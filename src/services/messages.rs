//! Message feed operations.

use uuid::Uuid;

use crate::backend::{Backend, BackendError};

/// What happened to a send request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Posted,
    /// Empty input is a guarded no-op; no request is issued.
    Ignored,
}

/// Insert one message owned by `user_id`.
///
/// The follow-up listing happens on the next page load, so a successful
/// send only reports `Posted` here.
///
/// # Errors
///
/// Propagates the backend failure verbatim for the page to surface.
pub async fn send_message(
    backend: &dyn Backend,
    user_id: Uuid,
    content: &str,
) -> Result<SendOutcome, BackendError> {
    if content.is_empty() {
        return Ok(SendOutcome::Ignored);
    }
    backend.insert_message(user_id, content).await?;
    Ok(SendOutcome::Posted)
}

#[cfg(test)]
#[path = "messages_test.rs"]
mod tests;
