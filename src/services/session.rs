//! Session provider — publishes the current authentication session.
//!
//! ARCHITECTURE
//! ============
//! One spawned task owns the single writer of a `watch` channel holding
//! `Option<Session>`. At startup it issues one `current_session` fetch and
//! subscribes to the backend's change stream; every event fully replaces
//! the published value. Readers get a synchronous accessor or their own
//! watch receiver.
//!
//! TRADE-OFFS
//! ==========
//! No ordering is guaranteed between the initial fetch and the first
//! change event; whichever resolves later wins. A failed initial fetch is
//! swallowed (logged at debug) and the value stays `None` — there is no
//! retry.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::backend::{Backend, Session};

/// Clone-able handle to the published session value.
///
/// Dropping the last handle (or calling [`SessionProvider::shutdown`])
/// aborts the publisher task; no update is delivered afterwards.
#[derive(Clone)]
pub struct SessionProvider {
    inner: Arc<ProviderInner>,
}

struct ProviderInner {
    sessions: watch::Receiver<Option<Session>>,
    task: JoinHandle<()>,
}

impl Drop for ProviderInner {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl SessionProvider {
    /// Spawn the publisher task for `backend`.
    #[must_use]
    pub fn spawn(backend: Arc<dyn Backend>) -> Self {
        let (tx, rx) = watch::channel(None);
        let task = tokio::spawn(run(backend, tx));
        Self { inner: Arc::new(ProviderInner { sessions: rx, task }) }
    }

    /// Latest published session; `None` before the initial fetch resolves
    /// or while signed out.
    #[must_use]
    pub fn current(&self) -> Option<Session> {
        self.inner.sessions.borrow().clone()
    }

    /// A watch receiver over the published value, for components that
    /// must react to session changes.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<Option<Session>> {
        self.inner.sessions.clone()
    }

    /// Stop publishing. Idempotent.
    pub fn shutdown(&self) {
        self.inner.task.abort();
    }
}

async fn run(backend: Arc<dyn Backend>, tx: watch::Sender<Option<Session>>) {
    // Subscribe before the initial fetch so no event emitted in between
    // is lost.
    let mut events = backend.subscribe();
    let mut fetch = backend.current_session();
    let mut fetched = false;

    loop {
        tokio::select! {
            result = &mut fetch, if !fetched => {
                fetched = true;
                match result {
                    Ok(session) => {
                        let _ = tx.send(session);
                    }
                    Err(e) => tracing::debug!(error = %e, "initial session fetch failed"),
                }
            }
            event = events.recv() => match event {
                Ok(event) => {
                    let _ = tx.send(event.into_session());
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "session change stream lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return,
            },
        }
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
