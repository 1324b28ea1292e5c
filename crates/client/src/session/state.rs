//! Observable authentication state.

use std::sync::Arc;

use secrecy::SecretString;
use stockroom_core::UserRole;
use tokio::sync::watch;
use tracing::warn;

use super::store::{SessionStore, StorageError, StoredSession};

/// Current login status, user name and role.
///
/// Each field is published through a `watch` channel so views can
/// subscribe to changes. The bearer token itself is never cached here: it
/// is read from the store on every request.
#[derive(Clone)]
pub struct SessionState {
    inner: Arc<SessionStateInner>,
}

struct SessionStateInner {
    store: Arc<dyn SessionStore>,
    login_status: watch::Sender<bool>,
    username: watch::Sender<Option<String>>,
    user_role: watch::Sender<Option<UserRole>>,
}

impl SessionState {
    /// Build the state from whatever session `store` already holds.
    ///
    /// An unreadable store is logged and treated as logged out.
    #[must_use]
    pub fn restore(store: Arc<dyn SessionStore>) -> Self {
        let stored = store.load().unwrap_or_else(|e| {
            warn!(error = %e, "Ignoring unreadable session store");
            None
        });

        let state = Self {
            inner: Arc::new(SessionStateInner {
                store,
                login_status: watch::Sender::new(false),
                username: watch::Sender::new(None),
                user_role: watch::Sender::new(None),
            }),
        };
        state.publish(stored.as_ref());
        state
    }

    /// Persist `session` and publish it.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the session cannot be saved; nothing is
    /// published in that case.
    pub fn begin(&self, session: &StoredSession) -> Result<(), StorageError> {
        self.inner.store.save(session)?;
        self.publish(Some(session));
        Ok(())
    }

    /// Remove the persisted session and publish the logged-out state.
    ///
    /// The logged-out state is published even if the store cannot be
    /// cleared.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be cleared.
    pub fn end(&self) -> Result<(), StorageError> {
        let cleared = self.inner.store.clear();
        self.publish(None);
        cleared
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        *self.inner.login_status.borrow()
    }

    #[must_use]
    pub fn current_user_name(&self) -> Option<String> {
        self.inner.username.borrow().clone()
    }

    #[must_use]
    pub fn current_user_role(&self) -> Option<UserRole> {
        self.inner.user_role.borrow().clone()
    }

    /// Whether the logged-in user is offered catalog write actions.
    #[must_use]
    pub fn can_manage_catalog(&self) -> bool {
        self.is_logged_in()
            && self
                .inner
                .user_role
                .borrow()
                .as_ref()
                .is_some_and(UserRole::can_manage_catalog)
    }

    /// Subscribe to login status changes.
    #[must_use]
    pub fn watch_login_status(&self) -> watch::Receiver<bool> {
        self.inner.login_status.subscribe()
    }

    /// Subscribe to user name changes.
    #[must_use]
    pub fn watch_user_name(&self) -> watch::Receiver<Option<String>> {
        self.inner.username.subscribe()
    }

    /// Subscribe to role changes.
    #[must_use]
    pub fn watch_user_role(&self) -> watch::Receiver<Option<UserRole>> {
        self.inner.user_role.subscribe()
    }

    /// The token to send with the next request, read fresh from the store.
    ///
    /// `None` when logged out, when the store holds no token, or when the
    /// store cannot be read.
    #[must_use]
    pub fn bearer_token(&self) -> Option<SecretString> {
        if !self.is_logged_in() {
            return None;
        }
        self.inner.store.token().unwrap_or_else(|e| {
            warn!(error = %e, "Could not read token from session store");
            None
        })
    }

    fn publish(&self, session: Option<&StoredSession>) {
        let active = session.filter(|s| s.login_status);
        self.inner.login_status.send_replace(active.is_some());
        self.inner
            .username
            .send_replace(active.map(|s| s.username.clone()));
        self.inner
            .user_role
            .send_replace(active.map(|s| s.user_role.clone()));
    }
}

impl std::fmt::Debug for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionState")
            .field("login_status", &self.is_logged_in())
            .field("username", &self.current_user_name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;
    use crate::session::MemorySessionStore;

    fn session(role: UserRole) -> StoredSession {
        StoredSession {
            login_status: true,
            token: SecretString::from("jwt-123"),
            username: "ada".to_string(),
            user_role: role,
            expiration: None,
        }
    }

    #[test]
    fn test_restore_empty_store_is_logged_out() {
        let state = SessionState::restore(Arc::new(MemorySessionStore::new()));
        assert!(!state.is_logged_in());
        assert!(state.bearer_token().is_none());
        assert!(state.current_user_name().is_none());
    }

    #[test]
    fn test_restore_existing_session() {
        let store = MemorySessionStore::with_session(session(UserRole::Customer));
        let state = SessionState::restore(Arc::new(store));
        assert!(state.is_logged_in());
        assert_eq!(state.current_user_name().as_deref(), Some("ada"));
        assert!(!state.can_manage_catalog());
        assert_eq!(state.bearer_token().unwrap().expose_secret(), "jwt-123");
    }

    #[test]
    fn test_inactive_stored_session_is_logged_out() {
        let mut stored = session(UserRole::Admin);
        stored.login_status = false;
        let state = SessionState::restore(Arc::new(MemorySessionStore::with_session(stored)));
        assert!(!state.is_logged_in());
        assert!(state.bearer_token().is_none());
    }

    #[test]
    fn test_begin_and_end_notify_watchers() {
        let state = SessionState::restore(Arc::new(MemorySessionStore::new()));
        let mut status = state.watch_login_status();
        let role = state.watch_user_role();

        state.begin(&session(UserRole::Admin)).unwrap();
        assert!(status.has_changed().unwrap());
        assert!(*status.borrow_and_update());
        assert_eq!(*role.borrow(), Some(UserRole::Admin));
        assert!(state.can_manage_catalog());

        state.end().unwrap();
        assert!(!*status.borrow_and_update());
        assert!(state.bearer_token().is_none());
    }
}
