//! Process-wide session state.
//!
//! A single [`SessionStore`] wraps the identity provider and is handed to
//! every component that cares who is signed in. Components register a
//! listener with [`SessionStore::subscribe`] and keep the returned
//! [`Subscription`] for as long as they are displayed; dropping it removes
//! the listener.

use crate::error::Result;
use crate::tasks::OwnerId;
use crate::traits::IdentityProvider;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// An authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Identity used as the owner of the user's tasks.
    pub id: OwnerId,
    /// Email address, if the provider exposes one.
    pub email: Option<String>,
}

/// A signed-in session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// The signed-in user.
    pub user: User,
    /// Opaque token issued by the provider.
    pub access_token: String,
    /// RFC 3339 timestamp when the session started.
    pub created_at: String,
}

/// Where the session currently stands.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Not yet asked the provider.
    #[default]
    Unresolved,
    /// A user is signed in.
    Authenticated(Session),
    /// Nobody is signed in.
    Unauthenticated,
}

impl SessionState {
    /// The signed-in session, if any.
    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        match self {
            Self::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.session().map(|session| &session.user)
    }

    /// Whether the provider has answered yet.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        !matches!(self, Self::Unresolved)
    }
}

type Listener = Rc<dyn Fn(&SessionState)>;

struct Inner {
    provider: Box<dyn IdentityProvider>,
    state: RefCell<SessionState>,
    listeners: RefCell<Vec<(u64, Listener)>>,
    next_listener: Cell<u64>,
}

/// Shared handle to the session. Clones refer to the same state.
#[derive(Clone)]
pub struct SessionStore {
    inner: Rc<Inner>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &*self.inner.state.borrow())
            .field("listeners", &self.inner.listeners.borrow().len())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Wrap an identity provider. The store starts out unresolved.
    pub fn new(provider: impl IdentityProvider + 'static) -> Self {
        Self {
            inner: Rc::new(Inner {
                provider: Box::new(provider),
                state: RefCell::new(SessionState::Unresolved),
                listeners: RefCell::new(Vec::new()),
                next_listener: Cell::new(0),
            }),
        }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.inner.state.borrow().user().cloned()
    }

    /// Ask the provider for the persisted session.
    ///
    /// A provider error counts as "no session".
    pub fn resolve(&self) -> SessionState {
        let state = match self.inner.provider.current_session() {
            Ok(Some(session)) => SessionState::Authenticated(session),
            Ok(None) => SessionState::Unauthenticated,
            Err(e) => {
                tracing::warn!(error = %e, "could not resolve session; treating as signed out");
                SessionState::Unauthenticated
            }
        };
        self.set_state(state.clone());
        state
    }

    /// Sign in and broadcast the new session.
    ///
    /// # Errors
    ///
    /// Returns the provider's error; the state is left unchanged.
    pub fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let session = self.inner.provider.sign_in(email, password)?;
        tracing::debug!(user = %session.user.id, "signed in");
        self.set_state(SessionState::Authenticated(session.clone()));
        Ok(session)
    }

    /// Register an account. The state is not changed.
    ///
    /// # Errors
    ///
    /// Returns the provider's error.
    pub fn sign_up(&self, email: &str, password: &str) -> Result<User> {
        let user = self.inner.provider.sign_up(email, password)?;
        tracing::debug!(user = %user.id, "signed up");
        Ok(user)
    }

    /// Sign out and broadcast the change.
    ///
    /// # Errors
    ///
    /// Returns the provider's error; the state is left unchanged.
    pub fn sign_out(&self) -> Result<()> {
        self.inner.provider.sign_out()?;
        tracing::debug!("signed out");
        self.set_state(SessionState::Unauthenticated);
        Ok(())
    }

    /// Register a listener called with every new state.
    ///
    /// The listener stays registered until the returned handle is dropped.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, listener: impl Fn(&SessionState) + 'static) -> Subscription {
        let id = self.inner.next_listener.get();
        self.inner.next_listener.set(id + 1);
        self.inner.listeners.borrow_mut().push((id, Rc::new(listener)));
        Subscription { id, store: Rc::downgrade(&self.inner) }
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    fn set_state(&self, state: SessionState) {
        {
            let mut current = self.inner.state.borrow_mut();
            if *current == state {
                return;
            }
            *current = state.clone();
        }

        // Listeners may subscribe or unsubscribe while being notified.
        let listeners: Vec<Listener> =
            self.inner.listeners.borrow().iter().map(|(_, l)| Rc::clone(l)).collect();
        for listener in listeners {
            listener(&state);
        }
    }
}

/// Handle for a registered listener.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    store: Weak<Inner>,
}

impl Subscription {
    /// Remove the listener now.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.store.upgrade() {
            inner.listeners.borrow_mut().retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockIdentityProvider;

    fn store_with_user() -> (Rc<MockIdentityProvider>, SessionStore) {
        let provider = Rc::new(MockIdentityProvider::new());
        provider.add_user("ada@example.com", "hunter22");
        let store = SessionStore::new(Rc::clone(&provider));
        (provider, store)
    }

    #[test]
    fn test_starts_unresolved() {
        let (_provider, store) = store_with_user();
        assert_eq!(store.state(), SessionState::Unresolved);
        assert!(!store.state().is_resolved());
    }

    #[test]
    fn test_resolve_without_session() {
        let (_provider, store) = store_with_user();
        assert_eq!(store.resolve(), SessionState::Unauthenticated);
    }

    #[test]
    fn test_resolve_error_is_no_session() {
        let (provider, store) = store_with_user();
        provider.fail_current_session(true);
        assert_eq!(store.resolve(), SessionState::Unauthenticated);
    }

    #[test]
    fn test_resolve_existing_session() {
        let (provider, store) = store_with_user();
        provider.sign_in("ada@example.com", "hunter22").unwrap();
        let state = store.resolve();
        assert_eq!(state.user().unwrap().email.as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn test_sign_in_and_out_notify_listeners() {
        let (_provider, store) = store_with_user();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _sub = store.subscribe(move |state| sink.borrow_mut().push(state.is_resolved()));

        store.sign_in("ada@example.com", "hunter22").unwrap();
        assert!(store.current_user().is_some());
        store.sign_out().unwrap();
        assert!(store.current_user().is_none());

        assert_eq!(*seen.borrow(), vec![true, true]);
    }

    #[test]
    fn test_failed_sign_in_keeps_state() {
        let (_provider, store) = store_with_user();
        store.resolve();
        let err = store.sign_in("ada@example.com", "wrong").unwrap_err();
        assert!(matches!(err, crate::Error::Auth(_)));
        assert_eq!(store.state(), SessionState::Unauthenticated);
    }

    #[test]
    fn test_failed_sign_out_keeps_session() {
        let (provider, store) = store_with_user();
        store.sign_in("ada@example.com", "hunter22").unwrap();
        provider.fail_sign_out(true);
        assert!(store.sign_out().is_err());
        assert!(store.current_user().is_some());
    }

    #[test]
    fn test_sign_up_does_not_sign_in() {
        let (_provider, store) = store_with_user();
        store.resolve();
        store.sign_up("grace@example.com", "password1").unwrap();
        assert_eq!(store.state(), SessionState::Unauthenticated);
    }

    #[test]
    fn test_unchanged_state_does_not_notify() {
        let (_provider, store) = store_with_user();
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        let _sub = store.subscribe(move |_| counter.set(counter.get() + 1));

        store.resolve();
        store.resolve();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_dropping_subscription_unsubscribes() {
        let (_provider, store) = store_with_user();
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        let sub = store.subscribe(move |_| counter.set(counter.get() + 1));
        let other = store.subscribe(|_| {});
        assert_eq!(store.listener_count(), 2);

        sub.unsubscribe();
        assert_eq!(store.listener_count(), 1);
        store.resolve();
        assert_eq!(count.get(), 0);

        drop(other);
        assert_eq!(store.listener_count(), 0);
    }

    #[test]
    fn test_subscription_outliving_store() {
        let (_provider, store) = store_with_user();
        let sub = store.subscribe(|_| {});
        drop(store);
        drop(sub);
    }
}
