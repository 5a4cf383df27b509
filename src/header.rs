//! Navigation header state: greeting and log-out.

use crate::session::{SessionState, SessionStore, Subscription};
use std::cell::RefCell;
use std::rc::Rc;

/// Header that follows the shared session store.
///
/// Holds its own subscription; dropping the header unsubscribes.
#[derive(Debug)]
pub struct Header {
    sessions: SessionStore,
    state: Rc<RefCell<SessionState>>,
    _subscription: Subscription,
}

impl Header {
    /// Create a header bound to `sessions`.
    #[must_use]
    pub fn new(sessions: &SessionStore) -> Self {
        let state = Rc::new(RefCell::new(sessions.state()));
        let sink = Rc::clone(&state);
        let subscription = sessions.subscribe(move |next| {
            *sink.borrow_mut() = next.clone();
        });
        Self { sessions: sessions.clone(), state, _subscription: subscription }
    }

    /// Whether a user is signed in.
    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.state.borrow().session().is_some()
    }

    /// `Welcome, <email>!` when signed in.
    #[must_use]
    pub fn greeting(&self) -> Option<String> {
        let state = self.state.borrow();
        let user = state.user()?;
        Some(format!("Welcome, {}!", user.email.as_deref().unwrap_or("User")))
    }

    /// Sign out. Failures are logged and the session is kept.
    pub fn log_out(&self) {
        if let Err(e) = self.sessions.sign_out() {
            tracing::error!(error = %e, "error logging out");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockIdentityProvider;

    fn setup() -> (Rc<MockIdentityProvider>, SessionStore) {
        let provider = Rc::new(MockIdentityProvider::new());
        provider.add_user("ada@example.com", "analytical");
        let sessions = SessionStore::new(Rc::clone(&provider));
        sessions.resolve();
        (provider, sessions)
    }

    #[test]
    fn test_greeting_follows_session() {
        let (_provider, sessions) = setup();
        let header = Header::new(&sessions);
        assert!(!header.is_signed_in());
        assert_eq!(header.greeting(), None);

        sessions.sign_in("ada@example.com", "analytical").unwrap();
        assert_eq!(header.greeting().as_deref(), Some("Welcome, ada@example.com!"));

        header.log_out();
        assert!(!header.is_signed_in());
        assert!(sessions.current_user().is_none());
    }

    #[test]
    fn test_failed_log_out_keeps_session() {
        let (provider, sessions) = setup();
        sessions.sign_in("ada@example.com", "analytical").unwrap();
        let header = Header::new(&sessions);
        provider.fail_sign_out(true);
        header.log_out();
        assert!(header.is_signed_in());
    }

    #[test]
    fn test_each_header_holds_its_own_subscription() {
        let (_provider, sessions) = setup();
        let first = Header::new(&sessions);
        let second = Header::new(&sessions);
        assert_eq!(sessions.listener_count(), 2);
        drop(first);
        assert_eq!(sessions.listener_count(), 1);
        drop(second);
        assert_eq!(sessions.listener_count(), 0);
    }
}
