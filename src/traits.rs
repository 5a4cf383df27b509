//! Core traits for testability and abstraction.

use crate::error::Result;
use crate::session::{Session, User};
use std::rc::Rc;

/// Trait for the identity collaborator.
///
/// The identity provider owns accounts and the persisted current session.
/// The production implementation uses `SQLite`, while tests use an in-memory
/// mock.
pub trait IdentityProvider {
    /// Fetch the currently persisted session, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be read.
    fn current_session(&self) -> Result<Option<Session>>;

    /// Sign in with email and password, making the new session current.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Auth`] if the credentials are rejected.
    fn sign_in(&self, email: &str, password: &str) -> Result<Session>;

    /// Register a new account. Does not sign in.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Auth`] if the account cannot be created.
    fn sign_up(&self, email: &str, password: &str) -> Result<User>;

    /// End the current session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be cleared.
    fn sign_out(&self) -> Result<()>;
}

impl<T: IdentityProvider + ?Sized> IdentityProvider for Rc<T> {
    fn current_session(&self) -> Result<Option<Session>> {
        (**self).current_session()
    }

    fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        (**self).sign_in(email, password)
    }

    fn sign_up(&self, email: &str, password: &str) -> Result<User> {
        (**self).sign_up(email, password)
    }

    fn sign_out(&self) -> Result<()> {
        (**self).sign_out()
    }
}
