//! Sign-in / sign-up form state.

use crate::session::SessionStore;

/// Message shown after a successful sign-in.
pub const SIGNED_IN_MESSAGE: &str = "Signed in successfully!";

/// Message shown after a successful sign-up.
pub const SIGNED_UP_MESSAGE: &str =
    "Sign-up successful! Please check your email to confirm your account.";

/// Which tab of the form is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// Existing account.
    #[default]
    SignIn,
    /// New account.
    SignUp,
}

impl AuthMode {
    /// Form heading for the mode.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::SignIn => "Sign In",
            Self::SignUp => "Create an Account",
        }
    }

    /// Short instructions for the mode.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::SignIn => "Enter your email and password to access your account.",
            Self::SignUp => "Enter your email and password to create an account.",
        }
    }
}

/// Two-mode authentication form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthForm {
    mode: AuthMode,
    /// Email input.
    pub email: String,
    /// Password input.
    pub password: String,
    loading: bool,
    error: Option<String>,
    message: Option<String>,
}

impl AuthForm {
    /// A blank form in sign-in mode.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The active mode.
    #[must_use]
    pub const fn mode(&self) -> AuthMode {
        self.mode
    }

    /// Whether a submission is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// The error from the last submission.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The success message from the last submission.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Switch tabs, clearing inputs and feedback.
    pub fn switch_mode(&mut self, mode: AuthMode) {
        *self = Self { mode, ..Self::default() };
    }

    /// Submit the form through `sessions`.
    ///
    /// Returns whether the provider accepted the request. On failure the
    /// provider's message is kept in [`Self::error`].
    pub fn submit(&mut self, sessions: &SessionStore) -> bool {
        self.loading = true;
        self.error = None;
        self.message = None;

        let outcome = match self.mode {
            AuthMode::SignUp => {
                let result = sessions.sign_up(&self.email, &self.password);
                if result.is_ok() {
                    self.email.clear();
                    self.password.clear();
                }
                result.map(|_| SIGNED_UP_MESSAGE)
            }
            AuthMode::SignIn => {
                sessions.sign_in(&self.email, &self.password).map(|_| SIGNED_IN_MESSAGE)
            }
        };

        self.loading = false;
        match outcome {
            Ok(message) => {
                self.message = Some(message.to_string());
                true
            }
            Err(e) => {
                self.error = Some(e.to_string());
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockIdentityProvider;
    use std::rc::Rc;

    fn sessions() -> SessionStore {
        let provider = Rc::new(MockIdentityProvider::new());
        provider.add_user("ada@example.com", "analytical");
        SessionStore::new(provider)
    }

    #[test]
    fn test_sign_in_success() {
        let sessions = sessions();
        let mut form = AuthForm::new();
        form.email = "ada@example.com".to_string();
        form.password = "analytical".to_string();

        assert!(form.submit(&sessions));
        assert_eq!(form.message(), Some(SIGNED_IN_MESSAGE));
        assert!(form.error().is_none());
        assert!(!form.is_loading());
        assert!(sessions.current_user().is_some());
    }

    #[test]
    fn test_sign_in_failure_shows_error() {
        let sessions = sessions();
        let mut form = AuthForm::new();
        form.email = "ada@example.com".to_string();
        form.password = "nope".to_string();

        assert!(!form.submit(&sessions));
        assert_eq!(form.error(), Some("Invalid login credentials"));
        assert!(form.message().is_none());
        assert_eq!(form.email, "ada@example.com");
    }

    #[test]
    fn test_sign_up_clears_credentials() {
        let sessions = sessions();
        let mut form = AuthForm::new();
        form.switch_mode(AuthMode::SignUp);
        form.email = "grace@example.com".to_string();
        form.password = "compiler".to_string();

        assert!(form.submit(&sessions));
        assert_eq!(form.message(), Some(SIGNED_UP_MESSAGE));
        assert!(form.email.is_empty());
        assert!(form.password.is_empty());
        assert!(sessions.current_user().is_none());
    }

    #[test]
    fn test_switch_mode_clears_everything() {
        let sessions = sessions();
        let mut form = AuthForm::new();
        form.email = "x@example.com".to_string();
        form.password = "bad".to_string();
        form.submit(&sessions);
        assert!(form.error().is_some());

        form.switch_mode(AuthMode::SignUp);
        assert_eq!(form.mode(), AuthMode::SignUp);
        assert!(form.email.is_empty());
        assert!(form.password.is_empty());
        assert!(form.error().is_none());
        assert_eq!(form.mode().title(), "Create an Account");
    }
}
