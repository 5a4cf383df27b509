//! # `lynk`
//!
//! A personal task list: tasks with checklists, kept in a user-chosen order
//! by sparse fractional keys, and only reachable while a user is signed in.
//!
//! The pieces are plain view models that a front end drives:
//! - [`SessionStore`] owns the authentication state and notifies subscribers
//! - [`TaskBoard`] holds the signed-in user's tasks and writes through a
//!   [`tasks::TaskStore`]
//! - [`tasks::ordering`] computes order keys for appends and moves
//! - [`AuthForm`], [`Header`] and [`TaskDraft`] back the remaining screens

pub mod auth_form;
pub mod board;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod draft;
pub mod error;
pub mod header;
pub mod identity;
pub mod logging;
pub mod paths;
pub mod session;
pub mod tasks;
pub mod testing;
pub mod traits;
pub mod views;

pub use auth_form::{AuthForm, AuthMode};
pub use board::TaskBoard;
pub use draft::TaskDraft;
pub use error::{Error, Result};
pub use header::Header;
pub use session::{Session, SessionState, SessionStore, Subscription, User};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
