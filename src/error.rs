//! Error types for `lynk`.

/// Errors that can occur while driving the task board.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON parsing error occurred.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A YAML parsing error occurred.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A `SQLite` database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A task title was empty or only whitespace.
    #[error("Task title cannot be empty.")]
    EmptyTitle,

    /// The referenced task does not exist for the current owner.
    #[error("task not found: {0}")]
    TaskNotFound(i64),

    /// The referenced checklist item does not exist on the task.
    #[error("checklist item {index} not found on task {task_id}")]
    ChecklistItemNotFound {
        /// The task that was searched.
        task_id: i64,
        /// The missing index.
        index: usize,
    },

    /// A position passed to a reorder was outside the sequence.
    #[error("position {index} is out of range for {len} tasks")]
    IndexOutOfRange {
        /// The requested position.
        index: usize,
        /// The number of tasks in the sequence.
        len: usize,
    },

    /// A row from the task store failed validation.
    #[error("Invalid task record: {0}")]
    InvalidRecord(String),

    /// The session has not been resolved yet.
    #[error("session is still being resolved")]
    SessionUnresolved,

    /// No user is signed in.
    #[error("not signed in")]
    NotSignedIn,

    /// The identity provider rejected the request.
    #[error("{0}")]
    Auth(String),

    /// The task store rejected the request.
    #[error("Remote store error: {0}")]
    Remote(String),
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
