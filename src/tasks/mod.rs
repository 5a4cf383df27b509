//! Tasks, their storage, and their ordering.
//!
//! This module provides:
//! - The task model with nested checklist items
//! - A record decoder that normalizes rows coming back from a store
//! - The [`TaskStore`] seam and its `SQLite` implementation
//! - The ordering engine that assigns sparse sort keys
//!
//! # Example
//!
//! ```no_run
//! use lynk::tasks::{ordering, NewTask, OwnerId, SqliteTaskStore, TaskStore};
//!
//! let store = SqliteTaskStore::new("/tmp/lynk.sqlite3").unwrap();
//! let owner = OwnerId::new("user-1");
//!
//! let existing: Vec<_> = store
//!     .select_tasks(&owner)
//!     .unwrap()
//!     .into_iter()
//!     .filter_map(|record| record.decode().ok())
//!     .collect();
//!
//! let task = NewTask {
//!     title: "Water the plants".to_string(),
//!     description: String::new(),
//!     checklist_items: Vec::new(),
//!     order_key: ordering::next_key(&existing),
//!     completed: false,
//! };
//! store.insert_task(&owner, &task).unwrap();
//! ```

pub mod models;
pub mod ordering;
pub mod record;
pub mod store;

pub use models::{is_valid_title, ChecklistItem, NewTask, OwnerId, Task, TaskId, TaskPatch};
pub use ordering::{KeyChange, MovePlan, Ordering};
pub use record::{RawChecklistItem, TaskRecord};
pub use store::{SqliteTaskStore, TaskStore};
