//! Task model types for the task board.

use serde::{Deserialize, Serialize};

/// Store-assigned task identifier.
pub type TaskId = i64;

/// Identity of the user who owns a task.
///
/// Every read and write against the task store is scoped to one owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    /// Wrap a raw identity string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identity string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A sub-entry of a task. Its position in the parent's list is its order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChecklistItem {
    /// Item text.
    pub text: String,
    /// Whether the item is checked off.
    pub completed: bool,
}

impl ChecklistItem {
    /// Create an unchecked item.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), completed: false }
    }
}

/// A task on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Identifier assigned by the store on creation.
    pub id: TaskId,
    /// Short title, never empty.
    pub title: String,
    /// Free-form description, may be empty.
    pub description: String,
    /// The user the task belongs to.
    pub owner: OwnerId,
    /// Sort key; ascending order is the visible order.
    pub order_key: f64,
    /// Whether the task is done.
    pub completed: bool,
    /// Checklist entries in display order.
    pub checklist_items: Vec<ChecklistItem>,
    /// ISO 8601 timestamp when the task was created.
    pub created_at: String,
    /// ISO 8601 timestamp when the task was last updated.
    pub updated_at: String,
}

impl Task {
    /// Number of checklist items that are checked off.
    #[must_use]
    pub fn checklist_progress(&self) -> (usize, usize) {
        let done = self.checklist_items.iter().filter(|item| item.completed).count();
        (done, self.checklist_items.len())
    }
}

/// Payload for inserting a task. The store assigns `id` and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    /// Task title.
    pub title: String,
    /// Task description.
    pub description: String,
    /// Initial checklist.
    pub checklist_items: Vec<ChecklistItem>,
    /// Sort key computed by the ordering engine.
    pub order_key: f64,
    /// Initial completion flag.
    pub completed: bool,
}

/// Fields that can be updated on a task.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TaskPatch {
    /// New title (if Some).
    pub title: Option<String>,
    /// New description (if Some).
    pub description: Option<String>,
    /// New sort key (if Some).
    pub order_key: Option<f64>,
    /// New completion flag (if Some).
    pub completed: Option<bool>,
    /// Replacement checklist (if Some).
    pub checklist_items: Option<Vec<ChecklistItem>>,
}

impl TaskPatch {
    /// Check if any fields are set for update.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.order_key.is_none()
            && self.completed.is_none()
            && self.checklist_items.is_none()
    }

    /// A patch that only moves the task.
    #[must_use]
    pub fn order_key(order_key: f64) -> Self {
        Self { order_key: Some(order_key), ..Self::default() }
    }

    /// A patch that only sets the completion flag.
    #[must_use]
    pub fn completed(completed: bool) -> Self {
        Self { completed: Some(completed), ..Self::default() }
    }

    /// A patch that only replaces the checklist.
    #[must_use]
    pub fn checklist(items: Vec<ChecklistItem>) -> Self {
        Self { checklist_items: Some(items), ..Self::default() }
    }

    /// Apply the set fields to a local copy of a task.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(ref title) = self.title {
            task.title.clone_from(title);
        }
        if let Some(ref description) = self.description {
            task.description.clone_from(description);
        }
        if let Some(order_key) = self.order_key {
            task.order_key = order_key;
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        if let Some(ref items) = self.checklist_items {
            task.checklist_items.clone_from(items);
        }
    }
}

/// Check that a title has visible content.
#[must_use]
pub fn is_valid_title(title: &str) -> bool {
    !title.trim().is_empty()
}
