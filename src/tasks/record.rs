//! Raw task rows as they come back from a task store.
//!
//! Stores hand back loosely shaped rows: optional columns may be null and
//! older rows keep checklist entries as bare strings. [`TaskRecord::decode`]
//! validates a row and normalizes it into a [`Task`] before it reaches the
//! board.

use crate::error::{Error, Result};
use crate::tasks::models::{ChecklistItem, OwnerId, Task, TaskId};
use serde::{Deserialize, Serialize};

/// A checklist entry in either of its stored shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawChecklistItem {
    /// Legacy shape: the item text only.
    Text(String),
    /// Current shape.
    Item {
        /// Item text.
        #[serde(default)]
        text: String,
        /// Completion flag; absent means unchecked.
        #[serde(default)]
        completed: Option<bool>,
    },
}

impl From<RawChecklistItem> for ChecklistItem {
    fn from(raw: RawChecklistItem) -> Self {
        match raw {
            RawChecklistItem::Text(text) => Self { text, completed: false },
            RawChecklistItem::Item { text, completed } => {
                Self { text, completed: completed.unwrap_or(false) }
            }
        }
    }
}

impl From<&ChecklistItem> for RawChecklistItem {
    fn from(item: &ChecklistItem) -> Self {
        Self::Item { text: item.text.clone(), completed: Some(item.completed) }
    }
}

/// A task row before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Store-assigned identifier.
    pub id: TaskId,
    /// Title column.
    pub title: String,
    /// Description column.
    #[serde(default)]
    pub description: Option<String>,
    /// Owner column.
    #[serde(alias = "user_id")]
    pub owner: String,
    /// Sort key column.
    #[serde(default, alias = "order_index")]
    pub order_key: Option<f64>,
    /// Completion column.
    #[serde(default)]
    pub completed: Option<bool>,
    /// Checklist column.
    #[serde(default)]
    pub checklist_items: Option<Vec<RawChecklistItem>>,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: String,
    /// Last update timestamp; falls back to `created_at`.
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl TaskRecord {
    /// Validate and normalize the row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRecord`] if the owner is empty or the sort key
    /// is not a finite number.
    pub fn decode(self) -> Result<Task> {
        if self.owner.trim().is_empty() {
            return Err(Error::InvalidRecord(format!("task {} has no owner", self.id)));
        }
        let order_key = self.order_key.unwrap_or(0.0);
        if !order_key.is_finite() {
            return Err(Error::InvalidRecord(format!(
                "task {} has a non-finite order key",
                self.id
            )));
        }

        let updated_at = self.updated_at.unwrap_or_else(|| self.created_at.clone());
        Ok(Task {
            id: self.id,
            title: self.title,
            description: self.description.unwrap_or_default(),
            owner: OwnerId::new(self.owner),
            order_key,
            completed: self.completed.unwrap_or(false),
            checklist_items: self
                .checklist_items
                .unwrap_or_default()
                .into_iter()
                .map(ChecklistItem::from)
                .collect(),
            created_at: self.created_at,
            updated_at,
        })
    }
}

impl From<&Task> for TaskRecord {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            description: Some(task.description.clone()),
            owner: task.owner.as_str().to_string(),
            order_key: Some(task.order_key),
            completed: Some(task.completed),
            checklist_items: Some(task.checklist_items.iter().map(RawChecklistItem::from).collect()),
            created_at: task.created_at.clone(),
            updated_at: Some(task.updated_at.clone()),
        }
    }
}

/// Decode a checklist column stored as JSON text.
///
/// # Errors
///
/// Returns [`Error::InvalidRecord`] if the text is not a JSON array of
/// checklist entries.
pub fn parse_checklist(json: &str) -> Result<Vec<RawChecklistItem>> {
    serde_json::from_str(json).map_err(|e| Error::InvalidRecord(format!("checklist: {e}")))
}

/// Encode a checklist for a JSON text column.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn encode_checklist(items: &[ChecklistItem]) -> Result<String> {
    Ok(serde_json::to_string(items)?)
}
