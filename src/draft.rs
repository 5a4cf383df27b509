//! Form state for adding and editing a task.

use crate::tasks::{ChecklistItem, NewTask, Task, TaskPatch};

/// Fields of the add/edit task form, including the dynamic checklist rows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskDraft {
    /// Title input.
    pub title: String,
    /// Description input.
    pub description: String,
    /// Checklist rows in display order.
    pub checklist_items: Vec<ChecklistItem>,
}

impl TaskDraft {
    /// A draft with just a title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), ..Self::default() }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Append a checklist row with the given text.
    #[must_use]
    pub fn with_item(mut self, text: impl Into<String>) -> Self {
        self.checklist_items.push(ChecklistItem::new(text));
        self
    }

    /// Prefill the form from an existing task.
    #[must_use]
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            checklist_items: task.checklist_items.clone(),
        }
    }

    /// Append an empty, unchecked row.
    pub fn add_item(&mut self) {
        self.checklist_items.push(ChecklistItem::default());
    }

    /// Change the text of row `index`, keeping its completion flag.
    ///
    /// Returns `false` if there is no such row.
    pub fn set_item_text(&mut self, index: usize, text: impl Into<String>) -> bool {
        match self.checklist_items.get_mut(index) {
            Some(item) => {
                item.text = text.into();
                true
            }
            None => false,
        }
    }

    /// Remove row `index`; later rows shift up.
    pub fn remove_item(&mut self, index: usize) -> Option<ChecklistItem> {
        (index < self.checklist_items.len()).then(|| self.checklist_items.remove(index))
    }

    /// Clear every field.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Insert payload for this draft at `order_key`.
    #[must_use]
    pub fn to_new_task(&self, order_key: f64) -> NewTask {
        NewTask {
            title: self.title.clone(),
            description: self.description.clone(),
            checklist_items: self.checklist_items.clone(),
            order_key,
            completed: false,
        }
    }

    /// Update payload writing every editable field.
    #[must_use]
    pub fn to_patch(&self) -> TaskPatch {
        TaskPatch {
            title: Some(self.title.clone()),
            description: Some(self.description.clone()),
            checklist_items: Some(self.checklist_items.clone()),
            ..TaskPatch::default()
        }
    }
}
