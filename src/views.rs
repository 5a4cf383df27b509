//! Plain-text rendering of boards and pages.

use crate::tasks::Task;
use std::fmt::Write as _;

/// Shown when the signed-in user has no tasks.
pub const EMPTY_BOARD_MESSAGE: &str = "No tasks found. Add a new task to get started!";

/// Shown to visitors who are not signed in.
pub const LANDING: &str = "\
Welcome to Lynk

Your companion for managing tasks, goals, and everything in between.

  Intuitive task management  Create, organize and prioritize your tasks.
  Goal setting & tracking    Break big goals into checklists and watch them fill in.

Run `lynk signup` to create an account or `lynk signin` to log in.";

fn mark(completed: bool) -> &'static str {
    if completed {
        "[x]"
    } else {
        "[ ]"
    }
}

/// Render one task card. `position` is 1-based.
#[must_use]
pub fn render_task(position: usize, task: &Task) -> String {
    let mut out = format!("{position}. {} {} (#{})", mark(task.completed), task.title, task.id);
    if !task.description.trim().is_empty() {
        let _ = write!(out, "\n     {}", task.description.trim());
    }
    for (i, item) in task.checklist_items.iter().enumerate() {
        let _ = write!(out, "\n     {}. {} {}", i + 1, mark(item.completed), item.text);
    }
    if !task.checklist_items.is_empty() {
        let (done, total) = task.checklist_progress();
        let _ = write!(out, "\n     {done}/{total} done");
    }
    out
}

/// Render the whole board in display order.
#[must_use]
pub fn render_board(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return EMPTY_BOARD_MESSAGE.to_string();
    }
    tasks
        .iter()
        .enumerate()
        .map(|(i, task)| render_task(i + 1, task))
        .collect::<Vec<_>>()
        .join("\n")
}
