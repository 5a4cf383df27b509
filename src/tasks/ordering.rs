//! Sparse sort keys for drag-and-drop ordering.
//!
//! Tasks carry a floating-point `order_key`. Appends land one `STEP` past the
//! current maximum and a move rewrites only the moved task's key, picking a
//! value between its new neighbours. When the gap between neighbours becomes
//! too small to split, the whole sequence is respaced to multiples of `STEP`.

use crate::error::{Error, Result};
use crate::tasks::models::{Task, TaskId};

/// Distance between consecutive keys on append and after a rebalance.
pub const STEP: f64 = 1000.0;

/// Smallest gap to a neighbour a computed key may have before the sequence is
/// respaced.
pub const DEFAULT_MIN_GAP: f64 = 1e-3;

/// A key that must be persisted for one task.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyChange {
    /// The task whose key changed.
    pub task_id: TaskId,
    /// Its new key.
    pub order_key: f64,
}

/// Result of planning a move.
#[derive(Debug, Clone, PartialEq)]
pub struct MovePlan {
    /// The sequence after the move, sorted by key.
    pub sequence: Vec<Task>,
    /// Keys to persist. The moved task comes first.
    pub changes: Vec<KeyChange>,
    /// Whether every key was respaced.
    pub rebalanced: bool,
}

impl MovePlan {
    /// The moved task's new key, if anything changed.
    #[must_use]
    pub fn moved(&self) -> Option<&KeyChange> {
        self.changes.first()
    }

    /// Whether the move left every key untouched.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Key spacing parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ordering {
    /// Distance between keys on append and rebalance.
    pub step: f64,
    /// Minimum distance from a new key to either neighbour.
    pub min_gap: f64,
}

impl Default for Ordering {
    fn default() -> Self {
        Self { step: STEP, min_gap: DEFAULT_MIN_GAP }
    }
}

impl Ordering {
    /// Create spacing parameters.
    #[must_use]
    pub const fn new(step: f64, min_gap: f64) -> Self {
        Self { step, min_gap }
    }

    /// Key for a task appended after every task in `tasks`.
    #[must_use]
    pub fn next_key(&self, tasks: &[Task]) -> f64 {
        tasks
            .iter()
            .map(|task| task.order_key)
            .reduce(f64::max)
            .map_or(self.step, |max| max + self.step)
    }

    /// Plan moving the task at `from` to position `to` in `sequence`.
    ///
    /// `sequence` must be in display order. Only the moved task's key changes
    /// unless the new key would crowd a neighbour, in which case every task is
    /// respaced in its post-move order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] if either position is outside the
    /// sequence.
    pub fn move_task(&self, sequence: &[Task], from: usize, to: usize) -> Result<MovePlan> {
        let len = sequence.len();
        for index in [from, to] {
            if index >= len {
                return Err(Error::IndexOutOfRange { index, len });
            }
        }

        let mut tasks = sequence.to_vec();
        if from == to {
            return Ok(MovePlan { sequence: tasks, changes: Vec::new(), rebalanced: false });
        }

        let moved = tasks.remove(from);
        tasks.insert(to, moved);

        let before = to.checked_sub(1).map(|i| tasks[i].order_key);
        let after = tasks.get(to + 1).map(|task| task.order_key);
        let key = match (before, after) {
            (None, Some(next)) => next / 2.0,
            (None, None) => self.step / 2.0,
            (Some(prev), None) => prev + self.step,
            (Some(prev), Some(next)) => (prev + next) / 2.0,
        };

        if self.fits(before, key, after) {
            tasks[to].order_key = key;
            let change = KeyChange { task_id: tasks[to].id, order_key: key };
            sort_by_order_key(&mut tasks);
            return Ok(MovePlan { sequence: tasks, changes: vec![change], rebalanced: false });
        }

        let moved_id = tasks[to].id;
        let mut changes = self.rebalance(&mut tasks);
        if let Some(pos) = changes.iter().position(|change| change.task_id == moved_id) {
            let change = changes.remove(pos);
            changes.insert(0, change);
        }
        Ok(MovePlan { sequence: tasks, changes, rebalanced: true })
    }

    /// Respace every key to `(i + 1) * step` in the current order.
    ///
    /// Returns the tasks whose key actually changed.
    #[allow(clippy::cast_precision_loss)]
    pub fn rebalance(&self, tasks: &mut [Task]) -> Vec<KeyChange> {
        let mut changes = Vec::new();
        for (i, task) in tasks.iter_mut().enumerate() {
            let key = (i + 1) as f64 * self.step;
            if task.order_key.to_bits() != key.to_bits() {
                task.order_key = key;
                changes.push(KeyChange { task_id: task.id, order_key: key });
            }
        }
        changes
    }

    /// Whether `key` sits at least `min_gap` away from both neighbours.
    fn fits(&self, before: Option<f64>, key: f64, after: Option<f64>) -> bool {
        key.is_finite()
            && before.map_or(true, |prev| key - prev >= self.min_gap)
            && after.map_or(true, |next| next - key >= self.min_gap)
    }
}

/// Key for a task appended after `tasks`, with the default step.
#[must_use]
pub fn next_key(tasks: &[Task]) -> f64 {
    Ordering::default().next_key(tasks)
}

/// Plan a move with the default spacing.
///
/// # Errors
///
/// Returns [`Error::IndexOutOfRange`] if either position is outside the
/// sequence.
pub fn move_task(sequence: &[Task], from: usize, to: usize) -> Result<MovePlan> {
    Ordering::default().move_task(sequence, from, to)
}

/// Stable ascending sort by `order_key`.
pub fn sort_by_order_key(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| a.order_key.total_cmp(&b.order_key));
}
