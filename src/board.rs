//! The task board view model.
//!
//! [`TaskBoard`] keeps the signed-in user's tasks in display order and keeps
//! them in step with a [`TaskStore`]. Completion toggles, checklist toggles
//! and reorders are applied locally first and rolled back if the store
//! rejects them. Adds, edits and deletes wait for the store before touching
//! local state.
//!
//! The board only talks to the store while a user is signed in. Attached to
//! a [`SessionStore`], it loads on sign-in and clears on sign-out. Every
//! reader and operation applies a session change delivered since the last
//! call first, so a sign-out is never followed by a read of stale tasks.

use crate::draft::TaskDraft;
use crate::error::{Error, Result};
use crate::session::{SessionState, SessionStore, Subscription};
use crate::tasks::ordering::{self, KeyChange, MovePlan, Ordering};
use crate::tasks::{is_valid_title, OwnerId, Task, TaskId, TaskPatch, TaskRecord, TaskStore};
use std::cell::RefCell;
use std::rc::Rc;

/// In-memory task list for one user, synchronized with a task store.
#[derive(Debug)]
pub struct TaskBoard<S> {
    store: S,
    ordering: Ordering,
    session: SessionState,
    tasks: Vec<Task>,
    last_error: Option<String>,
    pending: Rc<RefCell<Option<SessionState>>>,
    subscription: Option<Subscription>,
}

impl<S: TaskStore> TaskBoard<S> {
    /// Create a board that is not attached to a session store.
    ///
    /// The board starts unresolved; drive it with [`Self::set_session`].
    pub fn new(store: S, ordering: Ordering) -> Self {
        Self {
            store,
            ordering,
            session: SessionState::Unresolved,
            tasks: Vec::new(),
            last_error: None,
            pending: Rc::new(RefCell::new(None)),
            subscription: None,
        }
    }

    /// Create a board that follows `sessions`.
    ///
    /// The current session state is applied immediately. Later changes are
    /// picked up before the next board operation. The subscription is
    /// released when the board is dropped.
    pub fn attach(store: S, ordering: Ordering, sessions: &SessionStore) -> Self {
        let mut board = Self::new(store, ordering);
        let pending = Rc::clone(&board.pending);
        board.subscription = Some(sessions.subscribe(move |state| {
            *pending.borrow_mut() = Some(state.clone());
        }));
        board.set_session(sessions.state());
        board
    }

    /// The store this board writes to.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Tasks in display order.
    ///
    /// Empty once the followed session has signed out, even if no board
    /// operation has run since.
    pub fn tasks(&mut self) -> &[Task] {
        self.sync_session();
        &self.tasks
    }

    /// Look up a task by id.
    pub fn task(&mut self, id: TaskId) -> Option<&Task> {
        self.sync_session();
        self.tasks.iter().find(|task| task.id == id)
    }

    /// The session state the board is acting on.
    pub fn session(&mut self) -> &SessionState {
        self.sync_session();
        &self.session
    }

    /// Whether the board is waiting for the session to resolve.
    pub fn is_loading(&mut self) -> bool {
        self.sync_session();
        !self.session.is_resolved()
    }

    /// The most recent failure, cleared by the next successful operation.
    pub fn last_error(&mut self) -> Option<&str> {
        self.sync_session();
        self.last_error.as_deref()
    }

    /// Whether the board is following a session store.
    #[must_use]
    pub const fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    /// Apply a session transition.
    ///
    /// Signing in loads the user's tasks; signing out, or any state without
    /// a user, empties the list. A failed load is reported through
    /// [`Self::last_error`].
    pub fn set_session(&mut self, state: SessionState) {
        let previous_owner = self.session.user().map(|user| user.id.clone());
        self.session = state;

        match self.session.user().map(|user| user.id.clone()) {
            Some(owner) => {
                if previous_owner.as_ref() != Some(&owner) {
                    self.tasks.clear();
                }
                if let Err(e) = self.load() {
                    tracing::warn!(error = %e, owner = %owner, "initial task load failed");
                }
            }
            None => {
                self.tasks.clear();
                self.last_error = None;
            }
        }
    }

    /// Apply any session change delivered since the last operation.
    pub fn sync_session(&mut self) {
        let pending = self.pending.borrow_mut().take();
        if let Some(state) = pending {
            self.set_session(state);
        }
    }

    /// Fetch every task for the signed-in user, replacing the local list.
    ///
    /// Rows that fail validation are skipped. Returns the number of tasks
    /// loaded.
    ///
    /// # Errors
    ///
    /// Returns an error if nobody is signed in or the store call fails.
    pub fn load(&mut self) -> Result<usize> {
        let owner = self.owner()?;
        let records = match self.store.select_tasks(&owner) {
            Ok(records) => records,
            Err(e) => return Err(self.report("load tasks", e)),
        };

        let mut tasks: Vec<Task> =
            records.into_iter().filter_map(|record| Self::accept(record, &owner)).collect();
        ordering::sort_by_order_key(&mut tasks);
        tracing::debug!(owner = %owner, count = tasks.len(), "tasks loaded");

        self.tasks = tasks;
        self.last_error = None;
        Ok(self.tasks.len())
    }

    /// Create a task from `draft` at the end of the list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyTitle`] without calling the store if the title is
    /// blank, or the store's error if the insert fails. The list is unchanged
    /// on error.
    pub fn add_task(&mut self, draft: &TaskDraft) -> Result<Task> {
        let owner = self.begin()?;
        if !is_valid_title(&draft.title) {
            return Err(self.report("add task", Error::EmptyTitle));
        }

        let new_task = draft.to_new_task(self.ordering.next_key(&self.tasks));
        let task = match self.store.insert_task(&owner, &new_task).and_then(TaskRecord::decode) {
            Ok(task) => task,
            Err(e) => return Err(self.report("add task", e)),
        };
        tracing::debug!(task_id = task.id, order_key = task.order_key, "task added");

        self.tasks.push(task.clone());
        ordering::sort_by_order_key(&mut self.tasks);
        self.last_error = None;
        Ok(task)
    }

    /// Replace the title, description and checklist of task `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyTitle`] without calling the store if the title is
    /// blank, [`Error::TaskNotFound`] if the store has no such task, or the
    /// store's error. The list is unchanged on error.
    pub fn edit_task(&mut self, id: TaskId, draft: &TaskDraft) -> Result<Task> {
        let owner = self.begin()?;
        if !is_valid_title(&draft.title) {
            return Err(self.report("edit task", Error::EmptyTitle));
        }

        let task = match self.persist(id, &owner, &draft.to_patch()) {
            Ok(task) => task,
            Err(e) => return Err(self.report("edit task", e)),
        };
        tracing::debug!(task_id = id, "task edited");

        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(slot) => *slot = task.clone(),
            None => self.tasks.push(task.clone()),
        }
        ordering::sort_by_order_key(&mut self.tasks);
        self.last_error = None;
        Ok(task)
    }

    /// Delete task `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TaskNotFound`] if the store has no such task, or the
    /// store's error. The list is unchanged on error.
    pub fn delete_task(&mut self, id: TaskId) -> Result<()> {
        let owner = self.begin()?;
        match self.store.delete_task(id, &owner) {
            Ok(true) => {}
            Ok(false) => return Err(self.report("delete task", Error::TaskNotFound(id))),
            Err(e) => return Err(self.report("delete task", e)),
        }
        tracing::debug!(task_id = id, "task deleted");

        self.tasks.retain(|task| task.id != id);
        self.last_error = None;
        Ok(())
    }

    /// Set the completion flag of task `id`.
    ///
    /// The flag flips locally before the store call and flips back if the
    /// call fails.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TaskNotFound`] if the task is not on the board, or the
    /// store's error.
    pub fn set_task_completed(&mut self, id: TaskId, completed: bool) -> Result<()> {
        let owner = self.begin()?;
        let Some(index) = self.position(id) else {
            return Err(self.report("toggle task", Error::TaskNotFound(id)));
        };

        let patch = TaskPatch::completed(completed);
        let previous = self.tasks[index].completed;
        patch.apply_to(&mut self.tasks[index]);
        match self.persist(id, &owner, &patch) {
            Ok(task) => {
                self.tasks[index] = task;
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                self.tasks[index].completed = previous;
                Err(self.report("toggle task", e))
            }
        }
    }

    /// Flip the completion flag of task `id`. Returns the new value.
    ///
    /// # Errors
    ///
    /// See [`Self::set_task_completed`].
    pub fn toggle_task(&mut self, id: TaskId) -> Result<bool> {
        let completed = !self.task(id).map_or(false, |task| task.completed);
        self.set_task_completed(id, completed)?;
        Ok(completed)
    }

    /// Set the completion flag of checklist item `index` on task `id`.
    ///
    /// The whole checklist is written back. The change is applied locally
    /// first and rolled back if the store call fails.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TaskNotFound`] or [`Error::ChecklistItemNotFound`]
    /// without calling the store, or the store's error.
    pub fn set_checklist_item_completed(
        &mut self,
        id: TaskId,
        index: usize,
        completed: bool,
    ) -> Result<()> {
        let owner = self.begin()?;
        let Some(position) = self.position(id) else {
            return Err(self.report("toggle checklist item", Error::TaskNotFound(id)));
        };
        if index >= self.tasks[position].checklist_items.len() {
            return Err(self.report(
                "toggle checklist item",
                Error::ChecklistItemNotFound { task_id: id, index },
            ));
        }

        let previous = self.tasks[position].checklist_items.clone();
        let mut items = previous.clone();
        items[index].completed = completed;
        let patch = TaskPatch::checklist(items);
        patch.apply_to(&mut self.tasks[position]);

        match self.persist(id, &owner, &patch) {
            Ok(task) => {
                self.tasks[position] = task;
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                self.tasks[position].checklist_items = previous;
                Err(self.report("toggle checklist item", e))
            }
        }
    }

    /// Flip checklist item `index` on task `id`. Returns the new value.
    ///
    /// # Errors
    ///
    /// See [`Self::set_checklist_item_completed`].
    pub fn toggle_checklist_item(&mut self, id: TaskId, index: usize) -> Result<bool> {
        let completed = !self
            .task(id)
            .and_then(|task| task.checklist_items.get(index))
            .map_or(false, |item| item.completed);
        self.set_checklist_item_completed(id, index, completed)?;
        Ok(completed)
    }

    /// Move the task at position `from` to position `to`.
    ///
    /// The new order is shown immediately and only the changed keys are
    /// written. If any write fails, keys already written are put back, the
    /// previous order is restored and the list is reloaded from the store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] for a bad position, or the store's
    /// error.
    pub fn move_task(&mut self, from: usize, to: usize) -> Result<MovePlan> {
        let owner = self.begin()?;
        let plan = match self.ordering.move_task(&self.tasks, from, to) {
            Ok(plan) => plan,
            Err(e) => return Err(self.report("reorder", e)),
        };
        if plan.is_noop() {
            return Ok(plan);
        }

        let previous = std::mem::replace(&mut self.tasks, plan.sequence.clone());
        for (written, change) in plan.changes.iter().enumerate() {
            let patch = TaskPatch::order_key(change.order_key);
            if let Err(e) = self.persist(change.task_id, &owner, &patch) {
                self.restore_keys(&owner, &previous, &plan.changes[..written]);
                self.tasks = previous;
                let err = self.report("reorder", e);
                if let Err(reload) = self.load() {
                    tracing::warn!(error = %reload, "reload after failed reorder also failed");
                }
                self.last_error = Some(err.to_string());
                return Err(err);
            }
        }
        tracing::debug!(
            task_id = plan.moved().map(|c| c.task_id),
            rebalanced = plan.rebalanced,
            "task moved"
        );

        self.last_error = None;
        Ok(plan)
    }

    /// Move task `id` to position `to`.
    ///
    /// # Errors
    ///
    /// See [`Self::move_task`].
    pub fn move_task_to(&mut self, id: TaskId, to: usize) -> Result<MovePlan> {
        self.sync_session();
        let Some(from) = self.position(id) else {
            return Err(self.report("reorder", Error::TaskNotFound(id)));
        };
        self.move_task(from, to)
    }

    /// Pick up session changes and return the signed-in owner.
    fn begin(&mut self) -> Result<OwnerId> {
        self.sync_session();
        self.owner()
    }

    fn owner(&self) -> Result<OwnerId> {
        match &self.session {
            SessionState::Unresolved => Err(Error::SessionUnresolved),
            SessionState::Unauthenticated => Err(Error::NotSignedIn),
            SessionState::Authenticated(session) => Ok(session.user.id.clone()),
        }
    }

    fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    /// Put back the pre-move keys of `written` changes.
    fn restore_keys(&self, owner: &OwnerId, previous: &[Task], written: &[KeyChange]) {
        for change in written {
            let Some(task) = previous.iter().find(|task| task.id == change.task_id) else {
                continue;
            };
            let patch = TaskPatch::order_key(task.order_key);
            if let Err(e) = self.store.update_task(task.id, owner, &patch) {
                tracing::warn!(task_id = task.id, error = %e, "could not restore order key");
            }
        }
    }

    /// Write `patch` and decode the row the store returns.
    fn persist(&self, id: TaskId, owner: &OwnerId, patch: &TaskPatch) -> Result<Task> {
        self.store.update_task(id, owner, patch)?.ok_or(Error::TaskNotFound(id))?.decode()
    }

    fn accept(record: TaskRecord, owner: &OwnerId) -> Option<Task> {
        let id = record.id;
        match record.decode() {
            Ok(task) if task.owner == *owner => Some(task),
            Ok(task) => {
                tracing::warn!(task_id = id, owner = %task.owner, "skipping task owned by someone else");
                None
            }
            Err(e) => {
                tracing::warn!(task_id = id, error = %e, "skipping invalid task record");
                None
            }
        }
    }

    fn report(&mut self, action: &str, error: Error) -> Error {
        tracing::warn!(action, error = %error, "task operation failed");
        self.last_error = Some(error.to_string());
        error
    }
}
