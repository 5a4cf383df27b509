//! Testing utilities and mock implementations.
//!
//! These types are provided for use in tests. They may appear unused in
//! the library itself but are consumed by unit and integration tests.

#![allow(dead_code)]

use crate::error::{Error, Result};
use crate::session::{Session, User};
use crate::tasks::{NewTask, OwnerId, TaskId, TaskPatch, TaskRecord};
use crate::tasks::record::RawChecklistItem;
use crate::tasks::TaskStore;
use crate::traits::IdentityProvider;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, HashSet};

/// A task store operation, used to record and fail calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    /// `select_tasks`.
    Select,
    /// `insert_task`.
    Insert,
    /// `update_task`.
    Update,
    /// `delete_task`.
    Delete,
}

/// An in-memory task store that records calls and can be told to fail.
#[derive(Debug, Default)]
pub struct MockTaskStore {
    rows: RefCell<Vec<TaskRecord>>,
    next_id: Cell<TaskId>,
    failing: RefCell<HashSet<StoreOp>>,
    fail_after: RefCell<HashMap<StoreOp, usize>>,
    calls: RefCell<Vec<StoreOp>>,
}

impl MockTaskStore {
    /// Create an empty mock store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw row, bypassing the call log.
    pub fn seed(&self, record: TaskRecord) {
        if record.id >= self.next_id.get() {
            self.next_id.set(record.id);
        }
        self.rows.borrow_mut().push(record);
    }

    /// Make every call of `op` fail until [`Self::recover`] is called.
    pub fn fail(&self, op: StoreOp) {
        self.failing.borrow_mut().insert(op);
    }

    /// Let the next `successes` calls of `op` through, then fail one.
    pub fn fail_after(&self, op: StoreOp, successes: usize) {
        self.fail_after.borrow_mut().insert(op, successes);
    }

    /// Stop failing `op`.
    pub fn recover(&self, op: StoreOp) {
        self.failing.borrow_mut().remove(&op);
    }

    /// All calls made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<StoreOp> {
        self.calls.borrow().clone()
    }

    /// Number of calls made so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    /// Forget recorded calls.
    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    /// Snapshot of a stored row.
    #[must_use]
    pub fn row(&self, id: TaskId) -> Option<TaskRecord> {
        self.rows.borrow().iter().find(|r| r.id == id).cloned()
    }

    fn record_call(&self, op: StoreOp) -> Result<()> {
        self.calls.borrow_mut().push(op);
        if self.failing.borrow().contains(&op) {
            return Err(Error::Remote(format!("{op:?} failed")));
        }
        let mut countdown = self.fail_after.borrow_mut();
        if let Some(remaining) = countdown.get_mut(&op) {
            if *remaining == 0 {
                countdown.remove(&op);
                return Err(Error::Remote(format!("{op:?} failed")));
            }
            *remaining -= 1;
        }
        Ok(())
    }
}

impl TaskStore for MockTaskStore {
    fn select_tasks(&self, owner: &OwnerId) -> Result<Vec<TaskRecord>> {
        self.record_call(StoreOp::Select)?;
        let mut rows: Vec<TaskRecord> =
            self.rows.borrow().iter().filter(|r| r.owner == owner.as_str()).cloned().collect();
        rows.sort_by(|a, b| {
            a.order_key.unwrap_or(0.0).total_cmp(&b.order_key.unwrap_or(0.0)).then(a.id.cmp(&b.id))
        });
        Ok(rows)
    }

    fn insert_task(&self, owner: &OwnerId, task: &NewTask) -> Result<TaskRecord> {
        self.record_call(StoreOp::Insert)?;
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        let record = TaskRecord {
            id,
            title: task.title.clone(),
            description: Some(task.description.clone()),
            owner: owner.as_str().to_string(),
            order_key: Some(task.order_key),
            completed: Some(task.completed),
            checklist_items: Some(task.checklist_items.iter().map(RawChecklistItem::from).collect()),
            created_at: format!("2024-01-01 00:00:{:02}", id % 60),
            updated_at: None,
        };
        self.rows.borrow_mut().push(record.clone());
        Ok(record)
    }

    fn update_task(
        &self,
        id: TaskId,
        owner: &OwnerId,
        patch: &TaskPatch,
    ) -> Result<Option<TaskRecord>> {
        self.record_call(StoreOp::Update)?;
        let mut rows = self.rows.borrow_mut();
        let Some(row) = rows.iter_mut().find(|r| r.id == id && r.owner == owner.as_str()) else {
            return Ok(None);
        };
        if let Some(ref title) = patch.title {
            row.title.clone_from(title);
        }
        if let Some(ref description) = patch.description {
            row.description = Some(description.clone());
        }
        if let Some(order_key) = patch.order_key {
            row.order_key = Some(order_key);
        }
        if let Some(completed) = patch.completed {
            row.completed = Some(completed);
        }
        if let Some(ref items) = patch.checklist_items {
            row.checklist_items = Some(items.iter().map(RawChecklistItem::from).collect());
        }
        Ok(Some(row.clone()))
    }

    fn delete_task(&self, id: TaskId, owner: &OwnerId) -> Result<bool> {
        self.record_call(StoreOp::Delete)?;
        let mut rows = self.rows.borrow_mut();
        let before = rows.len();
        rows.retain(|r| !(r.id == id && r.owner == owner.as_str()));
        Ok(rows.len() < before)
    }
}

/// An in-memory identity provider.
#[derive(Debug, Default)]
pub struct MockIdentityProvider {
    users: RefCell<BTreeMap<String, (String, User)>>,
    session: RefCell<Option<Session>>,
    fail_current: Cell<bool>,
    fail_sign_out: Cell<bool>,
    issued: Cell<u64>,
}

impl MockIdentityProvider {
    /// Create a provider with no accounts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account directly.
    pub fn add_user(&self, email: &str, password: &str) -> User {
        let user = User {
            id: OwnerId::new(format!("user-{}", self.users.borrow().len() + 1)),
            email: Some(email.to_string()),
        };
        self.users.borrow_mut().insert(email.to_string(), (password.to_string(), user.clone()));
        user
    }

    /// Make `current_session` return an error.
    pub fn fail_current_session(&self, fail: bool) {
        self.fail_current.set(fail);
    }

    /// Make `sign_out` return an error.
    pub fn fail_sign_out(&self, fail: bool) {
        self.fail_sign_out.set(fail);
    }
}

impl IdentityProvider for MockIdentityProvider {
    fn current_session(&self) -> Result<Option<Session>> {
        if self.fail_current.get() {
            return Err(Error::Auth("session lookup failed".to_string()));
        }
        Ok(self.session.borrow().clone())
    }

    fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let users = self.users.borrow();
        let Some((expected, user)) = users.get(email) else {
            return Err(Error::Auth("Invalid login credentials".to_string()));
        };
        if expected != password {
            return Err(Error::Auth("Invalid login credentials".to_string()));
        }
        let issued = self.issued.get() + 1;
        self.issued.set(issued);
        let session = Session {
            user: user.clone(),
            access_token: format!("token-{issued}"),
            created_at: "2024-01-01T00:00:00Z".to_string(),
        };
        *self.session.borrow_mut() = Some(session.clone());
        Ok(session)
    }

    fn sign_up(&self, email: &str, password: &str) -> Result<User> {
        if self.users.borrow().contains_key(email) {
            return Err(Error::Auth("User already registered".to_string()));
        }
        Ok(self.add_user(email, password))
    }

    fn sign_out(&self) -> Result<()> {
        if self.fail_sign_out.get() {
            return Err(Error::Auth("sign-out failed".to_string()));
        }
        *self.session.borrow_mut() = None;
        Ok(())
    }
}
