//! Task store trait and `SQLite` implementation.

use crate::error::Result;
use crate::tasks::models::{NewTask, OwnerId, TaskId, TaskPatch};
use crate::tasks::record::{encode_checklist, parse_checklist, TaskRecord};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

/// Trait for task storage operations.
///
/// Every call is scoped to one owner; rows belonging to anyone else are
/// neither returned nor modified. Implementations assign `id` and
/// `created_at` on insert.
#[allow(clippy::missing_errors_doc)]
pub trait TaskStore {
    /// All of the owner's tasks, ascending by `order_key`.
    fn select_tasks(&self, owner: &OwnerId) -> Result<Vec<TaskRecord>>;

    /// Insert a task for the owner and return the stored row.
    fn insert_task(&self, owner: &OwnerId, task: &NewTask) -> Result<TaskRecord>;

    /// Update the given columns of `(id, owner)`. Returns `None` if no such row.
    fn update_task(
        &self,
        id: TaskId,
        owner: &OwnerId,
        patch: &TaskPatch,
    ) -> Result<Option<TaskRecord>>;

    /// Delete `(id, owner)`. Returns whether a row was removed.
    fn delete_task(&self, id: TaskId, owner: &OwnerId) -> Result<bool>;
}

const SELECT_COLUMNS: &str = "SELECT id, title, description, owner, order_key, completed, \
                              checklist_items, created_at, updated_at FROM tasks";

/// SQLite-based task store.
///
/// Each operation opens a new connection to the database file.
#[derive(Debug, Clone)]
pub struct SqliteTaskStore {
    db_path: PathBuf,
}

impl SqliteTaskStore {
    /// Create a new `SQLite` task store at the given database path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let store = Self { db_path: db_path.as_ref().to_path_buf() };
        store.init_schema()?;
        Ok(store)
    }

    /// Get the database path.
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Open a connection to the database.
    fn open(&self) -> Result<Connection> {
        if let Some(parent) = self.db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&self.db_path)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        Ok(conn)
    }

    /// Initialize the database schema.
    fn init_schema(&self) -> Result<()> {
        let conn = self.open()?;

        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT DEFAULT '',
                owner TEXT NOT NULL,
                order_key REAL,
                completed INTEGER NOT NULL DEFAULT 0,
                checklist_items TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX IF NOT EXISTS idx_tasks_owner_order ON tasks(owner, order_key);
            ",
        )?;

        Ok(())
    }

    /// Parse a record from a row.
    fn parse_record(row: &rusqlite::Row) -> rusqlite::Result<TaskRecord> {
        let checklist_json: Option<String> = row.get(6)?;
        let checklist_items = checklist_json
            .map(|json| parse_checklist(&json))
            .transpose()
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
            })?;

        Ok(TaskRecord {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            owner: row.get(3)?,
            order_key: row.get(4)?,
            completed: row.get(5)?,
            checklist_items,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }

    fn get_record(conn: &Connection, id: TaskId, owner: &OwnerId) -> Result<Option<TaskRecord>> {
        let record = conn
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1 AND owner = ?2"),
                params![id, owner.as_str()],
                Self::parse_record,
            )
            .optional()?;
        Ok(record)
    }
}

impl TaskStore for SqliteTaskStore {
    fn select_tasks(&self, owner: &OwnerId) -> Result<Vec<TaskRecord>> {
        let conn = self.open()?;
        let mut stmt =
            conn.prepare(&format!("{SELECT_COLUMNS} WHERE owner = ?1 ORDER BY order_key ASC, id ASC"))?;
        let records = stmt
            .query_map(params![owner.as_str()], Self::parse_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    fn insert_task(&self, owner: &OwnerId, task: &NewTask) -> Result<TaskRecord> {
        let conn = self.open()?;
        let checklist = encode_checklist(&task.checklist_items)?;

        conn.execute(
            "INSERT INTO tasks (title, description, owner, order_key, completed, checklist_items)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                &task.title,
                &task.description,
                owner.as_str(),
                task.order_key,
                task.completed,
                checklist
            ],
        )?;

        let id = conn.last_insert_rowid();
        let record = conn.query_row(
            &format!("{SELECT_COLUMNS} WHERE id = ?1"),
            params![id],
            Self::parse_record,
        )?;
        Ok(record)
    }

    fn update_task(
        &self,
        id: TaskId,
        owner: &OwnerId,
        patch: &TaskPatch,
    ) -> Result<Option<TaskRecord>> {
        let conn = self.open()?;
        if patch.is_empty() {
            return Self::get_record(&conn, id, owner);
        }

        // Build dynamic UPDATE statement
        let mut updates = vec!["updated_at = datetime('now')"];
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref title) = patch.title {
            updates.push("title = ?");
            values.push(Box::new(title.clone()));
        }
        if let Some(ref description) = patch.description {
            updates.push("description = ?");
            values.push(Box::new(description.clone()));
        }
        if let Some(order_key) = patch.order_key {
            updates.push("order_key = ?");
            values.push(Box::new(order_key));
        }
        if let Some(completed) = patch.completed {
            updates.push("completed = ?");
            values.push(Box::new(completed));
        }
        if let Some(ref items) = patch.checklist_items {
            updates.push("checklist_items = ?");
            values.push(Box::new(encode_checklist(items)?));
        }

        values.push(Box::new(id));
        values.push(Box::new(owner.as_str().to_string()));

        let sql = format!("UPDATE tasks SET {} WHERE id = ? AND owner = ?", updates.join(", "));

        let params: Vec<&dyn rusqlite::ToSql> = values.iter().map(AsRef::as_ref).collect();
        let rows = conn.execute(&sql, params.as_slice())?;
        if rows == 0 {
            return Ok(None);
        }

        Self::get_record(&conn, id, owner)
    }

    fn delete_task(&self, id: TaskId, owner: &OwnerId) -> Result<bool> {
        let conn = self.open()?;
        let rows = conn
            .execute("DELETE FROM tasks WHERE id = ?1 AND owner = ?2", params![id, owner.as_str()])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::models::ChecklistItem;
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, SqliteTaskStore) {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("test.db");
        let store = SqliteTaskStore::new(&db_path).unwrap();
        (dir, store)
    }

    fn new_task(title: &str, order_key: f64) -> NewTask {
        NewTask {
            title: title.to_string(),
            description: String::new(),
            checklist_items: Vec::new(),
            order_key,
            completed: false,
        }
    }

    #[test]
    fn test_insert_assigns_id_and_timestamps() {
        let (_dir, store) = create_test_store();
        let owner = OwnerId::new("alice");

        let mut task = new_task("Write tests", 1000.0);
        task.description = "for the store".to_string();
        task.checklist_items = vec![ChecklistItem::new("unit"), ChecklistItem::new("integration")];
        let record = store.insert_task(&owner, &task).unwrap();

        assert!(record.id > 0);
        assert!(!record.created_at.is_empty());
        let decoded = record.decode().unwrap();
        assert_eq!(decoded.title, "Write tests");
        assert_eq!(decoded.description, "for the store");
        assert_eq!(decoded.owner, owner);
        assert_eq!(decoded.checklist_items.len(), 2);
        assert!(!decoded.completed);
    }

    #[test]
    fn test_select_orders_by_key() {
        let (_dir, store) = create_test_store();
        let owner = OwnerId::new("alice");
        store.insert_task(&owner, &new_task("third", 3000.0)).unwrap();
        store.insert_task(&owner, &new_task("first", 500.0)).unwrap();
        store.insert_task(&owner, &new_task("second", 1000.0)).unwrap();

        let titles: Vec<String> =
            store.select_tasks(&owner).unwrap().into_iter().map(|r| r.title).collect();
        assert_eq!(titles, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_owner_isolation() {
        let (_dir, store) = create_test_store();
        let alice = OwnerId::new("alice");
        let bob = OwnerId::new("bob");
        let record = store.insert_task(&alice, &new_task("private", 1000.0)).unwrap();

        assert!(store.select_tasks(&bob).unwrap().is_empty());
        assert!(store.update_task(record.id, &bob, &TaskPatch::completed(true)).unwrap().is_none());
        assert!(!store.delete_task(record.id, &bob).unwrap());

        let still_there = store.select_tasks(&alice).unwrap();
        assert_eq!(still_there.len(), 1);
        assert_eq!(still_there[0].completed, Some(false));
    }

    #[test]
    fn test_partial_update() {
        let (_dir, store) = create_test_store();
        let owner = OwnerId::new("alice");
        let record = store.insert_task(&owner, &new_task("draft", 1000.0)).unwrap();

        let patch = TaskPatch {
            order_key: Some(250.0),
            checklist_items: Some(vec![ChecklistItem { text: "done".into(), completed: true }]),
            ..TaskPatch::default()
        };
        let updated = store.update_task(record.id, &owner, &patch).unwrap().unwrap().decode().unwrap();
        assert_eq!(updated.title, "draft");
        assert_eq!(updated.order_key, 250.0);
        assert_eq!(updated.checklist_items, vec![ChecklistItem { text: "done".into(), completed: true }]);
    }

    #[test]
    fn test_empty_update_returns_current_row() {
        let (_dir, store) = create_test_store();
        let owner = OwnerId::new("alice");
        let record = store.insert_task(&owner, &new_task("same", 1000.0)).unwrap();

        let fetched = store.update_task(record.id, &owner, &TaskPatch::default()).unwrap().unwrap();
        assert_eq!(fetched.title, "same");
        assert!(store.update_task(999, &owner, &TaskPatch::default()).unwrap().is_none());
    }

    #[test]
    fn test_delete() {
        let (_dir, store) = create_test_store();
        let owner = OwnerId::new("alice");
        let record = store.insert_task(&owner, &new_task("gone", 1000.0)).unwrap();

        assert!(store.delete_task(record.id, &owner).unwrap());
        assert!(!store.delete_task(record.id, &owner).unwrap());
        assert!(store.select_tasks(&owner).unwrap().is_empty());
    }

    #[test]
    fn test_legacy_checklist_rows_are_readable() {
        let (_dir, store) = create_test_store();
        let owner = OwnerId::new("alice");
        let record = store.insert_task(&owner, &new_task("legacy", 1000.0)).unwrap();

        let conn = Connection::open(store.db_path()).unwrap();
        conn.execute(
            "UPDATE tasks SET checklist_items = ?1 WHERE id = ?2",
            params![r#"["milk", "eggs"]"#, record.id],
        )
        .unwrap();

        let task = store.select_tasks(&owner).unwrap().remove(0).decode().unwrap();
        assert_eq!(task.checklist_items, vec![ChecklistItem::new("milk"), ChecklistItem::new("eggs")]);
    }

    #[test]
    fn test_malformed_checklist_fails_select() {
        let (_dir, store) = create_test_store();
        let owner = OwnerId::new("alice");
        let record = store.insert_task(&owner, &new_task("broken", 1000.0)).unwrap();

        let conn = Connection::open(store.db_path()).unwrap();
        conn.execute("UPDATE tasks SET checklist_items = 'not json' WHERE id = ?1", params![record.id])
            .unwrap();

        let err = store.select_tasks(&owner).unwrap_err();
        assert!(err.to_string().contains("Invalid task record: checklist"), "{err}");
    }

    #[test]
    fn test_corrupted_database_fails_to_open() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("tasks.db");
        std::fs::write(&db_path, "this is not a valid sqlite database").unwrap();
        assert!(SqliteTaskStore::new(&db_path).is_err());
    }
}
