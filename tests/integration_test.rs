//! Integration tests for `lynk`.
//!
//! These drive the public view models against the `SQLite` stores the CLI
//! uses, sharing one database file the way a real install does.

use lynk::identity::SqliteIdentityProvider;
use lynk::tasks::{ordering, Ordering, SqliteTaskStore, TaskStore};
use lynk::{AuthForm, AuthMode, Error, Header, SessionState, SessionStore, TaskBoard, TaskDraft};
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    sessions: SessionStore,
    board: TaskBoard<SqliteTaskStore>,
}

fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("lynk.sqlite3");
    let sessions = SessionStore::new(SqliteIdentityProvider::new(&db).unwrap());
    sessions.resolve();
    let board = TaskBoard::attach(SqliteTaskStore::new(&db).unwrap(), Ordering::default(), &sessions);
    Fixture { _dir: dir, sessions, board }
}

fn register(sessions: &SessionStore, email: &str) {
    let mut form = AuthForm::new();
    form.switch_mode(AuthMode::SignUp);
    form.email = email.to_string();
    form.password = "password".to_string();
    assert!(form.submit(sessions), "{:?}", form.error());
}

fn sign_in(sessions: &SessionStore, email: &str) {
    let mut form = AuthForm::new();
    form.email = email.to_string();
    form.password = "password".to_string();
    assert!(form.submit(sessions), "{:?}", form.error());
}

fn titles(board: &mut TaskBoard<SqliteTaskStore>) -> Vec<String> {
    board.tasks().iter().map(|t| t.title.clone()).collect()
}

#[test]
fn test_version_exists() {
    assert!(!lynk::VERSION.is_empty());
}

#[test]
fn test_signed_out_board_is_gated() {
    let mut f = fixture();
    assert_eq!(f.sessions.state(), SessionState::Unauthenticated);
    assert!(!f.board.is_loading());
    assert!(matches!(f.board.add_task(&TaskDraft::new("x")), Err(Error::NotSignedIn)));
}

#[test]
fn test_full_session_flow() {
    let mut f = fixture();
    let header = Header::new(&f.sessions);
    register(&f.sessions, "ada@example.com");
    sign_in(&f.sessions, "ada@example.com");
    assert_eq!(header.greeting().as_deref(), Some("Welcome, ada@example.com!"));

    for title in ["A", "B", "C"] {
        f.board.add_task(&TaskDraft::new(title)).unwrap();
    }
    let keys: Vec<f64> = f.board.tasks().iter().map(|t| t.order_key).collect();
    assert_eq!(keys, vec![ordering::STEP, 2.0 * ordering::STEP, 3.0 * ordering::STEP]);

    let plan = f.board.move_task(2, 0).unwrap();
    assert_eq!(plan.changes.len(), 1);
    assert_eq!(titles(&mut f.board), vec!["C", "A", "B"]);

    // Persisted order survives a reload.
    f.board.load().unwrap();
    assert_eq!(titles(&mut f.board), vec!["C", "A", "B"]);

    header.log_out();
    assert!(f.board.tasks().is_empty());
}

#[test]
fn test_checklist_round_trip_through_store() {
    let mut f = fixture();
    register(&f.sessions, "ada@example.com");
    sign_in(&f.sessions, "ada@example.com");

    let task = f
        .board
        .add_task(&TaskDraft::new("Pack").with_item("socks").with_item("charger"))
        .unwrap();
    assert!(f.board.toggle_checklist_item(task.id, 1).unwrap());
    assert!(f.board.toggle_task(task.id).unwrap());

    f.board.load().unwrap();
    let reloaded = f.board.task(task.id).unwrap();
    assert!(reloaded.completed);
    assert_eq!(reloaded.checklist_progress(), (1, 2));
    assert!(reloaded.checklist_items[1].completed);
}

#[test]
fn test_users_only_see_their_own_tasks() {
    let mut f = fixture();
    register(&f.sessions, "ada@example.com");
    register(&f.sessions, "grace@example.com");

    sign_in(&f.sessions, "ada@example.com");
    let ada_task = f.board.add_task(&TaskDraft::new("Ada's")).unwrap();

    sign_in(&f.sessions, "grace@example.com");
    assert!(f.board.tasks().is_empty());
    assert!(matches!(f.board.delete_task(ada_task.id), Err(Error::TaskNotFound(_))));

    let grace = f.sessions.current_user().unwrap();
    assert!(f.board.store().select_tasks(&grace.id).unwrap().is_empty());
}

#[test]
fn test_session_persists_across_stores() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("lynk.sqlite3");
    {
        let sessions = SessionStore::new(SqliteIdentityProvider::new(&db).unwrap());
        sessions.resolve();
        register(&sessions, "ada@example.com");
        sign_in(&sessions, "ada@example.com");
        let mut board =
            TaskBoard::attach(SqliteTaskStore::new(&db).unwrap(), Ordering::default(), &sessions);
        board.add_task(&TaskDraft::new("Remember me")).unwrap();
    }

    let sessions = SessionStore::new(SqliteIdentityProvider::new(&db).unwrap());
    let resolved = sessions.resolve();
    assert_eq!(resolved.user().and_then(|u| u.email.as_deref()), Some("ada@example.com"));
    let mut board =
        TaskBoard::attach(SqliteTaskStore::new(&db).unwrap(), Ordering::default(), &sessions);
    assert_eq!(titles(&mut board), vec!["Remember me"]);
}
