//! Command execution for the CLI.
//!
//! This module handles running CLI commands and producing output.

use crate::auth_form::{AuthForm, AuthMode};
use crate::board::TaskBoard;
use crate::cli::Command;
use crate::config::LynkConfig;
use crate::draft::TaskDraft;
use crate::error::{Error, Result};
use crate::header::Header;
use crate::identity::SqliteIdentityProvider;
use crate::paths;
use crate::session::SessionStore;
use crate::tasks::{SqliteTaskStore, Task, TaskId};
use crate::views;
use std::path::Path;
use std::process::ExitCode;

/// Output from running the CLI, with separate stdout and stderr messages.
#[derive(Debug)]
pub struct CliOutput {
    /// Exit code for the process.
    pub exit_code: ExitCode,
    /// Messages to print to stdout.
    pub stdout: Vec<String>,
    /// Messages to print to stderr.
    pub stderr: Vec<String>,
}

impl CliOutput {
    fn success(lines: Vec<String>) -> Self {
        Self { exit_code: ExitCode::SUCCESS, stdout: lines, stderr: vec![] }
    }

    fn message(line: impl Into<String>) -> Self {
        Self::success(vec![line.into()])
    }

    fn error(message: impl std::fmt::Display) -> Self {
        Self {
            exit_code: ExitCode::from(1),
            stdout: vec![],
            stderr: vec![format!("Error: {message}")],
        }
    }
}

/// Run a CLI command against the default data directory.
pub fn run(command: Command) -> CliOutput {
    match paths::data_dir() {
        Some(data_dir) => run_in(command, &data_dir),
        None => CliOutput::error("could not determine the home directory; set LYNK_HOME"),
    }
}

/// Run a CLI command against `data_dir`.
pub fn run_in(command: Command, data_dir: &Path) -> CliOutput {
    if command == Command::Version {
        return run_version();
    }

    let mut app = match App::open(data_dir) {
        Ok(app) => app,
        Err(e) => return CliOutput::error(e),
    };

    if command.needs_board() && !app.header.is_signed_in() {
        return match command {
            Command::List => CliOutput::message(views::LANDING),
            _ => CliOutput::error(Error::NotSignedIn),
        };
    }
    if command.needs_board() {
        if let Some(message) = app.board.last_error() {
            return CliOutput::error(format!("could not load tasks: {message}"));
        }
    }

    match command {
        Command::Version => run_version(),
        Command::Signup { email, password } => app.submit(AuthMode::SignUp, email, password),
        Command::Signin { email, password } => app.submit(AuthMode::SignIn, email, password),
        Command::Signout => app.sign_out(),
        Command::Whoami => app.whoami(),
        Command::List => app.list(),
        Command::Add { title, description, items } => app.add(title, description, items),
        Command::Edit { id, title, description, items, clear_items } => {
            app.edit(id, title, description, items, clear_items)
        }
        Command::Delete { id } => app.delete(id),
        Command::Done { id } => app.done(id),
        Command::Check { id, index } => app.check(id, index),
        Command::Move { from, to } => app.move_task(from, to),
    }
}

fn run_version() -> CliOutput {
    CliOutput::message(format!("lynk v{}", crate::VERSION))
}

/// Everything a command needs, wired to one database file.
struct App {
    sessions: SessionStore,
    header: Header,
    board: TaskBoard<SqliteTaskStore>,
}

impl App {
    fn open(data_dir: &Path) -> Result<Self> {
        let config = LynkConfig::ensure(data_dir)?;
        let db_path = config.db_path(data_dir);
        tracing::debug!(db_path = %db_path.display(), "opening data store");

        let sessions = SessionStore::new(SqliteIdentityProvider::new(&db_path)?);
        sessions.resolve();
        let header = Header::new(&sessions);
        let board = TaskBoard::attach(SqliteTaskStore::new(&db_path)?, config.ordering(), &sessions);

        Ok(Self { sessions, header, board })
    }

    fn submit(&self, mode: AuthMode, email: String, password: String) -> CliOutput {
        let mut form = AuthForm::new();
        form.switch_mode(mode);
        form.email = email;
        form.password = password;

        if form.submit(&self.sessions) {
            let mut lines: Vec<String> = form.message().map(str::to_string).into_iter().collect();
            lines.extend(self.header.greeting());
            CliOutput::success(lines)
        } else {
            CliOutput::error(form.error().unwrap_or("authentication failed"))
        }
    }

    fn sign_out(&self) -> CliOutput {
        if !self.header.is_signed_in() {
            return CliOutput::message("Not signed in.");
        }
        self.header.log_out();
        if self.header.is_signed_in() {
            CliOutput::error("could not log out")
        } else {
            CliOutput::message("Signed out.")
        }
    }

    fn whoami(&self) -> CliOutput {
        match self.header.greeting() {
            Some(greeting) => CliOutput::message(greeting),
            None => CliOutput::message("Not signed in."),
        }
    }

    fn list(&mut self) -> CliOutput {
        CliOutput::message(views::render_board(self.board.tasks()))
    }

    /// Render `task` at its current position on the board.
    fn show(&mut self, task: &Task) -> CliOutput {
        let position = self.board.tasks().iter().position(|t| t.id == task.id).unwrap_or(0) + 1;
        CliOutput::message(views::render_task(position, task))
    }

    fn add(&mut self, title: String, description: String, items: Vec<String>) -> CliOutput {
        let draft = items
            .into_iter()
            .fold(TaskDraft::new(title).with_description(description), |draft, item| {
                draft.with_item(item)
            });
        match self.board.add_task(&draft) {
            Ok(task) => self.show(&task),
            Err(e) => CliOutput::error(e),
        }
    }

    fn edit(
        &mut self,
        id: TaskId,
        title: Option<String>,
        description: Option<String>,
        items: Vec<String>,
        clear_items: bool,
    ) -> CliOutput {
        let Some(task) = self.board.task(id) else {
            return CliOutput::error(Error::TaskNotFound(id));
        };

        let mut draft = TaskDraft::from_task(task);
        if let Some(title) = title {
            draft.title = title;
        }
        if let Some(description) = description {
            draft.description = description;
        }
        if clear_items {
            draft.checklist_items.clear();
        }
        for text in items {
            draft.add_item();
            draft.set_item_text(draft.checklist_items.len() - 1, text);
        }

        match self.board.edit_task(id, &draft) {
            Ok(task) => self.show(&task),
            Err(e) => CliOutput::error(e),
        }
    }

    fn delete(&mut self, id: TaskId) -> CliOutput {
        match self.board.delete_task(id) {
            Ok(()) => CliOutput::message(format!("Deleted task #{id}.")),
            Err(e) => CliOutput::error(e),
        }
    }

    fn done(&mut self, id: TaskId) -> CliOutput {
        match self.board.toggle_task(id) {
            Ok(completed) => {
                let state = if completed { "done" } else { "not done" };
                CliOutput::message(format!("Task #{id} marked {state}."))
            }
            Err(e) => CliOutput::error(e),
        }
    }

    fn check(&mut self, id: TaskId, index: usize) -> CliOutput {
        if index == 0 {
            return CliOutput::error("checklist items are numbered from 1");
        }
        match self.board.toggle_checklist_item(id, index - 1) {
            Ok(completed) => {
                let state = if completed { "checked" } else { "unchecked" };
                CliOutput::message(format!("Item {index} on task #{id} {state}."))
            }
            Err(Error::ChecklistItemNotFound { .. }) => {
                CliOutput::error(format!("task #{id} has no checklist item {index}"))
            }
            Err(e) => CliOutput::error(e),
        }
    }

    fn move_task(&mut self, from: usize, to: usize) -> CliOutput {
        let len = self.board.tasks().len();
        if from == 0 || to == 0 {
            return CliOutput::error(format!("positions must be between 1 and {len}"));
        }
        match self.board.move_task(from - 1, to - 1) {
            Ok(_) => CliOutput::message(views::render_board(self.board.tasks())),
            Err(Error::IndexOutOfRange { len, .. }) => {
                CliOutput::error(format!("positions must be between 1 and {len}"))
            }
            Err(e) => CliOutput::error(e),
        }
    }
}
