//! Application core for Task Manager
//!
//! This module provides the main interface the window layer drives.
//! Every mutating operation persists through the stores and finishes by
//! pushing a fresh [`AppState`] snapshot at the shell's [`EventHandler`].

use crate::autostart::{platform_autostart, Autostart};
use crate::config;
use crate::prefs::Preferences;
use crate::store::TaskStore;
use crate::task::{Task, TaskId};
use std::path::PathBuf;

/// Error types for Task Manager
#[derive(Debug, thiserror::Error)]
pub enum TaskManagerError {
    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Autostart error: {message}")]
    Autostart { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Unexpected error: {message}")]
    Unexpected { message: String },
}

impl From<anyhow::Error> for TaskManagerError {
    fn from(err: anyhow::Error) -> Self {
        TaskManagerError::Unexpected {
            message: err.to_string(),
        }
    }
}

/// Snapshot of everything the window renders.
#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub tasks: Vec<Task>,
    pub startup_enabled: bool,
    pub autostart_registered: bool,
}

/// Implemented by the shell to receive state updates.
pub trait EventHandler {
    /// Called after every mutation with the state to render.
    fn on_state_changed(&self, state: AppState);

    /// Called with a user-visible message when a save or an OS
    /// registration fails. Never fatal.
    fn on_error(&self, message: String);
}

/// Main application core
pub struct TaskManagerCore {
    tasks: TaskStore,
    prefs: Preferences,
    handler: Box<dyn EventHandler>,
}

impl TaskManagerCore {
    /// Create a core backed by the default per-user data files.
    pub fn new(handler: Box<dyn EventHandler>) -> Result<Self, TaskManagerError> {
        let tasks_path = config::tasks_path().map_err(storage_error)?;
        let settings_path = config::settings_path().map_err(storage_error)?;
        Ok(Self::with_storage(
            tasks_path,
            settings_path,
            platform_autostart(),
            handler,
        ))
    }

    /// Create a core with explicit file locations and autostart
    /// mechanism.
    pub fn with_storage(
        tasks_path: PathBuf,
        settings_path: PathBuf,
        autostart: Box<dyn Autostart>,
        handler: Box<dyn EventHandler>,
    ) -> Self {
        let tasks = TaskStore::load(tasks_path);
        let prefs = Preferences::load(settings_path, autostart);
        let core = Self {
            tasks,
            prefs,
            handler,
        };

        // Bring the OS registration in line with the stored preference
        if let Err(e) = core.prefs.sync_autostart() {
            tracing::warn!("Could not sync autostart registration: {:#}", e);
        }

        core.emit_state();
        core
    }

    /// Get the state the window should currently render.
    pub fn state(&self) -> AppState {
        AppState {
            tasks: self.tasks.tasks().to_vec(),
            startup_enabled: self.prefs.startup_enabled(),
            autostart_registered: self.prefs.autostart_registered(),
        }
    }

    /// Add a task from the entry field. Input that trims to nothing is
    /// ignored.
    pub fn add_task(&mut self, text: &str) {
        match self.tasks.add(text) {
            Ok(None) => {}
            Ok(Some(_)) => self.emit_state(),
            Err(e) => {
                self.handler.on_error(format!("Could not save tasks: {e:#}"));
                self.emit_state();
            }
        }
    }

    /// Set a task's completion flag from its checkbox.
    pub fn set_task_done(&mut self, id: TaskId, done: bool) -> Result<(), TaskManagerError> {
        match self.tasks.set_done(id, done) {
            Ok(false) => Err(TaskManagerError::NotFound {
                message: format!("no task with id {id}"),
            }),
            Ok(true) => {
                self.emit_state();
                Ok(())
            }
            Err(e) => {
                // The flag is already flipped in memory; only the save failed
                self.handler.on_error(format!("Could not save tasks: {e:#}"));
                self.emit_state();
                Ok(())
            }
        }
    }

    /// Delete a task row. Unknown ids are ignored.
    pub fn delete_task(&mut self, id: TaskId) {
        match self.tasks.delete(id) {
            Ok(false) => {}
            Ok(true) => self.emit_state(),
            Err(e) => {
                self.handler.on_error(format!("Could not save tasks: {e:#}"));
                self.emit_state();
            }
        }
    }

    /// Clear the task list. The yes/no confirmation happens in the
    /// shell before this is called.
    pub fn reset_tasks(&mut self) {
        if let Err(e) = self.tasks.reset_all() {
            self.handler.on_error(format!("Could not save tasks: {e:#}"));
        }
        self.emit_state();
    }

    /// Persist the "start on startup" preference and apply it to the
    /// OS.
    ///
    /// The preference is saved even when registration fails; the
    /// returned error feeds the shell's dialog and the stored value
    /// stands.
    pub fn set_startup(&mut self, enabled: bool) -> Result<(), TaskManagerError> {
        if let Err(e) = self.prefs.set_startup_enabled(enabled) {
            self.handler
                .on_error(format!("Could not save settings: {e:#}"));
        }
        let result = self.prefs.sync_autostart().map_err(autostart_error);
        self.emit_state();
        result
    }

    /// Reset settings to defaults, removing any live OS registration.
    pub fn reset_settings(&mut self) -> Result<(), TaskManagerError> {
        if let Err(e) = self.prefs.reset() {
            self.handler
                .on_error(format!("Could not save settings: {e:#}"));
        }
        let result = self.prefs.sync_autostart().map_err(autostart_error);
        self.emit_state();
        result
    }

    fn emit_state(&self) {
        self.handler.on_state_changed(self.state());
    }
}

fn storage_error(err: anyhow::Error) -> TaskManagerError {
    TaskManagerError::Storage {
        message: err.to_string(),
    }
}

fn autostart_error(err: anyhow::Error) -> TaskManagerError {
    TaskManagerError::Autostart {
        message: format!("{err:#}"),
    }
}

#[cfg(test)]
mod tests {
    use super::{AppState, EventHandler, TaskManagerCore, TaskManagerError};
    use crate::autostart::testing::FakeAutostart;
    use crate::task::TaskId;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingHandler {
        states: RefCell<Vec<AppState>>,
        errors: RefCell<Vec<String>>,
    }

    impl EventHandler for Rc<RecordingHandler> {
        fn on_state_changed(&self, state: AppState) {
            self.states.borrow_mut().push(state);
        }

        fn on_error(&self, message: String) {
            self.errors.borrow_mut().push(message);
        }
    }

    struct Fixture {
        dir: TempDir,
        autostart: Rc<FakeAutostart>,
        handler: Rc<RecordingHandler>,
        core: TaskManagerCore,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let autostart = Rc::new(FakeAutostart::default());
        let handler = Rc::new(RecordingHandler::default());
        let core = TaskManagerCore::with_storage(
            dir.path().join("tasks.json"),
            dir.path().join("settings.json"),
            Box::new(autostart.clone()),
            Box::new(handler.clone()),
        );
        Fixture {
            dir,
            autostart,
            handler,
            core,
        }
    }

    fn tasks_json(fx: &Fixture) -> serde_json::Value {
        let content = std::fs::read_to_string(fx.dir.path().join("tasks.json")).unwrap();
        serde_json::from_str(&content).unwrap()
    }

    #[test]
    fn a_task_lives_from_entry_to_deletion() {
        let mut fx = fixture();
        fx.core.add_task("Buy milk");

        let state = fx.core.state();
        assert_eq!(state.tasks.len(), 1);
        assert_eq!(state.tasks[0].text, "Buy milk");
        assert!(!state.tasks[0].done);

        let id = state.tasks[0].id;
        fx.core.set_task_done(id, true).unwrap();
        assert_eq!(tasks_json(&fx), json!([["Buy milk", true]]));

        fx.core.delete_task(id);
        assert_eq!(tasks_json(&fx), json!([]));
        assert!(fx.core.state().tasks.is_empty());
    }

    #[test]
    fn every_mutation_pushes_a_snapshot() {
        let mut fx = fixture();
        assert_eq!(fx.handler.states.borrow().len(), 1);

        fx.core.add_task("Water plants");
        fx.core.add_task("   "); // ignored, no snapshot
        assert_eq!(fx.handler.states.borrow().len(), 2);
        assert_eq!(fx.handler.states.borrow()[1].tasks.len(), 1);
    }

    #[test]
    fn completing_an_unknown_id_reports_not_found() {
        let mut fx = fixture();
        fx.core.add_task("Buy milk");
        let err = fx.core.set_task_done(TaskId(99), true).unwrap_err();
        assert!(matches!(err, TaskManagerError::NotFound { .. }));
    }

    #[test]
    fn startup_preference_survives_registration_failure() {
        let mut fx = fixture();
        fx.autostart.fail.set(true);
        let err = fx.core.set_startup(true).unwrap_err();
        assert!(matches!(err, TaskManagerError::Autostart { .. }));

        // The stored preference and the OS registration now disagree
        let state = fx.core.state();
        assert!(state.startup_enabled);
        assert!(!state.autostart_registered);
    }

    #[test]
    fn reset_settings_also_unregisters() {
        let mut fx = fixture();
        fx.core.set_startup(true).unwrap();
        assert!(fx.autostart.enabled.get());

        fx.core.reset_settings().unwrap();
        assert!(!fx.core.state().startup_enabled);
        assert!(!fx.autostart.enabled.get());
    }

    #[test]
    fn reset_tasks_clears_list_and_file() {
        let mut fx = fixture();
        fx.core.add_task("Buy milk");
        fx.core.add_task("Water plants");
        fx.core.reset_tasks();
        assert!(fx.core.state().tasks.is_empty());
        assert_eq!(tasks_json(&fx), json!([]));
    }

    #[test]
    fn a_failed_save_is_surfaced_but_keeps_memory() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("blocker"), b"").unwrap();
        let handler = Rc::new(RecordingHandler::default());
        let mut core = TaskManagerCore::with_storage(
            dir.path().join("blocker").join("tasks.json"),
            dir.path().join("settings.json"),
            Box::new(Rc::new(FakeAutostart::default())),
            Box::new(handler.clone()),
        );

        core.add_task("Buy milk");
        assert_eq!(handler.errors.borrow().len(), 1);
        // In-memory state stays the source of truth until the next
        // successful save
        assert_eq!(core.state().tasks.len(), 1);
    }
}
