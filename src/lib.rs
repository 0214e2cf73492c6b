//! Task Manager Core
//!
//! This library provides the core functionality for Task Manager,
//! a minimal desktop to-do list application. The native window layer is
//! a thin shell: it drives [`TaskManagerCore`] and re-renders from the
//! [`AppState`] snapshots pushed at its [`EventHandler`].

mod autostart;
mod config;
mod core;
mod prefs;
mod store;
mod task;

pub use autostart::{platform_autostart, Autostart};
pub use core::{AppState, EventHandler, TaskManagerCore, TaskManagerError};
pub use prefs::Preferences;
pub use store::TaskStore;
pub use task::{Task, TaskId};

/// Install the default tracing subscriber. Meant for shells that do not
/// configure logging of their own.
pub fn init_logging() {
    tracing_subscriber::fmt::init();
}
