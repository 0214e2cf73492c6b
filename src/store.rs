//! Task list persistence
//!
//! The backing file is a JSON array of `[text, done]` pairs, rewritten
//! wholesale on every mutation. Ids and creation dates are in-memory
//! only: ids are reassigned sequentially at load, and creation dates
//! default to the load day for entries that predate the session.

use crate::config::write_atomic;
use crate::task::{Task, TaskId};
use anyhow::{Context, Result};
use chrono::Local;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub struct TaskStore {
    path: PathBuf,
    tasks: Vec<Task>,
    next_id: u64,
}

impl TaskStore {
    /// Load the task list from `path`, substituting an empty list for a
    /// missing or malformed file.
    pub fn load(path: PathBuf) -> Self {
        let today = Local::now().date_naive();
        let tasks: Vec<Task> = read_records(&path)
            .into_iter()
            .enumerate()
            .map(|(i, (text, done))| Task {
                id: TaskId(i as u64),
                text,
                done,
                created: today,
            })
            .collect();
        let next_id = tasks.len() as u64;
        Self {
            path,
            tasks,
            next_id,
        }
    }

    /// All tasks in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Append a task with today's date and persist. Input that trims to
    /// nothing is a no-op and writes nothing.
    pub fn add(&mut self, text: &str) -> Result<Option<TaskId>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.tasks.push(Task::new(id, text));
        self.save()?;
        Ok(Some(id))
    }

    /// Update a task's completion flag and persist. Returns `false` (and
    /// writes nothing) when no task matches `id`.
    pub fn set_done(&mut self, id: TaskId, done: bool) -> Result<bool> {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        task.done = done;
        self.save()?;
        Ok(true)
    }

    /// Remove a task and persist. Removing an unknown id is a no-op.
    pub fn delete(&mut self, id: TaskId) -> Result<bool> {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    /// Clear the list unconditionally and persist. The yes/no
    /// confirmation is the caller's job.
    pub fn reset_all(&mut self) -> Result<()> {
        self.tasks.clear();
        self.save()
    }

    fn save(&self) -> Result<()> {
        let records: Vec<(&str, bool)> = self
            .tasks
            .iter()
            .map(|t| (t.text.as_str(), t.done))
            .collect();
        let json =
            serde_json::to_string_pretty(&records).context("Failed to serialize task list")?;
        write_atomic(&self.path, &json)?;
        tracing::debug!("Saved {} tasks to {:?}", self.tasks.len(), self.path);
        Ok(())
    }
}

fn read_records(path: &Path) -> Vec<(String, bool)> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            if e.kind() != ErrorKind::NotFound {
                tracing::warn!("Could not read task file {:?}: {}", path, e);
            }
            return Vec::new();
        }
    };
    match serde_json::from_str(&content) {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!("Ignoring malformed task file {:?}: {}", path, e);
            Vec::new()
        }
    }
}
