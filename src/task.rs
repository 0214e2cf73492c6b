//! Task data structures

use chrono::{Local, NaiveDate};

/// Stable identity for a task, assigned when it enters the store.
///
/// Ids are a per-session sequence; they are never derived from the task
/// text, so duplicate texts stay individually addressable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskId(pub(crate) u64);

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A to-do item as shown in one row of the list.
#[derive(Clone, Debug)]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub done: bool,
    pub created: NaiveDate,
}

impl Task {
    pub(crate) fn new(id: TaskId, text: &str) -> Self {
        Self {
            id,
            text: text.to_string(),
            done: false,
            created: Local::now().date_naive(),
        }
    }

    /// Creation date for the label next to the row, `YYYY-MM-DD`.
    pub fn created_label(&self) -> String {
        self.created.format("%Y-%m-%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{Task, TaskId};
    use chrono::NaiveDate;

    #[test]
    fn created_label_is_an_iso_date() {
        let mut task = Task::new(TaskId(0), "Buy milk");
        task.created = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        assert_eq!(task.created_label(), "2026-08-06");
    }
}
