//! Tasks tracked for a single day.
//!
//!  - [Task] is the in-memory record owned by [registry::TaskRegistry].
//!  - [TaskEntity] is the record exchanged with storage. It is deliberately loose: missing fields
//!    get defaults and times are clamped when converted into a [Task].

pub mod registry;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the task that is always present and can't be removed or completed.
pub const SCREEN_TIME: &str = "Screen time";

/// Upper bound of a task's time. One calendar day in seconds.
pub const MAX_TASK_SECONDS: u32 = 86_400;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum TaskError {
    #[error("task name {0:?} is blank or already taken")]
    Duplicate(String),
    #[error("task not found: {0}")]
    NotFound(String),
    #[error("task {0:?} is protected")]
    Protected(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    pub name: Arc<str>,
    pub time: u32,
    pub completed: bool,
    pub fixed: bool,
}

impl Task {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            time: 0,
            completed: false,
            fixed: false,
        }
    }

    pub fn screen_time(time: u32) -> Self {
        Self {
            name: SCREEN_TIME.into(),
            time: clamp_seconds(time as i64),
            completed: false,
            fixed: true,
        }
    }

    pub fn with_time(self, time: u32) -> Self {
        Self {
            time: clamp_seconds(time as i64),
            ..self
        }
    }

    pub fn with_completed(self, completed: bool) -> Self {
        Self { completed, ..self }
    }

    /// Case-insensitive identity comparison.
    pub fn is_named(&self, name: &str) -> bool {
        same_name(&self.name, name)
    }
}

pub fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

pub fn is_screen_time(name: &str) -> bool {
    name == SCREEN_TIME
}

/// Clamps any second count into `[0, MAX_TASK_SECONDS]`.
pub fn clamp_seconds(seconds: i64) -> u32 {
    seconds.clamp(0, MAX_TASK_SECONDS as i64) as u32
}

/// Task as stored for a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEntity {
    pub name: String,
    #[serde(default)]
    pub time: i64,
    #[serde(default)]
    pub completed: bool,
}

impl TaskEntity {
    pub fn new(name: impl Into<String>, time: i64, completed: bool) -> Self {
        Self {
            name: name.into(),
            time,
            completed,
        }
    }
}

impl From<TaskEntity> for Task {
    fn from(TaskEntity { name, time, completed }: TaskEntity) -> Self {
        let fixed = is_screen_time(&name);
        Task {
            name: name.into(),
            time: clamp_seconds(time),
            // The fixed task can never be completed, whatever storage says.
            completed: completed && !fixed,
            fixed,
        }
    }
}

impl From<&Task> for TaskEntity {
    fn from(task: &Task) -> Self {
        TaskEntity {
            name: task.name.to_string(),
            time: task.time as i64,
            completed: task.completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_bounds_are_inclusive() {
        assert_eq!(clamp_seconds(-5), 0);
        assert_eq!(clamp_seconds(0), 0);
        assert_eq!(clamp_seconds(86_400), 86_400);
        assert_eq!(clamp_seconds(86_401), 86_400);
        assert_eq!(clamp_seconds(i64::MAX), 86_400);
    }

    #[test]
    fn entity_defaults_missing_fields() {
        let entity: TaskEntity = serde_json::from_str(r#"{"name":"Read"}"#).unwrap();
        assert_eq!(entity, TaskEntity::new("Read", 0, false));
    }

    #[test]
    fn entity_conversion_marks_screen_time_fixed() {
        let task = Task::from(TaskEntity::new(SCREEN_TIME, 100_000, true));
        assert!(task.fixed);
        assert!(!task.completed);
        assert_eq!(task.time, MAX_TASK_SECONDS);

        let task = Task::from(TaskEntity::new("screen time", 10, true));
        assert!(!task.fixed);
        assert!(task.completed);
    }

    #[test]
    fn names_compare_case_insensitively() {
        assert!(Task::new("Read").is_named("rEAD"));
        assert!(!Task::new("Read").is_named("Reading"));
    }
}
