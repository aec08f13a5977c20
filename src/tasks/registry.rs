use tracing::{debug, warn};

use crate::timer::TimerEngine;

use super::{clamp_seconds, is_screen_time, same_name, Task, TaskEntity, TaskError};

/// Ordered tasks of the day being edited. The first task is always the fixed screen time task and
/// names are unique ignoring case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRegistry {
    tasks: Vec<Task>,
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskRegistry {
    /// Registry of a fresh day: only the fixed task, with zero time.
    pub fn new() -> Self {
        Self {
            tasks: vec![Task::screen_time(0)],
        }
    }

    /// Builds a registry from stored records. The fixed task goes first (synthesized if absent),
    /// everything else keeps the stored order. Records repeating an earlier name are dropped.
    pub fn load(records: impl IntoIterator<Item = TaskEntity>) -> Self {
        let mut screen_time: Option<Task> = None;
        let mut others: Vec<Task> = Vec::new();

        for record in records {
            let task = Task::from(record);
            if is_screen_time(&task.name) {
                if screen_time.is_none() {
                    screen_time = Some(task);
                } else {
                    warn!("Dropping repeated fixed task record {:?}", task);
                }
                continue;
            }
            let taken = same_name(&task.name, super::SCREEN_TIME)
                || others.iter().any(|v| v.is_named(&task.name));
            if taken {
                warn!("Dropping task with a repeated name {:?}", task.name);
                continue;
            }
            others.push(task);
        }

        let mut tasks = Vec::with_capacity(others.len() + 1);
        tasks.push(screen_time.unwrap_or_else(|| Task::screen_time(0)));
        tasks.extend(others);
        debug!("Loaded registry with {} tasks", tasks.len());
        Self { tasks }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Task> {
        self.tasks.iter().find(|v| v.is_named(name))
    }

    fn position(&self, name: &str) -> Result<usize, TaskError> {
        self.tasks
            .iter()
            .position(|v| v.is_named(name))
            .ok_or_else(|| TaskError::NotFound(name.to_string()))
    }

    pub fn add_task(&mut self, name: &str) -> Result<&Task, TaskError> {
        let name = name.trim();
        if name.is_empty() || self.get(name).is_some() {
            return Err(TaskError::Duplicate(name.to_string()));
        }
        self.tasks.push(Task::new(name));
        debug!("Added task {name:?}");
        Ok(&self.tasks[self.tasks.len() - 1])
    }

    /// Removes a task. If the timer is running or paused on it, the timer is stopped before the
    /// task disappears.
    pub fn remove_task(&mut self, name: &str, timer: &mut TimerEngine) -> Result<Task, TaskError> {
        let index = self.position(name)?;
        let task = &self.tasks[index];
        if task.fixed {
            return Err(TaskError::Protected(task.name.to_string()));
        }
        if timer.is_active(&task.name) {
            timer.stop();
        }
        let removed = self.tasks.remove(index);
        debug!("Removed task {:?}", removed.name);
        Ok(removed)
    }

    /// The only way a task's time changes. Returns the stored (clamped) value.
    pub fn set_time(&mut self, name: &str, seconds: i64) -> Result<u32, TaskError> {
        let index = self.position(name)?;
        let task = &mut self.tasks[index];
        task.time = clamp_seconds(seconds);
        Ok(task.time)
    }

    /// Returns the new completion state.
    pub fn toggle_completion(&mut self, name: &str) -> Result<bool, TaskError> {
        let index = self.position(name)?;
        let task = &mut self.tasks[index];
        if task.fixed {
            return Err(TaskError::Protected(task.name.to_string()));
        }
        task.completed = !task.completed;
        Ok(task.completed)
    }

    /// Full ordered set, as it should be saved.
    pub fn to_entities(&self) -> Vec<TaskEntity> {
        self.tasks.iter().map(TaskEntity::from).collect()
    }
}
