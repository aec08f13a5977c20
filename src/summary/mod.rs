//! Derived statistics over a flat collection of tasks. Nothing here holds state; a collection can
//! be one day or several days concatenated, in which case every day contributes its own fixed
//! screen time task.

pub mod chart;

use std::fmt::Display;

use serde::Serialize;

use crate::{
    tasks::{is_screen_time, Task},
    utils::percentage::Percentage,
};

/// Summed time of all tasks that aren't fixed.
pub fn productive_time<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> u64 {
    tasks
        .into_iter()
        .filter(|v| !v.fixed)
        .map(|v| v.time as u64)
        .sum()
}

/// Summed time of all screen time tasks.
pub fn screen_time<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> u64 {
    tasks
        .into_iter()
        .filter(|v| is_screen_time(&v.name))
        .map(|v| v.time as u64)
        .sum()
}

/// Share of completed tasks among the tasks that aren't fixed. Zero when there are none.
pub fn completion_rate<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Percentage {
    let (completed, total) = tasks
        .into_iter()
        .filter(|v| !v.fixed)
        .fold((0, 0), |(completed, total), v| {
            (completed + v.completed as usize, total + 1)
        });
    Percentage::of_ratio(completed, total)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RangeSummary {
    pub productive_time: u64,
    pub screen_time: u64,
    pub completion_rate: Percentage,
}

impl RangeSummary {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        Self {
            productive_time: productive_time(tasks),
            screen_time: screen_time(tasks),
            completion_rate: completion_rate(tasks),
        }
    }

    pub fn mood(&self) -> Mood {
        Mood::classify(self)
    }
}

/// Qualitative reading of a summary, ordered from worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Mood {
    Sad,
    Tired,
    Happy,
    Super,
}

impl Mood {
    pub fn classify(summary: &RangeSummary) -> Self {
        let RangeSummary {
            productive_time,
            screen_time,
            completion_rate,
        } = *summary;
        // Order matters: a productive day with high completion is super even if the other rules
        // would also match.
        if *completion_rate >= 80 && productive_time > screen_time {
            Mood::Super
        } else if *completion_rate < 50 {
            Mood::Sad
        } else if screen_time > productive_time {
            Mood::Tired
        } else {
            Mood::Happy
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Mood::Sad => "sad",
            Mood::Tired => "tired",
            Mood::Happy => "happy",
            Mood::Super => "super",
        }
    }
}

impl Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{
        tasks::{registry::TaskRegistry, Task, TaskEntity, SCREEN_TIME},
        utils::percentage::Percentage,
    };

    use super::{completion_rate, Mood, RangeSummary};

    fn summary(productive_time: u64, screen_time: u64, rate: u8) -> RangeSummary {
        RangeSummary {
            productive_time,
            screen_time,
            completion_rate: Percentage::new_opt(rate).unwrap(),
        }
    }

    #[test]
    fn empty_collection_has_zero_rate() {
        assert_eq!(completion_rate(std::iter::empty()), Percentage::ZERO);
        assert_eq!(completion_rate(&[Task::screen_time(500)]), Percentage::ZERO);
        assert_eq!(
            RangeSummary::from_tasks(&[Task::screen_time(500)]),
            summary(0, 500, 0)
        );
    }

    #[test]
    fn loaded_day_summary() {
        let registry = TaskRegistry::load([
            TaskEntity::new("Read", 120, true),
            TaskEntity::new(SCREEN_TIME, 300, false),
        ]);
        assert_eq!(
            RangeSummary::from_tasks(registry.tasks()),
            summary(120, 300, 100)
        );
    }

    #[test]
    fn fixed_tasks_are_summed_across_days() {
        let tasks = [
            Task::screen_time(100),
            Task::new("Read").with_time(50),
            Task::screen_time(200),
            Task::new("Read").with_time(25).with_completed(true),
            Task::new("Write").with_time(25),
        ];
        assert_eq!(RangeSummary::from_tasks(&tasks), summary(100, 300, 33));
    }

    #[test]
    fn rate_is_rounded() {
        let tasks = [
            Task::new("a").with_completed(true),
            Task::new("b").with_completed(true),
            Task::new("c"),
        ];
        assert_eq!(*completion_rate(&tasks), 67);
    }

    #[test]
    fn mood_precedence() {
        assert_eq!(summary(100, 50, 80).mood(), Mood::Super);
        assert_eq!(summary(100, 50, 79).mood(), Mood::Happy);
        // High completion but more screen time falls through to the later rules.
        assert_eq!(summary(50, 100, 90).mood(), Mood::Tired);
        assert_eq!(summary(50, 50, 90).mood(), Mood::Happy);
        assert_eq!(summary(100, 50, 49).mood(), Mood::Sad);
        assert_eq!(summary(10, 500, 20).mood(), Mood::Sad);
        assert_eq!(summary(10, 500, 50).mood(), Mood::Tired);
        assert_eq!(summary(0, 0, 0).mood(), Mood::Sad);
    }

    #[test]
    fn moods_are_ordered() {
        assert!(Mood::Sad < Mood::Tired);
        assert!(Mood::Tired < Mood::Happy);
        assert!(Mood::Happy < Mood::Super);
        assert_eq!(Mood::Super.to_string(), "super");
    }
}
