//! Task domain model
//!
//! A task is a numbered line item with a priority, a finished flag and an
//! optional due date. The natural ordering of tasks is by ID.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

use super::prototype::{resolve, Prototype, Prototyped};

/// Task importance, ordered from least to most urgent
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    #[default]
    Normal,
    Important,
    Critical,
}

/// Accepted spellings for each priority level
const PRIORITY_NAMES: [(Priority, Prototype); 3] = [
    (Priority::Normal, Prototype::new("normal|low|0")),
    (Priority::Important, Prototype::new("important|high|1")),
    (Priority::Critical, Prototype::new("critical|urgent|2")),
];

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Normal, Priority::Important, Priority::Critical];

    /// Looks up a priority level by name, number or unambiguous prefix
    pub fn from_name(name: &str) -> Option<Self> {
        resolve(name, &Self::ALL).ok().map(|resolved| *resolved.entry)
    }

    pub fn as_str(&self) -> &'static str {
        self.prototype().canonical()
    }

    /// Short marker used in tables
    pub fn marker(&self) -> &'static str {
        match self {
            Priority::Normal => "",
            Priority::Important => "!",
            Priority::Critical => "!!",
        }
    }
}

impl Prototyped for Priority {
    fn prototype(&self) -> Prototype {
        PRIORITY_NAMES
            .iter()
            .find(|(level, _)| level == self)
            .map(|(_, proto)| *proto)
            .unwrap_or(Prototype::new("normal"))
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single entry of the task list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Position-like identifier, unique within a list
    pub id: u32,

    /// What needs doing
    pub description: String,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default)]
    pub finished: bool,

    /// Due date without time component
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<NaiveDate>,
}

impl Task {
    /// Creates a new pending task with normal priority
    pub fn new(id: u32, description: impl Into<String>) -> Self {
        Self {
            id,
            description: description.into(),
            priority: Priority::Normal,
            finished: false,
            due: None,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_due(mut self, due: NaiveDate) -> Self {
        self.due = Some(due);
        self
    }

    pub fn finish(&mut self) {
        self.finished = true;
    }

    pub fn reopen(&mut self) {
        self.finished = false;
    }

    /// Returns true if the task is unfinished and its due date has passed
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.finished && self.due.is_some_and(|due| due < today)
    }
}

impl PartialOrd for Task {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Task {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id
            .cmp(&other.id)
            .then_with(|| self.description.cmp(&other.description))
            .then_with(|| self.priority.cmp(&other.priority))
            .then_with(|| self.finished.cmp(&other.finished))
            .then_with(|| self.due.cmp(&other.due))
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TaskError {
    #[error("No task ID left after {0}; run 'renumber' to compact the IDs")]
    IdsExhausted(u32),
}

/// Returns the ID a newly added task receives
pub fn next_id(tasks: &[Task]) -> Result<u32, TaskError> {
    match tasks.iter().map(|t| t.id).max() {
        None => Ok(0),
        Some(max) => max.checked_add(1).ok_or(TaskError::IdsExhausted(max)),
    }
}

/// Removes the tasks in `removed` and shifts every larger ID down by the
/// number of removed IDs below it
pub fn remove_and_shift(tasks: &mut Vec<Task>, removed: &[u32]) {
    tasks.retain(|t| !removed.contains(&t.id));
    for task in tasks.iter_mut() {
        let below = removed.iter().filter(|&&id| id < task.id).count() as u32;
        task.id -= below;
    }
}

/// Reassigns IDs 0..N-1 in the current order of `tasks`
pub fn renumber(tasks: &mut [Task]) {
    for (index, task) in tasks.iter_mut().enumerate() {
        task.id = index as u32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn priority_ordering() {
        assert!(Priority::Normal < Priority::Important);
        assert!(Priority::Important < Priority::Critical);
        assert_eq!(Priority::default(), Priority::Normal);
    }

    #[test]
    fn priority_from_name() {
        assert_eq!(Priority::from_name("critical"), Some(Priority::Critical));
        assert_eq!(Priority::from_name("HIGH"), Some(Priority::Important));
        assert_eq!(Priority::from_name("crit"), Some(Priority::Critical));
        assert_eq!(Priority::from_name("0"), Some(Priority::Normal));
        assert_eq!(Priority::from_name("2"), Some(Priority::Critical));
        assert_eq!(Priority::from_name("bogus"), None);
    }

    #[test]
    fn priority_serializes_snake_case() {
        let json = serde_json::to_string(&Priority::Important).unwrap();
        assert_eq!(json, "\"important\"");
    }

    #[test]
    fn new_task_is_pending() {
        let task = Task::new(3, "Water plants");
        assert_eq!(task.id, 3);
        assert!(!task.finished);
        assert_eq!(task.priority, Priority::Normal);
        assert_eq!(task.due, None);
    }

    #[test]
    fn finish_and_reopen() {
        let mut task = Task::new(0, "Ship it");
        task.finish();
        assert!(task.finished);
        task.reopen();
        assert!(!task.finished);
    }

    #[test]
    fn overdue_only_when_pending() {
        let today = date(2025, 3, 10);
        let mut task = Task::new(0, "Taxes").with_due(date(2025, 3, 1));
        assert!(task.is_overdue(today));
        task.finish();
        assert!(!task.is_overdue(today));
        assert!(!Task::new(1, "No date").is_overdue(today));
    }

    #[test]
    fn natural_order_is_by_id() {
        let mut tasks = vec![Task::new(2, "a"), Task::new(0, "c"), Task::new(1, "b")];
        tasks.sort();
        let ids: Vec<_> = tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn next_id_follows_largest() {
        assert_eq!(next_id(&[]), Ok(0));
        assert_eq!(next_id(&[Task::new(0, "a"), Task::new(4, "b")]), Ok(5));
    }

    #[test]
    fn next_id_fails_at_largest_id() {
        assert_eq!(
            next_id(&[Task::new(3, "a"), Task::new(u32::MAX, "b")]),
            Err(TaskError::IdsExhausted(u32::MAX))
        );
    }

    #[test]
    fn removal_shifts_larger_ids_down() {
        let mut tasks: Vec<_> = (0..5).map(|i| Task::new(i, format!("t{i}"))).collect();
        remove_and_shift(&mut tasks, &[1, 3]);

        let pairs: Vec<_> = tasks.iter().map(|t| (t.id, t.description.as_str())).collect();
        assert_eq!(pairs, vec![(0, "t0"), (1, "t2"), (2, "t4")]);
    }

    #[test]
    fn renumber_in_current_order() {
        let mut tasks = vec![Task::new(7, "a"), Task::new(2, "b")];
        renumber(&mut tasks);
        assert_eq!(tasks[0].id, 0);
        assert_eq!(tasks[1].id, 1);
    }

    #[test]
    fn task_json_omits_missing_due() {
        let task = Task::new(0, "Plain");
        let json = serde_json::to_string(&task).unwrap();
        assert!(!json.contains("due"));

        let parsed: Task = serde_json::from_str(r#"{"id":1,"description":"Old"}"#).unwrap();
        assert_eq!(parsed.priority, Priority::Normal);
        assert!(!parsed.finished);
    }
}
