//! Sort-order mini-language
//!
//! A sort order is one or more steps written back to back, each step being
//! a property name (or unambiguous prefix) followed by `+` (ascending) or
//! `-` (descending):
//!
//! ```text
//! priority+id-     ascending priority, ties by descending id
//! du+de+           due date, then description
//! ```
//!
//! Missing values (a task without a due date) sort before present ones.

use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

use super::prototype::{resolve, MatchError, Prototype, Prototyped};
use super::task::Task;

static SORT_ORDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[A-Za-z][A-Za-z0-9]*[+-])+$").expect("valid regex"));

static SORT_STEP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z][A-Za-z0-9]*)([+-])").expect("valid regex"));

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SortError {
    #[error("No such sort property: '{0}'")]
    NoSuchSortProperty(String),

    #[error("Ambiguous sort property '{prefix}', could be: {}", candidates.join(", "))]
    AmbiguousSortProperty {
        prefix: String,
        candidates: Vec<String>,
    },

    #[error("Malformed sort order '{0}': expected steps like 'priority+id-'")]
    MalformedSortOrder(String),
}

/// A comparable task attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortProperty {
    Id,
    IsFinished,
    DueDate,
    Description,
    Priority,
}

impl SortProperty {
    pub const ALL: [SortProperty; 5] = [
        SortProperty::Id,
        SortProperty::IsFinished,
        SortProperty::DueDate,
        SortProperty::Description,
        SortProperty::Priority,
    ];

    pub fn name(&self) -> &'static str {
        self.prototype().canonical()
    }

    fn compare(&self, a: &Task, b: &Task) -> Ordering {
        match self {
            SortProperty::Id => a.id.cmp(&b.id),
            SortProperty::IsFinished => a.finished.cmp(&b.finished),
            // None < Some(_) is exactly the missing-sorts-first rule
            SortProperty::DueDate => a.due.cmp(&b.due),
            SortProperty::Description => a.description.cmp(&b.description),
            SortProperty::Priority => a.priority.cmp(&b.priority),
        }
    }
}

impl Prototyped for SortProperty {
    fn prototype(&self) -> Prototype {
        Prototype::new(match self {
            SortProperty::Id => "id",
            SortProperty::IsFinished => "isfinished",
            SortProperty::DueDate => "duedate",
            SortProperty::Description => "description",
            SortProperty::Priority => "priority",
        })
    }
}

/// Direction of a single sort step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// One (property, direction) unit of a sort order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortStep {
    pub property: SortProperty,
    pub direction: Direction,
}

impl SortStep {
    pub fn new(property: SortProperty, direction: Direction) -> Self {
        Self {
            property,
            direction,
        }
    }

    pub fn compare(&self, a: &Task, b: &Task) -> Ordering {
        let ordering = self.property.compare(a, b);
        match self.direction {
            Direction::Ascending => ordering,
            Direction::Descending => ordering.reverse(),
        }
    }
}

/// A composite comparator built from sort steps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrder {
    steps: Vec<SortStep>,
}

impl SortOrder {
    pub fn new(steps: Vec<SortStep>) -> Self {
        Self { steps }
    }

    /// Ascending by ID
    pub fn by_id() -> Self {
        Self::new(vec![SortStep::new(SortProperty::Id, Direction::Ascending)])
    }

    pub fn steps(&self) -> &[SortStep] {
        &self.steps
    }

    /// Compares step by step; the first decisive step wins
    pub fn compare(&self, a: &Task, b: &Task) -> Ordering {
        self.steps
            .iter()
            .map(|step| step.compare(a, b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    /// Stable sort of `tasks` in this order
    pub fn sort(&self, tasks: &mut [Task]) {
        tasks.sort_by(|a, b| self.compare(a, b));
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        Self::by_id()
    }
}

impl FromStr for SortOrder {
    type Err = SortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let spec = s.trim();
        if !SORT_ORDER.is_match(spec) {
            return Err(SortError::MalformedSortOrder(s.to_string()));
        }

        let steps = SORT_STEP
            .captures_iter(spec)
            .map(|caps| {
                let prefix = &caps[1];
                let property = resolve(prefix, &SortProperty::ALL).map_err(|e| match e {
                    MatchError::Unknown { .. } => SortError::NoSuchSortProperty(prefix.to_string()),
                    MatchError::Ambiguous { candidates, .. } => SortError::AmbiguousSortProperty {
                        prefix: prefix.to_string(),
                        candidates,
                    },
                })?;
                let direction = if &caps[2] == "+" {
                    Direction::Ascending
                } else {
                    Direction::Descending
                };
                Ok(SortStep::new(*property.entry, direction))
            })
            .collect::<Result<Vec<_>, SortError>>()?;

        Ok(Self::new(steps))
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            let sign = match step.direction {
                Direction::Ascending => '+',
                Direction::Descending => '-',
            };
            write!(f, "{}{}", step.property.name(), sign)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Priority;
    use chrono::NaiveDate;

    fn ids(tasks: &[Task]) -> Vec<u32> {
        tasks.iter().map(|t| t.id).collect()
    }

    #[test]
    fn parses_steps_with_prefixes() {
        let order: SortOrder = "pri+id-".parse().unwrap();
        assert_eq!(
            order.steps(),
            &[
                SortStep::new(SortProperty::Priority, Direction::Ascending),
                SortStep::new(SortProperty::Id, Direction::Descending),
            ]
        );
        assert_eq!(order.to_string(), "priority+id-");
    }

    #[test]
    fn exact_name_beats_prefix() {
        let order: SortOrder = "id+".parse().unwrap();
        assert_eq!(order.steps()[0].property, SortProperty::Id);
    }

    #[test]
    fn ambiguous_prefix_lists_candidates() {
        let err = "d+".parse::<SortOrder>().unwrap_err();
        assert_eq!(
            err,
            SortError::AmbiguousSortProperty {
                prefix: "d".to_string(),
                candidates: vec!["duedate".to_string(), "description".to_string()],
            }
        );
    }

    #[test]
    fn unknown_property_names_prefix() {
        let err = "colour+".parse::<SortOrder>().unwrap_err();
        assert_eq!(err, SortError::NoSuchSortProperty("colour".to_string()));
    }

    #[test]
    fn missing_direction_is_malformed() {
        for spec in ["priority", "priority+id", "+id", "", "id+ pri-"] {
            assert!(
                matches!(spec.parse::<SortOrder>(), Err(SortError::MalformedSortOrder(_))),
                "expected malformed for {spec:?}"
            );
        }
    }

    #[test]
    fn priority_then_id_descending() {
        let mut tasks = vec![
            Task::new(1, "a").with_priority(Priority::Critical),
            Task::new(2, "b"),
            Task::new(3, "c").with_priority(Priority::Critical),
            Task::new(4, "d"),
        ];
        let order: SortOrder = "priority+id-".parse().unwrap();
        order.sort(&mut tasks);
        assert_eq!(ids(&tasks), vec![4, 2, 3, 1]);
    }

    #[test]
    fn missing_due_dates_sort_first() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let mut tasks = vec![
            Task::new(0, "dated").with_due(date),
            Task::new(1, "undated"),
            Task::new(2, "also undated"),
        ];
        let order: SortOrder = "duedate+".parse().unwrap();
        order.sort(&mut tasks);
        assert_eq!(ids(&tasks), vec![1, 2, 0]);

        let order: SortOrder = "duedate-".parse().unwrap();
        order.sort(&mut tasks);
        assert_eq!(ids(&tasks)[0], 0);
    }

    #[test]
    fn all_equal_steps_compare_equal() {
        let a = Task::new(0, "same");
        let b = Task::new(1, "same");
        let order: SortOrder = "description+isfinished+".parse().unwrap();
        assert_eq!(order.compare(&a, &b), Ordering::Equal);
    }
}
