//! Command-line flags
//!
//! Every flag is declared once in [`FlagId`] and owned by [`Flags`]. A flag
//! parses its own value when the arguments are scanned and keeps "not set"
//! until then. Filter flags additionally narrow a task sequence.
//!
//! Token grammar:
//! - `--name` sets a boolean flag
//! - `--name=value` or `--name value` sets a valued flag
//! - `--` ends flag scanning; everything after it is free text
//! - anything else is a residual token (command name, free text)
//!
//! Flag names resolve like command names: full spellings first, then
//! unambiguous prefixes.

use std::fmt;

use chrono::NaiveDate;
use regex::{Regex, RegexBuilder};

use super::error::{NameKind, UnsetFlag, UsageError};
use super::output::Output;
use crate::domain::{resolve, resolve_due_date, Priority, Prototype, Prototyped, SortOrder, Task, TaskIds};

/// Accepted spellings for boolean values
const BOOLEAN_NAMES: [(&str, bool); 10] = [
    ("true", true),
    ("yes", true),
    ("y", true),
    ("on", true),
    ("1", true),
    ("false", false),
    ("no", false),
    ("n", false),
    ("off", false),
    ("0", false),
];

/// Values needed while parsing flag values
#[derive(Debug, Clone, Copy)]
pub struct ParseContext {
    /// Reference date for due-date expressions
    pub today: NaiveDate,
}

/// Every flag the interpreter knows, in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagId {
    Id,
    Pending,
    Finished,
    Priority,
    Match,
    Before,
    Skip,
    Limit,
    All,
    OrderBy,
    Due,
    NoDue,
    SetPriority,
    Interactive,
}

impl FlagId {
    pub const ALL: [FlagId; 14] = [
        FlagId::Id,
        FlagId::Pending,
        FlagId::Finished,
        FlagId::Priority,
        FlagId::Match,
        FlagId::Before,
        FlagId::Skip,
        FlagId::Limit,
        FlagId::All,
        FlagId::OrderBy,
        FlagId::Due,
        FlagId::NoDue,
        FlagId::SetPriority,
        FlagId::Interactive,
    ];

    /// Flags that narrow the task sequence
    pub const FILTERS: [FlagId; 8] = [
        FlagId::Id,
        FlagId::Pending,
        FlagId::Finished,
        FlagId::Priority,
        FlagId::Match,
        FlagId::Before,
        FlagId::Skip,
        FlagId::Limit,
    ];

    pub fn name(&self) -> &'static str {
        self.prototype().canonical()
    }

    pub fn is_filter(&self) -> bool {
        Self::FILTERS.contains(self)
    }

    /// Placeholder shown in help for the flag's value
    pub fn value_hint(&self) -> Option<&'static str> {
        match self {
            FlagId::Id => Some("<ids>"),
            FlagId::Priority | FlagId::SetPriority => Some("<level>"),
            FlagId::Match => Some("<regex>"),
            FlagId::Before | FlagId::Due => Some("<date>"),
            FlagId::Skip | FlagId::Limit => Some("<n>"),
            FlagId::OrderBy => Some("<steps>"),
            FlagId::Pending
            | FlagId::Finished
            | FlagId::All
            | FlagId::NoDue
            | FlagId::Interactive => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            FlagId::Id => "Select tasks by ID, list (1,2,3) or range (1-3)",
            FlagId::Pending => "Select unfinished tasks",
            FlagId::Finished => "Select finished tasks",
            FlagId::Priority => "Select tasks with this priority; priority of a new task",
            FlagId::Match => "Select tasks whose description matches a regex",
            FlagId::Before => "Select tasks due on or before a date",
            FlagId::Skip => "Skip the first n selected tasks",
            FlagId::Limit => "Keep at most n selected tasks",
            FlagId::All => "Apply to every task",
            FlagId::OrderBy => "Sort order, e.g. priority-id+",
            FlagId::Due => "Due date: 2025-01-21, tomorrow, next friday, +1w, 2025-01-21::+2d",
            FlagId::NoDue => "Remove the due date",
            FlagId::SetPriority => "New priority: normal, important or critical",
            FlagId::Interactive => "Ask before changing each task",
        }
    }
}

impl Prototyped for FlagId {
    fn prototype(&self) -> Prototype {
        Prototype::new(match self {
            FlagId::Id => "id|ids",
            FlagId::Pending => "pending|open",
            FlagId::Finished => "finished|done",
            FlagId::Priority => "priority|pri",
            FlagId::Match => "match|grep|regex",
            FlagId::Before => "before|due-before",
            FlagId::Skip => "skip|offset",
            FlagId::Limit => "limit|take|first",
            FlagId::All => "all|everything",
            FlagId::OrderBy => "orderby|sort",
            FlagId::Due => "due|deadline",
            FlagId::NoDue => "no-due|clear-due",
            FlagId::SetPriority => "set-priority|reprioritize",
            FlagId::Interactive => "interactive|confirm",
        })
    }
}

/// A type a flag value can be parsed into
pub trait FlagValue: Sized {
    /// Whether `--name value` consumes the next token
    const TAKES_VALUE: bool = true;

    /// Value of a bare `--name`, for flags that allow it
    fn implicit() -> Option<Self> {
        None
    }

    fn parse_value(flag: FlagId, raw: &str, ctx: &ParseContext) -> Result<Self, UsageError>;
}

impl FlagValue for bool {
    const TAKES_VALUE: bool = false;

    fn implicit() -> Option<Self> {
        Some(true)
    }

    fn parse_value(flag: FlagId, raw: &str, _ctx: &ParseContext) -> Result<Self, UsageError> {
        BOOLEAN_NAMES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(raw.trim()))
            .map(|(_, value)| *value)
            .ok_or_else(|| UsageError::UnknownBooleanValue {
                flag: flag.name().to_string(),
                value: raw.to_string(),
            })
    }
}

impl FlagValue for usize {
    fn parse_value(flag: FlagId, raw: &str, _ctx: &ParseContext) -> Result<Self, UsageError> {
        raw.trim().parse().map_err(|_| UsageError::InvalidFlagValue {
            flag: flag.name().to_string(),
            value: raw.to_string(),
            reason: "expected a non-negative number".to_string(),
        })
    }
}

impl FlagValue for TaskIds {
    fn parse_value(_flag: FlagId, raw: &str, _ctx: &ParseContext) -> Result<Self, UsageError> {
        Ok(raw.parse()?)
    }
}

impl FlagValue for Priority {
    fn parse_value(flag: FlagId, raw: &str, _ctx: &ParseContext) -> Result<Self, UsageError> {
        Priority::from_name(raw).ok_or_else(|| UsageError::UnknownPriorityLevel {
            flag: flag.name().to_string(),
            value: raw.to_string(),
        })
    }
}

impl FlagValue for SortOrder {
    fn parse_value(_flag: FlagId, raw: &str, _ctx: &ParseContext) -> Result<Self, UsageError> {
        Ok(raw.parse()?)
    }
}

impl FlagValue for NaiveDate {
    fn parse_value(_flag: FlagId, raw: &str, ctx: &ParseContext) -> Result<Self, UsageError> {
        Ok(resolve_due_date(raw, ctx.today)?)
    }
}

/// A case-insensitive description pattern
#[derive(Debug, Clone)]
pub struct Pattern(Regex);

impl Pattern {
    pub fn is_match(&self, text: &str) -> bool {
        self.0.is_match(text)
    }
}

impl FlagValue for Pattern {
    fn parse_value(flag: FlagId, raw: &str, _ctx: &ParseContext) -> Result<Self, UsageError> {
        RegexBuilder::new(raw)
            .case_insensitive(true)
            .build()
            .map(Pattern)
            .map_err(|_| UsageError::InvalidFlagValue {
                flag: flag.name().to_string(),
                value: raw.to_string(),
                reason: "not a valid regular expression".to_string(),
            })
    }
}

/// Object-safe view of any flag, used while scanning arguments
pub trait AnyFlag {
    fn id(&self) -> FlagId;
    fn is_set(&self) -> bool;
    fn takes_value(&self) -> bool;
    fn set_raw(&mut self, raw: Option<&str>, ctx: &ParseContext) -> Result<(), UsageError>;
}

/// A typed flag; `None` until supplied on the command line
#[derive(Debug, Clone)]
pub struct Flag<T> {
    id: FlagId,
    value: Option<T>,
}

impl<T> Flag<T> {
    pub fn new(id: FlagId) -> Self {
        Self { id, value: None }
    }

    /// The value, if the flag was supplied
    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// The value of a flag that must have been supplied
    pub fn value(&self) -> Result<&T, UnsetFlag> {
        self.value.as_ref().ok_or(UnsetFlag {
            flag: self.id.name(),
        })
    }

    pub fn set(&mut self, value: T) {
        self.value = Some(value);
    }
}

impl<T: FlagValue> AnyFlag for Flag<T> {
    fn id(&self) -> FlagId {
        self.id
    }

    fn is_set(&self) -> bool {
        self.value.is_some()
    }

    fn takes_value(&self) -> bool {
        T::TAKES_VALUE
    }

    fn set_raw(&mut self, raw: Option<&str>, ctx: &ParseContext) -> Result<(), UsageError> {
        let value = match raw {
            Some(raw) => T::parse_value(self.id, raw, ctx)?,
            None => T::implicit().ok_or_else(|| UsageError::MissingFlagValue {
                flag: self.id.name().to_string(),
            })?,
        };
        self.value = Some(value);
        Ok(())
    }
}

/// Predicate over (flag value, candidate task, position in the current sequence)
pub type Predicate<T> = fn(&T, &Task, usize) -> bool;

/// A flag that narrows a task sequence when set
pub struct FilterFlag<T> {
    flag: Flag<T>,
    priority: i32,
    predicate: Predicate<T>,
}

impl<T> FilterFlag<T> {
    pub fn new(id: FlagId, priority: i32, predicate: Predicate<T>) -> Self {
        Self {
            flag: Flag::new(id),
            priority,
            predicate,
        }
    }

    pub fn get(&self) -> Option<&T> {
        self.flag.get()
    }

    pub fn value(&self) -> Result<&T, UnsetFlag> {
        self.flag.value()
    }

    pub fn set(&mut self, value: T) {
        self.flag.set(value);
    }
}

impl<T: FlagValue> AnyFlag for FilterFlag<T> {
    fn id(&self) -> FlagId {
        self.flag.id()
    }

    fn is_set(&self) -> bool {
        self.flag.is_set()
    }

    fn takes_value(&self) -> bool {
        self.flag.takes_value()
    }

    fn set_raw(&mut self, raw: Option<&str>, ctx: &ParseContext) -> Result<(), UsageError> {
        self.flag.set_raw(raw, ctx)
    }
}

/// A set filter flag seen by the filter composer
pub trait TaskFilter {
    fn id(&self) -> FlagId;

    /// Lower runs first
    fn priority(&self) -> i32;

    fn is_set(&self) -> bool;

    /// Keeps the tasks the predicate accepts; positions are within `tasks`
    fn filter<'t>(&self, tasks: Vec<&'t Task>) -> Result<Vec<&'t Task>, UnsetFlag>;
}

impl<T: FlagValue> TaskFilter for FilterFlag<T> {
    fn id(&self) -> FlagId {
        self.flag.id()
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn is_set(&self) -> bool {
        self.flag.is_set()
    }

    fn filter<'t>(&self, tasks: Vec<&'t Task>) -> Result<Vec<&'t Task>, UnsetFlag> {
        let value = self.flag.value()?;
        Ok(tasks
            .into_iter()
            .enumerate()
            .filter(|(position, task)| (self.predicate)(value, task, *position))
            .map(|(_, task)| task)
            .collect())
    }
}

/// All flags of one invocation
pub struct Flags {
    pub id: FilterFlag<TaskIds>,
    pub pending: FilterFlag<bool>,
    pub finished: FilterFlag<bool>,
    pub priority: FilterFlag<Priority>,
    pub matching: FilterFlag<Pattern>,
    pub before: FilterFlag<NaiveDate>,
    pub skip: FilterFlag<usize>,
    pub limit: FilterFlag<usize>,
    pub all: Flag<bool>,
    pub orderby: Flag<SortOrder>,
    pub due: Flag<NaiveDate>,
    pub no_due: Flag<bool>,
    pub set_priority: Flag<Priority>,
    pub interactive: Flag<bool>,
}

impl Default for Flags {
    fn default() -> Self {
        Self::new()
    }
}

impl Flags {
    pub fn new() -> Self {
        Self {
            id: FilterFlag::new(FlagId::Id, 0, |ids, task, _| ids.contains(task.id)),
            pending: FilterFlag::new(FlagId::Pending, 0, |on, task, _| task.finished != *on),
            finished: FilterFlag::new(FlagId::Finished, 0, |on, task, _| task.finished == *on),
            priority: FilterFlag::new(FlagId::Priority, 1, |level, task, _| task.priority == *level),
            matching: FilterFlag::new(FlagId::Match, 1, |pattern, task, _| {
                pattern.is_match(&task.description)
            }),
            before: FilterFlag::new(FlagId::Before, 1, |date, task, _| {
                task.due.is_some_and(|due| due <= *date)
            }),
            skip: FilterFlag::new(FlagId::Skip, 10, |n, _, position| position >= *n),
            limit: FilterFlag::new(FlagId::Limit, 11, |n, _, position| position < *n),
            all: Flag::new(FlagId::All),
            orderby: Flag::new(FlagId::OrderBy),
            due: Flag::new(FlagId::Due),
            no_due: Flag::new(FlagId::NoDue),
            set_priority: Flag::new(FlagId::SetPriority),
            interactive: Flag::new(FlagId::Interactive),
        }
    }

    pub fn flag(&self, id: FlagId) -> &dyn AnyFlag {
        match id {
            FlagId::Id => &self.id,
            FlagId::Pending => &self.pending,
            FlagId::Finished => &self.finished,
            FlagId::Priority => &self.priority,
            FlagId::Match => &self.matching,
            FlagId::Before => &self.before,
            FlagId::Skip => &self.skip,
            FlagId::Limit => &self.limit,
            FlagId::All => &self.all,
            FlagId::OrderBy => &self.orderby,
            FlagId::Due => &self.due,
            FlagId::NoDue => &self.no_due,
            FlagId::SetPriority => &self.set_priority,
            FlagId::Interactive => &self.interactive,
        }
    }

    pub fn flag_mut(&mut self, id: FlagId) -> &mut dyn AnyFlag {
        match id {
            FlagId::Id => &mut self.id,
            FlagId::Pending => &mut self.pending,
            FlagId::Finished => &mut self.finished,
            FlagId::Priority => &mut self.priority,
            FlagId::Match => &mut self.matching,
            FlagId::Before => &mut self.before,
            FlagId::Skip => &mut self.skip,
            FlagId::Limit => &mut self.limit,
            FlagId::All => &mut self.all,
            FlagId::OrderBy => &mut self.orderby,
            FlagId::Due => &mut self.due,
            FlagId::NoDue => &mut self.no_due,
            FlagId::SetPriority => &mut self.set_priority,
            FlagId::Interactive => &mut self.interactive,
        }
    }

    /// Filter flags in declaration order
    pub fn filters(&self) -> [&dyn TaskFilter; 8] {
        [
            &self.id,
            &self.pending,
            &self.finished,
            &self.priority,
            &self.matching,
            &self.before,
            &self.skip,
            &self.limit,
        ]
    }

    /// Flags supplied on the command line, in declaration order
    pub fn set_flags(&self) -> Vec<FlagId> {
        FlagId::ALL
            .into_iter()
            .filter(|id| self.flag(*id).is_set())
            .collect()
    }

    /// True if `--all` was given and not switched off
    pub fn apply_to_all(&self) -> bool {
        self.all.get().copied().unwrap_or(false)
    }

    /// Whether the invocation asked for a prompt per task
    pub fn is_interactive(&self) -> bool {
        self.interactive.get().copied().unwrap_or(false)
    }
}

/// Result of scanning the raw tokens
pub struct ParsedArgs {
    pub flags: Flags,
    /// Tokens that are not flags, in order
    pub residual: Vec<String>,
}

impl fmt::Debug for ParsedArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParsedArgs")
            .field("flags", &self.flags.set_flags())
            .field("residual", &self.residual)
            .finish()
    }
}

/// Separates flags from residual tokens, parsing every flag value
pub fn parse_args(
    args: &[String],
    ctx: &ParseContext,
    output: &Output,
) -> Result<ParsedArgs, UsageError> {
    let mut flags = Flags::new();
    let mut residual = Vec::new();
    let mut tokens = args.iter();

    while let Some(token) = tokens.next() {
        if token == "--" {
            residual.extend(tokens.by_ref().cloned());
            break;
        }

        let body = match token.strip_prefix("--") {
            Some(body) if !body.is_empty() => body,
            _ => {
                residual.push(token.clone());
                continue;
            }
        };

        let (name, inline) = match body.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (body, None),
        };

        let resolved =
            resolve(name, &FlagId::ALL).map_err(|e| UsageError::from_match(NameKind::Flag, e))?;
        let id = *resolved.entry;
        if resolved.abbreviated {
            output.verbose_ctx(
                "match",
                &format!("assuming '--{}' for '--{}'", resolved.spelling, name),
            );
        }

        let flag = flags.flag_mut(id);
        let raw = match inline {
            Some(value) => Some(value.to_string()),
            None if flag.takes_value() => Some(
                tokens
                    .next()
                    .cloned()
                    .ok_or_else(|| UsageError::MissingFlagValue {
                        flag: id.name().to_string(),
                    })?,
            ),
            None => None,
        };

        if flag.is_set() {
            output.verbose_ctx("flags", &format!("'--{}' given again, last value wins", id.name()));
        }
        flag.set_raw(raw.as_deref(), ctx)?;
    }

    Ok(ParsedArgs { flags, residual })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::output::OutputFormat;
    use crate::domain::Task;

    fn ctx() -> ParseContext {
        ParseContext {
            today: NaiveDate::from_ymd_opt(2025, 1, 16).unwrap(),
        }
    }

    fn parse(args: &[&str]) -> Result<ParsedArgs, UsageError> {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        parse_args(&args, &ctx(), &Output::new(OutputFormat::Text, false))
    }

    #[test]
    fn every_flag_has_a_unique_canonical_name() {
        let mut names: Vec<_> = FlagId::ALL.iter().map(FlagId::name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), FlagId::ALL.len());
    }

    #[test]
    fn flags_and_residual_tokens() {
        let parsed = parse(&["add", "--priority=critical", "Buy", "--due", "tomorrow", "milk"]).unwrap();

        assert_eq!(parsed.residual, vec!["add", "Buy", "milk"]);
        assert_eq!(parsed.flags.priority.get(), Some(&Priority::Critical));
        assert_eq!(
            parsed.flags.due.get(),
            Some(&NaiveDate::from_ymd_opt(2025, 1, 17).unwrap())
        );
        assert_eq!(parsed.flags.set_flags(), vec![FlagId::Priority, FlagId::Due]);
    }

    #[test]
    fn abbreviated_flag_names() {
        let parsed = parse(&["list", "--pend", "--lim", "3"]).unwrap();
        assert_eq!(parsed.flags.pending.get(), Some(&true));
        assert_eq!(parsed.flags.limit.get(), Some(&3));
    }

    #[test]
    fn ambiguous_flag_name() {
        // due, due-before, deadline
        let err = parse(&["list", "--d"]).unwrap_err();
        assert!(matches!(
            err,
            UsageError::AmbiguousName {
                kind: NameKind::Flag,
                ..
            }
        ));
    }

    #[test]
    fn unknown_flag_name() {
        let err = parse(&["list", "--colour=red"]).unwrap_err();
        assert!(matches!(
            err,
            UsageError::UnknownName {
                kind: NameKind::Flag,
                ..
            }
        ));
    }

    #[test]
    fn boolean_values() {
        let parsed = parse(&["list", "--pending=no", "--all=YES"]).unwrap();
        assert_eq!(parsed.flags.pending.get(), Some(&false));
        assert!(parsed.flags.apply_to_all());

        let err = parse(&["list", "--pending=maybe"]).unwrap_err();
        assert_eq!(
            err,
            UsageError::UnknownBooleanValue {
                flag: "pending".to_string(),
                value: "maybe".to_string()
            }
        );
    }

    #[test]
    fn boolean_flag_does_not_consume_next_token() {
        let parsed = parse(&["delete", "--all", "now"]).unwrap();
        assert_eq!(parsed.residual, vec!["delete", "now"]);
    }

    #[test]
    fn unknown_priority_level() {
        let err = parse(&["add", "--priority", "meh", "x"]).unwrap_err();
        assert!(matches!(err, UsageError::UnknownPriorityLevel { .. }));
    }

    #[test]
    fn missing_value_at_end() {
        let err = parse(&["list", "--limit"]).unwrap_err();
        assert_eq!(
            err,
            UsageError::MissingFlagValue {
                flag: "limit".to_string()
            }
        );
    }

    #[test]
    fn id_errors_surface() {
        assert!(matches!(
            parse(&["delete", "--id", "7-5"]),
            Err(UsageError::Id(crate::domain::IdError::InvalidIdRangeOrder(_)))
        ));
    }

    #[test]
    fn double_dash_ends_flags() {
        let parsed = parse(&["add", "--", "--not-a-flag", "text"]).unwrap();
        assert_eq!(parsed.residual, vec!["add", "--not-a-flag", "text"]);
        assert!(parsed.flags.set_flags().is_empty());
    }

    #[test]
    fn negative_shift_as_value() {
        let parsed = parse(&["add", "--due", "-1d", "x"]).unwrap();
        assert_eq!(
            parsed.flags.due.get(),
            Some(&NaiveDate::from_ymd_opt(2025, 1, 15).unwrap())
        );
    }

    #[test]
    fn reading_unset_flag_is_internal_error() {
        let flags = Flags::new();
        assert_eq!(flags.due.value(), Err(UnsetFlag { flag: "due" }));
    }

    #[test]
    fn filter_sees_positions_within_its_input() {
        let tasks: Vec<Task> = (0..5).map(|i| Task::new(i, format!("t{i}"))).collect();
        let mut flags = Flags::new();
        flags.skip.set(1);
        flags.limit.set(2);

        let skipped = flags.skip.filter(tasks.iter().collect()).unwrap();
        let limited = flags.limit.filter(skipped).unwrap();
        let ids: Vec<_> = limited.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
