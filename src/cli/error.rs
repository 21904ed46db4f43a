//! Errors raised while interpreting a command line

use thiserror::Error;

use crate::domain::{DueDateError, IdError, MatchError, SortError};

/// What kind of name failed to resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Command,
    Flag,
}

impl std::fmt::Display for NameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            NameKind::Command => "command",
            NameKind::Flag => "flag",
        })
    }
}

fn did_you_mean(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (did you mean {}?)", quoted(suggestions).join(" or "))
    }
}

fn quoted(names: &[String]) -> Vec<String> {
    names.iter().map(|n| format!("'{n}'")).collect()
}

/// User-facing interpretation failures; none of them touch the task list
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UsageError {
    #[error("Unknown {kind} '{name}'{}", did_you_mean(suggestions))]
    UnknownName {
        kind: NameKind,
        name: String,
        suggestions: Vec<String>,
    },

    #[error("Ambiguous {kind} '{name}', could be: {}", candidates.join(", "))]
    AmbiguousName {
        kind: NameKind,
        name: String,
        candidates: Vec<String>,
    },

    #[error("Flag '--{flag}' is not supported by command '{command}'")]
    UnsupportedFlagForCommand { flag: String, command: String },

    #[error("Command '{command}' requires flag '--{flag}'")]
    MissingRequiredFlag { flag: String, command: String },

    #[error("Flag '--{flag}' cannot be combined with '--all' in command '{command}'")]
    FilterConflictsWithApplyAll { flag: String, command: String },

    #[error("Command '{command}' needs a filter (e.g. --id) or '--all' to apply to every task")]
    NoExplicitFilterAndNotApplyAll { command: String },

    #[error("Unknown boolean value '{value}' for '--{flag}' (use yes/no, true/false, on/off)")]
    UnknownBooleanValue { flag: String, value: String },

    #[error("Unknown priority level '{value}' for '--{flag}' (use normal, important or critical)")]
    UnknownPriorityLevel { flag: String, value: String },

    #[error("Flag '--{flag}' needs a value")]
    MissingFlagValue { flag: String },

    #[error("Invalid value '{value}' for '--{flag}': {reason}")]
    InvalidFlagValue {
        flag: String,
        value: String,
        reason: String,
    },

    #[error("No command given (try 'help')")]
    MissingCommand,

    #[error("Command '{command}' needs a task description")]
    MissingDescription { command: String },

    #[error("Nothing to change: give a new description, --set-priority, --due or --no-due")]
    NothingToUpdate,

    #[error("Unexpected argument '{argument}' for command '{command}'")]
    UnexpectedArgument { argument: String, command: String },

    #[error(transparent)]
    Id(#[from] IdError),

    #[error(transparent)]
    Sort(#[from] SortError),

    #[error(transparent)]
    DueDate(#[from] DueDateError),
}

impl UsageError {
    /// Wraps a matcher failure for the given kind of name
    pub fn from_match(kind: NameKind, err: MatchError) -> Self {
        match err {
            MatchError::Unknown { token, suggestions } => UsageError::UnknownName {
                kind,
                name: token,
                suggestions,
            },
            MatchError::Ambiguous { token, candidates } => UsageError::AmbiguousName {
                kind,
                name: token,
                candidates,
            },
        }
    }
}

/// A flag's value was read although the flag was never set
///
/// This is a bug in a command implementation, not bad input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("flag '--{flag}' was read before it was set")]
pub struct UnsetFlag {
    pub flag: &'static str,
}
