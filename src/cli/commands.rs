//! Command registry
//!
//! Commands are declared once in [`COMMANDS`]. Each one lists the flags it
//! supports and requires; [`Command::validate`] checks an invocation against
//! that list before anything is loaded or changed.

use anyhow::Result;

use super::actions::{self, Invocation};
use super::error::UsageError;
use super::flags::{FlagId, Flags};
use crate::domain::{Prototype, Prototyped};

/// What a command does once validated
#[derive(Clone, Copy)]
pub enum Action {
    /// Runs without a task selection
    Standalone(fn(&mut Invocation<'_>) -> Result<()>),
    /// Runs on the IDs left after sorting and filtering
    Pipeline(fn(&mut Invocation<'_>, &[u32]) -> Result<()>),
}

/// A named operation
pub struct Command {
    pub prototype: Prototype,
    pub description: &'static str,
    /// Must be told `--all` or given a filter before touching tasks
    pub explicit_scope: bool,
    /// Whether free-text arguments are accepted
    pub free_text: bool,
    pub supports: &'static [FlagId],
    pub requires: &'static [FlagId],
    /// Command-specific checks on flags and free text
    pub check: Option<fn(&Flags, &[String]) -> Result<(), UsageError>>,
    pub action: Action,
}

impl Prototyped for Command {
    fn prototype(&self) -> Prototype {
        self.prototype
    }
}

impl Command {
    pub fn name(&self) -> &'static str {
        self.prototype.canonical()
    }

    pub fn is_pipeline(&self) -> bool {
        matches!(self.action, Action::Pipeline(_))
    }

    /// True if `flag` may be given to this command
    pub fn accepts(&self, flag: FlagId) -> bool {
        self.supports.contains(&flag) || self.requires.contains(&flag)
    }

    /// Checks flags and arguments; runs before any task is touched
    pub fn validate(&self, flags: &Flags, args: &[String]) -> Result<(), UsageError> {
        let command = self.name().to_string();
        let set = flags.set_flags();

        if let Some(flag) = set.iter().find(|flag| !self.accepts(**flag)) {
            return Err(UsageError::UnsupportedFlagForCommand {
                flag: flag.name().to_string(),
                command,
            });
        }

        if let Some(flag) = self.requires.iter().find(|flag| !set.contains(flag)) {
            return Err(UsageError::MissingRequiredFlag {
                flag: flag.name().to_string(),
                command,
            });
        }

        if set.contains(&FlagId::All) {
            if let Some(flag) = set.iter().find(|flag| flag.is_filter()) {
                return Err(UsageError::FilterConflictsWithApplyAll {
                    flag: flag.name().to_string(),
                    command,
                });
            }
        }

        if self.explicit_scope
            && !flags.apply_to_all()
            && !set.iter().any(|flag| flag.is_filter())
        {
            return Err(UsageError::NoExplicitFilterAndNotApplyAll { command });
        }

        if !self.free_text {
            if let Some(argument) = args.first() {
                return Err(UsageError::UnexpectedArgument {
                    argument: argument.clone(),
                    command,
                });
            }
        }

        match self.check {
            Some(check) => check(flags, args),
            None => Ok(()),
        }
    }
}

use FlagId::*;

const SELECTION: &[FlagId] = &[Id, Pending, Finished, Priority, Match, Before, Skip, Limit, All, OrderBy];

/// Every command, in help order
pub static COMMANDS: [Command; 11] = [
    Command {
        prototype: Prototype::new("add|new|create"),
        description: "Add a task; the remaining words are its description",
        explicit_scope: false,
        free_text: true,
        supports: &[Priority, Due],
        requires: &[],
        check: None,
        action: Action::Standalone(actions::add),
    },
    Command {
        prototype: Prototype::new("list|ls|show|display"),
        description: "List tasks",
        explicit_scope: false,
        free_text: false,
        supports: SELECTION,
        requires: &[],
        check: None,
        action: Action::Pipeline(actions::list),
    },
    Command {
        prototype: Prototype::new("update|edit|modify"),
        description: "Change description, priority or due date of tasks",
        explicit_scope: true,
        free_text: true,
        supports: &[
            Id, Pending, Finished, Priority, Match, Before, Skip, Limit, All, OrderBy, SetPriority,
            Due, NoDue, Interactive,
        ],
        requires: &[],
        check: Some(actions::check_update),
        action: Action::Pipeline(actions::update),
    },
    Command {
        prototype: Prototype::new("finish|complete|accomplish"),
        description: "Mark tasks as finished",
        explicit_scope: true,
        free_text: false,
        supports: &[
            Id, Pending, Finished, Priority, Match, Before, Skip, Limit, All, OrderBy, Interactive,
        ],
        requires: &[],
        check: None,
        action: Action::Pipeline(actions::finish),
    },
    Command {
        prototype: Prototype::new("reopen|unfinish"),
        description: "Mark tasks as not finished",
        explicit_scope: true,
        free_text: false,
        supports: &[
            Id, Pending, Finished, Priority, Match, Before, Skip, Limit, All, OrderBy, Interactive,
        ],
        requires: &[],
        check: None,
        action: Action::Pipeline(actions::reopen),
    },
    Command {
        prototype: Prototype::new("postpone|defer|reschedule"),
        description: "Set the due date of tasks",
        explicit_scope: true,
        free_text: false,
        supports: &[
            Id, Pending, Finished, Priority, Match, Before, Skip, Limit, All, OrderBy, Interactive,
        ],
        requires: &[Due],
        check: None,
        action: Action::Pipeline(actions::postpone),
    },
    Command {
        prototype: Prototype::new("delete|remove|rm"),
        description: "Delete tasks; higher IDs move down",
        explicit_scope: true,
        free_text: false,
        supports: &[
            Id, Pending, Finished, Priority, Match, Before, Skip, Limit, All, OrderBy, Interactive,
        ],
        requires: &[],
        check: None,
        action: Action::Pipeline(actions::delete),
    },
    Command {
        prototype: Prototype::new("renumber|reindex"),
        description: "Reassign IDs 0..N-1 in sort order",
        explicit_scope: false,
        free_text: false,
        supports: &[OrderBy],
        requires: &[],
        check: None,
        action: Action::Standalone(actions::renumber),
    },
    Command {
        prototype: Prototype::new("config|settings"),
        description: "Show or change settings: config [key [value]]",
        explicit_scope: false,
        free_text: true,
        supports: &[],
        requires: &[],
        check: None,
        action: Action::Standalone(actions::config),
    },
    Command {
        prototype: Prototype::new("help|usage"),
        description: "Show commands, or the flags of one command",
        explicit_scope: false,
        free_text: true,
        supports: &[],
        requires: &[],
        check: None,
        action: Action::Standalone(actions::help),
    },
    Command {
        prototype: Prototype::new("init"),
        description: "Create a .tick home in a directory (default: current)",
        explicit_scope: false,
        free_text: true,
        supports: &[],
        requires: &[],
        check: None,
        action: Action::Standalone(actions::init),
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{resolve, TaskIds};

    fn command(name: &str) -> &'static Command {
        resolve(name, &COMMANDS).unwrap().entry
    }

    fn no_args() -> Vec<String> {
        Vec::new()
    }

    #[test]
    fn every_command_has_a_unique_canonical_name() {
        let mut names: Vec<_> = COMMANDS.iter().map(Command::name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), COMMANDS.len());
    }

    #[test]
    fn abbreviations_resolve() {
        assert_eq!(command("fin").name(), "finish");
        assert_eq!(command("accomplish").name(), "finish");
        assert_eq!(command("ls").name(), "list");
        assert_eq!(command("del").name(), "delete");
        assert_eq!(command("post").name(), "postpone");
    }

    #[test]
    fn shared_prefix_is_ambiguous() {
        assert!(resolve("re", &COMMANDS).is_err());
    }

    #[test]
    fn unsupported_flag_is_rejected() {
        let mut flags = Flags::new();
        flags.limit.set(3);
        let err = command("add").validate(&flags, &no_args()).unwrap_err();
        assert_eq!(
            err,
            UsageError::UnsupportedFlagForCommand {
                flag: "limit".to_string(),
                command: "add".to_string()
            }
        );
    }

    #[test]
    fn required_flag_must_be_set() {
        let mut flags = Flags::new();
        flags.all.set(true);
        let err = command("postpone").validate(&flags, &no_args()).unwrap_err();
        assert_eq!(
            err,
            UsageError::MissingRequiredFlag {
                flag: "due".to_string(),
                command: "postpone".to_string()
            }
        );
    }

    #[test]
    fn filter_with_all_conflicts() {
        let mut flags = Flags::new();
        flags.all.set(true);
        flags.pending.set(true);
        let err = command("delete").validate(&flags, &no_args()).unwrap_err();
        assert!(matches!(err, UsageError::FilterConflictsWithApplyAll { .. }));
    }

    #[test]
    fn destructive_commands_need_scope() {
        let flags = Flags::new();
        for name in ["delete", "finish", "reopen", "update"] {
            let err = command(name).validate(&flags, &no_args()).unwrap_err();
            assert!(
                matches!(err, UsageError::NoExplicitFilterAndNotApplyAll { .. }),
                "{name} should need a scope"
            );
        }
        assert!(command("list").validate(&flags, &no_args()).is_ok());
    }

    #[test]
    fn filter_or_all_gives_scope() {
        let mut flags = Flags::new();
        flags.id.set("0".parse::<TaskIds>().unwrap());
        assert!(command("delete").validate(&flags, &no_args()).is_ok());

        let mut flags = Flags::new();
        flags.all.set(true);
        assert!(command("delete").validate(&flags, &no_args()).is_ok());
    }

    #[test]
    fn all_switched_off_is_no_scope() {
        let mut flags = Flags::new();
        flags.all.set(false);
        let err = command("finish").validate(&flags, &no_args()).unwrap_err();
        assert!(matches!(err, UsageError::NoExplicitFilterAndNotApplyAll { .. }));
    }

    #[test]
    fn stray_text_is_rejected() {
        let flags = Flags::new();
        let args = vec!["oops".to_string()];
        assert!(matches!(
            command("list").validate(&flags, &args),
            Err(UsageError::UnexpectedArgument { .. })
        ));
    }

    #[test]
    fn update_checks_run_during_validation() {
        let mut flags = Flags::new();
        flags.id.set("99".parse::<TaskIds>().unwrap());
        assert_eq!(
            command("update").validate(&flags, &no_args()),
            Err(UsageError::NothingToUpdate)
        );

        flags.due.set(chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        flags.no_due.set(true);
        assert!(matches!(
            command("update").validate(&flags, &no_args()),
            Err(UsageError::InvalidFlagValue { .. })
        ));

        flags.no_due.set(false);
        assert!(command("update").validate(&flags, &no_args()).is_ok());
    }

    #[test]
    fn pipeline_marker() {
        assert!(command("list").is_pipeline());
        assert!(!command("add").is_pipeline());
    }
}
