//! Command implementations
//!
//! Actions run after validation. Pipeline actions receive the selected IDs
//! in display order and change `Invocation::tasks` in memory; the caller
//! saves the list once, after the action returned successfully.

use anyhow::{Context, Result};
use chrono::NaiveDate;

use super::commands::{Command, COMMANDS};
use super::error::{NameKind, UsageError};
use super::flags::{FlagId, Flags};
use super::output::Output;
use super::prompt;
use super::render;
use crate::domain::{self, resolve, SortOrder, Task};
use crate::storage::{Project, Settings};

/// Everything one command invocation works with
pub struct Invocation<'a> {
    pub command: &'static Command,
    pub flags: &'a Flags,
    /// Free-text arguments after the command name
    pub args: &'a [String],
    pub tasks: Vec<Task>,
    pub project: &'a mut Project,
    pub output: &'a Output,
    pub today: NaiveDate,
    /// Set when `tasks` has to be written back
    pub dirty: bool,
}

impl Invocation<'_> {
    pub fn settings(&self) -> &Settings {
        &self.project.config().settings
    }

    /// `--orderby` if given, else the configured default
    pub fn sort_order(&self) -> SortOrder {
        self.flags
            .orderby
            .get()
            .cloned()
            .unwrap_or_else(|| self.settings().sort_order())
    }

    fn text(&self) -> String {
        self.args.join(" ").trim().to_string()
    }

    fn position(&self, id: u32) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    /// Asks for confirmation in interactive mode; always true otherwise
    fn confirm(&self, verb: &str, task: &Task) -> Result<bool> {
        if !self.flags.is_interactive() {
            return Ok(true);
        }
        prompt::confirm(&format!("{} task {} '{}'?", verb, task.id, task.description))
    }

    /// Applies `change` to every selected task the user agrees to
    fn apply(&mut self, ids: &[u32], verb: &str, change: impl Fn(&mut Task)) -> Result<Vec<u32>> {
        let mut changed = Vec::new();
        for &id in ids {
            let Some(index) = self.position(id) else {
                continue;
            };
            if !self.confirm(verb, &self.tasks[index])? {
                self.output.verbose_ctx(self.command.name(), &format!("skipped task {}", id));
                continue;
            }
            change(&mut self.tasks[index]);
            changed.push(id);
        }
        if !changed.is_empty() {
            self.dirty = true;
        }
        Ok(changed)
    }

    fn report(&self, past: &str, ids: &[u32]) {
        if self.output.is_json() {
            self.output.data(&serde_json::json!({
                "command": self.command.name(),
                "ids": ids,
            }));
            return;
        }

        match ids {
            [] => self.output.info(&format!("No tasks {}.", past)),
            [id] => {
                let description = self
                    .tasks
                    .iter()
                    .find(|t| t.id == *id)
                    .map(|t| t.description.as_str())
                    .unwrap_or_default();
                self.output
                    .success(&format!("{} task {}: {}", capitalize(past), id, description));
            }
            _ => self
                .output
                .success(&format!("{} {} tasks", capitalize(past), ids.len())),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn add(inv: &mut Invocation<'_>) -> Result<()> {
    let description = inv.text();
    if description.is_empty() {
        return Err(UsageError::MissingDescription {
            command: inv.command.name().to_string(),
        }
        .into());
    }

    let mut task = Task::new(domain::next_id(&inv.tasks)?, description)
        .with_priority(inv.flags.priority.get().copied().unwrap_or_default());
    if let Some(due) = inv.flags.due.get() {
        task = task.with_due(*due);
    }

    if inv.output.is_json() {
        inv.output.data(&task);
    } else {
        inv.output
            .success(&format!("Added task {}: {}", task.id, task.description));
    }

    inv.tasks.push(task);
    inv.dirty = true;
    Ok(())
}

pub fn list(inv: &mut Invocation<'_>, ids: &[u32]) -> Result<()> {
    let selected: Vec<&Task> = ids
        .iter()
        .filter_map(|id| inv.tasks.iter().find(|t| t.id == *id))
        .collect();

    render::tasks(inv.output, &selected, inv.settings(), inv.today);
    Ok(())
}

/// Rejects `update` invocations that cannot change anything
pub fn check_update(flags: &Flags, args: &[String]) -> Result<(), UsageError> {
    let clear_due = flags.no_due.get() == Some(&true);
    if flags.due.get().is_some() && clear_due {
        return Err(UsageError::InvalidFlagValue {
            flag: FlagId::NoDue.name().to_string(),
            value: "true".to_string(),
            reason: "cannot be combined with --due".to_string(),
        });
    }

    let has_text = !args.join(" ").trim().is_empty();
    if !has_text && flags.set_priority.get().is_none() && flags.due.get().is_none() && !clear_due {
        return Err(UsageError::NothingToUpdate);
    }
    Ok(())
}

pub fn update(inv: &mut Invocation<'_>, ids: &[u32]) -> Result<()> {
    let flags = inv.flags;
    let description = Some(inv.text()).filter(|text| !text.is_empty());
    let priority = flags.set_priority.get().copied();
    let due = flags.due.get().copied();
    let clear_due = flags.no_due.get() == Some(&true);

    let changed = inv.apply(ids, "Update", |task| {
        if let Some(description) = &description {
            task.description = description.clone();
        }
        if let Some(priority) = priority {
            task.priority = priority;
        }
        if let Some(due) = due {
            task.due = Some(due);
        }
        if clear_due {
            task.due = None;
        }
    })?;

    inv.report("updated", &changed);
    Ok(())
}

pub fn finish(inv: &mut Invocation<'_>, ids: &[u32]) -> Result<()> {
    let changed = inv.apply(ids, "Finish", Task::finish)?;
    inv.report("finished", &changed);
    Ok(())
}

pub fn reopen(inv: &mut Invocation<'_>, ids: &[u32]) -> Result<()> {
    let changed = inv.apply(ids, "Reopen", Task::reopen)?;
    inv.report("reopened", &changed);
    Ok(())
}

pub fn postpone(inv: &mut Invocation<'_>, ids: &[u32]) -> Result<()> {
    let due = *inv.flags.due.value()?;
    let changed = inv.apply(ids, "Postpone", |task| task.due = Some(due))?;
    inv.report("postponed", &changed);
    Ok(())
}

pub fn delete(inv: &mut Invocation<'_>, ids: &[u32]) -> Result<()> {
    let mut removed = Vec::new();
    for &id in ids {
        let Some(index) = inv.position(id) else {
            continue;
        };
        if inv.confirm("Delete", &inv.tasks[index])? {
            removed.push(id);
        }
    }

    // Report before IDs shift
    inv.report("deleted", &removed);

    if !removed.is_empty() {
        domain::remove_and_shift(&mut inv.tasks, &removed);
        inv.dirty = true;
    }
    Ok(())
}

pub fn renumber(inv: &mut Invocation<'_>) -> Result<()> {
    let order = inv.sort_order();
    order.sort(&mut inv.tasks);
    domain::renumber(&mut inv.tasks);
    inv.dirty = true;

    inv.output.success(&format!(
        "Renumbered {} task(s) by {}",
        inv.tasks.len(),
        order
    ));
    Ok(())
}

pub fn config(inv: &mut Invocation<'_>) -> Result<()> {
    match inv.args {
        [] => {
            let settings = inv.settings();
            if inv.output.is_json() {
                inv.output.data(settings);
            } else {
                for key in Settings::KEYS {
                    println!("{} = {}", key, settings.get(key)?);
                }
            }
        }
        [key] => {
            let value = inv.settings().get(key)?;
            if inv.output.is_json() {
                inv.output.data(&serde_json::json!({ "key": key, "value": value }));
            } else {
                println!("{}", value);
            }
        }
        [key, value @ ..] => {
            let value = value.join(" ");
            let config = inv.project.config_mut();
            config.settings.set(key, &value)?;
            config.save()?;
            inv.output.success(&format!("Set {} = {}", key, value));
        }
    }
    Ok(())
}

pub fn help(inv: &mut Invocation<'_>) -> Result<()> {
    match inv.args.first() {
        None => render::command_overview(inv.output, &COMMANDS),
        Some(name) => {
            let resolved = resolve(name, &COMMANDS)
                .map_err(|e| UsageError::from_match(NameKind::Command, e))?;
            render::command_details(inv.output, resolved.entry);
        }
    }
    Ok(())
}

pub fn init(inv: &mut Invocation<'_>) -> Result<()> {
    let root = inv.args.first().map(String::as_str).unwrap_or(".");
    inv.output
        .verbose_ctx("init", &format!("Initializing home in: {}", root));

    let project = Project::init(root)
        .with_context(|| format!("Failed to initialize tick home in {}", root))?;
    inv.output.success(&format!(
        "Initialized tick home at {}",
        project.home().display()
    ));
    Ok(())
}
