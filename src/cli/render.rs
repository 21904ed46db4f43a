//! Text and JSON rendering of tasks and help

use std::fmt::Write;

use chrono::NaiveDate;

use super::commands::Command;
use super::flags::FlagId;
use super::output::Output;
use crate::domain::Task;
use crate::storage::Settings;

/// Formats a date, falling back to ISO for a broken pattern
fn format_date(date: NaiveDate, pattern: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", date.format(pattern)).is_err() {
        return date.to_string();
    }
    out
}

/// One table row for a task
pub fn task_row(task: &Task, settings: &Settings, today: NaiveDate) -> String {
    let due = task
        .due
        .map(|d| format_date(d, &settings.date_format))
        .unwrap_or_default();
    let overdue = if task.is_overdue(today) { "*" } else { "" };

    format!(
        "{:<5} {:<3} {:<4} {:<12} {}",
        task.id,
        task.priority.marker(),
        if task.finished { "x" } else { "" },
        format!("{}{}", due, overdue),
        task.description
    )
}

/// Renders a task selection
pub fn tasks(output: &Output, tasks: &[&Task], settings: &Settings, today: NaiveDate) {
    if output.is_json() {
        output.data(&tasks);
        return;
    }

    println!("{:<5} {:<3} {:<4} {:<12} DESCRIPTION", "ID", "PRI", "DONE", "DUE");
    println!("{}", "-".repeat(60));
    for task in tasks {
        println!("{}", task_row(task, settings, today));
    }
}

/// Lists every command with its aliases
pub fn command_overview(output: &Output, commands: &[Command]) {
    if output.is_json() {
        let items: Vec<_> = commands
            .iter()
            .map(|c| {
                serde_json::json!({
                    "name": c.name(),
                    "aliases": c.prototype.aliases().collect::<Vec<_>>(),
                    "description": c.description,
                })
            })
            .collect();
        output.data(&items);
        return;
    }

    println!("Usage: tick [--home DIR] [--format text|json] [-v] <command> [--flag[=value]]... [text]");
    println!();
    println!("Commands (any unambiguous prefix works):");
    for command in commands {
        println!("  {:<28} {}", command.prototype.to_string(), command.description);
    }
    println!();
    println!("Run 'tick help <command>' for the flags of a command.");
}

fn flag_usage(flag: FlagId) -> String {
    match flag.value_hint() {
        Some(hint) => format!("--{} {}", flag.name(), hint),
        None => format!("--{}", flag.name()),
    }
}

/// Shows one command with its supported and required flags
pub fn command_details(output: &Output, command: &Command) {
    if output.is_json() {
        let names = |flags: &[FlagId]| flags.iter().map(|f| f.name()).collect::<Vec<_>>();
        output.data(&serde_json::json!({
            "name": command.name(),
            "aliases": command.prototype.aliases().collect::<Vec<_>>(),
            "description": command.description,
            "supports": names(command.supports),
            "requires": names(command.requires),
            "needs_scope": command.explicit_scope,
        }));
        return;
    }

    println!("{} ({})", command.name(), command.prototype);
    println!("  {}", command.description);
    if command.explicit_scope {
        println!("  Needs a filter flag or --all.");
    }

    for (title, flags) in [("Required", command.requires), ("Flags", command.supports)] {
        if flags.is_empty() {
            continue;
        }
        println!();
        println!("{}:", title);
        for flag in flags {
            println!("  {:<24} {}", flag_usage(*flag), flag.description());
        }
    }
}
