//! Main CLI application structure
//!
//! clap handles the global options in front of the command. Everything from
//! the command name on is interpreted by [`execute`]:
//!
//! 1. flags are parsed out of the tokens, leaving the residual tokens
//! 2. the first residual token resolves to a [`Command`]
//! 3. the command validates the flags and free text
//! 4. pipeline commands sort and filter the list, then act on the selection
//! 5. a changed list is saved once, as a whole

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;

use super::actions::Invocation;
use super::commands::{Action, Command, COMMANDS};
use super::error::{NameKind, UsageError};
use super::filter;
use super::flags::{parse_args, ParseContext};
use super::output::{Output, OutputFormat};
use crate::domain::{self, resolve, Task};
use crate::storage::Project;

#[derive(Parser)]
#[command(name = "tick")]
#[command(author, version, about = "Abbreviation-friendly command-line task manager")]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Directory holding tasks.jsonl and config.toml
    #[arg(long, env = "TICK_HOME")]
    pub home: Option<PathBuf>,

    /// Command, flags and text, e.g. `add --due tomorrow Buy milk`
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, num_args = 0..)]
    pub args: Vec<String>,
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(cli.format, cli.verbose);

    output.verbose("tick starting");

    let mut project = Project::discover(cli.home.as_deref())?;
    output.verbose_ctx("home", &project.home().display().to_string());

    let today = Local::now().date_naive();
    execute(&cli.args, &mut project, &output, today)?;

    output.verbose("Command completed successfully");
    Ok(())
}

/// Interprets one command line against a project
pub fn execute(args: &[String], project: &mut Project, output: &Output, today: NaiveDate) -> Result<()> {
    let ctx = ParseContext { today };
    let parsed = parse_args(args, &ctx, output)?;

    let (name, text) = parsed
        .residual
        .split_first()
        .ok_or(UsageError::MissingCommand)?;

    let resolved =
        resolve(name, &COMMANDS).map_err(|e| UsageError::from_match(NameKind::Command, e))?;
    let command: &'static Command = resolved.entry;
    if resolved.abbreviated {
        output.verbose_ctx(
            "match",
            &format!("assuming '{}' for '{}'", resolved.spelling, name),
        );
    }

    command.validate(&parsed.flags, text)?;

    let store = project.task_store();
    let tasks = store.load()?;
    output.verbose_ctx("load", &format!("{} task(s) from {}", tasks.len(), store.path().display()));

    let mut inv = Invocation {
        command,
        flags: &parsed.flags,
        args: text,
        tasks,
        project,
        output,
        today,
        dirty: false,
    };

    match command.action {
        Action::Standalone(action) => action(&mut inv),
        Action::Pipeline(action) => run_pipeline(&mut inv, action),
    }
    .with_context(|| format!("while running '{}'", command.name()))?;

    if inv.dirty {
        save(inv.tasks, inv.project, output)?;
    }

    Ok(())
}

fn run_pipeline(
    inv: &mut Invocation<'_>,
    action: fn(&mut Invocation<'_>, &[u32]) -> Result<()>,
) -> Result<()> {
    let order = inv.sort_order();
    order.sort(&mut inv.tasks);
    inv.output.verbose_ctx("sort", &order.to_string());

    let selected: Vec<u32> = filter::compose(inv.flags, &inv.tasks, inv.output)?
        .iter()
        .map(|task| task.id)
        .collect();

    if selected.is_empty() {
        inv.output.info("No tasks match.");
        return Ok(());
    }

    action(inv, &selected)
}

/// Writes the list in the configured order, renumbering if configured
fn save(mut tasks: Vec<Task>, project: &Project, output: &Output) -> Result<()> {
    let settings = &project.config().settings;
    settings.sort_order().sort(&mut tasks);
    if settings.renumber_on_save {
        domain::renumber(&mut tasks);
    }

    let store = project.task_store();
    store.save(&tasks)?;
    output.verbose_ctx("save", &format!("{} task(s) to {}", tasks.len(), store.path().display()));
    Ok(())
}
