//! # Command-Line Interface
//!
//! Command interpretation, task selection and output formatting.
//!
//! ## Pipeline
//!
//! | Stage | Module | Purpose |
//! |-------|--------|---------|
//! | Parse | `flags` | Resolve flag names and parse typed values |
//! | Resolve | `commands` | Pick the command, check supported/required flags |
//! | Select | `filter` | Sort, then fold the list through the set filters |
//! | Act | `actions` | Change the selection in memory, then save once |
//!
//! ## Output Formats
//!
//! `--format text` (default) or `--format json`, given before the command:
//! ```bash
//! tick --format json ls --pending
//! ```
//!
//! ## Verbose Mode
//!
//! `--verbose` (or `-v`) reports abbreviation matches, filter stages and
//! file access on stderr.
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the command.

mod actions;
mod app;
mod commands;
mod error;
mod filter;
mod flags;
mod output;
mod prompt;
mod render;

pub use app::{execute, run, Cli};
pub use commands::{Command, COMMANDS};
pub use error::{NameKind, UnsetFlag, UsageError};
pub use flags::{FlagId, Flags};
pub use output::{Output, OutputFormat};
