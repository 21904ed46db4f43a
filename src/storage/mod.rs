//! # Storage Layer
//!
//! Persistence for the task list and configuration.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Tasks | JSONL (one JSON per line) | `<home>/tasks.jsonl` |
//! | Config | TOML | `<home>/config.toml` |
//!
//! The task list is always loaded and saved as a whole. Saves go through a
//! temp file and a rename, so the file on disk is either the old or the new
//! list, never a mix.

mod config;
mod jsonl;
mod project;

pub use config::{Config, ConfigError, Settings};
pub use jsonl::TaskStore;
pub use project::{Project, ProjectError, HOME_DIR};
