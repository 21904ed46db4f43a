//! Home directory discovery
//!
//! A home is the directory holding `tasks.jsonl` and `config.toml`. It is,
//! in order of preference: the explicit `--home`/`TICK_HOME` directory, the
//! `.tick/` directory of the current directory or a parent, or the user's
//! data directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use thiserror::Error;

use super::{Config, TaskStore};

/// Name of the per-project home directory
pub const HOME_DIR: &str = ".tick";

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Could not determine a data directory; pass --home or set TICK_HOME")]
    NoDataDir,
}

/// A resolved tick home
pub struct Project {
    home: PathBuf,
    config: Config,
}

impl Project {
    /// Opens the home at the given directory (created lazily on save)
    pub fn open(home: impl Into<PathBuf>) -> Result<Self> {
        let home = home.into();
        let config = Config::load(&home)?;

        Ok(Self { home, config })
    }

    /// Opens the explicit home, or discovers one from the current directory
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(home) = explicit {
            return Self::open(home);
        }

        if let Some(home) = Self::find_project_home() {
            return Self::open(home);
        }

        let dirs = ProjectDirs::from("dev", "tick", "tick-cli").ok_or(ProjectError::NoDataDir)?;
        Self::open(dirs.data_dir())
    }

    /// Finds the nearest `.tick/` directory from the current directory up
    pub fn find_project_home() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;

        loop {
            let home = current.join(HOME_DIR);
            if home.is_dir() {
                return Some(home);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    /// Initializes a project home at `<root>/.tick`
    pub fn init(root: impl AsRef<Path>) -> Result<Self> {
        let home = root.as_ref().join(HOME_DIR);

        fs::create_dir_all(&home)
            .with_context(|| format!("Failed to create {} directory: {}", HOME_DIR, home.display()))?;

        let project = Self::open(&home)?;
        if !project.config.path().exists() {
            project.config.save()?;
        }

        Ok(project)
    }

    /// Returns the home directory path
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns a mutable reference to the configuration
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Returns the task store
    pub fn task_store(&self) -> TaskStore {
        TaskStore::in_home(&self.home)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn init_creates_home_with_config() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        assert!(project.home().is_dir());
        assert!(project.home().join("config.toml").is_file());
        assert!(project.home().ends_with(HOME_DIR));
    }

    #[test]
    fn init_is_idempotent() {
        let dir = TempDir::new().unwrap();

        Project::init(dir.path()).unwrap();
        Project::init(dir.path()).unwrap();

        assert!(dir.path().join(HOME_DIR).is_dir());
    }

    #[test]
    fn explicit_home_wins() {
        let dir = TempDir::new().unwrap();
        let project = Project::discover(Some(dir.path())).unwrap();

        assert_eq!(project.home(), dir.path());
        assert!(project.task_store().path().ends_with("tasks.jsonl"));
    }
}
