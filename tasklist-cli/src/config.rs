//! User configuration, stored with confy under the `tasklist` app name

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CliError, Result};

pub const APP_NAME: &str = "tasklist";

/// Settings read from the confy configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The task list opened when no `--file` is given
    pub task_file: PathBuf,
    /// File name of the archive for completed tasks, next to the task file
    pub archive_file: String,
    /// Stamp today's date on added tasks that carry no creation date
    pub add_creation_date: bool,
}

impl Default for Config {
    fn default() -> Self {
        let task_file = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_NAME)
            .join("todo.txt");

        Self {
            task_file,
            archive_file: "done.txt".to_string(),
            add_creation_date: true,
        }
    }
}

impl Config {
    /// Load the configuration, writing defaults on first use
    pub fn load() -> Result<Self> {
        let cfg: Config = confy::load(APP_NAME, None)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        let name = Path::new(&self.archive_file);
        if self.archive_file.trim().is_empty() || name.file_name() != Some(name.as_os_str()) {
            return Err(CliError::config(format!(
                "archive_file must be a plain file name, got '{}'",
                self.archive_file
            )));
        }
        Ok(())
    }

    /// Archive path for a task file: the archive name in the same directory
    pub fn archive_path(&self, task_file: &Path) -> PathBuf {
        match task_file.parent() {
            Some(dir) => dir.join(&self.archive_file),
            None => PathBuf::from(&self.archive_file),
        }
    }
}
