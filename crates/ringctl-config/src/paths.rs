//! Path utilities and XDG directory discovery.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::ConfigError;

/// XDG-compliant paths for `ringctl`.
pub struct Paths {
    project_dirs: Option<ProjectDirs>,
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

impl Paths {
    pub fn new() -> Self {
        Self {
            project_dirs: ProjectDirs::from("com", "RingControl", "ringctl"),
        }
    }

    /// `~/.config/ringctl/`
    pub fn user_config_dir(&self) -> Result<PathBuf, ConfigError> {
        self.project_dirs
            .as_ref()
            .map(|p| p.config_dir().to_path_buf())
            .ok_or_else(|| ConfigError::XdgError("failed to determine user config directory".into()))
    }

    /// `~/.config/ringctl/config.toml`
    pub fn user_config_file(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.user_config_dir()?.join("config.toml"))
    }

    /// `<project_dir>/ringctl.toml`
    pub fn project_config_file(project_dir: impl AsRef<Path>) -> PathBuf {
        project_dir.as_ref().join("ringctl.toml")
    }

    /// `<project_dir>/ringctl.local.toml` — gitignored local overrides.
    pub fn local_config_file(project_dir: impl AsRef<Path>) -> PathBuf {
        project_dir.as_ref().join("ringctl.local.toml")
    }
}
