//! Configuration loader with multi-source merging.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::{Paths, TopologyConfig};

/// Configuration loader with builder-pattern source selection.
pub struct ConfigLoader {
    project_dir: PathBuf,
    env_prefix: String,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Loader rooted at the current working directory, `RINGCTL_*` env prefix.
    pub fn new() -> Self {
        Self {
            project_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            env_prefix: "RINGCTL".to_string(),
        }
    }

    #[must_use]
    pub fn with_project_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.project_dir = dir.as_ref().to_path_buf();
        self
    }

    #[must_use]
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Loads configuration from all sources with the precedence
    /// documented on [`TopologyConfig`].
    pub fn load(self) -> Result<TopologyConfig> {
        let mut builder = config::Config::builder();

        let defaults = TopologyConfig::default();
        builder = builder.add_source(config::Config::try_from(&defaults)?);

        let paths = Paths::new();
        if let Ok(user_config_file) = paths.user_config_file() {
            if user_config_file.exists() {
                builder = builder.add_source(
                    config::File::from(user_config_file)
                        .required(false)
                        .format(config::FileFormat::Toml),
                );
            }
        }

        let project_config_file = Paths::project_config_file(&self.project_dir);
        if project_config_file.exists() {
            builder = builder.add_source(
                config::File::from(project_config_file)
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        let local_config_file = Paths::local_config_file(&self.project_dir);
        if local_config_file.exists() {
            builder = builder.add_source(
                config::File::from(local_config_file)
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        builder = builder.add_source(
            config::Environment::with_prefix(&self.env_prefix)
                .separator("_")
                .try_parsing(true),
        );

        let built = builder.build().context("failed to build configuration")?;
        let cfg: TopologyConfig = built
            .try_deserialize()
            .context("failed to deserialize configuration")?;
        Ok(cfg)
    }
}
