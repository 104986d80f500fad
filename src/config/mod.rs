//! Project configuration for `sitegraph.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # [build], [watch], [collections]
//! ├── error          # ConfigError
//! ├── util           # find_config_file
//! └── mod.rs         # GraphConfig (this file)
//! ```

mod error;
pub mod section;
mod util;

pub use error::ConfigError;
pub use section::{BuildConfig, CollectionsConfig, WatchConfig};
pub use util::find_config_file;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::{
    cli::{Cli, Commands},
    graph::relative_to,
    log,
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing sitegraph.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub watch: WatchConfig,

    #[serde(default)]
    pub collections: CollectionsConfig,
}

impl GraphConfig {
    /// Load configuration for a CLI invocation.
    ///
    /// Searches upward from cwd; the project root is the config file's parent.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let Some(config_path) = find_config_file(&cli.config, &cwd) else {
            bail!(
                "config file '{}' not found in {} or any parent directory",
                cli.config.display(),
                cwd.display()
            );
        };

        let mut config = Self::from_path(&config_path)?;
        config.root = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        config.config_path = config_path;
        config.apply_command_options(cli);
        config.validate()?;

        crate::debug!("config"; "loaded {}", config.config_path.display());
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring: {}", display_path, fields.join(", "));
    }

    /// Apply command-specific overrides.
    fn apply_command_options(&mut self, cli: &Cli) {
        match &cli.command {
            Commands::Affected { incremental, .. } | Commands::Watch { incremental } => {
                if *incremental {
                    self.watch.incremental = true;
                }
            }
            Commands::Order { .. } | Commands::Deps { .. } => {}
        }
    }

    /// Validate every section, reporting all problems at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();
        self.build.validate(&mut errors);
        self.watch.validate(&mut errors);
        self.collections.validate(&mut errors);
        ConfigError::from_messages(errors)
    }

    // ========================================================================
    // paths
    // ========================================================================

    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Join a path with the root directory.
    pub fn root_join(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root_join(&self.build.manifest)
    }

    pub fn cache_dir(&self) -> &Path {
        &self.build.cache
    }

    /// Graph keys of files whose change forces a full rebuild.
    ///
    /// Always includes the config file itself and the manifest.
    pub fn config_file_nodes(&self) -> Vec<String> {
        let mut nodes: Vec<String> = self
            .build
            .config_files
            .iter()
            .map(|f| relative_to(Path::new(f), &self.root))
            .collect();
        for path in [&self.config_path, &self.manifest_path()] {
            let node = relative_to(path, &self.root);
            if !node.is_empty() && !nodes.contains(&node) {
                nodes.push(node);
            }
        }
        nodes
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config, panicking on unknown fields (to catch typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> GraphConfig {
    let (parsed, ignored) = GraphConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================
