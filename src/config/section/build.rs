//! `[build]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [build]
//! manifest = "graph.toml"             # Project manifest (relative to root)
//! cache = ".sitegraph/cache"          # Dependency map cache directory
//! config_files = ["sitegraph.toml"]   # Changes here force a full rebuild
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::cache::CACHE_DIR;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Project manifest path.
    pub manifest: PathBuf,

    /// Cache directory, relative to the project root.
    pub cache: PathBuf,

    /// Files whose change invalidates every graph.
    pub config_files: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            manifest: "graph.toml".into(),
            cache: CACHE_DIR.into(),
            config_files: vec!["sitegraph.toml".into()],
        }
    }
}

impl BuildConfig {
    pub fn validate(&self, errors: &mut Vec<String>) {
        if self.cache.as_os_str().is_empty() || self.cache.is_absolute() {
            errors.push(format!(
                "[build.cache] must be a relative path, got `{}`",
                self.cache.display()
            ));
        }
        if self.manifest.as_os_str().is_empty() {
            errors.push("[build.manifest] must not be empty".to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_build_config_defaults() {
        let config = test_parse_config("");

        assert_eq!(config.build.manifest.to_str(), Some("graph.toml"));
        assert_eq!(config.build.cache.to_str(), Some(".sitegraph/cache"));
        assert_eq!(config.build.config_files, ["sitegraph.toml"]);
    }

    #[test]
    fn test_build_config_custom() {
        let config = test_parse_config(
            "[build]\nmanifest = \"out/graph.toml\"\ncache = \"tmp\"\nconfig_files = [\"site.json\"]",
        );

        assert_eq!(config.build.manifest.to_str(), Some("out/graph.toml"));
        assert_eq!(config.build.cache.to_str(), Some("tmp"));
        assert_eq!(config.build.config_files, ["site.json"]);
    }

    #[test]
    fn test_build_config_absolute_cache_rejected() {
        let config = test_parse_config("[build]\ncache = \"/var/cache\"");
        let mut errors = Vec::new();
        config.build.validate(&mut errors);

        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("build.cache"));
    }
}
