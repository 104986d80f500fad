//! `[collections]` section configuration.
//!
//! Collections declared here are built from configuration instead of tags,
//! and are ordered against the `[keys]` stage.
//!
//! # Example
//!
//! ```toml
//! [collections]
//! config = ["featured", "drafts"]
//! ```

use serde::{Deserialize, Serialize};

use crate::graph::{Stage, is_bracketed};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionsConfig {
    /// Configuration-registered collection names.
    pub config: Vec<String>,
}

impl CollectionsConfig {
    pub fn validate(&self, errors: &mut Vec<String>) {
        for name in &self.config {
            if name.trim().is_empty() {
                errors.push("[collections.config] names must not be empty".to_string());
            } else if is_bracketed(name) || Stage::from_name(name).is_some() {
                errors.push(format!(
                    "[collections.config] `{name}` is reserved for build stages"
                ));
            }
        }
    }
}
