//! Project manifest (`graph.toml`).
//!
//! Describes what the renderer discovered about each template: the files it
//! includes, the collections it reads and publishes into, and the resolved
//! layout chains.
//!
//! # Example
//!
//! ```toml
//! [[template]]
//! path = "posts/a.md"
//! uses = ["_includes/card.njk"]
//! publishes = ["posts"]
//!
//! [[template]]
//! path = "feed.njk"
//! consumes = ["posts"]
//!
//! [layouts]
//! "_includes/base.njk" = ["posts/a.md", "feed.njk"]
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::config::ConfigError;
use crate::graph::LayoutMap;

/// One discovered template.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateEntry {
    pub path: String,

    /// Included files. Kept untyped so a malformed list surfaces as a graph error.
    #[serde(default = "empty_list")]
    pub uses: Value,

    #[serde(default)]
    pub consumes: Vec<String>,

    #[serde(default)]
    pub publishes: Vec<String>,
}

/// Everything the graphs are built from.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default, rename = "template")]
    pub templates: Vec<TemplateEntry>,

    /// `layout → [templates using it]`
    #[serde(default)]
    pub layouts: LayoutMap,
}

fn empty_list() -> Value {
    Value::Array(Vec::new())
}

impl Manifest {
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::parse(&content)
    }

    /// Paths of every template, in manifest order.
    pub fn template_paths(&self) -> impl Iterator<Item = &str> {
        self.templates.iter().map(|t| t.path.as_str())
    }
}
