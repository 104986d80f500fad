//! Node key normalization.
//!
//! Every key that enters a graph passes through [`normalize_node`], so graph
//! identity does not depend on the platform or on how the caller spelled the
//! path:
//!
//! ```text
//! ./_includes/layout.njk   ─┐
//! _includes\layout.njk     ─┼─►  _includes/layout.njk
//! _includes//./layout.njk  ─┘
//! ```
//!
//! Collections live in the same key space behind [`COLLECTION_PREFIX`].

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::GraphError;

/// Reserved namespace for collection nodes.
pub const COLLECTION_PREFIX: &str = "__collection:";

/// What a graph node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Source template, include, or any other input file.
    File,
    /// A file resolved as a layout for the current build.
    Layout,
    /// A named collection (or a stage marker, which is a bracketed collection).
    Collection,
}

impl NodeKind {
    /// Kind implied by the key alone. Layouts are only known from layout maps.
    #[inline]
    pub fn of_key(key: &str) -> Self {
        if is_collection_key(key) {
            Self::Collection
        } else {
            Self::File
        }
    }
}

/// Canonicalize a path string into a graph key.
///
/// Strips `file://`, converts `\` to `/`, collapses empty and `.` segments,
/// resolves `..` where a preceding segment exists, and drops any leading `./`.
/// Absolute paths stay absolute. Collection keys are returned unchanged, since
/// a collection name is not a path. Idempotent.
///
/// # Examples
/// ```
/// use sitegraph::graph::normalize_node;
/// assert_eq!(normalize_node("./test.njk"), "test.njk");
/// assert_eq!(normalize_node("_includes\\layout.njk"), "_includes/layout.njk");
/// assert_eq!(normalize_node("a/b/../c.md"), "a/c.md");
/// ```
pub fn normalize_node(raw: &str) -> String {
    if is_collection_key(raw) {
        return raw.to_string();
    }
    let raw = raw.strip_prefix("file://").unwrap_or(raw);
    let unified = raw.replace('\\', "/");
    let absolute = unified.starts_with('/');

    let mut parts: Vec<&str> = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                // Cannot climb above the filesystem root
                _ if absolute => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    if absolute {
        format!("/{joined}")
    } else {
        joined
    }
}

/// Make an absolute path relative to `root`, then normalize it.
///
/// Paths outside `root` (or already relative) are only normalized.
pub fn relative_to(raw: &Path, root: &Path) -> String {
    let relative = raw.strip_prefix(root).unwrap_or(raw);
    normalize_node(&relative.to_string_lossy())
}

/// Watch-queue form of a path: relative paths always start with `./`.
///
/// # Examples
/// ```
/// use sitegraph::graph::add_leading_dot_slash;
/// assert_eq!(add_leading_dot_slash("test.md"), "./test.md");
/// assert_eq!(add_leading_dot_slash("./test.md"), "./test.md");
/// assert_eq!(add_leading_dot_slash(".."), "../");
/// ```
pub fn add_leading_dot_slash(raw: &str) -> String {
    if raw == "." || raw == ".." {
        return format!("{raw}/");
    }
    if raw.starts_with('/')
        || raw.starts_with("./")
        || raw.starts_with("../")
        || Path::new(raw).is_absolute()
    {
        return raw.to_string();
    }
    format!("./{raw}")
}

/// Convert a dynamically-typed value into a node key.
///
/// Strings pass through; numbers and booleans use their string form.
pub fn node_from_value(value: &Value) -> Result<String, GraphError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(GraphError::InvalidNodeType(other.to_string())),
    }
}

/// Key of the collection node for `name`.
#[inline]
pub fn collection_key(name: &str) -> String {
    format!("{COLLECTION_PREFIX}{name}")
}

/// Collection name behind a collection key.
#[inline]
pub fn collection_name(key: &str) -> Option<&str> {
    key.strip_prefix(COLLECTION_PREFIX)
}

#[inline]
pub fn is_collection_key(key: &str) -> bool {
    key.starts_with(COLLECTION_PREFIX)
}

/// Bracketed names such as `[keys]` are reserved for stage markers.
#[inline]
pub fn is_bracketed(name: &str) -> bool {
    name.len() >= 2 && name.starts_with('[') && name.ends_with(']')
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_strips_leading_dot_slash() {
        assert_eq!(normalize_node("./test.njk"), "test.njk");
        assert_eq!(normalize_node("test.njk"), "test.njk");
        assert_eq!(
            normalize_node("./_includes/include.njk"),
            "_includes/include.njk"
        );
    }

    #[test]
    fn test_normalize_separators() {
        assert_eq!(normalize_node("_includes\\layout.njk"), "_includes/layout.njk");
        assert_eq!(normalize_node("a//b///c.md"), "a/b/c.md");
        assert_eq!(normalize_node("a/./b/./c.md"), "a/b/c.md");
    }

    #[test]
    fn test_normalize_parent_segments() {
        assert_eq!(normalize_node("a/b/../c.md"), "a/c.md");
        assert_eq!(normalize_node("../shared/x.md"), "../shared/x.md");
        assert_eq!(normalize_node("../../x.md"), "../../x.md");
        assert_eq!(normalize_node("/../x.md"), "/x.md");
    }

    #[test]
    fn test_normalize_absolute_and_scheme() {
        assert_eq!(normalize_node("/srv/site/a.md"), "/srv/site/a.md");
        assert_eq!(normalize_node("file:///srv/site/a.md"), "/srv/site/a.md");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in [
            "./a/b.md",
            "a\\b\\..\\c.md",
            "../x/./y.md",
            "/abs//path/",
            "__collection:posts",
            "",
        ] {
            let once = normalize_node(raw);
            assert_eq!(normalize_node(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn test_normalize_leaves_collection_keys_alone() {
        assert_eq!(normalize_node("__collection:posts"), "__collection:posts");
        assert_eq!(normalize_node("__collection:[keys]"), "__collection:[keys]");
        assert_eq!(normalize_node("__collection:a/./b"), "__collection:a/./b");
        assert_eq!(normalize_node("__collection:posts/.."), "__collection:posts/..");
        assert_eq!(normalize_node("__collection:a\\b"), "__collection:a\\b");
    }

    #[test]
    fn test_relative_to_root() {
        let root = Path::new("/srv/site");
        assert_eq!(relative_to(Path::new("/srv/site/posts/a.md"), root), "posts/a.md");
        assert_eq!(relative_to(Path::new("/elsewhere/a.md"), root), "/elsewhere/a.md");
        assert_eq!(relative_to(Path::new("./posts/a.md"), root), "posts/a.md");
    }

    #[test]
    fn test_add_leading_dot_slash() {
        assert_eq!(add_leading_dot_slash("test.md"), "./test.md");
        assert_eq!(add_leading_dot_slash("./test.md"), "./test.md");
        assert_eq!(add_leading_dot_slash("../test.md"), "../test.md");
        assert_eq!(add_leading_dot_slash("/abs/test.md"), "/abs/test.md");
        assert_eq!(add_leading_dot_slash("."), "./");
        assert_eq!(add_leading_dot_slash(".."), "../");
    }

    #[test]
    fn test_node_from_value() {
        assert_eq!(node_from_value(&json!("a.md")).unwrap(), "a.md");
        assert_eq!(node_from_value(&json!(42)).unwrap(), "42");
        assert_eq!(node_from_value(&json!(true)).unwrap(), "true");
        assert!(matches!(
            node_from_value(&json!(null)),
            Err(GraphError::InvalidNodeType(_))
        ));
        assert!(matches!(
            node_from_value(&json!({ "path": "a.md" })),
            Err(GraphError::InvalidNodeType(_))
        ));
    }

    #[test]
    fn test_collection_helpers() {
        let key = collection_key("posts");
        assert_eq!(key, "__collection:posts");
        assert!(is_collection_key(&key));
        assert_eq!(collection_name(&key), Some("posts"));
        assert_eq!(collection_name("posts/a.md"), None);
        assert_eq!(NodeKind::of_key(&key), NodeKind::Collection);
        assert_eq!(NodeKind::of_key("posts/a.md"), NodeKind::File);
    }

    #[test]
    fn test_is_bracketed() {
        assert!(is_bracketed("[keys]"));
        assert!(!is_bracketed("keys"));
        assert!(!is_bracketed("["));
        assert!(!is_bracketed("[keys"));
    }
}
