//! Configuration resolver: defaults + override file -> resolved task config.
//!
//! The resolver captures the project root once at startup, merges the
//! compiled-in defaults with the optional override file, resolves every
//! leaf onto the root, and hands consumers an immutable typed view.

use super::merge::deep_merge;
use super::resolve::resolve_paths;
use super::tree::ConfigTree;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Override file name, looked up directly under the project root.
pub const OVERRIDE_FILE: &str = "assetpipe.json";

/// Environment variable supplying the project root.
pub const ROOT_ENV_VAR: &str = "ASSETPIPE_ROOT";

/// One or more glob patterns. Deserializes from a single string or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Globs {
    One(String),
    Many(Vec<String>),
}

impl Globs {
    /// All patterns in declaration order.
    pub fn patterns(&self) -> &[String] {
        match self {
            Globs::One(p) => std::slice::from_ref(p),
            Globs::Many(ps) => ps,
        }
    }
}

/// Resolved directories for one task. All fields are absolute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDirs {
    /// Glob(s) selecting the files the task reads.
    pub input: Globs,
    /// Directory the task writes into.
    pub output: String,
    /// Glob(s) that re-trigger the task in watch mode.
    pub watch: Globs,
}

/// The fully resolved configuration consumed by every task.
///
/// Built once by [`ConfigResolver::load`] and treated as read-only for the
/// remainder of the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedConfig {
    /// Root output directory, removed wholesale by the clean task.
    pub assets: String,
    pub styles: TaskDirs,
    pub images: TaskDirs,
    pub copy: TaskDirs,
    pub scripts: TaskDirs,
    pub icons: TaskDirs,
}

/// Resolves the directory configuration for one project.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    project_root: PathBuf,
}

impl ConfigResolver {
    /// Create a resolver rooted at an explicit directory.
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: absolutize(project_root.into()),
        }
    }

    /// Discover the project root: explicit CLI override, then
    /// `ASSETPIPE_ROOT`, then the current working directory.
    pub fn discover(cli_root: Option<&Path>) -> Self {
        let root = cli_root
            .map(Path::to_path_buf)
            .or_else(|| std::env::var(ROOT_ENV_VAR).ok().map(PathBuf::from))
            .unwrap_or_else(|| {
                std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
            });
        Self::new(root)
    }

    /// The captured project root (absolute).
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// The compiled-in default tree.
    pub fn load_defaults() -> ConfigTree {
        ConfigTree::defaults()
    }

    /// Load the override file, if present.
    ///
    /// A missing file yields an empty tree (a no-op for merge purposes).
    /// A file that is not valid JSON, or whose top level is not an object,
    /// fails with [`Error::ConfigParse`]; leaf values of an unexpected
    /// shape fail with [`Error::InvalidPath`]. Both are fatal: the build
    /// must not start from a partially parsed configuration.
    pub fn load_override(&self) -> Result<ConfigTree> {
        let path = self.project_root.join(OVERRIDE_FILE);
        if !path.exists() {
            debug!(path = %path.display(), "No override file, using defaults");
            return Ok(ConfigTree::empty());
        }

        let content = std::fs::read_to_string(&path)?;
        let value: serde_json::Value = serde_json::from_str(&content)
            .map_err(|e| Error::config_parse(&path, e.to_string()))?;
        if !value.is_object() {
            return Err(Error::config_parse(
                &path,
                "top level must be an object of directory sections",
            ));
        }

        info!(path = %path.display(), "Loaded directory overrides");
        ConfigTree::from_value(value)
    }

    /// Produce the resolved configuration.
    ///
    /// Merges defaults with the override tree and resolves every leaf onto
    /// the project root. Resolution happens exactly once, here, before any
    /// consumer reads the tree.
    pub fn load(&self) -> Result<ResolvedConfig> {
        let merged = deep_merge(Self::load_defaults(), self.load_override()?);
        let resolved = resolve_paths(&merged, &self.project_root);

        // The resolved tree is schema-complete unless an override replaced
        // a whole section with the wrong shape, which is a parse error.
        let value = serde_json::to_value(&resolved)
            .map_err(|e| Error::config_parse(self.project_root.join(OVERRIDE_FILE), e.to_string()))?;
        serde_json::from_value(value).map_err(|e| {
            Error::config_parse(
                self.project_root.join(OVERRIDE_FILE),
                format!("config does not match the expected shape: {}", e),
            )
        })
    }
}

// Resolve a possibly-relative root against the current working directory.
fn absolutize(root: PathBuf) -> PathBuf {
    if root.is_absolute() {
        root
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_defaults_only() {
        let temp = TempDir::new().unwrap();
        let resolver = ConfigResolver::new(temp.path());

        let config = resolver.load().unwrap();
        let root = temp.path().to_string_lossy();

        assert_eq!(config.assets, format!("{}/assets", root));
        assert_eq!(config.styles.output, format!("{}/assets/css", root));
        assert_eq!(
            config.scripts.input.patterns(),
            &[
                format!("{}/src/js/app.js", root),
                format!("{}/src/js/admin.js", root)
            ]
        );
    }

    #[test]
    fn test_override_wins_and_siblings_survive() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(OVERRIDE_FILE),
            r#"{"images": {"output": "public/img"}}"#,
        )
        .unwrap();

        let resolver = ConfigResolver::new(temp.path());
        let config = resolver.load().unwrap();
        let root = temp.path().to_string_lossy();

        // Overridden leaf, resolved
        assert_eq!(config.images.output, format!("{}/public/img", root));
        // Untouched sibling from defaults, also resolved
        assert_eq!(
            config.images.input.patterns(),
            &[format!("{}/src/images/**/*.{{jpg,jpeg,png,svg,gif}}", root)]
        );
    }

    #[test]
    fn test_negation_marker_survives_resolution() {
        let temp = TempDir::new().unwrap();
        let resolver = ConfigResolver::new(temp.path());
        let config = resolver.load().unwrap();
        let root = temp.path().to_string_lossy();

        let watch = config.copy.watch.patterns();
        assert_eq!(watch[0], format!("{}/src/**/*", root));
        assert_eq!(watch[2], format!("!{}/src/{{images,js,sass}}/**/*", root));
    }

    #[test]
    fn test_malformed_override_is_fatal() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(OVERRIDE_FILE), "{not json").unwrap();

        let resolver = ConfigResolver::new(temp.path());
        let err = resolver.load().unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }), "{:?}", err);
    }

    #[test]
    fn test_non_object_override_is_fatal() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(OVERRIDE_FILE), r#"["not", "an", "object"]"#).unwrap();

        let resolver = ConfigResolver::new(temp.path());
        let err = resolver.load().unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }), "{:?}", err);
    }

    #[test]
    fn test_bad_leaf_shape_is_invalid_path() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(OVERRIDE_FILE),
            r#"{"styles": {"output": 42}}"#,
        )
        .unwrap();

        let resolver = ConfigResolver::new(temp.path());
        let err = resolver.load().unwrap_err();
        assert!(matches!(err, Error::InvalidPath { .. }), "{:?}", err);
    }

    #[test]
    fn test_missing_override_is_empty_tree() {
        let temp = TempDir::new().unwrap();
        let resolver = ConfigResolver::new(temp.path());
        assert_eq!(resolver.load_override().unwrap(), ConfigTree::empty());
    }
}
