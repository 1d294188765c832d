//! The configuration tree and its compiled-in defaults.
//!
//! The on-disk override file is an untyped JSON document; [`ConfigTree`]
//! gives it an explicit shape. Leaves hold a path/glob string or an ordered
//! list of them, nodes hold named subtrees. Anything else is rejected at
//! conversion time, so merging and resolution never see a malformed leaf.

use crate::error::{Error, Result};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// A recursively nested directory configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ConfigTree {
    /// A single path or glob, relative until resolution.
    Leaf(String),
    /// An ordered list of paths or globs.
    LeafList(Vec<String>),
    /// A named collection of subtrees.
    Node(BTreeMap<String, ConfigTree>),
}

impl ConfigTree {
    /// An empty node. Merging it into any tree is a no-op.
    pub fn empty() -> Self {
        ConfigTree::Node(BTreeMap::new())
    }

    /// The compiled-in default directory layout.
    pub fn defaults() -> Self {
        node([
            ("assets", leaf("assets")),
            (
                "styles",
                node([
                    (
                        "input",
                        list(["src/sass/style.scss", "src/sass/admin.scss"]),
                    ),
                    ("output", leaf("assets/css")),
                    ("watch", leaf("src/sass/**/*.scss")),
                ]),
            ),
            (
                "images",
                node([
                    ("input", leaf("src/images/**/*.{jpg,jpeg,png,svg,gif}")),
                    ("output", leaf("assets/images")),
                    ("watch", leaf("src/images/**/*.{jpg,jpeg,png,svg,gif}")),
                ]),
            ),
            (
                "copy",
                node([
                    (
                        "input",
                        list([
                            "src/**/*",
                            "!src/{images,js,sass}",
                            "!src/{images,js,sass}/**/*",
                        ]),
                    ),
                    ("output", leaf("assets")),
                    (
                        "watch",
                        list([
                            "src/**/*",
                            "!src/{images,js,scss}",
                            "!src/{images,js,sass}/**/*",
                        ]),
                    ),
                ]),
            ),
            (
                "scripts",
                node([
                    ("input", list(["src/js/app.js", "src/js/admin.js"])),
                    ("output", leaf("assets/js")),
                    ("watch", leaf("src/js/**/*.js")),
                ]),
            ),
            (
                "icons",
                node([
                    ("input", leaf("src/icons/**/*.svg")),
                    ("output", leaf("assets/icons")),
                    ("watch", leaf("src/icons/**/*.svg")),
                ]),
            ),
        ])
    }

    /// Convert a parsed JSON value into a typed tree.
    ///
    /// Strings become leaves, arrays of strings become leaf lists, objects
    /// recurse. Any other value (numbers, booleans, nulls, arrays with
    /// non-string entries) is a schema violation and fails with
    /// [`Error::InvalidPath`] naming the offending key.
    pub fn from_value(value: Value) -> Result<Self> {
        convert(value, "")
    }

    /// Look up a direct child of a node.
    pub fn get(&self, key: &str) -> Option<&ConfigTree> {
        match self {
            ConfigTree::Node(map) => map.get(key),
            _ => None,
        }
    }
}

fn convert(value: Value, key_path: &str) -> Result<ConfigTree> {
    match value {
        Value::String(s) => Ok(ConfigTree::Leaf(s)),
        Value::Array(items) => {
            let mut entries = Vec::with_capacity(items.len());
            for (i, item) in items.into_iter().enumerate() {
                match item {
                    Value::String(s) => entries.push(s),
                    other => {
                        return Err(Error::invalid_path(
                            format!("{}[{}]", key_path, i),
                            format!("expected a string, got {}", type_name(&other)),
                        ));
                    }
                }
            }
            Ok(ConfigTree::LeafList(entries))
        }
        Value::Object(map) => {
            let mut children = BTreeMap::new();
            for (key, child) in map {
                let child_path = if key_path.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", key_path, key)
                };
                children.insert(key, convert(child, &child_path)?);
            }
            Ok(ConfigTree::Node(children))
        }
        other => Err(Error::invalid_path(
            key_path,
            format!(
                "expected a string, list of strings, or object, got {}",
                type_name(&other)
            ),
        )),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn leaf(s: &str) -> ConfigTree {
    ConfigTree::Leaf(s.to_string())
}

fn list<const N: usize>(items: [&str; N]) -> ConfigTree {
    ConfigTree::LeafList(items.iter().map(|s| s.to_string()).collect())
}

fn node<const N: usize>(entries: [(&str, ConfigTree); N]) -> ConfigTree {
    ConfigTree::Node(
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
    )
}
