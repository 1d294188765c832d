//! Leaf resolution: relative paths and globs onto the project root.
//!
//! Pure string manipulation, no filesystem I/O. Recursion is bounded by
//! the fixed schema depth.

use super::tree::ConfigTree;
use std::path::Path;

/// Rewrite every leaf of `tree` onto `project_root`.
///
/// Leaves starting with the `!` glob-exclusion marker keep the marker as a
/// prefix of the final absolute path; all other leaves are joined directly.
///
/// Resolution is not idempotent: re-resolving an already-resolved tree
/// double-prefixes every leaf. [`super::ConfigResolver::load`] is the only
/// production caller and invokes this exactly once, immediately after the
/// merge and before any task reads the tree.
pub fn resolve_paths(tree: &ConfigTree, project_root: &Path) -> ConfigTree {
    match tree {
        ConfigTree::Leaf(value) => ConfigTree::Leaf(resolve_leaf(value, project_root)),
        ConfigTree::LeafList(values) => ConfigTree::LeafList(
            values
                .iter()
                .map(|value| resolve_leaf(value, project_root))
                .collect(),
        ),
        ConfigTree::Node(map) => ConfigTree::Node(
            map.iter()
                .map(|(key, child)| (key.clone(), resolve_paths(child, project_root)))
                .collect(),
        ),
    }
}

fn resolve_leaf(value: &str, project_root: &Path) -> String {
    match value.strip_prefix('!') {
        Some(rest) => format!("!{}", join(project_root, rest)),
        None => join(project_root, value),
    }
}

// Plain string join. Path::join would discard the root when handed an
// already-absolute leaf, silently masking a second resolution pass instead
// of producing the observably-wrong double prefix.
fn join(project_root: &Path, value: &str) -> String {
    let root = project_root.to_string_lossy();
    format!(
        "{}/{}",
        root.trim_end_matches('/'),
        value.trim_start_matches('/')
    )
}
