//! Deep merge for configuration trees.
//!
//! Implements field-by-field merging where override values win over
//! defaults. Lists are replaced entirely, not concatenated.

use super::tree::ConfigTree;

/// Deep merge two configuration trees, with `overlay` taking precedence
/// over `base`.
///
/// - Nodes are merged recursively: keys in overlay override keys in base,
///   keys present in only one side are kept
/// - Leaves and leaf lists are replaced entirely
///
/// Merging an empty node into any tree returns that tree unchanged.
pub fn deep_merge(base: ConfigTree, overlay: ConfigTree) -> ConfigTree {
    match (base, overlay) {
        // Both are nodes: merge recursively
        (ConfigTree::Node(mut base_map), ConfigTree::Node(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged_value = if let Some(base_value) = base_map.remove(&key) {
                    deep_merge(base_value, overlay_value)
                } else {
                    overlay_value
                };
                base_map.insert(key, merged_value);
            }
            ConfigTree::Node(base_map)
        }
        // Any other case: overlay replaces base entirely
        (_, overlay) => overlay,
    }
}
