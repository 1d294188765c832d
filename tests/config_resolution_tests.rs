//! Integration tests for directory configuration resolution.
//!
//! Covers the merge and path-rewrite contract end-to-end: defaults merged
//! with an on-disk override file, every leaf rewritten onto the project
//! root exactly once.

use assetpipe::config::{
    deep_merge, resolve_paths, ConfigResolver, ConfigTree, OVERRIDE_FILE,
};
use assetpipe::error::Error;
use serde_json::json;
use std::path::Path;
use tempfile::TempDir;

fn tree(value: serde_json::Value) -> ConfigTree {
    ConfigTree::from_value(value).unwrap()
}

#[test]
fn merging_empty_override_preserves_defaults() {
    let defaults = ConfigResolver::load_defaults();
    assert_eq!(
        deep_merge(defaults.clone(), ConfigTree::empty()),
        defaults
    );
}

#[test]
fn override_leaves_win_and_default_only_keys_survive() {
    let defaults = tree(json!({
        "assets": "assets",
        "styles": {"input": "a.scss", "output": "assets/css", "watch": "src/**/*.scss"}
    }));
    let overrides = tree(json!({
        "styles": {"input": "b.scss", "output": "public/css", "watch": "sass/**/*.scss"}
    }));
    let merged = deep_merge(defaults, overrides);
    assert_eq!(
        merged,
        tree(json!({
            "assets": "assets",
            "styles": {"input": "b.scss", "output": "public/css", "watch": "sass/**/*.scss"}
        }))
    );
}

#[test]
fn nested_override_merges_structurally_not_wholesale() {
    let defaults = tree(json!({"icons": {"input": "src/icons/**/*.svg", "output": "assets/icons"}}));
    let overrides = tree(json!({"icons": {"sprite": "assets/sprite.svg"}}));
    let merged = deep_merge(defaults, overrides);
    // Original siblings retained, new sub-key added at the same level
    assert_eq!(
        merged,
        tree(json!({
            "icons": {
                "input": "src/icons/**/*.svg",
                "output": "assets/icons",
                "sprite": "assets/sprite.svg"
            }
        }))
    );
}

#[test]
fn styles_output_resolves_onto_project_root() {
    let root = Path::new("/home/project");
    let resolved = resolve_paths(&tree(json!({"styles": {"output": "assets/css"}})), root);
    assert_eq!(
        resolved,
        tree(json!({"styles": {"output": "/home/project/assets/css"}}))
    );
}

#[test]
fn copy_watch_negations_keep_their_markers() {
    let root = Path::new("/home/project");
    let resolved = resolve_paths(
        &tree(json!({"copy": {"watch": ["src/**/*", "!src/js/**/*"]}})),
        root,
    );
    assert_eq!(
        resolved,
        tree(json!({
            "copy": {"watch": ["/home/project/src/**/*", "!/home/project/src/js/**/*"]}
        }))
    );
}

#[test]
fn resolution_runs_once_per_lifecycle() {
    // resolve_paths is deliberately not idempotent; ConfigResolver::load is
    // the only production caller and invokes it a single time after merge.
    let root = Path::new("/home/project");
    let unresolved = tree(json!({"assets": "assets"}));
    let once = resolve_paths(&unresolved, root);
    let twice = resolve_paths(&once, root);
    assert_ne!(once, twice);
}

#[test]
fn override_file_changes_one_leaf_and_rest_stays_default() {
    let temp = TempDir::new().unwrap();
    std::fs::write(
        temp.path().join(OVERRIDE_FILE),
        r#"{"images": {"output": "public/img"}}"#,
    )
    .unwrap();

    let config = ConfigResolver::new(temp.path()).load().unwrap();
    let root = temp.path().to_string_lossy();

    assert_eq!(config.images.output, format!("{}/public/img", root));
    assert_eq!(
        config.images.input.patterns(),
        &[format!("{}/src/images/**/*.{{jpg,jpeg,png,svg,gif}}", root)]
    );
    // An untouched section resolves from defaults
    assert_eq!(config.styles.output, format!("{}/assets/css", root));
}

#[test]
fn override_can_replace_an_input_list() {
    let temp = TempDir::new().unwrap();
    std::fs::write(
        temp.path().join(OVERRIDE_FILE),
        r#"{"scripts": {"input": ["src/js/main.js"]}}"#,
    )
    .unwrap();

    let config = ConfigResolver::new(temp.path()).load().unwrap();
    let root = temp.path().to_string_lossy();

    // The override list replaces the default list entirely
    assert_eq!(
        config.scripts.input.patterns(),
        &[format!("{}/src/js/main.js", root)]
    );
}

#[test]
fn malformed_override_file_aborts_loading() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join(OVERRIDE_FILE), "{\"styles\": ").unwrap();

    let err = ConfigResolver::new(temp.path()).load().unwrap_err();
    assert!(matches!(err, Error::ConfigParse { .. }), "{:?}", err);
}

#[test]
fn non_string_leaf_in_override_aborts_loading() {
    let temp = TempDir::new().unwrap();
    std::fs::write(
        temp.path().join(OVERRIDE_FILE),
        r#"{"copy": {"input": ["src/**/*", {"nested": "object"}]}}"#,
    )
    .unwrap();

    let err = ConfigResolver::new(temp.path()).load().unwrap_err();
    assert!(matches!(err, Error::InvalidPath { .. }), "{:?}", err);
}
