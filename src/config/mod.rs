//! Directory configuration system.
//!
//! Builds the resolved task configuration from two sources with deep merging:
//! 1. **Defaults** - Compiled-in directory tree (see [`ConfigTree::defaults`])
//! 2. **Override** - `<project root>/assetpipe.json`, if present
//!
//! ## Merge Strategy
//! - Nested objects: deep merge field-by-field, override wins at the leaves
//! - Lists: replaced entirely, not concatenated
//!
//! After merging, every leaf is rewritten onto the project root as an
//! absolute path or glob. A leading `!` glob-exclusion marker survives the
//! rewrite. Resolution runs exactly once, at startup, before any task reads
//! the tree.
//!
//! ## Environment Variables
//! - `ASSETPIPE_ROOT` - Project root used as the base for all path resolution

mod loader;
mod merge;
mod resolve;
mod tree;

pub use loader::{ConfigResolver, Globs, ResolvedConfig, TaskDirs, OVERRIDE_FILE, ROOT_ENV_VAR};
pub use merge::deep_merge;
pub use resolve::resolve_paths;
pub use tree::ConfigTree;
