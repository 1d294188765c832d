//! Task definitions and glob input collection.

use crate::config::{Globs, ResolvedConfig, TaskDirs};
use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The five file-processing tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Styles,
    Images,
    Copy,
    Scripts,
    Icons,
}

impl TaskKind {
    /// All tasks, in the order the original pipeline declares them.
    pub const ALL: [TaskKind; 5] = [
        TaskKind::Styles,
        TaskKind::Images,
        TaskKind::Copy,
        TaskKind::Scripts,
        TaskKind::Icons,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TaskKind::Styles => "styles",
            TaskKind::Images => "images",
            TaskKind::Copy => "copy",
            TaskKind::Scripts => "scripts",
            TaskKind::Icons => "icons",
        }
    }

    /// The resolved directories this task reads and writes.
    pub fn dirs(self, config: &ResolvedConfig) -> &TaskDirs {
        match self {
            TaskKind::Styles => &config.styles,
            TaskKind::Images => &config.images,
            TaskKind::Copy => &config.copy,
            TaskKind::Scripts => &config.scripts,
            TaskKind::Icons => &config.icons,
        }
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Per-file transformation applied between read and write.
///
/// This is the seam where the real transformers (Sass, autoprefixer,
/// minifiers, image optimizers, transpilers) plug in. The flag
/// distinguishes the production build variant.
pub trait Transform: Send + Sync {
    fn apply(&self, path: &Path, contents: Vec<u8>, production: bool) -> Result<Vec<u8>>;
}

/// Copies bytes through unchanged.
pub struct Passthrough;

impl Transform for Passthrough {
    fn apply(&self, _path: &Path, contents: Vec<u8>, _production: bool) -> Result<Vec<u8>> {
        Ok(contents)
    }
}

/// Expand a set of glob patterns into the matching files.
///
/// Patterns starting with `!` act as exclusion filters over the matches of
/// the positive patterns. Patterns that match nothing are fine; a task with
/// no inputs simply does nothing.
pub fn collect_inputs(globs: &Globs) -> Result<Vec<PathBuf>> {
    let mut includes = Vec::new();
    let mut excludes = Vec::new();
    for pattern in globs.patterns() {
        match pattern.strip_prefix('!') {
            Some(rest) => {
                for expanded in expand_braces(rest) {
                    excludes.push(glob::Pattern::new(&expanded)?);
                }
            }
            None => includes.push(pattern.as_str()),
        }
    }

    let mut files = Vec::new();
    for pattern in includes {
        for expanded in expand_braces(pattern) {
            for entry in glob::glob(&expanded)? {
                let path = entry.map_err(|e| e.into_error())?;
                if !path.is_file() {
                    continue;
                }
                if excludes.iter().any(|ex| ex.matches_path(&path)) {
                    continue;
                }
                files.push(path);
            }
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

/// The static directory prefix of a glob pattern: everything before the
/// first component containing a metacharacter. Used to lay out outputs
/// relative to where the glob starts matching, and to pick watch roots.
pub fn static_base(pattern: &str) -> PathBuf {
    let mut base = PathBuf::new();
    for component in Path::new(pattern).components() {
        let text = component.as_os_str().to_string_lossy();
        if text.contains(['*', '?', '[', '{']) {
            break;
        }
        base.push(component);
    }
    base
}

/// Expand the first `{a,b,c}` alternation into one pattern per branch,
/// recursively. The `glob` crate has no brace support, but the directory
/// defaults use brace sets for image extensions and copy exclusions.
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let Some(open) = pattern.find('{') else {
        return vec![pattern.to_string()];
    };
    let Some(close) = pattern[open..].find('}').map(|i| open + i) else {
        return vec![pattern.to_string()];
    };

    let prefix = &pattern[..open];
    let suffix = &pattern[close + 1..];
    pattern[open + 1..close]
        .split(',')
        .flat_map(|branch| expand_braces(&format!("{}{}{}", prefix, branch, suffix)))
        .collect()
}

/// Run one task synchronously: collect inputs, transform, write.
///
/// Output paths preserve the file's position below the static base of the
/// matching input pattern, so `src/**/*` keeps its directory structure
/// under the output directory while flat file lists land directly in it.
///
/// Returns the number of files written.
pub fn run_sync(
    kind: TaskKind,
    dirs: &TaskDirs,
    production: bool,
    transform: &dyn Transform,
) -> Result<usize> {
    let inputs = collect_inputs(&dirs.input)?;
    if inputs.is_empty() {
        debug!(task = %kind, "No matching inputs");
        return Ok(0);
    }

    let bases: Vec<PathBuf> = dirs
        .input
        .patterns()
        .iter()
        .filter(|p| !p.starts_with('!'))
        .map(|p| static_base(p))
        .collect();

    let output_dir = Path::new(&dirs.output);
    std::fs::create_dir_all(output_dir)?;

    let mut written = 0;
    for input in &inputs {
        // A flat file pattern is its own static base; fall back to the
        // file name so it lands directly in the output directory.
        let relative = bases
            .iter()
            .find_map(|base| input.strip_prefix(base).ok())
            .filter(|r| !r.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .or_else(|| input.file_name().map(PathBuf::from))
            .unwrap_or_default();

        let dest = output_dir.join(&relative);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = std::fs::read(input)?;
        let transformed = transform.apply(input, contents, production)?;
        std::fs::write(&dest, transformed)?;
        written += 1;
    }

    debug!(task = %kind, files = written, "Task finished");
    Ok(written)
}
