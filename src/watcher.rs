//! File watcher for task source globs.
//!
//! Watches the static base directory of every task's `watch` patterns and
//! classifies changed paths back to the owning task so the dev loop can
//! re-run it. Emits events through a tokio watch channel, with debouncing
//! to coalesce rapid file changes.

use crate::config::ResolvedConfig;
use crate::pipeline::{expand_braces, static_base, TaskKind};
use notify_debouncer_mini::{new_debouncer, DebouncedEventKind};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Event emitted when watched sources change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// One or more watched sources changed; re-run these tasks.
    Changed(Vec<TaskKind>),
    /// Watcher encountered an error.
    Error(String),
}

impl ChangeEvent {
    /// Returns true if this event requires tasks to re-run.
    pub fn requires_rerun(&self) -> bool {
        matches!(self, ChangeEvent::Changed(tasks) if !tasks.is_empty())
    }
}

/// Configuration for the file watcher.
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// Debounce duration for coalescing rapid changes.
    pub debounce_duration: Duration,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            debounce_duration: Duration::from_millis(500),
        }
    }
}

/// Compiled watch patterns for one task.
#[derive(Debug)]
struct TaskMatcher {
    kind: TaskKind,
    includes: Vec<glob::Pattern>,
    excludes: Vec<glob::Pattern>,
}

impl TaskMatcher {
    fn matches(&self, path: &Path) -> bool {
        self.includes.iter().any(|p| p.matches_path(path))
            && !self.excludes.iter().any(|p| p.matches_path(path))
    }
}

/// Handle to the running watcher.
pub struct WatcherHandle {
    /// Receiver for change events. Cloning allows multiple consumers.
    pub events: watch::Receiver<Option<ChangeEvent>>,
    /// Handle to the watcher task (dropping this stops the watcher).
    _task_handle: tokio::task::JoinHandle<()>,
}

impl WatcherHandle {
    /// Wait for the next change event.
    pub async fn wait_for_change(&mut self) -> Option<ChangeEvent> {
        // Skip the initial None value
        loop {
            if self.events.changed().await.is_err() {
                return None; // Sender dropped
            }
            let event = self.events.borrow_and_update().clone();
            if event.is_some() {
                return event;
            }
        }
    }
}

/// Start watching every task's source directories.
///
/// The watch roots are the static bases of each task's positive watch
/// patterns, watched recursively; classification back to a task happens
/// per changed path against the compiled patterns.
pub fn start_watcher(
    config: &ResolvedConfig,
    watcher_config: WatcherConfig,
) -> crate::error::Result<WatcherHandle> {
    let matchers = build_matchers(config)?;
    let roots = watch_roots(config);

    let (event_tx, event_rx) = watch::channel(None);
    let (notify_tx, notify_rx) = mpsc::channel();

    let mut debouncer = new_debouncer(watcher_config.debounce_duration, notify_tx)?;
    let watcher = debouncer.watcher();

    for root in &roots {
        if root.exists() {
            info!(dir = %root.display(), "Watching source directory");
            watcher.watch(root, notify::RecursiveMode::Recursive)?;
        } else {
            warn!(
                dir = %root.display(),
                "Source directory does not exist, skipping watch"
            );
        }
    }

    let task_handle = tokio::task::spawn_blocking(move || {
        // Keep the debouncer alive
        let _debouncer = debouncer;
        process_notify_events(notify_rx, event_tx, &matchers);
    });

    Ok(WatcherHandle {
        events: event_rx,
        _task_handle: task_handle,
    })
}

fn build_matchers(config: &ResolvedConfig) -> crate::error::Result<Vec<TaskMatcher>> {
    let mut matchers = Vec::new();
    for kind in TaskKind::ALL {
        let mut includes = Vec::new();
        let mut excludes = Vec::new();
        for pattern in kind.dirs(config).watch.patterns() {
            let (target, raw) = match pattern.strip_prefix('!') {
                Some(rest) => (&mut excludes, rest),
                None => (&mut includes, pattern.as_str()),
            };
            for expanded in expand_braces(raw) {
                target.push(glob::Pattern::new(&expanded)?);
            }
        }
        matchers.push(TaskMatcher {
            kind,
            includes,
            excludes,
        });
    }
    Ok(matchers)
}

/// Deduplicated static bases of all positive watch patterns.
fn watch_roots(config: &ResolvedConfig) -> Vec<PathBuf> {
    let mut roots: Vec<PathBuf> = TaskKind::ALL
        .iter()
        .flat_map(|kind| kind.dirs(config).watch.patterns())
        .filter(|p| !p.starts_with('!'))
        .map(|p| static_base(p))
        .collect();
    roots.sort();
    roots.dedup();

    // Drop roots nested inside another root; the parent watch covers them.
    let mut top_level: Vec<PathBuf> = Vec::new();
    for root in roots {
        if !top_level.iter().any(|kept| root.starts_with(kept)) {
            top_level.push(root);
        }
    }
    top_level
}

/// Process events from the notify debouncer and classify them to tasks.
fn process_notify_events(
    rx: mpsc::Receiver<Result<Vec<notify_debouncer_mini::DebouncedEvent>, notify::Error>>,
    tx: watch::Sender<Option<ChangeEvent>>,
    matchers: &[TaskMatcher],
) {
    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let tasks = classify_events(events, matchers);
                if tasks.is_empty() {
                    continue;
                }
                debug!(?tasks, "Source change detected");
                if tx.send(Some(ChangeEvent::Changed(tasks))).is_err() {
                    info!("Watcher receiver dropped, stopping");
                    return;
                }
            }
            Ok(Err(e)) => {
                error!("File watcher error: {}", e);
                let _ = tx.send(Some(ChangeEvent::Error(e.to_string())));
            }
            Err(_) => {
                info!("Watcher channel closed, stopping");
                return;
            }
        }
    }
}

/// Collect the distinct tasks affected by a batch of debounced events.
fn classify_events(
    events: Vec<notify_debouncer_mini::DebouncedEvent>,
    matchers: &[TaskMatcher],
) -> Vec<TaskKind> {
    let mut tasks = Vec::new();
    for event in events {
        if !matches!(
            event.kind,
            DebouncedEventKind::Any | DebouncedEventKind::AnyContinuous
        ) {
            continue;
        }
        for kind in classify_path(&event.path, matchers) {
            if !tasks.contains(&kind) {
                tasks.push(kind);
            }
        }
    }
    tasks
}

/// Every task whose watch patterns cover this path.
fn classify_path(path: &Path, matchers: &[TaskMatcher]) -> Vec<TaskKind> {
    matchers
        .iter()
        .filter(|m| m.matches(path))
        .map(|m| m.kind)
        .collect()
}
