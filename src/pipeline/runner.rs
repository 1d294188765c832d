//! Task orchestration: clean, then everything in parallel.
//!
//! Tasks are blocking filesystem work, so each one runs on the tokio
//! blocking pool; the build joins them all. Scheduling beyond that is
//! tokio's.

use super::task::{run_sync, Passthrough, TaskKind, Transform};
use crate::config::ResolvedConfig;
use crate::error::Result;
use std::sync::Arc;
use tracing::{info, warn};

/// Remove the resolved assets directory. A missing directory is fine.
pub fn clean(config: &ResolvedConfig) -> Result<()> {
    match std::fs::remove_dir_all(&config.assets) {
        Ok(()) => {
            info!(dir = %config.assets, "Cleaned output directory");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Run a single task on the blocking pool with the passthrough transform.
pub async fn run_task(
    kind: TaskKind,
    config: Arc<ResolvedConfig>,
    production: bool,
) -> Result<usize> {
    run_task_with(kind, config, production, Arc::new(Passthrough)).await
}

/// Run a single task on the blocking pool with an explicit transform.
pub async fn run_task_with(
    kind: TaskKind,
    config: Arc<ResolvedConfig>,
    production: bool,
    transform: Arc<dyn Transform>,
) -> Result<usize> {
    let handle = tokio::task::spawn_blocking(move || {
        let dirs = kind.dirs(&config);
        run_sync(kind, dirs, production, transform.as_ref())
    });
    handle.await.map_err(std::io::Error::other)?
}

/// Run a set of tasks in parallel, failing on the first error.
pub async fn run_tasks(
    kinds: &[TaskKind],
    config: &Arc<ResolvedConfig>,
    production: bool,
) -> Result<()> {
    let handles: Vec<_> = kinds
        .iter()
        .map(|&kind| {
            let config = Arc::clone(config);
            (kind, tokio::spawn(run_task(kind, config, production)))
        })
        .collect();

    for (kind, handle) in handles {
        match handle.await.map_err(std::io::Error::other)? {
            Ok(files) => info!(task = %kind, files, "Task complete"),
            Err(e) => {
                warn!(task = %kind, error = %e, "Task failed");
                return Err(e);
            }
        }
    }
    Ok(())
}

/// The full build: clean, then all tasks in parallel.
pub async fn build(config: &Arc<ResolvedConfig>, production: bool) -> Result<()> {
    clean(config)?;
    run_tasks(&TaskKind::ALL, config, production).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigResolver;
    use tempfile::TempDir;

    fn project_with_sources() -> (TempDir, Arc<ResolvedConfig>) {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        std::fs::create_dir_all(src.join("sass")).unwrap();
        std::fs::create_dir_all(src.join("js")).unwrap();
        std::fs::create_dir_all(src.join("images")).unwrap();
        std::fs::create_dir_all(src.join("icons")).unwrap();
        std::fs::create_dir_all(src.join("fonts")).unwrap();
        std::fs::write(src.join("sass/style.scss"), "body {}").unwrap();
        std::fs::write(src.join("js/app.js"), "let x = 1;").unwrap();
        std::fs::write(src.join("images/logo.png"), [0u8; 4]).unwrap();
        std::fs::write(src.join("icons/menu.svg"), "<svg/>").unwrap();
        std::fs::write(src.join("fonts/a.woff"), "font").unwrap();

        let config = ConfigResolver::new(temp.path()).load().unwrap();
        (temp, Arc::new(config))
    }

    #[tokio::test]
    async fn test_build_writes_every_task_output() {
        let (temp, config) = project_with_sources();
        build(&config, false).await.unwrap();

        let assets = temp.path().join("assets");
        assert!(assets.join("css/style.scss").is_file());
        assert!(assets.join("js/app.js").is_file());
        assert!(assets.join("images/logo.png").is_file());
        assert!(assets.join("icons/menu.svg").is_file());
        // Static copy keeps structure but skips the handled source dirs
        assert!(assets.join("fonts/a.woff").is_file());
        assert!(!assets.join("sass").exists());
    }

    #[tokio::test]
    async fn test_build_cleans_previous_output() {
        let (temp, config) = project_with_sources();
        let stale = temp.path().join("assets/stale.txt");
        std::fs::create_dir_all(stale.parent().unwrap()).unwrap();
        std::fs::write(&stale, "old").unwrap();

        build(&config, false).await.unwrap();
        assert!(!stale.exists());
    }

    #[test]
    fn test_clean_missing_dir_is_ok() {
        let temp = TempDir::new().unwrap();
        let config = ConfigResolver::new(temp.path()).load().unwrap();
        clean(&config).unwrap();
    }
}
