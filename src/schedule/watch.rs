use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError};
use std::time::Duration;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::config::schema::BlossomSettings;
use crate::config::CONFIG_FILE;
use crate::error::{BlossomError, Result};
use crate::schedule::{run_tasks, Project, RunOptions, RunSummary};

#[derive(Debug, Clone)]
pub struct WatchOptions {
    /// Quiet period after the first change before regenerating.
    pub debounce: Duration,
    /// Stop after this many runs. `None` watches until the watcher channel closes.
    pub max_runs: Option<usize>,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            max_runs: None,
        }
    }
}

/// Generate, then regenerate whenever the config, a template, an include or a
/// data file changes. `on_run` receives the result of every run; failed runs do
/// not stop watching.
pub fn watch<F>(
    project_dir: &Path,
    run_options: &RunOptions,
    watch_options: &WatchOptions,
    mut on_run: F,
) -> Result<()>
where
    F: FnMut(Result<RunSummary>),
{
    let (tx, rx) = channel();
    let mut watcher =
        RecommendedWatcher::new(tx, notify::Config::default()).map_err(|e| BlossomError::Watch { source: e })?;
    let mut watched: Vec<PathBuf> = Vec::new();
    let mut runs = 0usize;

    loop {
        let (result, paths, generated_dir) = match Project::load(project_dir) {
            Ok(project) => {
                let paths = watch_paths(&project)?;
                let generated_dir = project.generated_dir();
                (run_tasks(&project, run_options), paths, generated_dir)
            }
            Err(e) => (
                Err(e),
                vec![(project_dir.join(CONFIG_FILE), RecursiveMode::NonRecursive)],
                project_dir.join(BlossomSettings::default().generated_dir),
            ),
        };
        on_run(result);

        runs += 1;
        if watch_options.max_runs.is_some_and(|max| runs >= max) {
            return Ok(());
        }

        for path in watched.drain(..) {
            let _ = watcher.unwatch(&path);
        }
        for (path, mode) in paths {
            let target = nearest_existing(&path);
            match watcher.watch(&target, mode) {
                Ok(()) => watched.push(target),
                Err(e) => tracing::warn!(path = %target.display(), error = %e, "cannot watch path"),
            }
        }

        if !wait_for_change(&rx, &generated_dir, watch_options.debounce) {
            return Ok(());
        }
    }
}

/// Everything a run reads, paired with how it should be watched.
fn watch_paths(project: &Project) -> Result<Vec<(PathBuf, RecursiveMode)>> {
    let mut paths = vec![(project.dir.join(CONFIG_FILE), RecursiveMode::NonRecursive)];
    for task in project.tasks()? {
        for dir in task.template_dirs.iter().chain(task.include_dirs.iter()) {
            paths.push((dir.clone(), RecursiveMode::Recursive));
        }
        for file in task.data_files(&project.dir) {
            paths.push((file, RecursiveMode::NonRecursive));
        }
    }
    paths.sort_by(|a, b| a.0.cmp(&b.0));
    paths.dedup_by(|a, b| a.0 == b.0);
    Ok(paths)
}

/// Watch the closest existing ancestor so that creating the path is noticed.
fn nearest_existing(path: &Path) -> PathBuf {
    let mut current = path;
    while !current.exists() {
        match current.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => current = parent,
            _ => break,
        }
    }
    current.to_path_buf()
}

/// Block until a relevant change arrives, then drain events for `debounce`.
/// Returns `false` once the watcher has gone away.
fn wait_for_change(
    rx: &Receiver<notify::Result<Event>>,
    generated_dir: &Path,
    debounce: Duration,
) -> bool {
    loop {
        match rx.recv() {
            Ok(Ok(event)) if is_relevant(&event, generated_dir) => break,
            Ok(Ok(_)) => continue,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "watch error");
                continue;
            }
            Err(_) => return false,
        }
    }

    loop {
        match rx.recv_timeout(debounce) {
            Ok(_) => continue,
            Err(RecvTimeoutError::Timeout) => return true,
            Err(RecvTimeoutError::Disconnected) => return false,
        }
    }
}

fn is_relevant(event: &Event, generated_dir: &Path) -> bool {
    if matches!(event.kind, EventKind::Access(_)) {
        return false;
    }
    event.paths.is_empty() || event.paths.iter().any(|p| !p.starts_with(generated_dir))
}
