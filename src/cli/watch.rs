use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokencast::config::CONFIG_FILENAMES;
use tokencast::Config;

const DEBOUNCE: Duration = Duration::from_millis(500);

/// Run watch mode: rebuild on changes to the config or token file.
pub(crate) fn run_watch_mode(config_path: Option<PathBuf>, out_dir: Option<PathBuf>) {
    let config = super::build::resolve_config(config_path.as_deref(), out_dir.as_deref());

    // Run initial build.
    super::build::run_build_pass(&config, false);

    let (tx, rx) = mpsc::channel();
    let mut watcher =
        RecommendedWatcher::new(tx, notify::Config::default()).unwrap_or_else(|e| {
            eprintln!("tokencast watch: failed to create watcher: {e}");
            std::process::exit(1);
        });

    let mut targets = watch_targets(&config, config_path.as_deref());
    let mut watched = BTreeSet::new();
    sync_watches(&mut watcher, &mut watched, &targets);

    eprintln!("Watching for changes... (press Ctrl+C to stop)");

    while wait_for_change(&rx, &targets, DEBOUNCE) {
        eprint!("\x1b[2J\x1b[H");

        // Reload so config edits take effect. A broken config keeps the
        // previous targets so fixing it triggers the next build.
        match super::build::try_resolve_config(config_path.as_deref(), out_dir.as_deref()) {
            Ok(config) => {
                super::build::run_build_pass(&config, false);
                targets = watch_targets(&config, config_path.as_deref());
                sync_watches(&mut watcher, &mut watched, &targets);
            }
            Err(e) => eprintln!("tokencast build: {e}"),
        }
    }
}

/// Files whose changes trigger a rebuild: the token file and the config.
///
/// Without an explicit config path every config filename in the root is a
/// target, so creating one is noticed.
fn watch_targets(config: &Config, config_path: Option<&Path>) -> BTreeSet<PathBuf> {
    let mut files = vec![config.tokens_path()];
    match config_path {
        Some(path) => files.push(path.to_path_buf()),
        None => files.extend(CONFIG_FILENAMES.iter().map(|name| config.root.join(name))),
    }
    files.iter().map(PathBuf::as_path).map(normalize).collect()
}

/// Absolute path with the parent directory canonicalized. The file itself
/// may be missing mid-save, so only the directory is resolved.
fn normalize(path: &Path) -> PathBuf {
    let abs = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    match (abs.parent(), abs.file_name()) {
        (Some(dir), Some(name)) => {
            std::fs::canonicalize(dir).map_or_else(|_| abs.clone(), |dir| dir.join(name))
        }
        _ => abs,
    }
}

/// Directories to watch. Editors that save by rename replace the inode, so
/// watching the files themselves goes quiet after the first save.
fn watch_dirs(targets: &BTreeSet<PathBuf>) -> BTreeSet<PathBuf> {
    targets.iter().filter_map(|p| p.parent().map(Path::to_path_buf)).collect()
}

fn sync_watches(
    watcher: &mut RecommendedWatcher,
    watched: &mut BTreeSet<PathBuf>,
    targets: &BTreeSet<PathBuf>,
) {
    let dirs = watch_dirs(targets);
    for dir in watched.difference(&dirs) {
        if let Err(e) = watcher.unwatch(dir) {
            tracing::debug!(dir = %dir.display(), "unwatch failed: {e}");
        }
    }
    watched.retain(|dir| dirs.contains(dir));
    for dir in dirs {
        if watched.contains(&dir) {
            continue;
        }
        match watcher.watch(&dir, RecursiveMode::NonRecursive) {
            Ok(()) => {
                watched.insert(dir);
            }
            Err(e) => eprintln!("tokencast watch: failed to watch {}: {e}", dir.display()),
        }
    }
}

/// Whether an event touches one of the target files. Reads are ignored;
/// every build opens the token file.
fn is_relevant(event: &Event, targets: &BTreeSet<PathBuf>) -> bool {
    !matches!(event.kind, EventKind::Access(_))
        && event.paths.iter().any(|p| targets.contains(&normalize(p)))
}

/// Block until a relevant change has settled: one event touching `targets`
/// followed by `quiet` without further relevant events. Events arriving
/// during the window restart it, so the last write of a burst is always
/// built. Returns `false` once the watcher is gone and nothing is pending.
fn wait_for_change(
    rx: &Receiver<notify::Result<Event>>,
    targets: &BTreeSet<PathBuf>,
    quiet: Duration,
) -> bool {
    let mut pending = false;
    loop {
        let received = if pending {
            rx.recv_timeout(quiet)
        } else {
            rx.recv().map_err(|_| RecvTimeoutError::Disconnected)
        };
        match received {
            Ok(Ok(event)) => pending |= is_relevant(&event, targets),
            Ok(Err(e)) => eprintln!("tokencast watch: watcher error: {e}"),
            Err(RecvTimeoutError::Timeout) => return true,
            Err(RecvTimeoutError::Disconnected) => return pending,
        }
    }
}
