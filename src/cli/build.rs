use std::path::{Path, PathBuf};

use tokencast::{Config, WriteStatus};

pub(crate) fn run(config: Option<PathBuf>, out_dir: Option<PathBuf>, check: bool, watch: bool) {
    // Watch mode: rebuild on filesystem changes.
    #[cfg(feature = "watch")]
    if watch {
        super::watch::run_watch_mode(config, out_dir);
        return;
    }
    #[cfg(not(feature = "watch"))]
    if watch {
        eprintln!(
            "Watch mode requires the 'watch' feature. Rebuild with: cargo build --features watch"
        );
        std::process::exit(1);
    }

    let config = resolve_config(config.as_deref(), out_dir.as_deref());
    if !run_build_pass(&config, check) {
        std::process::exit(1);
    }
}

/// Load the given or discovered config, applying a CLI output directory
/// override. Exits on a config error.
pub(crate) fn resolve_config(path: Option<&Path>, out_dir: Option<&Path>) -> Config {
    try_resolve_config(path, out_dir).unwrap_or_else(|e| {
        eprintln!("tokencast build: {e}");
        std::process::exit(1);
    })
}

pub(crate) fn try_resolve_config(
    path: Option<&Path>,
    out_dir: Option<&Path>,
) -> tokencast::Result<Config> {
    let path = path.map(Path::to_path_buf).or_else(|| tokencast::find_config(Path::new(".")));
    let mut config = match path {
        Some(path) => tokencast::load_config(&path)?,
        None => {
            tracing::info!("no config file found, using defaults");
            Config::default()
        }
    };
    if let Some(out_dir) = out_dir {
        // Relative to the working directory, not the config file.
        config.out_dir = std::env::current_dir()
            .map(|cwd| cwd.join(out_dir))
            .unwrap_or_else(|_| out_dir.to_path_buf());
    }
    Ok(config)
}

/// Run one build; returns `false` if it failed or, in check mode, found stale files.
pub(crate) fn run_build_pass(config: &Config, check: bool) -> bool {
    let report = match tokencast::build(config) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("tokencast build: {e}");
            return false;
        }
    };
    super::print_diagnostics(&report.diagnostics);

    let out_dir = config.out_dir_path();
    if check {
        return match tokencast::check_outputs(&out_dir, &report.files) {
            Ok(stale) if stale.is_empty() => {
                eprintln!("ok");
                true
            }
            Ok(stale) => {
                for file in &stale {
                    eprintln!("Would update: {}", file.path.display());
                    eprint!("{}", file.diff);
                }
                false
            }
            Err(e) => {
                eprintln!("tokencast build: {e}");
                false
            }
        };
    }

    match tokencast::write_outputs(&out_dir, &report.files) {
        Ok(written) => {
            for (path, status) in &written {
                match status {
                    WriteStatus::Created => eprintln!("Created {}", path.display()),
                    WriteStatus::Updated => eprintln!("Updated {}", path.display()),
                    WriteStatus::Unchanged => {}
                }
            }
            if written.iter().all(|(_, s)| *s == WriteStatus::Unchanged) {
                eprintln!("ok");
            }
            true
        }
        Err(e) => {
            eprintln!("tokencast build: {e}");
            false
        }
    }
}
