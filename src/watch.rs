//! File watcher: renders the graph on startup, then re-renders on document changes.

use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use notify::{RecursiveMode, Watcher as _};

use linkmark::Error;
use linkmark::config::CONFIG_FILE;
use linkmark::lister::is_markdown;

use crate::commands::{self, GraphOverrides, ScanOptions};
use crate::diagnostics;

/// Debounce delay between filesystem events and re-render.
const DEBOUNCE_MS: u64 = 100;

/// Create a filesystem watcher that signals on the given channel whenever a
/// markdown document or the config file is created, modified, or removed.
///
/// # Errors
///
/// Returns `Error::WatchFailed` if the watcher cannot be created.
fn create_watcher(tx: crossbeam_channel::Sender<()>) -> Result<notify::RecommendedWatcher, Error> {
    return notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
        if let Ok(event) = res
            && matches!(
                event.kind,
                notify::EventKind::Create(_)
                    | notify::EventKind::Modify(_)
                    | notify::EventKind::Remove(_)
            )
            && event.paths.iter().any(|p| return is_watched_file(p))
        {
            let _ = tx.send(());
        }
    })
    .map_err(|e| return Error::WatchFailed { reason: e.to_string() });
}

/// Whether a change to this path can change the graph.
fn is_watched_file(path: &Path) -> bool {
    return is_markdown(path) || path.file_name().is_some_and(|name| return name == CONFIG_FILE);
}

/// Render once and report the outcome. Returns the exit code from rendering.
fn render_once(
    root: &Path,
    output: &Path,
    overrides: &GraphOverrides,
    scan: &ScanOptions,
) -> ExitCode {
    return match commands::graph(root, Some(output), overrides, scan) {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::from(3_u8)
        },
    };
}

/// Entry point for the watch command.
///
/// Renders once, then watches `root` recursively and re-renders on changes.
/// A failed render is reported and watching continues.
///
/// # Errors
///
/// Returns `Error::WatchFailed` if the watcher cannot be set up.
pub fn run(
    root: &Path,
    output: &Path,
    overrides: &GraphOverrides,
    scan: &ScanOptions,
) -> Result<ExitCode, Error> {
    eprintln!("watch: initial render");
    let mut last_code = render_once(root, output, overrides, scan);

    let (tx, rx) = crossbeam_channel::unbounded();
    let mut watcher = create_watcher(tx)?;
    watcher
        .watch(root, RecursiveMode::Recursive)
        .map_err(|e| return Error::WatchFailed { reason: e.to_string() })?;

    eprintln!("watch: monitoring {}, press Ctrl+C to stop", root.display());

    while rx.recv().is_ok() {
        let debounce = Duration::from_millis(DEBOUNCE_MS);
        while rx.recv_timeout(debounce).is_ok() {}
        eprintln!("watch: change detected, re-rendering...");
        last_code = render_once(root, output, overrides, scan);
    }

    return Ok(last_code);
}
