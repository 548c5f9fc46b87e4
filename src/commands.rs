//! Core CLI commands for linkmark: links and graph.

use std::path::Path;
use std::process::ExitCode;

use linkmark::config::{self, Config};
use linkmark::graph::render_dot;
use linkmark::{
    DocumentFailure, Error, ErrorPolicy, IndexOptions, OutOfRoot, build_link_index,
    build_relative_link_index,
};

/// Command-line overrides for the graph style in `.linkmark.toml`.
#[derive(Debug, Clone, Default)]
pub struct GraphOverrides {
    /// Layout engine name.
    pub layout: Option<String>,
    /// Built-in palette name.
    pub palette: Option<String>,
}

/// Command-line additions to the index options in `.linkmark.toml`.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Extra exclusions, appended to the configured ones.
    pub exclude: Vec<String>,
    /// Overrides `on_error`.
    pub on_error: Option<ErrorPolicy>,
    /// Overrides `out_of_root`.
    pub out_of_root: Option<OutOfRoot>,
}

/// Render the link graph and write it to `output`, or stdout when `None`.
///
/// # Errors
///
/// Returns errors from config loading, index building, or writing the output.
pub fn graph(
    root: &Path,
    output: Option<&Path>,
    overrides: &GraphOverrides,
    scan: &ScanOptions,
) -> Result<ExitCode, Error> {
    let (dot, failures) = render_graph(root, overrides, scan)?;
    match output {
        Some(path) => {
            std::fs::write(path, dot)?;
            eprintln!("Wrote graph to {}", path.display());
        },
        None => print!("{dot}"),
    }
    return Ok(report_failures(&failures));
}

/// Merge config and command-line scan options.
fn index_options(config: &Config, scan: &ScanOptions) -> IndexOptions {
    let mut options = config.index_options(&scan.exclude);
    if let Some(policy) = scan.on_error {
        options.on_error = policy;
    }
    if let Some(policy) = scan.out_of_root {
        options.out_of_root = policy;
    }
    return options;
}

/// Print the link index under `root` as pretty JSON on stdout.
///
/// # Errors
///
/// Returns errors from config loading, index building, or serialization.
pub fn links(root: &Path, absolute: bool, scan: &ScanOptions) -> Result<ExitCode, Error> {
    let config = Config::load(root)?;
    let options = index_options(&config, scan);
    let report = if absolute {
        build_link_index(root, &options)?
    } else {
        build_relative_link_index(root, &options)?
    };

    let json = serde_json::to_string_pretty(&report.index)?;
    println!("{json}");
    return Ok(report_failures(&report.failures));
}

/// Build the root-relative index and render it as DOT.
/// Returns the DOT text and any documents skipped along the way.
///
/// # Errors
///
/// Returns errors from config loading, style validation, or index building.
pub fn render_graph(
    root: &Path,
    overrides: &GraphOverrides,
    scan: &ScanOptions,
) -> Result<(String, Vec<DocumentFailure>), Error> {
    let config = Config::load(root)?;
    let mut style = config.graph.clone();
    if let Some(name) = &overrides.palette {
        style.palette = config::resolve_palette(name)?;
    }
    if let Some(layout) = &overrides.layout {
        style.layout.clone_from(layout);
    }
    config::validate_style(&style)?;

    let report = build_relative_link_index(root, &index_options(&config, scan))?;
    let dangling = report.index.dangling().len();
    if dangling > 0 {
        tracing::info!(dangling, "edges to documents outside the graph were left out");
    }
    return Ok((render_dot(&report.index, &style), report.failures));
}

/// Print skipped documents to stderr. Exit code 2 if there were any.
fn report_failures(failures: &[DocumentFailure]) -> ExitCode {
    if failures.is_empty() {
        return ExitCode::SUCCESS;
    }

    eprintln!("## Skipped\n");
    for failure in failures {
        eprintln!("- {}: {}", failure.path.display(), failure.reason);
    }
    eprintln!();
    return ExitCode::from(2);
}
