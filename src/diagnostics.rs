use std::path::Path;

use linkmark::Error;
use linkmark::config::CONFIG_FILE;

/// ANSI bold.
const BOLD: &str = "\x1b[1m";
/// ANSI reset.
const RESET: &str = "\x1b[0m";

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic.
///
/// Each variant produces a block with what happened and, where there is one,
/// how to fix it.
pub fn render_error(e: &Error) -> String {
    return match e {
        Error::ConfigInvalid { reason } => render_config_invalid(reason),
        Error::OutsideRoot { path, root } => render_outside_root(path, root),
        Error::RootNotFound { path } => render_root_not_found(path),
        Error::UnknownExclusion { file } => render_unknown_exclusion(file),
        Error::UnknownPalette { name } => render_unknown_palette(name),
        _ => render_generic(e),
    };
}

/// Variants that need no fix section.
fn render_generic(e: &Error) -> String {
    return match e {
        Error::Io(err) => format!("\
# Error: I/O

{err}
"),

        Error::Json(err) => format!("\
# Error: JSON Output

{err}
"),

        Error::ParseFailed { file, reason } => format!("\
# Error: Parse Failed

Could not parse `{}`: {reason}
", file.display()),

        Error::ReadFailed { path, source } => format!("\
# Error: Unreadable Document

`{}` could not be read: {source}

## Fix

Skip unreadable documents and index the rest:

    linkmark links --on-error continue
", path.display()),

        Error::TomlDe(err) => format!("\
# Error: Invalid {CONFIG_FILE}

{err}
"),

        Error::Walk(err) => format!("\
# Error: Directory Traversal

{err}
"),

        Error::WatchFailed { reason } => format!("\
# Error: Watch Failed

{reason}
"),

        // Already handled in render_error, but need exhaustive match.
        _ => format!("\
# Error

{e}
"),
    };
}

/// Bad value in the config file.
fn render_config_invalid(reason: &str) -> String {
    return format!("\
# Error: Invalid {CONFIG_FILE}

{reason}

## Fix

Colors are `#rrggbb`. Built-in palettes: `pastel`, `shmoop`, `shmoop2`.
");
}

/// A link climbed out of the root while relativizing.
fn render_outside_root(path: &Path, root: &Path) -> String {
    return format!("\
# Error: Link Outside Root

`{}` resolves outside `{}`.

## Fix

Drop such links instead of failing:

    linkmark links --out-of-root drop

Or set `out_of_root = \"drop\"` in `{CONFIG_FILE}`.
", path.display(), root.display());
}

/// Root directory missing.
fn render_root_not_found(path: &Path) -> String {
    return format!("\
# Error: Root Not Found

`{}` does not exist or is not a directory.
", path.display());
}

/// Tried to remove an exclusion that isn't configured.
fn render_unknown_exclusion(file: &str) -> String {
    return format!("\
# Error: Not Excluded

`{file}` is not in the exclusion list.

## Fix

List current exclusions:

    linkmark exclude list
");
}

/// Palette name not recognized.
fn render_unknown_palette(name: &str) -> String {
    return format!("\
# Error: Unknown Palette

No palette named `{name}`.

## Available palettes

- `pastel` (default)
- `shmoop`
- `shmoop2`
");
}
