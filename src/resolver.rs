//! Link resolution: raw destinations as written in a document become
//! normalized filesystem paths, optionally relative to a root.

use std::path::{Component, Path, PathBuf};

use crate::error::Error;

/// Suffix appended to links that omit it.
pub const MARKDOWN_SUFFIX: &str = ".md";

/// Collapse `.` and `..` components in a path without touching the filesystem.
/// Preserves leading `..` on relative paths when there is nothing left to pop,
/// and drops `..` directly under the filesystem root.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        push_normalized_component(&mut components, component);
    }
    return components.iter().collect();
}

/// Handle a single path component during normalization.
fn push_normalized_component<'a>(components: &mut Vec<Component<'a>>, component: Component<'a>) {
    match component {
        Component::CurDir => {},
        Component::ParentDir => match components.last() {
            Some(Component::Normal(_)) => {
                components.pop();
            },
            Some(Component::Prefix(_) | Component::RootDir) => {},
            Some(Component::CurDir | Component::ParentDir) | None => components.push(component),
        },
        Component::Normal(_) | Component::Prefix(_) | Component::RootDir => components.push(component),
    }
}

/// Rewrite `path` relative to `root`.
///
/// # Errors
///
/// Returns `Error::OutsideRoot` if `path` does not lie under `root`.
pub fn relativize(path: &Path, root: &Path) -> Result<PathBuf, Error> {
    return path
        .strip_prefix(root)
        .map(Path::to_path_buf)
        .map_err(|_err| return Error::OutsideRoot {
            path: path.to_path_buf(),
            root: root.to_path_buf(),
        });
}

/// Resolve a link as written in `linked_from` into a normalized path.
///
/// The link is taken relative to the linking document's own directory, the
/// way markdown renderers follow relative links. A missing `.md` suffix is
/// appended. The result may lie outside any root when the link climbs with `..`.
pub fn resolve_link(link: &str, linked_from: &Path) -> PathBuf {
    let source_dir = linked_from.parent().unwrap_or_else(|| return Path::new(""));
    let joined = if link.ends_with(MARKDOWN_SUFFIX) {
        source_dir.join(link)
    } else {
        source_dir.join(format!("{link}{MARKDOWN_SUFFIX}"))
    };
    return normalize_path(&joined);
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use super::*;

    #[test]
    fn bare_filename_is_a_sibling() {
        let from = Path::new("/wiki/dir/doc.md");
        assert_eq!(resolve_link("other", from), PathBuf::from("/wiki/dir/other.md"));
        assert_eq!(resolve_link("other.md", from), PathBuf::from("/wiki/dir/other.md"));
    }

    #[test]
    fn parent_traversal() {
        let from = Path::new("a/b/doc.md");
        assert_eq!(resolve_link("../x", from), PathBuf::from("a/x.md"));
    }

    #[test]
    fn current_dir_segments_collapse() {
        let from = Path::new("/wiki/doc.md");
        assert_eq!(resolve_link("./sub/./page", from), PathBuf::from("/wiki/sub/page.md"));
    }

    #[test]
    fn suffix_only_checked_at_end() {
        let from = Path::new("/wiki/doc.md");
        assert_eq!(resolve_link("notes.md.bak", from), PathBuf::from("/wiki/notes.md.bak.md"));
    }

    #[test]
    fn climbing_past_relative_start_is_kept() {
        let from = Path::new("doc.md");
        assert_eq!(resolve_link("../../up", from), PathBuf::from("../../up.md"));
    }

    #[test]
    fn leading_slash_replaces_document_directory() {
        let from = Path::new("/wiki/dir/doc.md");
        assert_eq!(resolve_link("/x", from), PathBuf::from("/x.md"));
        assert_eq!(resolve_link("/top/../y.md", from), PathBuf::from("/y.md"));
    }

    #[test]
    fn climbing_past_filesystem_root_stops_at_root() {
        assert_eq!(normalize_path(Path::new("/a/../../b")), PathBuf::from("/b"));
    }

    #[test]
    fn relativize_then_rejoin_round_trips() {
        let root = Path::new("/wiki");
        let resolved = resolve_link("../notes/today", Path::new("/wiki/diary/index.md"));
        let relative = relativize(&resolved, root).unwrap();
        assert_eq!(relative, PathBuf::from("notes/today.md"));
        assert_eq!(root.join(&relative), resolved);
    }

    #[test]
    fn relativize_outside_root_fails() {
        let root = Path::new("/wiki/sub");
        let resolved = resolve_link("../escape", Path::new("/wiki/sub/doc.md"));
        let err = relativize(&resolved, root).unwrap_err();
        assert!(matches!(
            err,
            Error::OutsideRoot { path, .. } if path == Path::new("/wiki/escape.md")
        ));
    }
}
