use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::Error;

/// File extension of documents linkmark scans.
pub const MARKDOWN_EXTENSION: &str = "md";

/// Check whether a path names a markdown document.
pub fn is_markdown(path: &Path) -> bool {
    return path.extension().is_some_and(|ext| return ext == MARKDOWN_EXTENSION);
}

/// List every markdown document under `root`, including subdirectories.
/// Paths are `root` joined with each document's relative location.
/// Order follows file names within each directory but callers should not rely on it.
///
/// # Errors
///
/// Returns `Error::RootNotFound` if `root` is not a directory,
/// or `Error::Walk` if a directory below it cannot be read.
pub fn list_markdown_files(root: &Path) -> Result<Vec<PathBuf>, Error> {
    if !root.is_dir() {
        return Err(Error::RootNotFound { path: root.to_path_buf() });
    }

    let mut documents = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_dir() || !is_markdown(entry.path()) {
            continue;
        }
        documents.push(entry.into_path());
    }

    tracing::debug!(root = %root.display(), count = documents.len(), "listed markdown documents");
    return Ok(documents);
}
