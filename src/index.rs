//! Link index: which documents link to which, built in one pass over a root.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Error;
use crate::extractor;
use crate::lister;
use crate::markdown;
use crate::resolver;
use crate::types::{DocumentFailure, ErrorPolicy, OutOfRoot};

/// Outcome of an index build: the index plus any documents skipped under
/// `ErrorPolicy::Continue`. Under `ErrorPolicy::Abort`, `failures` is always empty.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    /// Documents that failed to read or parse and were left out.
    pub failures: Vec<DocumentFailure>,
    /// The assembled link index.
    pub index: LinkIndex,
}

/// Inputs to an index build besides the root directory.
#[derive(Debug, Clone, Default)]
pub struct IndexOptions {
    /// Root-relative document identifiers to leave out, e.g. `diary/diary.md`.
    pub excluded: Vec<String>,
    /// Abort on the first bad document, or skip it.
    pub on_error: ErrorPolicy,
    /// Fail or drop links that leave the root when relativizing.
    pub out_of_root: OutOfRoot,
}

/// Mapping from each document to the documents it links to, in the order
/// the links appear. Duplicate targets are kept. Targets need not be keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LinkIndex {
    /// Document path to ordered link targets.
    links: BTreeMap<PathBuf, Vec<PathBuf>>,
}

impl LinkIndex {
    /// Whether `document` is a key.
    pub fn contains(&self, document: &Path) -> bool {
        return self.links.contains_key(document);
    }

    /// Edges whose target is not a key: excluded, missing, or outside the root.
    pub fn dangling(&self) -> Vec<(&Path, &Path)> {
        let mut edges = Vec::new();
        for (document, targets) in &self.links {
            for target in targets {
                if !self.links.contains_key(target) {
                    edges.push((document.as_path(), target.as_path()));
                }
            }
        }
        return edges;
    }

    /// Link targets of one document.
    pub fn get(&self, document: &Path) -> Option<&[PathBuf]> {
        return self.links.get(document).map(Vec::as_slice);
    }

    /// Insert or replace a document's link targets.
    pub fn insert(&mut self, document: PathBuf, targets: Vec<PathBuf>) {
        self.links.insert(document, targets);
    }

    /// Whether the index has no documents.
    pub fn is_empty(&self) -> bool {
        return self.links.is_empty();
    }

    /// Documents and their targets, ordered by document path.
    pub fn iter(&self) -> impl Iterator<Item = (&Path, &[PathBuf])> {
        return self
            .links
            .iter()
            .map(|(document, targets)| return (document.as_path(), targets.as_slice()));
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        return self.links.len();
    }

    /// Apply `transform` to every key and every value.
    pub fn map_paths<F>(&self, mut transform: F) -> Self
    where
        F: FnMut(&Path) -> PathBuf,
    {
        let mut links = BTreeMap::new();
        for (document, targets) in &self.links {
            let mapped: Vec<PathBuf> = targets.iter().map(|target| return transform(target)).collect();
            links.insert(transform(document), mapped);
        }
        return Self { links };
    }

    /// Rewrite every key and value relative to `root`.
    ///
    /// # Errors
    ///
    /// Returns `Error::OutsideRoot` if a key lies outside `root`, or if a
    /// value does and `out_of_root` is `OutOfRoot::Fail`.
    pub fn relativize(&self, root: &Path, out_of_root: OutOfRoot) -> Result<Self, Error> {
        if out_of_root == OutOfRoot::Fail {
            return self.try_map_paths(|path| return resolver::relativize(path, root));
        }

        let mut links = BTreeMap::new();
        for (document, targets) in &self.links {
            let mut kept = Vec::with_capacity(targets.len());
            for target in targets {
                match resolver::relativize(target, root) {
                    Ok(relative) => kept.push(relative),
                    Err(_) => tracing::warn!(
                        document = %document.display(),
                        target = %target.display(),
                        "dropping link outside root"
                    ),
                }
            }
            links.insert(resolver::relativize(document, root)?, kept);
        }
        return Ok(Self { links });
    }

    /// Apply a fallible `transform` to every key and every value.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `transform`.
    pub fn try_map_paths<F>(&self, mut transform: F) -> Result<Self, Error>
    where
        F: FnMut(&Path) -> Result<PathBuf, Error>,
    {
        let mut links = BTreeMap::new();
        for (document, targets) in &self.links {
            let mapped = targets
                .iter()
                .map(|target| return transform(target))
                .collect::<Result<Vec<_>, _>>()?;
            links.insert(transform(document)?, mapped);
        }
        return Ok(Self { links });
    }
}

impl FromIterator<(PathBuf, Vec<PathBuf>)> for LinkIndex {
    fn from_iter<I: IntoIterator<Item = (PathBuf, Vec<PathBuf>)>>(iter: I) -> Self {
        return Self { links: iter.into_iter().collect() };
    }
}

/// Make the root absolute and normalized so keys and resolved links share one form.
///
/// # Errors
///
/// Returns `Error::Io` if the current directory cannot be read.
pub fn absolute_root(root: &Path) -> Result<PathBuf, Error> {
    return Ok(resolver::normalize_path(&std::path::absolute(root)?));
}

/// Find links between markdown documents under `root`.
/// Keys and values are absolute, normalized paths.
///
/// # Errors
///
/// Returns `Error::RootNotFound` or `Error::Walk` if the tree cannot be listed.
/// Under `ErrorPolicy::Abort`, also returns the first read or parse failure.
pub fn build_link_index(root: &Path, options: &IndexOptions) -> Result<BuildReport, Error> {
    let root = absolute_root(root)?;
    let documents = lister::list_markdown_files(&root)?;

    let mut report = BuildReport::default();
    for document in documents {
        let links = match links_for_document(&document) {
            Ok(links) => links,
            Err(e) if options.on_error == ErrorPolicy::Continue => {
                tracing::warn!(document = %document.display(), error = %e, "skipping document");
                report.failures.push(DocumentFailure { path: document, reason: e.to_string() });
                continue;
            },
            Err(e) => return Err(e),
        };

        if is_excluded(&document, &root, &options.excluded) {
            tracing::debug!(document = %document.display(), "excluded");
            continue;
        }
        report.index.insert(document, links);
    }

    warn_on_unmatched_exclusions(&report, &root, &options.excluded);
    tracing::info!(
        documents = report.index.len(),
        skipped = report.failures.len(),
        "built link index"
    );
    return Ok(report);
}

/// Find links between markdown documents under `root`, with every key and
/// value relative to `root`.
///
/// # Errors
///
/// Returns any error from `build_link_index`, or `Error::OutsideRoot` if a
/// link escapes the root and `options.out_of_root` is `OutOfRoot::Fail`.
pub fn build_relative_link_index(root: &Path, options: &IndexOptions) -> Result<BuildReport, Error> {
    let mut report = build_link_index(root, options)?;
    let root = absolute_root(root)?;
    report.index = report.index.relativize(&root, options.out_of_root)?;
    for failure in &mut report.failures {
        if let Ok(relative) = resolver::relativize(&failure.path, &root) {
            failure.path = relative;
        }
    }
    return Ok(report);
}

/// Whether a document's root-relative path string exactly matches an exclusion.
fn is_excluded(document: &Path, root: &Path, excluded: &[String]) -> bool {
    let Ok(relative) = document.strip_prefix(root) else {
        return false;
    };
    let relative = relative.to_string_lossy();
    return excluded.iter().any(|e| return *e == relative);
}

/// Parse one document and resolve its internal links against it.
/// The parse tree is dropped before returning.
///
/// # Errors
///
/// Returns `Error::ReadFailed` or `Error::ParseFailed`.
fn links_for_document(document: &Path) -> Result<Vec<PathBuf>, Error> {
    let tree = markdown::parse_markdown_file(document)?;
    let raw = extractor::find_links(&tree);
    tracing::debug!(document = %document.display(), links = raw.len(), "extracted links");
    return Ok(raw
        .iter()
        .map(|link| return resolver::resolve_link(link, document))
        .collect());
}

/// Log exclusions that named no discovered document. Usually a typo.
fn warn_on_unmatched_exclusions(report: &BuildReport, root: &Path, excluded: &[String]) {
    for exclusion in excluded {
        let path = root.join(exclusion);
        let failed = report.failures.iter().any(|f| return f.path == path);
        if !path.is_file() && !failed {
            tracing::warn!(exclusion = %exclusion, "exclusion matches no document");
        }
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use super::*;

    fn index_of(entries: Vec<(&str, Vec<&str>)>) -> LinkIndex {
        return entries
            .into_iter()
            .map(|(doc, targets)| {
                return (PathBuf::from(doc), targets.into_iter().map(PathBuf::from).collect::<Vec<_>>());
            })
            .collect();
    }

    #[test]
    fn dangling_lists_targets_that_are_not_keys() {
        let index = index_of(vec![("a.md", vec!["b.md", "gone.md"]), ("b.md", vec!["a.md"])]);
        assert_eq!(index.dangling(), vec![(Path::new("a.md"), Path::new("gone.md"))]);
    }

    #[test]
    fn map_paths_touches_keys_and_values() {
        let index = index_of(vec![("a.md", vec!["b.md"])]);
        let mapped = index.map_paths(|p| return Path::new("/r").join(p));
        assert_eq!(mapped.get(Path::new("/r/a.md")), Some(&[PathBuf::from("/r/b.md")][..]));
    }

    #[test]
    fn relativize_fail_policy_errors_on_escape() {
        let index = index_of(vec![("/r/a.md", vec!["/r/b.md", "/elsewhere/c.md"])]);
        let err = index.relativize(Path::new("/r"), OutOfRoot::Fail).unwrap_err();
        assert!(matches!(err, Error::OutsideRoot { .. }));
    }

    #[test]
    fn relativize_drop_policy_removes_escaping_edges() {
        let index = index_of(vec![("/r/a.md", vec!["/r/b.md", "/elsewhere/c.md", "/r/b.md"])]);
        let relative = index.relativize(Path::new("/r"), OutOfRoot::Drop).unwrap();
        assert_eq!(relative, index_of(vec![("a.md", vec!["b.md", "b.md"])]));
    }

    #[test]
    fn exclusion_matches_whole_relative_path() {
        let root = Path::new("/r");
        let excluded = vec!["diary/diary.md".to_string()];
        assert!(is_excluded(Path::new("/r/diary/diary.md"), root, &excluded));
        assert!(!is_excluded(Path::new("/r/diary.md"), root, &excluded));
        assert!(!is_excluded(Path::new("/r/other/diary/diary.md"), root, &excluded));
    }

    #[test]
    fn serializes_as_plain_map() {
        let index = index_of(vec![("a.md", vec!["b.md"]), ("b.md", vec![])]);
        let json = serde_json::to_string(&index).unwrap();
        assert_eq!(json, r#"{"a.md":["b.md"],"b.md":[]}"#);
    }
}
