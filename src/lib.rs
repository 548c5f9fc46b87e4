//! Map cross-document links in a tree of markdown files.
//!
//! The pipeline lists documents under a root, parses each with tree-sitter,
//! pulls out internal link destinations, and resolves them against the
//! linking document's directory:
//!
//! ```no_run
//! use std::path::Path;
//!
//! let options = linkmark::IndexOptions {
//!     excluded: vec!["index.md".to_string()],
//!     ..linkmark::IndexOptions::default()
//! };
//! let report = linkmark::build_relative_link_index(Path::new("wiki"), &options)?;
//! for (document, targets) in report.index.iter() {
//!     println!("{} -> {targets:?}", document.display());
//! }
//! # Ok::<(), linkmark::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod extractor;
pub mod graph;
pub mod index;
pub mod lister;
pub mod markdown;
pub mod resolver;
pub mod types;

mod grammar;

pub use error::Error;
pub use index::{BuildReport, IndexOptions, LinkIndex, build_link_index, build_relative_link_index};
pub use types::{DocumentFailure, ErrorPolicy, LinkNode, MarkdownNode, OutOfRoot};
