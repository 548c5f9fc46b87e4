/// Core domain types: the owned markdown tree and the node capability the
/// link extractor walks.
use std::path::PathBuf;

/// The only capability link extraction needs from a parsed document.
/// Any parser that can expose ordered children and link destinations can back it.
pub trait LinkNode: Sized {
    /// Ordered child nodes. Leaves return an empty slice.
    fn children(&self) -> &[Self];

    /// Raw destination if this node is a link, exactly as written in the document.
    fn destination(&self) -> Option<&str>;
}

/// One node of a parsed markdown document. Each node owns its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkdownNode {
    /// Block or inline node with ordered children and no payload.
    Container {
        /// Child nodes in document order.
        children: Vec<MarkdownNode>,
        /// Grammar node kind, e.g. `paragraph` or `emphasis`.
        kind: &'static str,
    },
    /// Node with no children and no payload.
    Leaf {
        /// Grammar node kind.
        kind: &'static str,
    },
    /// Inline link leaf.
    Link {
        /// Destination with angle brackets and backslash escapes removed.
        destination: String,
    },
}

impl LinkNode for MarkdownNode {
    fn children(&self) -> &[Self] {
        return match self {
            MarkdownNode::Container { children, .. } => children.as_slice(),
            MarkdownNode::Leaf { .. } | MarkdownNode::Link { .. } => &[],
        };
    }

    fn destination(&self) -> Option<&str> {
        return match self {
            MarkdownNode::Link { destination } => Some(destination.as_str()),
            MarkdownNode::Container { .. } | MarkdownNode::Leaf { .. } => None,
        };
    }
}

/// A document that was skipped because it failed to read or parse.
/// Only produced under `ErrorPolicy::Continue`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFailure {
    /// Absolute path of the failed document.
    pub path: PathBuf,
    /// Rendered error message.
    pub reason: String,
}

/// What to do when one document cannot be read or parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Fail the whole build on the first error.
    #[default]
    Abort,
    /// Skip the document, record it, and keep going.
    Continue,
}

/// What to do with a link target outside the root during relativization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutOfRoot {
    /// Remove the edge and log it.
    Drop,
    /// Fail with `Error::OutsideRoot`.
    #[default]
    Fail,
}
