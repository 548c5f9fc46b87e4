//! Markdown parsing: a tree-sitter block pass, an inline pass per block, and
//! conversion of both into one owned `MarkdownNode` tree.

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tree_sitter::{Language, Node, Parser, Range, Tree};

use crate::error::Error;
use crate::grammar;
use crate::types::MarkdownNode;

/// Block node kinds whose text is inline content and gets a second parse.
const INLINE_CONTENT_KINDS: &[&str] = &["inline", "pipe_table_cell"];

/// Bracketed link text followed by `(<destination>)`, optionally with a title.
/// The inline grammar reads a destination such as `<notes>` as an HTML tag and
/// leaves only a shortcut link behind; this recovers the inline link.
static ANGLE_DESTINATION: LazyLock<Regex> = LazyLock::new(|| {
    return Regex::new(
        r#"^\([ \t]*<((?:[^<>\r\n\\]|\\.)*)>(?:[ \t]+(?:"[^"]*"|'[^']*'|\([^()]*\)))?[ \t]*\)"#,
    )
    .expect("valid regex");
});

/// Builds the owned tree for one document. Holds the inline parser so it is
/// created once per document rather than once per paragraph.
struct TreeBuilder<'a> {
    /// Link reference definitions keyed by normalized label.
    definitions: HashMap<String, String>,
    /// Document being converted, for error messages.
    file_path: &'a Path,
    /// Parser configured with the inline grammar.
    inline_parser: Parser,
    /// Full document text. Inline trees index into it.
    source: &'a str,
}

impl TreeBuilder<'_> {
    /// Destination written as `(<...>)` right after a shortcut link's brackets.
    /// Also accepts a bare `link_text` node, whose span may exclude the brackets.
    fn angle_destination_after(&self, node: Node<'_>) -> Option<String> {
        let preceding = self.source.get(..node.start_byte())?;
        if preceding.strip_suffix('[').unwrap_or(preceding).ends_with('!') {
            return None;
        }
        let after = self.source.get(node.end_byte()..)?;
        let rest = after.strip_prefix(']').unwrap_or(after);
        let captures = ANGLE_DESTINATION.captures(rest)?;
        return Some(clean_destination(captures.get(1)?.as_str()));
    }

    /// Convert a block-grammar node and everything below it.
    ///
    /// # Errors
    ///
    /// Returns `Error::ParseFailed` if an inline pass fails.
    fn convert_block(&mut self, node: Node<'_>) -> Result<MarkdownNode, Error> {
        if INLINE_CONTENT_KINDS.contains(&node.kind()) {
            return self.convert_inline_content(node);
        }

        let mut children = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            children.push(self.convert_block(child)?);
        }
        return Ok(container_or_leaf(node.kind(), children));
    }

    /// Convert an inline-grammar node. Links become leaves.
    fn convert_inline(&self, node: Node<'_>) -> MarkdownNode {
        if let Some(destination) = self.link_destination(node) {
            return MarkdownNode::Link { destination };
        }

        let mut cursor = node.walk();
        let children = node
            .named_children(&mut cursor)
            .map(|child| return self.convert_inline(child))
            .collect();
        return container_or_leaf(node.kind(), children);
    }

    /// Re-parse the text of one block-level inline node with the inline grammar.
    ///
    /// # Errors
    ///
    /// Returns `Error::ParseFailed` if the ranges are rejected or parsing fails.
    fn convert_inline_content(&mut self, node: Node<'_>) -> Result<MarkdownNode, Error> {
        if node.byte_range().is_empty() {
            return Ok(MarkdownNode::Leaf { kind: node.kind() });
        }

        let ranges = inline_ranges(node);
        self.inline_parser
            .set_included_ranges(&ranges)
            .map_err(|err| return Error::ParseFailed {
                file: self.file_path.to_path_buf(),
                reason: format!("invalid inline ranges: {err:?}"),
            })?;
        let tree = parse_source(&mut self.inline_parser, self.file_path, self.source)?;

        let root = tree.root_node();
        let mut cursor = root.walk();
        let children = root
            .named_children(&mut cursor)
            .map(|child| return self.convert_inline(child))
            .collect();
        return Ok(MarkdownNode::Container { children, kind: node.kind() });
    }

    /// Destination of a link node, or `None` if the node is not a link.
    /// Reference links without a matching definition are plain text.
    fn link_destination(&self, node: Node<'_>) -> Option<String> {
        return match node.kind() {
            "shortcut_link" => self.angle_destination_after(node).or_else(|| {
                return self.lookup_definition(named_child(node, "link_text")?);
            }),
            "collapsed_reference_link" => self.lookup_definition(named_child(node, "link_text")?),
            "full_reference_link" => self.lookup_definition(named_child(node, "link_label")?),
            "inline_link" => Some(
                named_child(node, "link_destination")
                    .and_then(|dest| return node_text(dest, self.source))
                    .map(clean_destination)
                    .unwrap_or_default(),
            ),
            "link_text" => self.angle_destination_after(node),
            _ => None,
        };
    }

    /// Find the destination defined for a reference link label.
    fn lookup_definition(&self, label: Node<'_>) -> Option<String> {
        let key = normalize_label(node_text(label, self.source)?);
        return self.definitions.get(&key).cloned();
    }
}

/// Strip angle brackets and backslash escapes from a raw link destination.
fn clean_destination(raw: &str) -> String {
    let trimmed = raw.trim();
    let unbracketed = trimmed
        .strip_prefix('<')
        .and_then(|rest| return rest.strip_suffix('>'))
        .unwrap_or(trimmed);

    let mut out = String::with_capacity(unbracketed.len());
    let mut chars = unbracketed.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\\'
            && let Some(escaped) = chars.next_if(char::is_ascii_punctuation)
        {
            out.push(escaped);
            continue;
        }
        out.push(ch);
    }
    return out;
}

/// Collect `[label]: destination` definitions. The first definition of a label wins.
fn collect_link_definitions(node: Node<'_>, source: &str, definitions: &mut HashMap<String, String>) {
    if node.kind() == "link_reference_definition" {
        let label = named_child(node, "link_label").and_then(|n| return node_text(n, source));
        let dest = named_child(node, "link_destination").and_then(|n| return node_text(n, source));
        if let (Some(label), Some(dest)) = (label, dest) {
            definitions
                .entry(normalize_label(label))
                .or_insert_with(|| return clean_destination(dest));
        }
        return;
    }

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        collect_link_definitions(child, source, definitions);
    }
}

/// Wrap children in a container, or produce a bare leaf when there are none.
fn container_or_leaf(kind: &'static str, children: Vec<MarkdownNode>) -> MarkdownNode {
    if children.is_empty() {
        return MarkdownNode::Leaf { kind };
    }
    return MarkdownNode::Container { children, kind };
}

/// Byte ranges of an inline node's own text, with its named children
/// (block continuation markers such as `> `) carved out.
fn inline_ranges(node: Node<'_>) -> Vec<Range> {
    let mut ranges = Vec::new();
    let mut current = node.range();

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        let carved = child.range();
        if carved.start_byte > current.start_byte {
            ranges.push(Range {
                end_byte: carved.start_byte,
                end_point: carved.start_point,
                start_byte: current.start_byte,
                start_point: current.start_point,
            });
        }
        current.start_byte = carved.end_byte;
        current.start_point = carved.end_point;
    }

    if current.end_byte > current.start_byte || ranges.is_empty() {
        ranges.push(current);
    }
    return ranges;
}

/// First named child of the given kind.
fn named_child<'tree>(node: Node<'tree>, kind: &str) -> Option<Node<'tree>> {
    let mut cursor = node.walk();
    return node.named_children(&mut cursor).find(|child| return child.kind() == kind);
}

/// Source text covered by a node.
fn node_text<'a>(node: Node<'_>, source: &'a str) -> Option<&'a str> {
    return source.get(node.start_byte()..node.end_byte());
}

/// Create a parser for one of the markdown grammars.
///
/// # Errors
///
/// Returns `Error::ParseFailed` if the grammar cannot be loaded.
fn new_parser(file_path: &Path, language: &Language) -> Result<Parser, Error> {
    let mut parser = Parser::new();
    parser.set_language(language).map_err(|e| return Error::ParseFailed {
        file: file_path.to_path_buf(),
        reason: e.to_string(),
    })?;
    return Ok(parser);
}

/// Reference labels match case-insensitively with internal whitespace collapsed.
fn normalize_label(raw: &str) -> String {
    let inner = raw
        .strip_prefix('[')
        .and_then(|rest| return rest.strip_suffix(']'))
        .unwrap_or(raw);
    return inner.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
}

/// Parse a markdown document into an owned tree of container and link nodes.
///
/// # Errors
///
/// Returns `Error::ParseFailed` if tree-sitter cannot parse it.
pub fn parse_markdown(file_path: &Path, source: &str) -> Result<MarkdownNode, Error> {
    let mut block_parser = new_parser(file_path, &grammar::block_language())?;
    let block_tree = parse_source(&mut block_parser, file_path, source)?;
    let root = block_tree.root_node();

    let mut definitions = HashMap::new();
    collect_link_definitions(root, source, &mut definitions);

    let mut builder = TreeBuilder {
        definitions,
        file_path,
        inline_parser: new_parser(file_path, &grammar::inline_language())?,
        source,
    };
    return builder.convert_block(root);
}

/// Read a markdown document from disk and parse it.
///
/// # Errors
///
/// Returns `Error::ReadFailed` if the file cannot be read,
/// or any error from `parse_markdown`.
pub fn parse_markdown_file(path: &Path) -> Result<MarkdownNode, Error> {
    let source = std::fs::read_to_string(path).map_err(|source| return Error::ReadFailed {
        path: path.to_path_buf(),
        source,
    })?;
    return parse_markdown(path, &source);
}

/// Run a configured parser over the full document text.
///
/// # Errors
///
/// Returns `Error::ParseFailed` if tree-sitter returns no tree.
fn parse_source(parser: &mut Parser, file_path: &Path, source: &str) -> Result<Tree, Error> {
    return parser.parse(source, None).ok_or_else(|| return Error::ParseFailed {
        file: file_path.to_path_buf(),
        reason: "tree-sitter returned None".to_string(),
    });
}
