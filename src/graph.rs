//! Graphviz projection of a link index: one filled node per document,
//! colored by its parent directory, and one edge per link between documents.

use std::fmt::Write as _;
use std::path::Path;

use sha2::{Digest as _, Sha256};

use crate::index::LinkIndex;

/// Default graph background.
pub const DEFAULT_BACKGROUND: &str = "#838584";

/// Default edge color.
pub const DEFAULT_EDGE_COLOR: &str = "#000000";

/// Default Graphviz layout engine (force-directed).
pub const DEFAULT_LAYOUT: &str = "sfdp";

/// Default palette name.
pub const DEFAULT_PALETTE: &str = "pastel";

/// Soft five-color set.
pub const PASTEL: &[&str] = &["#cdb4db", "#ffc8dd", "#ffafcc", "#bde0fe", "#a2d2ff"];

/// Dark teal through rust, ten colors.
pub const SHMOOP: &[&str] = &[
    "#001219", "#005f73", "#0a9396", "#94d2bd", "#e9d8a6", "#ee9b00", "#ca6702", "#bb3e03",
    "#ae2012", "#9b2226",
];

/// Saturated blue through red, eight colors.
pub const SHMOOP2: &[&str] = &[
    "#34d1ff", "#349dff", "#346aff", "#3437ff", "#6334ff", "#c934ff", "#ff349d", "#ff3437",
];

/// Visual settings for the rendered graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphStyle {
    /// Graph background color.
    pub background: String,
    /// Color of every edge.
    pub edge_color: String,
    /// Graphviz layout engine, e.g. `sfdp`, `dot`, `circo`.
    pub layout: String,
    /// Node fill colors, picked by parent directory.
    pub palette: Vec<String>,
}

impl Default for GraphStyle {
    fn default() -> Self {
        return Self {
            background: DEFAULT_BACKGROUND.to_string(),
            edge_color: DEFAULT_EDGE_COLOR.to_string(),
            layout: DEFAULT_LAYOUT.to_string(),
            palette: PASTEL.iter().map(|c| return (*c).to_string()).collect(),
        };
    }
}

/// Look up a built-in palette by name.
pub fn named_palette(name: &str) -> Option<&'static [&'static str]> {
    return match name {
        "pastel" => Some(PASTEL),
        "shmoop" => Some(SHMOOP),
        "shmoop2" => Some(SHMOOP2),
        _ => None,
    };
}

/// Pick a palette color for a node from a hash of its parent directory.
/// Documents in the same directory always share a color, regardless of
/// which other documents are in the graph.
pub fn node_color<'p>(node: &Path, palette: &'p [String]) -> Option<&'p str> {
    let dir = node.parent().map(|p| return p.to_string_lossy()).unwrap_or_default();
    let digest = Sha256::digest(dir.as_bytes());
    let prefix: [u8; 8] = digest.get(..8)?.try_into().ok()?;
    let len = u64::try_from(palette.len()).ok()?;
    let slot = usize::try_from(u64::from_be_bytes(prefix).checked_rem(len)?).ok()?;
    return palette.get(slot).map(String::as_str);
}

/// Quote a string as a DOT identifier.
fn quote(id: &str) -> String {
    let mut out = String::with_capacity(id.len().saturating_add(2));
    out.push('"');
    for ch in id.chars() {
        if ch == '"' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('"');
    return out;
}

/// Render the index as a Graphviz digraph.
///
/// Edges to documents that are not nodes (excluded, missing, or outside the
/// root) are left out and logged at debug level.
pub fn render_dot(index: &LinkIndex, style: &GraphStyle) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "digraph links {{");
    let _ = writeln!(out, "    layout={};", quote(&style.layout));
    let _ = writeln!(out, "    bgcolor={};", quote(&style.background));
    let _ = writeln!(out, "    node [style=filled];");
    let _ = writeln!(out, "    edge [color={}];", quote(&style.edge_color));

    for (document, _) in index.iter() {
        let name = quote(&document.to_string_lossy());
        match node_color(document, &style.palette) {
            Some(color) => {
                let _ = writeln!(out, "    {name} [fillcolor={}];", quote(color));
            },
            None => {
                let _ = writeln!(out, "    {name};");
            },
        }
    }

    for (document, targets) in index.iter() {
        for target in targets {
            if !index.contains(target) {
                tracing::debug!(
                    from = %document.display(),
                    to = %target.display(),
                    "skipping dangling edge"
                );
                continue;
            }
            let _ = writeln!(
                out,
                "    {} -> {};",
                quote(&document.to_string_lossy()),
                quote(&target.to_string_lossy())
            );
        }
    }

    out.push_str("}\n");
    return out;
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn palette() -> Vec<String> {
        return GraphStyle::default().palette;
    }

    #[test]
    fn same_directory_same_color() {
        let palette = palette();
        let a = node_color(Path::new("diary/a.md"), &palette);
        let b = node_color(Path::new("diary/b.md"), &palette);
        assert!(a.is_some());
        assert_eq!(a, b);
    }

    #[test]
    fn color_comes_from_palette() {
        let palette = vec!["#111111".to_string()];
        assert_eq!(node_color(Path::new("x/y.md"), &palette), Some("#111111"));
        assert_eq!(node_color(Path::new("top.md"), &palette), Some("#111111"));
    }

    #[test]
    fn empty_palette_gives_no_color() {
        assert_eq!(node_color(Path::new("a.md"), &[]), None);
    }

    #[test]
    fn named_palettes() {
        assert_eq!(named_palette("pastel").map(<[_]>::len), Some(5));
        assert_eq!(named_palette("shmoop").map(<[_]>::len), Some(10));
        assert_eq!(named_palette("shmoop2").map(<[_]>::len), Some(8));
        assert!(named_palette("neon").is_none());
    }

    #[test]
    fn dot_has_nodes_edges_and_style() {
        let index: LinkIndex = vec![
            (PathBuf::from("index.md"), vec![PathBuf::from("sub/a.md"), PathBuf::from("gone.md")]),
            (PathBuf::from("sub/a.md"), vec![]),
        ]
        .into_iter()
        .collect();

        let dot = render_dot(&index, &GraphStyle::default());
        assert!(dot.starts_with("digraph links {\n"));
        assert!(dot.contains("layout=\"sfdp\";"));
        assert!(dot.contains("bgcolor=\"#838584\";"));
        assert!(dot.contains("edge [color=\"#000000\"];"));
        assert!(dot.contains("\"index.md\" [fillcolor="));
        assert!(dot.contains("\"index.md\" -> \"sub/a.md\";"));
        assert!(!dot.contains("gone.md"));
        assert!(dot.ends_with("}\n"));
    }

    #[test]
    fn quotes_are_escaped() {
        assert_eq!(quote(r#"we"ird\name"#), r#""we\"ird\\name""#);
    }
}
