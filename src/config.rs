use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::Error;
use crate::graph::{self, GraphStyle};
use crate::index::IndexOptions;
use crate::types::{ErrorPolicy, OutOfRoot};

/// Name of the config file looked up in the root directory.
pub const CONFIG_FILE: &str = ".linkmark.toml";

/// Colors must be `#rrggbb`.
static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"^#[0-9a-fA-F]{6}$").expect("valid regex"));

/// Project configuration loaded from `.linkmark.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Root-relative document identifiers left out of the index.
    pub exclude: Vec<String>,
    /// How the rendered graph looks.
    pub graph: GraphStyle,
    /// Abort on the first bad document, or skip it.
    pub on_error: ErrorPolicy,
    /// Fail or drop links that leave the root.
    pub out_of_root: OutOfRoot,
}

/// Raw TOML structure for `.linkmark.toml`.
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct LinkmarkTomlConfig {
    #[serde(default)]
    exclude: Vec<String>,
    #[serde(default)]
    graph: GraphTomlConfig,
    #[serde(default)]
    on_error: ErrorPolicy,
    #[serde(default)]
    out_of_root: OutOfRoot,
}

/// Raw `[graph]` table. Unset keys fall back to `GraphStyle::default()`.
#[derive(Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct GraphTomlConfig {
    background: Option<String>,
    edge_color: Option<String>,
    layout: Option<String>,
    palette: Option<PaletteSetting>,
}

/// A palette given by name or as an explicit color list.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum PaletteSetting {
    /// Inline list of colors.
    Colors(Vec<String>),
    /// One of the built-in palette names.
    Named(String),
}

impl Config {
    /// Index options for this config, with extra exclusions appended.
    pub fn index_options(&self, extra_excluded: &[String]) -> IndexOptions {
        let mut excluded = self.exclude.clone();
        excluded.extend(extra_excluded.iter().cloned());
        return IndexOptions {
            excluded,
            on_error: self.on_error,
            out_of_root: self.out_of_root,
        };
    }

    /// Load config from `.linkmark.toml` in the given root directory.
    /// Returns defaults if the file doesn't exist.
    /// Returns an error if the file exists but is malformed; never silently
    /// falls back to defaults when the user wrote a config file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// `Error::TomlDe` if the TOML is malformed,
    /// `Error::UnknownPalette` for an unrecognized palette name,
    /// or `Error::ConfigInvalid` for a bad color.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::Io(e)),
        };
        return Self::parse(&content);
    }

    /// Parse config from TOML text.
    ///
    /// # Errors
    ///
    /// Same as `Config::load`, minus I/O.
    pub fn parse(content: &str) -> Result<Self, Error> {
        let raw: LinkmarkTomlConfig = toml::from_str(content)?;
        let defaults = GraphStyle::default();

        let palette = match raw.graph.palette {
            None => defaults.palette,
            Some(PaletteSetting::Named(name)) => resolve_palette(&name)?,
            Some(PaletteSetting::Colors(colors)) => colors,
        };
        let style = GraphStyle {
            background: raw.graph.background.unwrap_or(defaults.background),
            edge_color: raw.graph.edge_color.unwrap_or(defaults.edge_color),
            layout: raw.graph.layout.unwrap_or(defaults.layout),
            palette,
        };
        validate_style(&style)?;

        return Ok(Self {
            exclude: raw.exclude,
            graph: style,
            on_error: raw.on_error,
            out_of_root: raw.out_of_root,
        });
    }
}

/// Expand a built-in palette name into its colors.
///
/// # Errors
///
/// Returns `Error::UnknownPalette` if no palette has that name.
pub fn resolve_palette(name: &str) -> Result<Vec<String>, Error> {
    let colors = graph::named_palette(name).ok_or_else(|| return Error::UnknownPalette {
        name: name.to_string(),
    })?;
    return Ok(colors.iter().map(|c| return (*c).to_string()).collect());
}

/// Check every color in a style is `#rrggbb` and the palette is not empty.
///
/// # Errors
///
/// Returns `Error::ConfigInvalid` naming the first bad value.
pub fn validate_style(style: &GraphStyle) -> Result<(), Error> {
    if style.palette.is_empty() {
        return Err(Error::ConfigInvalid { reason: "graph.palette is empty".to_string() });
    }
    let named = [("graph.background", &style.background), ("graph.edge_color", &style.edge_color)];
    for (key, color) in named.into_iter().chain(style.palette.iter().map(|c| return ("graph.palette", c))) {
        if !HEX_COLOR.is_match(color) {
            return Err(Error::ConfigInvalid {
                reason: format!("{key}: `{color}` is not a #rrggbb color"),
            });
        }
    }
    if style.layout.trim().is_empty() {
        return Err(Error::ConfigInvalid { reason: "graph.layout is empty".to_string() });
    }
    return Ok(());
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.graph.layout, "sfdp");
        assert_eq!(config.graph.palette.len(), 5);
    }

    #[test]
    fn full_config() {
        let config = Config::parse(
            r##"
exclude = ["index.md", "diary/diary.md"]
on_error = "continue"
out_of_root = "drop"

[graph]
palette = "shmoop"
background = "#ffffff"
layout = "circo"
"##,
        )
        .unwrap();
        assert_eq!(config.exclude, vec!["index.md", "diary/diary.md"]);
        assert_eq!(config.on_error, ErrorPolicy::Continue);
        assert_eq!(config.out_of_root, OutOfRoot::Drop);
        assert_eq!(config.graph.palette.len(), 10);
        assert_eq!(config.graph.background, "#ffffff");
        assert_eq!(config.graph.edge_color, "#000000");
        assert_eq!(config.graph.layout, "circo");
    }

    #[test]
    fn inline_palette() {
        let config = Config::parse("[graph]\npalette = [\"#aabbcc\", \"#112233\"]\n").unwrap();
        assert_eq!(config.graph.palette, vec!["#aabbcc", "#112233"]);
    }

    #[test]
    fn unknown_palette_rejected() {
        let err = Config::parse("[graph]\npalette = \"neon\"\n").unwrap_err();
        assert!(matches!(err, Error::UnknownPalette { name } if name == "neon"));
    }

    #[test]
    fn bad_color_rejected() {
        let err = Config::parse("[graph]\nbackground = \"grey\"\n").unwrap_err();
        assert!(matches!(err, Error::ConfigInvalid { reason } if reason.contains("graph.background")));
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "exclude = [").unwrap();
        assert!(matches!(Config::load(dir.path()), Err(Error::TomlDe(_))));
    }

    #[test]
    fn unknown_key_is_an_error() {
        assert!(matches!(Config::parse("excluded = []\n"), Err(Error::TomlDe(_))));
    }

    #[test]
    fn index_options_merge_exclusions() {
        let config = Config { exclude: vec!["a.md".to_string()], ..Config::default() };
        let options = config.index_options(&["b.md".to_string()]);
        assert_eq!(options.excluded, vec!["a.md", "b.md"]);
        assert_eq!(options.on_error, ErrorPolicy::Abort);
    }
}
