/// Crate-level error types for linkmark diagnostics.
use std::path::PathBuf;

/// All errors in linkmark carry enough context to produce a useful diagnostic
/// without a debugger. Each variant names the file, path, or reason for failure.
#[allow(clippy::error_impl_error, reason = "crate-level error type re-exported by the library")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// `.linkmark.toml` parsed but holds a value linkmark cannot use.
    #[error("invalid config: {reason}")]
    ConfigInvalid {
        /// Description of the offending setting.
        reason: String,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON serialization of the link index failed.
    #[error("json: {0}")]
    Json(
        /// The wrapped JSON error.
        #[from]
        serde_json::Error,
    ),

    /// A resolved link lies outside the root it is being made relative to.
    #[error("{} is outside root {}", path.display(), root.display())]
    OutsideRoot {
        /// The path that could not be relativized.
        path: PathBuf,
        /// The root directory it was expected under.
        root: PathBuf,
    },

    /// Tree-sitter failed to parse a markdown document.
    #[error("parse failed: {}: {reason}", file.display())]
    ParseFailed {
        /// File that failed to parse.
        file: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// A markdown document was discovered but could not be read.
    #[error("cannot read {}: {source}", path.display())]
    ReadFailed {
        /// Document that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The root directory does not exist or is not a directory.
    #[error("root directory not found: {}", path.display())]
    RootNotFound {
        /// The root that was requested.
        path: PathBuf,
    },

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// The document is not in the configured exclusion list.
    #[error("not excluded: `{file}`")]
    UnknownExclusion {
        /// Root-relative document identifier.
        file: String,
    },

    /// No built-in palette has this name.
    #[error("unknown palette: `{name}`")]
    UnknownPalette {
        /// Palette name as given by the user.
        name: String,
    },

    /// Directory traversal failed below the root.
    #[error("walk: {0}")]
    Walk(
        /// The wrapped traversal error.
        #[from]
        walkdir::Error,
    ),

    /// The filesystem watcher could not be set up.
    #[error("watch failed: {reason}")]
    WatchFailed {
        /// Description of the watcher failure.
        reason: String,
    },
}
