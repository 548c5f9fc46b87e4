use std::path::{Path, PathBuf};

use linkmark::Error;
use linkmark::config::{CONFIG_FILE, Config};

// ── CLI commands ──────────────────────────────────────────────────────

/// Add a document to the exclusion list in `.linkmark.toml`.
///
/// # Errors
///
/// Returns errors from config reading, validation, or writing.
pub fn cmd_add(root: &Path, file: &str) -> Result<(), Error> {
    if !root.join(file).is_file() {
        eprintln!("warning: `{file}` is not a document under {}", root.display());
    }

    if add_to_config(root, file)? {
        println!("Excluded: {file}");
    } else {
        println!("Already excluded: {file}");
    }
    return Ok(());
}

/// List configured exclusions in file order.
///
/// # Errors
///
/// Returns errors from config loading.
pub fn cmd_list(root: &Path) -> Result<(), Error> {
    let config = Config::load(root)?;

    if config.exclude.is_empty() {
        println!("No exclusions configured.");
        return Ok(());
    }

    for file in &config.exclude {
        println!("{file}");
    }
    return Ok(());
}

/// Remove a document from the exclusion list.
///
/// # Errors
///
/// Returns `Error::UnknownExclusion` if it is not listed,
/// or errors from config reading or writing.
pub fn cmd_remove(root: &Path, file: &str) -> Result<(), Error> {
    remove_from_config(root, file)?;
    println!("No longer excluded: {file}");
    return Ok(());
}

// ── Config file editing ───────────────────────────────────────────────

/// Append `file` to the `exclude` array, creating it if needed.
/// Returns `false` if it was already listed.
///
/// # Errors
///
/// Returns `Error::ConfigInvalid` if `exclude` is not an array,
/// or errors from reading, validating, or writing the config.
fn add_to_config(root: &Path, file: &str) -> Result<bool, Error> {
    let (config_path, mut doc) = read_config_doc(root)?;

    if !doc.contains_key("exclude") {
        doc["exclude"] = toml_edit::value(toml_edit::Array::new());
    }
    let exclude = exclude_array(&mut doc)?;

    if exclude.iter().any(|v| return v.as_str() == Some(file)) {
        return Ok(false);
    }
    exclude.push(file);

    write_config_doc(&config_path, &doc)?;
    return Ok(true);
}

/// Borrow the `exclude` array.
///
/// # Errors
///
/// Returns `Error::ConfigInvalid` if `exclude` is missing or not an array.
fn exclude_array(doc: &mut toml_edit::DocumentMut) -> Result<&mut toml_edit::Array, Error> {
    return doc
        .get_mut("exclude")
        .and_then(toml_edit::Item::as_array_mut)
        .ok_or_else(|| return Error::ConfigInvalid {
            reason: "`exclude` must be an array of strings".to_string(),
        });
}

/// Parse `.linkmark.toml` into a format-preserving document.
/// Returns an empty document if the file doesn't exist.
///
/// # Errors
///
/// Returns `Error::Io` on read failure or `Error::ConfigInvalid` if the file is not valid TOML.
fn read_config_doc(root: &Path) -> Result<(PathBuf, toml_edit::DocumentMut), Error> {
    let config_path = root.join(CONFIG_FILE);
    let content = match std::fs::read_to_string(&config_path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(Error::Io(e)),
    };

    let doc: toml_edit::DocumentMut = content.parse().map_err(|e: toml_edit::TomlError| {
        return Error::ConfigInvalid {
            reason: format!("{}: {e}", config_path.display()),
        };
    })?;

    return Ok((config_path, doc));
}

/// Drop `file` from the `exclude` array.
///
/// # Errors
///
/// Returns `Error::UnknownExclusion` if it isn't listed.
fn remove_from_config(root: &Path, file: &str) -> Result<(), Error> {
    let (config_path, mut doc) = read_config_doc(root)?;

    let unknown = || return Error::UnknownExclusion { file: file.to_string() };
    if !doc.contains_key("exclude") {
        return Err(unknown());
    }
    let exclude = exclude_array(&mut doc)?;
    let position = exclude
        .iter()
        .position(|v| return v.as_str() == Some(file))
        .ok_or_else(unknown)?;
    exclude.remove(position);

    write_config_doc(&config_path, &doc)?;
    return Ok(());
}

/// Check the edited document still loads as a config, then write it.
///
/// # Errors
///
/// Returns config validation errors or `Error::Io` if writing fails.
fn write_config_doc(config_path: &Path, doc: &toml_edit::DocumentMut) -> Result<(), Error> {
    let content = doc.to_string();
    Config::parse(&content)?;
    std::fs::write(config_path, content)?;
    return Ok(());
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use super::*;

    #[test]
    fn add_creates_config_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        assert!(add_to_config(dir.path(), "index.md").unwrap());
        assert!(!add_to_config(dir.path(), "index.md").unwrap());
        assert!(add_to_config(dir.path(), "diary/diary.md").unwrap());

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.exclude, vec!["index.md", "diary/diary.md"]);
    }

    #[test]
    fn edits_preserve_comments_and_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let original = "# my wiki\non_error = \"continue\"\nexclude = [\"a.md\"]\n\n[graph]\nlayout = \"circo\"\n";
        std::fs::write(dir.path().join(CONFIG_FILE), original).unwrap();

        add_to_config(dir.path(), "b.md").unwrap();
        remove_from_config(dir.path(), "a.md").unwrap();

        let written = std::fs::read_to_string(dir.path().join(CONFIG_FILE)).unwrap();
        assert!(written.starts_with("# my wiki\n"));
        assert!(written.contains("layout = \"circo\""));
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.exclude, vec!["b.md"]);
    }

    #[test]
    fn remove_unknown_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = remove_from_config(dir.path(), "nope.md").unwrap_err();
        assert!(matches!(err, Error::UnknownExclusion { file } if file == "nope.md"));
    }

    #[test]
    fn malformed_config_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "exclude = [\"a.md\"\n").unwrap();
        let err = add_to_config(dir.path(), "b.md").unwrap_err();
        assert!(matches!(&err, Error::ConfigInvalid { reason } if reason.contains(CONFIG_FILE)), "{err}");
    }

    #[test]
    fn non_array_exclude_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "exclude = \"index.md\"\n").unwrap();
        let err = add_to_config(dir.path(), "b.md").unwrap_err();
        assert!(matches!(err, Error::ConfigInvalid { .. }));
    }
}
