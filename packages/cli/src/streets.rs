//! Street name list for address autocomplete.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Default location of the street list, relative to the working directory.
pub const DEFAULT_PATH: &str = "data/streets.json";

/// Failure to load the street list.
#[derive(Debug, Error)]
pub enum StreetsError {
    /// The file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a street list document.
    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct StreetFile {
    #[serde(default)]
    t_rechov_values: Vec<String>,
}

/// Parses a street list document. A document without the
/// `t_rechov_values` key is an empty list.
///
/// # Errors
///
/// Returns the JSON error if `json` is not a valid street list document.
pub fn parse(json: &str) -> Result<Vec<String>, serde_json::Error> {
    let file: StreetFile = serde_json::from_str(json)?;
    Ok(file.t_rechov_values)
}

/// Reads and parses the street list at `path`.
///
/// # Errors
///
/// * If the file cannot be read
/// * If the file is not a valid street list document
pub fn load(path: &Path) -> Result<Vec<String>, StreetsError> {
    let json = std::fs::read_to_string(path).map_err(|source| StreetsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let streets = parse(&json).map_err(|source| StreetsError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("Loaded {} street(s) from {}", streets.len(), path.display());
    Ok(streets)
}

/// Streets starting with `prefix`, ignoring case. A blank prefix keeps
/// everything.
#[must_use]
pub fn matching<'a>(streets: &'a [String], prefix: &str) -> Vec<&'a str> {
    let prefix = prefix.trim().to_lowercase();
    streets
        .iter()
        .map(String::as_str)
        .filter(|street| street.to_lowercase().starts_with(&prefix))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn streets() -> Vec<String> {
        ["הרצל", "הירקון", "Herzl", "herzliya", "Rothschild"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn parses_street_values() {
        let parsed = parse(r#"{"t_rechov_values": ["הרצל", "אלנבי"]}"#).unwrap();
        assert_eq!(parsed, ["הרצל", "אלנבי"]);
    }

    #[test]
    fn missing_key_is_empty() {
        assert!(parse(r#"{"other": 1}"#).unwrap().is_empty());
    }

    #[test]
    fn rejects_non_json() {
        assert!(parse("streets").is_err());
    }

    #[test]
    fn prefix_is_case_insensitive() {
        let streets = streets();
        assert_eq!(matching(&streets, "HERZ"), ["Herzl", "herzliya"]);
        assert_eq!(matching(&streets, "ה"), ["הרצל", "הירקון"]);
    }

    #[test]
    fn blank_prefix_keeps_everything() {
        let streets = streets();
        assert_eq!(matching(&streets, "  ").len(), streets.len());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load(Path::new("does/not/exist.json")).unwrap_err();
        assert!(matches!(err, StreetsError::Read { .. }));
        assert!(err.to_string().contains("does/not/exist.json"));
    }

    #[test]
    fn bundled_list_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data/streets.json");
        let streets = load(&path).unwrap();
        assert!(streets.iter().any(|s| s == "הרצל"));
    }
}
