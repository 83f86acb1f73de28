//! JSON artifact load/store.

use std::io::Write;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{OntologyError, Result};

/// Fail with `MissingArtifact` unless every path exists.
pub fn require_artifacts<'a, I>(paths: I) -> Result<()>
where
    I: IntoIterator<Item = &'a Path>,
{
    for path in paths {
        if !path.exists() {
            return Err(OntologyError::MissingArtifact {
                path: path.to_path_buf(),
            });
        }
    }
    Ok(())
}

/// Read and decode a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    require_artifacts([path])?;
    let content = std::fs::read_to_string(path).map_err(|source| OntologyError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| OntologyError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Write pretty JSON, replacing the destination atomically.
///
/// The content goes to a temp file in the destination directory which is
/// then renamed over the target.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut content = serde_json::to_string_pretty(value)?;
    content.push('\n');

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let io_err = |source| OntologyError::Io {
        path: path.to_path_buf(),
        source,
    };

    std::fs::create_dir_all(dir).map_err(io_err)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(content.as_bytes()).map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;

    tracing::debug!(path = %path.display(), bytes = content.len(), "Wrote JSON");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.json");
        let value = json!({"slug": "ghee", "surfaceForms": ["ghee", "ghí"]});

        write_json(&path, &value).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\n  \"slug\""));
        assert!(content.contains("ghí"));

        let back: serde_json::Value = read_json(&path).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_read_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_json::<serde_json::Value>(&dir.path().join("x.json")).unwrap_err();
        assert!(matches!(err, OntologyError::MissingArtifact { .. }));
    }

    #[test]
    fn test_read_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = read_json::<serde_json::Value>(&path).unwrap_err();
        assert!(matches!(err, OntologyError::Json { .. }));
    }
}
