//! Versioned synonym table used to seed confirm tokens.
//!
//! File format:
//!
//! ```json
//! {
//!   "version": 1,
//!   "entries": {
//!     "ground ginger": [["ginger"], ["ground", "powder"]]
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{OntologyError, Result};
use crate::ontology::ConfirmTokens;

pub const SYNONYM_TABLE_VERSION: u32 = 1;

#[derive(Deserialize)]
struct SynonymTableFile {
    version: u32,
    entries: BTreeMap<String, Vec<Vec<String>>>,
}

/// Lowercase ingredient name -> token groups. Iterates in key order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SynonymTable {
    entries: BTreeMap<String, ConfirmTokens>,
}

impl SynonymTable {
    /// Load the table from disk.
    ///
    /// A missing file is an error. A file whose contents cannot be read as a
    /// supported table yields an empty table and a warning.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(OntologyError::MissingArtifact {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|source| OntologyError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self::parse(&content).unwrap_or_else(|reason| {
            tracing::warn!(
                path = %path.display(),
                reason = %reason,
                "Could not read synonym table, continuing without confirm tokens"
            );
            Self::default()
        }))
    }

    /// Parse table contents, returning the reason on failure.
    pub fn parse(content: &str) -> std::result::Result<Self, String> {
        let file: SynonymTableFile =
            serde_json::from_str(content).map_err(|e| format!("invalid table: {e}"))?;
        if file.version != SYNONYM_TABLE_VERSION {
            return Err(format!("unsupported version {}", file.version));
        }

        let entries = file
            .entries
            .into_iter()
            .filter_map(|(key, groups)| {
                let groups: ConfirmTokens = groups
                    .into_iter()
                    .map(|g| {
                        g.into_iter()
                            .map(|t| t.trim().to_string())
                            .filter(|t| !t.is_empty())
                            .collect::<Vec<_>>()
                    })
                    .filter(|g| !g.is_empty())
                    .collect();
                (!groups.is_empty()).then(|| (key.to_lowercase(), groups))
            })
            .collect();

        Ok(Self { entries })
    }

    pub fn get(&self, key: &str) -> Option<&ConfirmTokens> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfirmTokens)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, ConfirmTokens)> for SynonymTable {
    fn from_iter<I: IntoIterator<Item = (String, ConfirmTokens)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse() {
        let table = SynonymTable::parse(
            r#"{"version": 1, "entries": {
                "Ground Ginger": [["ginger"], ["ground", "powder"]],
                "empty": [[]],
                "padded": [[" salt ", ""]]
            }}"#,
        )
        .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(
            table.get("ground ginger"),
            Some(&vec![
                vec!["ginger".to_string()],
                vec!["ground".to_string(), "powder".to_string()],
            ])
        );
        assert_eq!(table.get("padded"), Some(&vec![vec!["salt".to_string()]]));
        assert!(table.get("empty").is_none());
    }

    #[test]
    fn test_parse_rejects_unknown_version() {
        let err = SynonymTable::parse(r#"{"version": 2, "entries": {}}"#).unwrap_err();
        assert!(err.contains("unsupported version"));
    }

    #[test]
    fn test_load_unparseable_is_empty() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "export const SYNONYM_TABLE = new Map([]);").unwrap();

        let table = SynonymTable::load(file.path()).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_load_missing_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = SynonymTable::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, OntologyError::MissingArtifact { .. }));
    }
}
