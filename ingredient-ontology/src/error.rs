use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OntologyError {
    #[error("Required input not found: {}", path.display())]
    MissingArtifact { path: PathBuf },

    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize JSON: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("CSV read failed: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, OntologyError>;
