#![deny(unsafe_code)]

use std::path::PathBuf;

use imms_ingest::IngestError;

#[derive(Debug, thiserror::Error)]
pub enum StandardsError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("reference file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to parse JSON {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid reference {path}: {message}")]
    InvalidReference { path: PathBuf, message: String },

    #[error("no PHIX columns match the requested PHU(s): {requested}")]
    UnknownPhu { requested: String },

    #[error(transparent)]
    Ingest(#[from] IngestError),
}

impl StandardsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound { path }
        } else {
            Self::Io { path, source }
        }
    }
}

pub type Result<T> = std::result::Result<T, StandardsError>;
