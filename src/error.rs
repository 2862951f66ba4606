use std::path::PathBuf;
use std::string::FromUtf8Error;

use thiserror::Error;

/// A source document could not be turned into a parse tree.
///
/// Only unreadable input lands here. Malformed markup is parsed best-effort
/// and never produces a `LoadError`.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not UTF-8 text: {source}", path.display())]
    NotText {
        path: PathBuf,
        #[source]
        source: FromUtf8Error,
    },
    #[error("cannot derive an identifier from {}", path.display())]
    NoIdentifier { path: PathBuf },
}

/// The output sink rejected an artifact. Fatal for the whole run.
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("failed to create output directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to stage {}: {source}", path.display())]
    Stage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot replace {}: it is not a regular file", path.display())]
    Blocked { path: PathBuf },
    #[error("failed to replace {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: tempfile::PersistError,
    },
}

/// A previously published (or hand-edited) artifact could not be read back.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to open {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} does not match the record schema: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
#[error("invalid configuration: {0}")]
pub struct ConfigError(#[from] pub config::ConfigError);
