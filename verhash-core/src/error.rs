use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced synchronously by `ManifestGenerator::start` and by the
/// worker when the manifest itself cannot be written.
#[derive(Debug, Error)]
pub enum GenError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("a manifest run is already in progress")]
    AlreadyRunning,

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl GenError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        GenError::InvalidInput(msg.into())
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        GenError::Io { path: path.into(), source }
    }
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest is empty (no version line)")]
    Empty,

    #[error("line {line}: missing two-space separator between path and digest")]
    MissingSeparator { line: usize },

    #[error("read manifest: {0}")]
    Io(#[from] io::Error),
}
