use std::path::PathBuf;

/// Alias for `Result<T, DocsError>`.
pub type DocsResult<T> = Result<T, DocsError>;

/// Errors raised while loading or building documentation tables.
#[derive(Debug, thiserror::Error)]
pub enum DocsError {
    /// A documentation artifact or manual could not be read.
    #[error("cannot read {path}: {source}")]
    Read {
        /// The file that failed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A documentation artifact could not be written.
    #[error("cannot write {path}: {source}")]
    Write {
        /// The file that failed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A documentation artifact is not valid JSON of the expected shape.
    #[error("invalid documentation artifact {path}: {source}")]
    Artifact {
        /// The artifact, or `<builtin>` for the embedded one.
        path: PathBuf,
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// None of the searched info directories holds the manual.
    #[error("manual {name} not found in {searched}")]
    ManualNotFound {
        /// Manual file name without compression suffix, e.g. `make.info-2`.
        name: String,
        /// The directories that were searched, joined with `:`.
        searched: String,
    },

    /// A JSON document could not be serialized.
    #[error("cannot serialize JSON: {0}")]
    Serialize(serde_json::Error),

    /// The platform has no user cache directory.
    #[error("no cache directory available on this system")]
    NoCacheDir,

    /// An unrecognised file type name.
    #[error("unknown file type: \"{0}\" (expected config or make)")]
    UnknownFileType(String),

    /// An unrecognised documentation source name.
    #[error("unknown documentation source: \"{0}\" (expected builtin, cache or system)")]
    UnknownSource(String),
}
