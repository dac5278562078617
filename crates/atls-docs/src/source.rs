use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DocsError, DocsResult};
use crate::extract;
use crate::table::DocumentationTable;

const BUILTIN: &str = include_str!("../assets/autotools.json");

/// Where the documentation table comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentationSource {
    /// The artifact embedded in the binary.
    #[default]
    Builtin,
    /// Extracted from the system manuals once, then read from the user cache.
    Cache,
    /// Extracted from the system manuals on every start.
    System,
}

impl DocumentationSource {
    /// Lowercase name as used on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentationSource::Builtin => "builtin",
            DocumentationSource::Cache => "cache",
            DocumentationSource::System => "system",
        }
    }

    /// Load the table from this source.
    pub fn load(self) -> DocsResult<DocumentationTable> {
        match self {
            DocumentationSource::Builtin => builtin(),
            DocumentationSource::System => extract::extract_system(),
            DocumentationSource::Cache => {
                let path = cache_path().ok_or(DocsError::NoCacheDir)?;
                load_or_create_cache(&path, extract::extract_system)
            }
        }
    }
}

impl fmt::Display for DocumentationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentationSource {
    type Err = DocsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "builtin" => Ok(DocumentationSource::Builtin),
            "cache" => Ok(DocumentationSource::Cache),
            "system" => Ok(DocumentationSource::System),
            other => Err(DocsError::UnknownSource(other.to_string())),
        }
    }
}

/// Load a table, preferring an explicit artifact file over `source`.
pub fn load_table(
    source: DocumentationSource,
    path: Option<&Path>,
) -> DocsResult<DocumentationTable> {
    let table = match path {
        Some(path) => read_artifact(path)?,
        None => source.load()?,
    };
    tracing::debug!(%source, path = ?path, "documentation table loaded");
    Ok(table)
}

/// The table shipped with the binary.
pub fn builtin() -> DocsResult<DocumentationTable> {
    serde_json::from_str(BUILTIN).map_err(|source| DocsError::Artifact {
        path: PathBuf::from("<builtin>"),
        source,
    })
}

/// `<user cache dir>/autotools-language-server/autotools.json`.
pub fn cache_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("autotools-language-server").join("autotools.json"))
}

/// Read a documentation artifact written by [`write_artifact`].
pub fn read_artifact(path: &Path) -> DocsResult<DocumentationTable> {
    let text = fs::read_to_string(path).map_err(|source| DocsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| DocsError::Artifact {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a table as a JSON artifact, creating parent directories.
pub fn write_artifact(path: &Path, table: &DocumentationTable) -> DocsResult<()> {
    let write_err = |source| DocsError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    let json = serde_json::to_string(table).map_err(|source| DocsError::Artifact {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(write_err)
}

/// Read the cache at `path`, or build it with `extract` and write it there.
/// A cache that cannot be written is logged and the fresh table returned.
pub fn load_or_create_cache(
    path: &Path,
    extract: impl FnOnce() -> DocsResult<DocumentationTable>,
) -> DocsResult<DocumentationTable> {
    if path.is_file() {
        return read_artifact(path);
    }
    let table = extract()?;
    if let Err(e) = write_artifact(path, &table) {
        tracing::warn!(error = %e, "could not write documentation cache");
    }
    Ok(table)
}
