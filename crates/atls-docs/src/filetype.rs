use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DocsError;

/// The languages the servers understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// Autoconf input, `configure.ac`.
    Config,
    /// Make input: `Makefile`, `Makefile.am`, `*.mk`, ...
    Make,
}

impl FileType {
    /// Every file type, in table order.
    pub const ALL: [FileType; 2] = [FileType::Config, FileType::Make];

    /// Lowercase name as used on the command line and in artifacts.
    pub fn as_str(self) -> &'static str {
        match self {
            FileType::Config => "config",
            FileType::Make => "make",
        }
    }

    /// Detect the file type of a path or URI from its last path segment.
    ///
    /// `foo.mk`, `Makefile`, `Makefile.am`, `makefile` and `GNUmakefile.in`
    /// are make files, `configure.ac` is a config file.
    pub fn detect(path: &str) -> Option<FileType> {
        let path = path.split(['?', '#']).next().unwrap_or(path);
        let basename = path.rsplit(['/', '\\']).next().unwrap_or(path);
        if basename == "configure.ac" {
            return Some(FileType::Config);
        }
        let stem = basename.split('.').next().unwrap_or(basename);
        let is_make = matches!(stem, "Makefile" | "makefile" | "GNUmakefile")
            || (basename.contains('.') && basename.rsplit('.').next() == Some("mk"));
        is_make.then_some(FileType::Make)
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileType {
    type Err = DocsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "config" => Ok(FileType::Config),
            "make" => Ok(FileType::Make),
            other => Err(DocsError::UnknownFileType(other.to_string())),
        }
    }
}
