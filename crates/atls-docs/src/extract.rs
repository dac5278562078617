//! Documentation extraction from GNU info manuals.
//!
//! Both manuals mark documented names with a line convention of their own:
//! autoconf writes ` -- Macro: AC_INIT (PACKAGE, VERSION)`, make quotes the
//! signature on a line of its own (`'$(subst FROM,TO,TEXT)'`). Consecutive
//! marker lines document the same block, and the block runs on over blank
//! lines and lines indented by five columns.

use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;

use crate::error::{DocsError, DocsResult};
use crate::filetype::FileType;
use crate::table::DocumentationTable;

const AUTOCONF_MARKER: &str = " -- Macro: ";
const BODY_INDENT: &str = "     ";

/// One documented block: the names it defines, their signature lines and
/// the body text.
#[derive(Debug, Default)]
struct Block {
    names: Vec<String>,
    signatures: Vec<String>,
    body: Vec<String>,
}

impl Block {
    fn is_open(&self) -> bool {
        !self.names.is_empty()
    }

    /// Render to markdown and store under every name of the block.
    fn flush(&mut self, fence: &str, entries: &mut BTreeMap<String, String>) {
        let block = std::mem::take(self);
        if block.names.is_empty() {
            return;
        }
        let doc = paragraphs(&block.body);
        for name in &block.names {
            let code_is_name = block.signatures.len() == 1 && block.signatures[0] == *name;
            let description = if code_is_name {
                doc.clone()
            } else {
                let code = format!("```{fence}\n{}\n```", block.signatures.join("\n"));
                if doc.is_empty() {
                    code
                } else {
                    format!("{code}\n{doc}")
                }
            };
            entries.insert(name.clone(), description);
        }
    }
}

/// Join wrapped manual lines into paragraphs separated by blank lines.
fn paragraphs(lines: &[String]) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                out.push(current.join(" "));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        out.push(current.join(" "));
    }
    out.join("\n\n")
}

/// Extract macro documentation from the autoconf info manual.
pub fn autoconf_entries(manual: &str) -> BTreeMap<String, String> {
    let mut entries = BTreeMap::new();
    let mut block = Block::default();
    let mut last_was_marker = false;

    for line in manual.lines() {
        if let Some(signature) = line.strip_prefix(AUTOCONF_MARKER) {
            if !last_was_marker {
                block.flush("m4", &mut entries);
            }
            let name = signature.split(' ').next().unwrap_or_default();
            if !name.is_empty() {
                block.names.push(name.to_string());
                block.signatures.push(signature.trim_end().to_string());
            }
            last_was_marker = true;
            continue;
        }
        last_was_marker = false;
        let fifth = line.as_bytes().get(4);
        if block.is_open() && fifth.is_none_or(|&b| b == b' ') {
            block.body.push(line.to_string());
        } else if fifth.is_some_and(|&b| b != b' ') {
            block.flush("m4", &mut entries);
        }
    }
    block.flush("m4", &mut entries);
    entries
}

/// The signature of a make marker line, or `None` for ordinary lines.
fn make_marker(line: &str) -> Option<&str> {
    if line.len() < 2 || !line.starts_with('\'') || !line.ends_with('\'') {
        return None;
    }
    let signature = line.trim_matches('\'');
    let option_like = signature.starts_with('-') && signature != "-include";
    if option_like || matches!(signature, "0" | "1" | "2") {
        return None;
    }
    Some(signature)
}

/// Name documented by a make signature: `$(subst FROM,TO,TEXT)` → `subst`.
fn make_name(signature: &str) -> Option<&str> {
    signature
        .trim_start_matches(['$', '('])
        .trim_end_matches(')')
        .split_whitespace()
        .next()
}

/// Extract function, variable and directive documentation from the make
/// info manual.
pub fn make_entries(manual: &str) -> BTreeMap<String, String> {
    let mut entries = BTreeMap::new();
    let mut block = Block::default();
    let mut last_was_marker = false;

    for line in manual.lines() {
        if let Some(signature) = make_marker(line) {
            if !last_was_marker {
                block.flush("make", &mut entries);
            }
            if let Some(name) = make_name(signature) {
                block.names.push(name.to_string());
                block.signatures.push(signature.to_string());
            }
            last_was_marker = true;
            continue;
        }
        last_was_marker = false;
        if block.is_open() && (line.starts_with(BODY_INDENT) || line.is_empty()) {
            block.body.push(line.to_string());
        } else {
            block.flush("make", &mut entries);
        }
    }
    block.flush("make", &mut entries);
    entries
}

/// Directories searched for info manuals: `$XDG_DATA_DIRS/*/info`, then the
/// usual system locations.
pub fn info_dirs() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = std::env::var_os("XDG_DATA_DIRS")
        .map(|value| {
            std::env::split_paths(&value)
                .filter(|p| !p.as_os_str().is_empty())
                .map(|p| p.join("info"))
                .collect()
        })
        .unwrap_or_default();
    for fallback in ["/usr/share/info", "/usr/local/share/info"] {
        let fallback = PathBuf::from(fallback);
        if !dirs.contains(&fallback) {
            dirs.push(fallback);
        }
    }
    dirs
}

/// Read a manual whose file name starts with `name` (e.g. `make.info-2`
/// matches `make.info-2.gz`) from the first directory that has one.
/// Gzipped manuals are decompressed.
pub fn read_manual(name: &str, dirs: &[PathBuf]) -> DocsResult<String> {
    for dir in dirs {
        let Ok(read_dir) = fs::read_dir(dir) else {
            continue;
        };
        let mut candidates: Vec<PathBuf> = read_dir
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(name))
            })
            .collect();
        candidates.sort();
        if let Some(path) = candidates.first() {
            tracing::debug!(path = %path.display(), "reading manual");
            return read_text(path);
        }
    }
    Err(DocsError::ManualNotFound {
        name: name.to_string(),
        searched: dirs
            .iter()
            .map(|d| d.display().to_string())
            .collect::<Vec<_>>()
            .join(":"),
    })
}

fn read_text(path: &Path) -> DocsResult<String> {
    let read_err = |source| DocsError::Read {
        path: path.to_path_buf(),
        source,
    };
    let bytes = fs::read(path).map_err(read_err)?;
    let bytes = if path.extension().is_some_and(|ext| ext == "gz") {
        let mut decoded = Vec::new();
        GzDecoder::new(bytes.as_slice())
            .read_to_end(&mut decoded)
            .map_err(read_err)?;
        decoded
    } else {
        bytes
    };
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Build a table from the manuals installed on this system.
pub fn extract_system() -> DocsResult<DocumentationTable> {
    extract_from(&info_dirs())
}

/// Build a table from the manuals found in `dirs`.
pub fn extract_from(dirs: &[PathBuf]) -> DocsResult<DocumentationTable> {
    let mut table = DocumentationTable::new();

    let autoconf = read_manual("autoconf.info", dirs)?;
    table.extend(FileType::Config, autoconf_entries(&autoconf));

    let make = read_manual("make.info-2", dirs).or_else(|_| read_manual("make.info", dirs))?;
    table.extend(FileType::Make, make_entries(&make));

    tracing::info!(
        config = table.len(FileType::Config),
        make = table.len(FileType::Make),
        "extracted documentation from system manuals"
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const AUTOCONF: &str = "\
4.1.2 Initializing configure
----------------------------

 -- Macro: AC_INIT (PACKAGE, VERSION, [BUG-REPORT], [TARNAME], [URL])
     Process any command-line arguments and perform initialization and
     verification.

     Set the name of the PACKAGE and its VERSION.

   Text indented three columns belongs to the chapter.

 -- Macro: AC_CONFIG_MACRO_DIRS (DIR1 [DIR2 ... DIRN])
 -- Macro: AC_CONFIG_MACRO_DIR (DIR)
     Specify the given directories as the location of additional local
     Autoconf macros.
Next chapter
";

    const MAKE: &str = "\
8.2 Functions for String Substitution and Analysis
==================================================

'$(subst FROM,TO,TEXT)'
     Performs a textual replacement on the text TEXT: each occurrence
     of FROM is replaced by TO.

     The result is substituted for the function call.

'$(strip STRING)'
     Removes leading and trailing whitespace from STRING.
'-k'
     Keep going.
'include'
'-include'
     Read other makefiles.
'0'
     Exit status.
";

    #[test]
    fn autoconf_marker_and_body() {
        let entries = autoconf_entries(AUTOCONF);
        let init = &entries["AC_INIT"];
        assert!(init.starts_with(
            "```m4\nAC_INIT (PACKAGE, VERSION, [BUG-REPORT], [TARNAME], [URL])\n```\n"
        ));
        assert!(init.contains("Process any command-line arguments and perform initialization and verification.\n\nSet the name"));
        assert!(!init.contains("three columns"));
    }

    #[test]
    fn autoconf_consecutive_markers_alias() {
        let entries = autoconf_entries(AUTOCONF);
        assert_eq!(entries["AC_CONFIG_MACRO_DIRS"], entries["AC_CONFIG_MACRO_DIR"]);
        assert!(entries["AC_CONFIG_MACRO_DIR"].contains("AC_CONFIG_MACRO_DIRS (DIR1"));
        assert_eq!(entries.len(), 3);
    }

    #[test]
    fn make_functions() {
        let entries = make_entries(MAKE);
        assert_eq!(
            entries["subst"],
            "```make\n$(subst FROM,TO,TEXT)\n```\nPerforms a textual replacement on the text TEXT: each occurrence of FROM is replaced by TO.\n\nThe result is substituted for the function call."
        );
        assert!(entries["strip"].contains("Removes leading"));
    }

    #[test]
    fn make_skips_options_and_exit_codes() {
        let entries = make_entries(MAKE);
        assert!(!entries.contains_key("-k"));
        assert!(!entries.contains_key("0"));
    }

    #[test]
    fn make_signature_equal_to_name_has_no_code_block() {
        let entries = make_entries(MAKE);
        assert!(entries["include"].starts_with("```make\ninclude\n-include\n```"));
        let single = make_entries("'CURDIR'\n     Current directory.\n");
        assert_eq!(single["CURDIR"], "Current directory.");
    }

    #[test]
    fn read_plain_and_gzipped_manuals() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("autoconf.info"), AUTOCONF).unwrap();
        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(MAKE.as_bytes()).unwrap();
        fs::write(dir.path().join("make.info-2.gz"), encoder.finish().unwrap()).unwrap();

        let dirs = vec![dir.path().to_path_buf()];
        assert_eq!(read_manual("make.info-2", &dirs).unwrap(), MAKE);

        let table = extract_from(&dirs).unwrap();
        assert!(table.describe("AC_INIT", FileType::Config).is_some());
        assert!(table.describe("subst", FileType::Make).is_some());
    }

    #[test]
    fn missing_manual_names_searched_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_manual("autoconf.info", &[dir.path().to_path_buf()]).unwrap_err();
        assert!(matches!(err, DocsError::ManualNotFound { .. }));
        assert!(err.to_string().contains("autoconf.info"));
    }
}
