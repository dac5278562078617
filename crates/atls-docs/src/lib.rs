//! Documentation for autoconf macros and make functions, variables and
//! directives.
//!
//! A [`DocumentationTable`] is loaded once per process from one of several
//! [`DocumentationSource`]s: the artifact compiled into the binary, a user
//! cache, or the GNU info manuals installed on the system.

/// Error type for loading and extracting documentation.
pub mod error;
/// Manual scanning.
pub mod extract;
/// File type detection.
pub mod filetype;
/// JSON schema generation.
pub mod schema;
/// Where tables come from.
pub mod source;
/// The documentation table.
pub mod table;

pub use error::{DocsError, DocsResult};
pub use filetype::FileType;
pub use source::{DocumentationSource, load_table};
pub use table::DocumentationTable;
