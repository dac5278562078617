//! Symbol resolution and diagnostics over make syntax trees.
//!
//! [`role::classify`] decides what the node under the cursor means,
//! [`finder`] searches open trees for matching sites and
//! [`diagnostics::diagnose`] runs the tree-wide checks. [`Workspace`] ties
//! them to open documents and the documentation table.

/// Tree-wide checks and their terminal rendering.
pub mod diagnostics;
/// Definition and reference search.
pub mod finder;
/// Node classification.
pub mod role;
/// Open documents and their trees.
pub mod store;
/// Request handlers over open documents.
pub mod workspace;

pub use diagnostics::{Finding, Severity, diagnose, render_findings};
pub use finder::{Occurrence, Query, Scope, Search, find_all, find_first};
pub use role::{Family, Role, Symbol, classify};
pub use store::{Document, TreeStore};
pub use workspace::{CompletionItem, CompletionKind, Hover, Location, Target, Workspace};
