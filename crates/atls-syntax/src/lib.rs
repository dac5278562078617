//! Concrete syntax trees for make files.
//!
//! Parsing is done by tree-sitter with the make grammar; this crate wraps the
//! result in a [`SyntaxTree`] that owns its source text, so nodes can hand
//! out their text and positions without the caller keeping the buffer around.

/// Error type for the parser.
pub mod error;
/// The make parser.
pub mod parser;
/// Syntax tree and node handles.
pub mod tree;

pub use error::{SyntaxError, SyntaxResult};
pub use parser::{FUNCTIONS, MakeParser, parse};
pub use tree::{Descendants, Node, NodeKind, Point, Range, Span, SyntaxTree};
