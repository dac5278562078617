/// Alias for `Result<T, SyntaxError>`.
pub type SyntaxResult<T> = Result<T, SyntaxError>;

/// Errors raised while setting up or running the make parser.
#[derive(Debug, thiserror::Error)]
pub enum SyntaxError {
    /// The compiled grammar does not match the tree-sitter runtime.
    #[error("cannot load the make grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),

    /// The parser gave up without producing a tree.
    #[error("the make parser produced no tree")]
    NoTree,
}
