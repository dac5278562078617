use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use atls_docs::FileType;
use atls_syntax::{SyntaxTree, parse};

/// An open document and, for make files, its current tree.
#[derive(Debug, Clone)]
pub struct Document {
    uri: String,
    text: String,
    version: i32,
    file_type: Option<FileType>,
    path: Option<PathBuf>,
    tree: Option<Arc<SyntaxTree>>,
}

impl Document {
    fn new(uri: String, path: Option<PathBuf>, text: String, version: i32) -> Self {
        let file_type = FileType::detect(path.as_deref().and_then(Path::to_str).unwrap_or(&uri));
        let tree = match file_type {
            Some(FileType::Make) => match parse(&text) {
                Ok(tree) => Some(Arc::new(tree)),
                Err(error) => {
                    tracing::warn!(uri = %uri, %error, "document not parsed");
                    None
                }
            },
            _ => None,
        };
        Self {
            uri,
            text,
            version,
            file_type,
            path,
            tree,
        }
    }

    /// Document URI as sent by the client.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Current full text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Version of the last change.
    pub fn version(&self) -> i32 {
        self.version
    }

    /// Detected language, `None` for files the server does not handle.
    pub fn file_type(&self) -> Option<FileType> {
        self.file_type
    }

    /// Local path, for `file:` URIs.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Directory include paths are resolved against.
    pub fn directory(&self) -> Option<&Path> {
        self.path.as_deref().and_then(Path::parent)
    }

    /// Tree of the current text; only make files are parsed.
    pub fn tree(&self) -> Option<&Arc<SyntaxTree>> {
        self.tree.as_ref()
    }
}

/// Latest text and tree of every open document, keyed by URI.
///
/// Entries are replaced wholesale on change; a tree handed out earlier stays
/// valid for whoever holds the `Arc`.
#[derive(Debug, Default)]
pub struct TreeStore {
    documents: HashMap<String, Document>,
}

impl TreeStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a document, parsing it if it is a make file.
    pub fn open(
        &mut self,
        uri: impl Into<String>,
        path: Option<PathBuf>,
        text: impl Into<String>,
        version: i32,
    ) -> &Document {
        let uri = uri.into();
        let document = Document::new(uri.clone(), path, text.into(), version);
        tracing::debug!(uri = %uri, file_type = ?document.file_type, "document stored");
        self.documents.insert(uri.clone(), document);
        &self.documents[&uri]
    }

    /// Replace the text of an open document. Unknown URIs are opened.
    pub fn change(&mut self, uri: &str, text: impl Into<String>, version: i32) -> &Document {
        let path = self.documents.get(uri).and_then(|d| d.path.clone());
        self.open(uri, path, text, version)
    }

    /// Forget a document.
    pub fn close(&mut self, uri: &str) -> Option<Document> {
        self.documents.remove(uri)
    }

    /// An open document.
    pub fn get(&self, uri: &str) -> Option<&Document> {
        self.documents.get(uri)
    }

    /// Tree of an open make document.
    pub fn tree(&self, uri: &str) -> Option<&Arc<SyntaxTree>> {
        self.get(uri).and_then(Document::tree)
    }

    /// Number of open documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether no document is open.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Trees of all open make documents: `first` (if it is one), then the
    /// rest sorted by URI.
    pub fn make_trees(&self, first: &str) -> Vec<(&str, &SyntaxTree)> {
        let mut others: Vec<(&str, &SyntaxTree)> = self
            .documents
            .values()
            .filter(|d| d.uri != first)
            .filter_map(|d| d.tree().map(|tree| (d.uri(), tree.as_ref())))
            .collect();
        others.sort_by_key(|&(uri, _)| uri);
        // the stored URI, not `first`, so the pair borrows from the store only
        let mut trees: Vec<_> = self
            .get(first)
            .and_then(|d| d.tree().map(|tree| (d.uri(), tree.as_ref())))
            .into_iter()
            .collect();
        trees.extend(others);
        trees
    }
}
