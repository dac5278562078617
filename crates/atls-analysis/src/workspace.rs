//! Editor requests answered over the open documents.
//!
//! Every handler is total: unknown URIs, positions past the end of a file
//! and nodes without a meaning give empty results, never errors.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use atls_docs::{DocumentationTable, FileType};
use atls_syntax::{FUNCTIONS, Node, NodeKind, Point, Range};

use crate::diagnostics::{Finding, diagnose};
use crate::finder::{self, Query, Scope, defining_statement};
use crate::role::{Role, classify};
use crate::store::{Document, TreeStore};

/// Make words that are directives rather than functions or variables.
const MAKE_KEYWORDS: &[&str] = &[
    "include", "-include", "sinclude", "define", "endef", "undefine", "export", "unexport",
    "override", "private", "vpath", "ifeq", "ifneq", "ifdef", "ifndef", "else", "endif",
];

/// Hover text and the range it applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hover {
    /// Markdown.
    pub contents: String,
    /// Range of the hovered word.
    pub range: Range,
}

/// What a completion item completes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionKind {
    /// Make function or user `define`.
    Function,
    /// Make variable.
    Variable,
    /// Make directive.
    Keyword,
    /// Rule target.
    Target,
    /// Autoconf macro.
    Macro,
}

/// One completion candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionItem {
    /// Text shown in the list.
    pub label: String,
    /// Short note next to the label.
    pub detail: Option<String>,
    /// Text inserted on accept.
    pub insert_text: String,
    /// Item category.
    pub kind: CompletionKind,
    /// Markdown documentation.
    pub documentation: Option<String>,
}

/// Where a location points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// An open document.
    Document(String),
    /// A file on disk that may not be open, e.g. an included make file.
    File(PathBuf),
}

/// A range in a document or file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// The document or file.
    pub target: Target,
    /// The range inside it.
    pub range: Range,
}

/// Open documents plus the documentation table.
#[derive(Debug)]
pub struct Workspace {
    store: TreeStore,
    docs: Arc<DocumentationTable>,
}

impl Workspace {
    /// A workspace with no open documents.
    pub fn new(docs: Arc<DocumentationTable>) -> Self {
        Self {
            store: TreeStore::new(),
            docs,
        }
    }

    /// Swap in another documentation table.
    pub fn set_documentation(&mut self, docs: Arc<DocumentationTable>) {
        self.docs = docs;
    }

    /// The documentation table in use.
    pub fn documentation(&self) -> &Arc<DocumentationTable> {
        &self.docs
    }

    /// The open documents.
    pub fn store(&self) -> &TreeStore {
        &self.store
    }

    /// Open a document and diagnose it.
    pub fn did_open(
        &mut self,
        uri: &str,
        path: Option<PathBuf>,
        text: impl Into<String>,
        version: i32,
    ) -> Vec<Finding> {
        let document = self.store.open(uri, path, text, version);
        findings(document)
    }

    /// Replace a document's text and diagnose it again.
    pub fn did_change(&mut self, uri: &str, text: impl Into<String>, version: i32) -> Vec<Finding> {
        let document = self.store.change(uri, text, version);
        findings(document)
    }

    /// Close a document.
    pub fn did_close(&mut self, uri: &str) {
        self.store.close(uri);
    }

    /// Hover documentation at `position`.
    pub fn hover(&self, uri: &str, position: Point) -> Option<Hover> {
        let document = self.store.get(uri)?;
        match document.file_type()? {
            FileType::Make => self.make_hover(document, position),
            FileType::Config => {
                let line = line_at(document.text(), position)?;
                let (start, end) = word_at(line, position.column as usize, is_macro_char)?;
                let contents = self.docs.describe(&line[start..end], FileType::Config)?;
                Some(Hover {
                    contents: contents.to_string(),
                    range: line_range(position.row, start, end),
                })
            }
        }
    }

    fn make_hover(&self, document: &Document, position: Point) -> Option<Hover> {
        let tree = document.tree()?;
        let node = tree.node_at_point(position)?;
        let symbol = classify(node);
        let range = node.range();

        if matches!(
            symbol.role,
            Role::VariableReference | Role::FunctionCall | Role::TargetReference
        ) && let Some(query) = Query::definitions(symbol)
        {
            let trees = self.store.make_trees(document.uri());
            let definitions = finder::definitions(&query, &Scope::new(trees));
            if !definitions.is_empty() {
                let contents = definitions
                    .iter()
                    .map(|o| render_definition(o.uri, o.node))
                    .collect::<Vec<_>>()
                    .join("\n");
                return Some(Hover { contents, range });
            }
        }

        let parent = node.parent()?;
        if !has_builtin_documentation(parent.kind()) {
            return None;
        }
        let contents = self.docs.describe(node.text(), FileType::Make)?;
        Some(Hover {
            contents: contents.to_string(),
            range,
        })
    }

    /// Completion candidates for the word before `position`.
    pub fn completion(&self, uri: &str, position: Point) -> Vec<CompletionItem> {
        let Some(document) = self.store.get(uri) else {
            return Vec::new();
        };
        let Some(file_type) = document.file_type() else {
            return Vec::new();
        };
        let is_word: fn(char) -> bool = match file_type {
            FileType::Make => is_make_char,
            FileType::Config => is_macro_char,
        };
        let column = position.column as usize;
        let prefix = line_at(document.text(), position)
            .and_then(|line| word_at(line, column, is_word).map(|(start, _)| &line[start..column]))
            .unwrap_or("");

        let mut items: Vec<CompletionItem> = self
            .docs
            .entries(file_type)
            .filter(|(name, _)| name.starts_with(prefix))
            .map(|(name, description)| CompletionItem {
                label: name.to_string(),
                detail: Some(builtin_detail(name, file_type).to_string()),
                insert_text: name.to_string(),
                kind: builtin_kind(name, file_type),
                documentation: Some(description.to_string()),
            })
            .collect();
        if file_type == FileType::Make {
            let user = self
                .user_symbols(uri)
                .into_iter()
                .filter(|item| item.label.starts_with(prefix))
                .filter(|item| self.docs.describe(&item.label, file_type).is_none());
            items.extend(user);
        }
        tracing::debug!(prefix, count = items.len(), "completion");
        items
    }

    /// Variables, functions and targets defined in open make documents.
    fn user_symbols(&self, uri: &str) -> Vec<CompletionItem> {
        let mut symbols: BTreeMap<&str, CompletionItem> = BTreeMap::new();
        for (tree_uri, tree) in self.store.make_trees(uri) {
            for node in tree.nodes() {
                let symbol = classify(node);
                let (kind, detail) = match symbol.role {
                    Role::VariableDefinition => (CompletionKind::Variable, "variable"),
                    Role::FunctionDefinition => (CompletionKind::Function, "function"),
                    Role::TargetDefinition => (CompletionKind::Target, "target"),
                    _ => continue,
                };
                if symbol.name.is_empty() || symbol.name.starts_with('.') {
                    continue;
                }
                symbols.entry(symbol.name).or_insert_with(|| CompletionItem {
                    label: symbol.name.to_string(),
                    detail: Some(detail.to_string()),
                    insert_text: symbol.name.to_string(),
                    kind,
                    documentation: Some(render_definition(tree_uri, node)),
                });
            }
        }
        symbols.into_values().collect()
    }

    /// Where the symbol at `position` is defined. For an include path, the
    /// included file.
    pub fn definition(&self, uri: &str, position: Point) -> Vec<Location> {
        let Some((document, node)) = self.make_node(uri, position) else {
            return Vec::new();
        };
        let symbol = classify(node);
        if symbol.role == Role::PathLiteral {
            return document
                .directory()
                .map(|dir| dir.join(symbol.name))
                .filter(|path| path.is_file())
                .map(|path| Location {
                    target: Target::File(path),
                    range: Range::default(),
                })
                .into_iter()
                .collect();
        }
        let Some(query) = Query::definitions(symbol) else {
            return Vec::new();
        };
        let trees = self.store.make_trees(uri);
        finder::definitions(&query, &Scope::new(trees))
            .into_iter()
            .map(|o| Location {
                target: Target::Document(o.uri.to_string()),
                range: o.range(),
            })
            .collect()
    }

    /// Every use of the symbol at `position`, preceded by its definitions
    /// when `include_declaration` is set.
    pub fn references(&self, uri: &str, position: Point, include_declaration: bool) -> Vec<Location> {
        let Some((_, node)) = self.make_node(uri, position) else {
            return Vec::new();
        };
        let symbol = classify(node);
        let Some(query) = Query::references(symbol) else {
            return Vec::new();
        };
        let scope = Scope::new(self.store.make_trees(uri));
        let mut found = Vec::new();
        if include_declaration && let Some(definitions) = Query::definitions(symbol) {
            found.extend(finder::find_all(&definitions, &scope));
        }
        found.extend(finder::find_all(&query, &scope));
        found
            .into_iter()
            .map(|o| Location {
                target: Target::Document(o.uri.to_string()),
                range: o.range(),
            })
            .collect()
    }

    fn make_node(&self, uri: &str, position: Point) -> Option<(&Document, Node<'_>)> {
        let document = self.store.get(uri)?;
        let node = document.tree()?.node_at_point(position)?;
        Some((document, node))
    }
}

fn findings(document: &Document) -> Vec<Finding> {
    match document.tree() {
        Some(tree) => diagnose(tree, document.directory()),
        None => Vec::new(),
    }
}

/// `<uri>` followed by the defining statement in a make code block.
fn render_definition(uri: &str, node: Node<'_>) -> String {
    format!("<{uri}>\n```make\n{}\n```", defining_statement(node).text().trim_end())
}

fn has_builtin_documentation(parent: NodeKind) -> bool {
    matches!(
        parent,
        NodeKind::Targets
            | NodeKind::VariableReference
            | NodeKind::FunctionCall
            | NodeKind::Conditional
            | NodeKind::IfeqDirective
            | NodeKind::IfneqDirective
            | NodeKind::IfdefDirective
            | NodeKind::IfndefDirective
            | NodeKind::ElsifDirective
            | NodeKind::ElseDirective
            | NodeKind::DefineDirective
            | NodeKind::UndefineDirective
            | NodeKind::IncludeDirective
            | NodeKind::ExportDirective
            | NodeKind::UnexportDirective
            | NodeKind::OverrideDirective
            | NodeKind::PrivateDirective
            | NodeKind::VpathDirective
    )
}

fn builtin_kind(name: &str, file_type: FileType) -> CompletionKind {
    match file_type {
        FileType::Config => CompletionKind::Macro,
        FileType::Make if FUNCTIONS.contains(&name) => CompletionKind::Function,
        FileType::Make if MAKE_KEYWORDS.contains(&name) => CompletionKind::Keyword,
        FileType::Make => CompletionKind::Variable,
    }
}

fn builtin_detail(name: &str, file_type: FileType) -> &'static str {
    match builtin_kind(name, file_type) {
        CompletionKind::Macro => "macro",
        CompletionKind::Function => "builtin function",
        CompletionKind::Keyword => "directive",
        _ => "builtin variable",
    }
}

fn is_make_char(c: char) -> bool {
    !matches!(c, '$' | '(' | ')' | ' ' | '\t')
}

fn is_macro_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn line_at(text: &str, position: Point) -> Option<&str> {
    text.split('\n')
        .nth(position.row as usize)
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
}

/// Byte bounds of the run of word characters touching `column`.
fn word_at(line: &str, column: usize, is_word: fn(char) -> bool) -> Option<(usize, usize)> {
    if column > line.len() || !line.is_char_boundary(column) {
        return None;
    }
    let start = line[..column]
        .char_indices()
        .rev()
        .take_while(|&(_, c)| is_word(c))
        .last()
        .map_or(column, |(i, _)| i);
    let end = line[column..]
        .char_indices()
        .find(|&(_, c)| !is_word(c))
        .map_or(line.len(), |(i, _)| column + i);
    (start < end).then_some((start, end))
}

fn line_range(row: u32, start: usize, end: usize) -> Range {
    Range::new(Point::new(row, start as u32), Point::new(row, end as u32))
}
