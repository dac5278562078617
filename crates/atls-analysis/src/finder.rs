//! Symbol search over one or more syntax trees.
//!
//! A [`Query`] is built from the classified node under the cursor and then
//! matched against every node of a [`Scope`] in pre-order. Nothing is
//! indexed: trees are small and re-walked on every request.

use std::collections::HashMap;

use atls_syntax::{Node, NodeKind, Range, SyntaxTree};

use crate::role::{Family, Role, Symbol, classify};

/// Whether a query looks for defining or referencing sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Search {
    /// Sites that define the symbol.
    Definitions,
    /// Sites that use the symbol.
    References,
}

/// A symbol search: a name, its namespace and the kind of site wanted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    name: String,
    family: Family,
    search: Search,
}

impl Query {
    /// A query for `name` in `family`.
    pub fn new(name: impl Into<String>, family: Family, search: Search) -> Self {
        Self {
            name: name.into(),
            family,
            search,
        }
    }

    /// Definitions of a classified symbol, `None` for paths and other nodes.
    pub fn definitions(symbol: Symbol<'_>) -> Option<Self> {
        Some(Self::new(symbol.name, symbol.role.family()?, Search::Definitions))
    }

    /// References to a classified symbol, `None` for paths and other nodes.
    pub fn references(symbol: Symbol<'_>) -> Option<Self> {
        Some(Self::new(symbol.name, symbol.role.family()?, Search::References))
    }

    /// The name searched for.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The namespace searched.
    pub fn family(&self) -> Family {
        self.family
    }

    /// The kind of site searched for.
    pub fn search(&self) -> Search {
        self.search
    }

    fn role(&self) -> Role {
        match self.search {
            Search::Definitions => self.family.definition(),
            Search::References => self.family.reference(),
        }
    }

    /// Whether `node` is a site this query is looking for.
    pub fn matches(&self, node: Node<'_>) -> bool {
        let symbol = classify(node);
        if symbol.role != self.role() {
            return false;
        }
        match symbol.role {
            // merged argument text: `greet,world` calls `greet`, but a name
            // can sit in any segment of nested calls
            Role::FunctionCall => node.text().split(',').any(|part| part == self.name),
            _ => symbol.name == self.name,
        }
    }
}

/// The trees a query runs over, each tagged with its document URI.
#[derive(Debug, Clone, Default)]
pub struct Scope<'t> {
    trees: Vec<(&'t str, &'t SyntaxTree)>,
}

impl<'t> Scope<'t> {
    /// A scope of several documents, searched in the given order.
    pub fn new(trees: impl IntoIterator<Item = (&'t str, &'t SyntaxTree)>) -> Self {
        Self {
            trees: trees.into_iter().collect(),
        }
    }

    /// A scope of one document.
    pub fn single(uri: &'t str, tree: &'t SyntaxTree) -> Self {
        Self {
            trees: vec![(uri, tree)],
        }
    }

    /// The documents of this scope.
    pub fn trees(&self) -> &[(&'t str, &'t SyntaxTree)] {
        &self.trees
    }
}

/// A node found by a query, with the document it lives in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Occurrence<'t> {
    /// URI of the document.
    pub uri: &'t str,
    /// The matching node.
    pub node: Node<'t>,
}

impl<'t> Occurrence<'t> {
    /// Row/column range of the node.
    pub fn range(&self) -> Range {
        self.node.range()
    }

    /// Source text of the node.
    pub fn text(&self) -> &'t str {
        self.node.text()
    }
}

/// Lazily walk `scope` in document order and yield every match of `query`.
pub fn occurrences<'a, 't>(
    query: &'a Query,
    scope: &'a Scope<'t>,
) -> impl Iterator<Item = Occurrence<'t>> + use<'a, 't> {
    scope.trees.iter().flat_map(move |&(uri, tree)| {
        tree.nodes()
            .filter(move |&node| query.matches(node))
            .map(move |node| Occurrence { uri, node })
    })
}

/// Every match of `query` in `scope`.
pub fn find_all<'t>(query: &Query, scope: &Scope<'t>) -> Vec<Occurrence<'t>> {
    let found: Vec<_> = occurrences(query, scope).collect();
    tracing::debug!(name = query.name(), family = ?query.family(), count = found.len(), "find_all");
    found
}

/// The first match of `query` in `scope`, stopping the walk there.
pub fn find_first<'t>(query: &Query, scope: &Scope<'t>) -> Option<Occurrence<'t>> {
    occurrences(query, scope).next()
}

/// Definitions of `query`, effective one first.
///
/// A target defined by several rules is defined by the last of them, so for
/// targets the last definition in the first document of the scope moves to
/// the front. Other results keep document order.
pub fn definitions<'t>(query: &Query, scope: &Scope<'t>) -> Vec<Occurrence<'t>> {
    let query = Query {
        search: Search::Definitions,
        ..query.clone()
    };
    let mut found = find_all(&query, scope);
    if query.family == Family::Target
        && let Some(first_uri) = found.first().map(|o| o.uri)
    {
        let last_in_first = found.iter().rposition(|o| o.uri == first_uri);
        if let Some(index) = last_in_first {
            found[..=index].rotate_right(1);
        }
    }
    found
}

/// A rule target that a later rule for the same name overrides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadowed<'t> {
    /// The overridden target word.
    pub node: Node<'t>,
    /// The target word of the rule that wins.
    pub definition: Node<'t>,
}

/// Rule targets repeated by a later rule.
///
/// Target words are walked from the end of the file; the first one seen for
/// a name is recorded and every earlier one is reported against it. Names
/// starting with `.` (`.PHONY`, `.SUFFIXES`, ...) may legitimately repeat.
/// Results are in document order.
pub fn shadowed_targets(tree: &SyntaxTree) -> Vec<Shadowed<'_>> {
    let targets: Vec<Node<'_>> = tree
        .nodes()
        .filter(|&node| classify(node).role == Role::TargetDefinition)
        .collect();

    let mut recorded: HashMap<&str, Node<'_>> = HashMap::new();
    let mut shadowed = Vec::new();
    for &node in targets.iter().rev() {
        let name = node.text();
        match recorded.get(name) {
            Some(&definition) if !name.starts_with('.') => {
                shadowed.push(Shadowed { node, definition });
            }
            Some(_) => {}
            None => {
                recorded.insert(name, node);
            }
        }
    }
    shadowed.reverse();
    shadowed
}

/// The rule or statement a definition belongs to, for hover rendering.
/// Assignments wrapped in `export`, `override` or `private` come with
/// their directive.
pub fn defining_statement(node: Node<'_>) -> Node<'_> {
    let Some(parent) = node.parent() else {
        return node;
    };
    let statement = if parent.kind() == NodeKind::Targets {
        parent.parent().unwrap_or(parent)
    } else {
        parent
    };
    match statement.parent() {
        Some(directive)
            if matches!(
                directive.kind(),
                NodeKind::ExportDirective | NodeKind::OverrideDirective | NodeKind::PrivateDirective
            ) =>
        {
            directive
        }
        _ => statement,
    }
}
