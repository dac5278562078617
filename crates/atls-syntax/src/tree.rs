use std::fmt;

/// Source span as a byte range.
pub type Span = std::ops::Range<usize>;

/// A zero-based row and byte column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Point {
    /// Zero-based line number.
    pub row: u32,
    /// Zero-based byte offset within the line.
    pub column: u32,
}

impl Point {
    /// Create a point from a row and a column.
    pub fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }
}

impl From<tree_sitter::Point> for Point {
    fn from(point: tree_sitter::Point) -> Self {
        Self::new(point.row as u32, point.column as u32)
    }
}

/// Displays as a one-based `line:column` pair, the way editors show positions.
impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row + 1, self.column + 1)
    }
}

/// A row/column span, start inclusive and end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Range {
    /// First position.
    pub start: Point,
    /// Position one past the end.
    pub end: Point,
}

impl Range {
    /// Create a range.
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Whether `point` lies inside, counting both ends.
    pub fn contains(&self, point: Point) -> bool {
        self.start <= point && point <= self.end
    }
}

/// Type tag of a syntax node.
///
/// One variant per named node type of the make grammar, plus `Error` for
/// input the parser skipped and `Token` for every anonymous token (keywords,
/// operators, punctuation). [`Node::grammar_kind`] has the exact name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Root of every tree.
    Makefile,
    /// `targets : prerequisites` plus its recipe.
    Rule,
    /// Left-hand side of a rule.
    Targets,
    /// Normal or order-only right-hand side of a rule.
    Prerequisites,
    /// Target or prerequisite pattern of a static pattern rule.
    PatternList,
    /// All recipe lines of a rule.
    Recipe,
    /// One recipe line.
    RecipeLine,
    /// Shell command text of a recipe line.
    ShellText,
    /// `VPATH = dirs`.
    VpathAssignment,
    /// `.RECIPEPREFIX = c`.
    RecipeprefixAssignment,
    /// `NAME = value`, optionally target-specific.
    VariableAssignment,
    /// `NAME != command`.
    ShellAssignment,
    /// `define NAME ... endef`.
    DefineDirective,
    /// Unparsed body of a `define` directive.
    RawText,
    /// `include`, `-include` or `sinclude`.
    IncludeDirective,
    /// `vpath pattern dirs`.
    VpathDirective,
    /// Colon-separated directory list.
    Paths,
    /// `export ...`.
    ExportDirective,
    /// `unexport ...`.
    UnexportDirective,
    /// `override ...`.
    OverrideDirective,
    /// `undefine NAME`.
    UndefineDirective,
    /// `private NAME = value`.
    PrivateDirective,
    /// An `if...`/`else`/`endif` block.
    Conditional,
    /// `else ifeq ...` and friends.
    ElsifDirective,
    /// Plain `else`.
    ElseDirective,
    /// `ifeq` header.
    IfeqDirective,
    /// `ifneq` header.
    IfneqDirective,
    /// `ifdef` header.
    IfdefDirective,
    /// `ifndef` header.
    IfndefDirective,
    /// `$(NAME)`, `${NAME}` or `$N`.
    VariableReference,
    /// `$(NAME:from=to)`.
    SubstitutionReference,
    /// `$@`, `$(<D)` and the other automatic variables.
    AutomaticVariable,
    /// `$(function arguments)`.
    FunctionCall,
    /// `$(shell command)`.
    ShellFunction,
    /// Command of a shell assignment or `$(shell ...)`.
    ShellCommand,
    /// Arguments of a function call.
    Arguments,
    /// Whitespace-separated items.
    List,
    /// Adjacent pieces without whitespace between them, e.g. `$(DIR)/a.mk`.
    Concatenation,
    /// Quoted string.
    String,
    /// `lib(member)`.
    Archive,
    /// A single word.
    Word,
    /// Free text: a variable value, a function argument.
    Text,
    /// `$$` or `//`.
    Escape,
    /// `# ...`.
    Comment,
    /// Input that could not be parsed.
    Error,
    /// Anonymous token.
    Token,
}

impl NodeKind {
    /// Map a grammar node type to its kind.
    pub fn from_grammar(kind: &str, named: bool) -> Self {
        if !named {
            return NodeKind::Token;
        }
        match kind {
            "makefile" => NodeKind::Makefile,
            "rule" => NodeKind::Rule,
            "targets" => NodeKind::Targets,
            "prerequisites" => NodeKind::Prerequisites,
            "pattern_list" => NodeKind::PatternList,
            "recipe" => NodeKind::Recipe,
            "recipe_line" => NodeKind::RecipeLine,
            "shell_text" => NodeKind::ShellText,
            "VPATH_assignment" => NodeKind::VpathAssignment,
            "RECIPEPREFIX_assignment" => NodeKind::RecipeprefixAssignment,
            "variable_assignment" => NodeKind::VariableAssignment,
            "shell_assignment" => NodeKind::ShellAssignment,
            "define_directive" => NodeKind::DefineDirective,
            "raw_text" => NodeKind::RawText,
            "include_directive" => NodeKind::IncludeDirective,
            "vpath_directive" => NodeKind::VpathDirective,
            "paths" => NodeKind::Paths,
            "export_directive" => NodeKind::ExportDirective,
            "unexport_directive" => NodeKind::UnexportDirective,
            "override_directive" => NodeKind::OverrideDirective,
            "undefine_directive" => NodeKind::UndefineDirective,
            "private_directive" => NodeKind::PrivateDirective,
            "conditional" => NodeKind::Conditional,
            "elsif_directive" => NodeKind::ElsifDirective,
            "else_directive" => NodeKind::ElseDirective,
            "ifeq_directive" => NodeKind::IfeqDirective,
            "ifneq_directive" => NodeKind::IfneqDirective,
            "ifdef_directive" => NodeKind::IfdefDirective,
            "ifndef_directive" => NodeKind::IfndefDirective,
            "variable_reference" => NodeKind::VariableReference,
            "substitution_reference" => NodeKind::SubstitutionReference,
            "automatic_variable" => NodeKind::AutomaticVariable,
            "function_call" => NodeKind::FunctionCall,
            "shell_function" => NodeKind::ShellFunction,
            "shell_command" => NodeKind::ShellCommand,
            "arguments" => NodeKind::Arguments,
            "list" => NodeKind::List,
            "concatenation" => NodeKind::Concatenation,
            "string" => NodeKind::String,
            "archive" => NodeKind::Archive,
            "word" => NodeKind::Word,
            "text" => NodeKind::Text,
            "escape" => NodeKind::Escape,
            "comment" => NodeKind::Comment,
            // "ERROR", and hidden rules that only show up as missing nodes
            _ => NodeKind::Error,
        }
    }
}

/// An immutable parsed make file: the tree-sitter tree plus the text it was
/// parsed from.
///
/// `tree_sitter::Tree` is `Send + Sync`, so trees are shared as
/// `Arc<SyntaxTree>` and replaced, never edited.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    source: String,
    tree: tree_sitter::Tree,
    line_starts: Vec<usize>,
}

impl SyntaxTree {
    pub(crate) fn new(source: String, tree: tree_sitter::Tree) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            source,
            tree,
            line_starts,
        }
    }

    /// The text this tree was parsed from, always newline-terminated.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The `makefile` root node.
    pub fn root_node(&self) -> Node<'_> {
        Node {
            inner: self.tree.root_node(),
            tree: self,
        }
    }

    /// Every node in pre-order, root first.
    pub fn nodes(&self) -> Descendants<'_> {
        self.root_node().descendants()
    }

    /// Number of nodes, named and anonymous.
    pub fn len(&self) -> usize {
        self.nodes().count()
    }

    /// Whether the tree is only a root.
    pub fn is_empty(&self) -> bool {
        self.root_node().child_count() == 0
    }

    /// Row and column of a byte offset (clamped to the source length).
    pub fn point_at(&self, offset: usize) -> Point {
        let offset = offset.min(self.source.len());
        let row = self.line_starts.partition_point(|&start| start <= offset) - 1;
        Point {
            row: row as u32,
            column: (offset - self.line_starts[row]) as u32,
        }
    }

    /// Byte offset of a point. A column past the end of its line is clamped
    /// to the line end; a row past the last line gives `None`.
    pub fn offset_at(&self, point: Point) -> Option<usize> {
        let row = point.row as usize;
        let start = *self.line_starts.get(row)?;
        let end = self
            .line_starts
            .get(row + 1)
            .map(|next| next - 1)
            .unwrap_or(self.source.len());
        let line = &self.source[start..end];
        let line_len = line.strip_suffix('\r').unwrap_or(line).len();
        Some(start + (point.column as usize).min(line_len))
    }

    /// The deepest node whose span contains `offset`, with both ends inclusive.
    ///
    /// When several children contain the offset the first named one in
    /// document order wins, so a cursor between `$(` and a variable name lands
    /// on the name rather than the punctuation. Missing nodes are never
    /// returned.
    pub fn node_at(&self, offset: usize) -> Option<Node<'_>> {
        let root = self.root_node();
        if offset > root.end_byte() {
            return None;
        }
        let mut node = root;
        loop {
            let mut candidates = node
                .children()
                .filter(|c| !c.is_missing() && c.start_byte() <= offset && offset <= c.end_byte());
            let first = candidates.next();
            let next = match first {
                Some(c) if c.is_named() => Some(c),
                Some(c) => candidates.find(|n| n.is_named()).or(Some(c)),
                None => None,
            };
            match next {
                Some(child) => node = child,
                None => return Some(node),
            }
        }
    }

    /// [`SyntaxTree::node_at`] for a row/column position.
    pub fn node_at_point(&self, point: Point) -> Option<Node<'_>> {
        self.offset_at(point).and_then(|offset| self.node_at(offset))
    }

    /// S-expression of the named nodes with field names, e.g.
    /// `(makefile (rule (targets (word)) normal: (prerequisites (word))))`.
    pub fn to_sexp(&self) -> String {
        self.tree.root_node().to_sexp()
    }
}

/// A node of a [`SyntaxTree`], able to slice its own text.
#[derive(Clone, Copy)]
pub struct Node<'t> {
    inner: tree_sitter::Node<'t>,
    tree: &'t SyntaxTree,
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl Eq for Node<'_> {}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.inner.kind(), self.span())
    }
}

impl<'t> Node<'t> {
    fn wrap(&self, inner: tree_sitter::Node<'t>) -> Node<'t> {
        Node {
            inner,
            tree: self.tree,
        }
    }

    /// The tree this node belongs to.
    pub fn tree(&self) -> &'t SyntaxTree {
        self.tree
    }

    /// Type tag.
    pub fn kind(&self) -> NodeKind {
        NodeKind::from_grammar(self.inner.kind(), self.inner.is_named())
    }

    /// The grammar's name for this node: `word`, `ERROR`, or the token
    /// itself (`include`, `:=`) for anonymous nodes.
    pub fn grammar_kind(&self) -> &'static str {
        self.inner.kind()
    }

    /// Whether the node is named in the grammar, as opposed to a token.
    pub fn is_named(&self) -> bool {
        self.inner.is_named()
    }

    /// Whether the parser inserted this zero-width node for an expected
    /// token that was not there.
    pub fn is_missing(&self) -> bool {
        self.inner.is_missing()
    }

    /// What a missing node stands for, e.g. `word`.
    pub fn missing_text(&self) -> Option<&'static str> {
        self.is_missing().then(|| self.inner.kind())
    }

    /// Whether this node or anything below it is an error or missing node.
    pub fn has_error(&self) -> bool {
        self.inner.has_error()
    }

    /// Whether this is an `ERROR` node.
    pub fn is_error(&self) -> bool {
        self.inner.is_error()
    }

    /// Byte span.
    pub fn span(&self) -> Span {
        self.inner.byte_range()
    }

    /// First byte.
    pub fn start_byte(&self) -> usize {
        self.inner.start_byte()
    }

    /// One past the last byte.
    pub fn end_byte(&self) -> usize {
        self.inner.end_byte()
    }

    /// Row/column of the first byte.
    pub fn start_point(&self) -> Point {
        self.inner.start_position().into()
    }

    /// Row/column one past the last byte.
    pub fn end_point(&self) -> Point {
        self.inner.end_position().into()
    }

    /// Row/column range.
    pub fn range(&self) -> Range {
        Range::new(self.start_point(), self.end_point())
    }

    /// Source text covered by this node. Empty for missing nodes.
    pub fn text(&self) -> &'t str {
        self.tree.source.get(self.span()).unwrap_or_default()
    }

    /// Parent node, `None` for the root.
    pub fn parent(&self) -> Option<Node<'t>> {
        self.inner.parent().map(|p| self.wrap(p))
    }

    /// Child at `index`, counting anonymous tokens.
    pub fn child(&self, index: usize) -> Option<Node<'t>> {
        self.inner.child(index).map(|c| self.wrap(c))
    }

    /// Number of children, counting anonymous tokens.
    pub fn child_count(&self) -> usize {
        self.inner.child_count()
    }

    /// Children in document order.
    pub fn children(&self) -> impl ExactSizeIterator<Item = Node<'t>> + use<'t> {
        let this = *self;
        (0..self.child_count()).filter_map(move |i| this.child(i)).collect::<Vec<_>>().into_iter()
    }

    /// Named children in document order.
    pub fn named_children(&self) -> impl Iterator<Item = Node<'t>> + use<'t> {
        self.children().filter(|c| c.is_named())
    }

    /// The child stored under a grammar field, e.g. `name` of an assignment.
    pub fn child_by_field_name(&self, field: &str) -> Option<Node<'t>> {
        self.inner.child_by_field_name(field).map(|c| self.wrap(c))
    }

    /// The grammar field this node fills in its parent, if any.
    pub fn field_name(&self) -> Option<&'static str> {
        let parent = self.inner.parent()?;
        let index = self.index_in_parent()?;
        parent.field_name_for_child(index as u32)
    }

    /// Position of this node among its parent's children.
    pub fn index_in_parent(&self) -> Option<usize> {
        let parent = self.parent()?;
        parent.children().position(|c| c == *self)
    }

    /// Parent, grandparent, and so on up to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = Node<'t>> + use<'t> {
        std::iter::successors(self.parent(), |n| n.parent())
    }

    /// This node and everything below it, in pre-order.
    pub fn descendants(&self) -> Descendants<'t> {
        Descendants {
            tree: self.tree,
            cursor: self.inner.walk(),
            done: false,
        }
    }
}

/// Lazy pre-order walk over a subtree, driven by a tree-sitter cursor.
pub struct Descendants<'t> {
    tree: &'t SyntaxTree,
    cursor: tree_sitter::TreeCursor<'t>,
    done: bool,
}

impl<'t> Iterator for Descendants<'t> {
    type Item = Node<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let node = Node {
            inner: self.cursor.node(),
            tree: self.tree,
        };
        if !self.cursor.goto_first_child() {
            loop {
                if self.cursor.goto_next_sibling() {
                    break;
                }
                // back at the node the walk started from
                if !self.cursor.goto_parent() {
                    self.done = true;
                    break;
                }
            }
        }
        Some(node)
    }
}
