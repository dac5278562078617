use atls_syntax::{Node, NodeKind};

/// What a node means to hover, definition and reference requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Name of a variable assignment.
    VariableDefinition,
    /// Variable name inside `$(...)`, or listed by `export`, `ifdef` and friends.
    VariableReference,
    /// Name of a `define` block.
    FunctionDefinition,
    /// Argument of a function call, e.g. the callee of `$(call name,...)`.
    FunctionCall,
    /// Target of a rule.
    TargetDefinition,
    /// Prerequisite of a rule.
    TargetReference,
    /// File named by an `include` directive.
    PathLiteral,
    /// Nothing to resolve.
    Other,
}

/// Which namespace a role lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// Variables.
    Variable,
    /// `define`d functions.
    Function,
    /// Rule targets.
    Target,
}

impl Role {
    /// The namespace of this role, `None` for paths and other nodes.
    pub fn family(self) -> Option<Family> {
        match self {
            Role::VariableDefinition | Role::VariableReference => Some(Family::Variable),
            Role::FunctionDefinition | Role::FunctionCall => Some(Family::Function),
            Role::TargetDefinition | Role::TargetReference => Some(Family::Target),
            Role::PathLiteral | Role::Other => None,
        }
    }

    /// Whether this role defines its symbol.
    pub fn is_definition(self) -> bool {
        matches!(
            self,
            Role::VariableDefinition | Role::FunctionDefinition | Role::TargetDefinition
        )
    }
}

impl Family {
    /// The defining role of this namespace.
    pub fn definition(self) -> Role {
        match self {
            Family::Variable => Role::VariableDefinition,
            Family::Function => Role::FunctionDefinition,
            Family::Target => Role::TargetDefinition,
        }
    }

    /// The referencing role of this namespace.
    pub fn reference(self) -> Role {
        match self {
            Family::Variable => Role::VariableReference,
            Family::Function => Role::FunctionCall,
            Family::Target => Role::TargetReference,
        }
    }
}

/// A classified node: its role and the name it resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol<'t> {
    /// Resolved name; the node text, or its first comma-separated segment
    /// for function calls.
    pub name: &'t str,
    /// The role of the node.
    pub role: Role,
}

fn parent_kind(node: Node<'_>) -> Option<NodeKind> {
    node.parent().map(|p| p.kind())
}

fn grandparent_kind(node: Node<'_>) -> Option<NodeKind> {
    node.parent().and_then(|p| p.parent()).map(|g| g.kind())
}

fn is_name_of(node: Node<'_>, kinds: &[NodeKind]) -> bool {
    node.kind() == NodeKind::Word
        && node.field_name() == Some("name")
        && parent_kind(node).is_some_and(|kind| kinds.contains(&kind))
}

fn is_variable_definition(node: Node<'_>) -> bool {
    is_name_of(node, &[NodeKind::VariableAssignment, NodeKind::ShellAssignment])
}

fn is_variable_reference(node: Node<'_>) -> bool {
    if node.kind() != NodeKind::Word {
        return false;
    }
    match parent_kind(node) {
        Some(
            NodeKind::VariableReference
            | NodeKind::IfdefDirective
            | NodeKind::IfndefDirective
            | NodeKind::UndefineDirective,
        ) => true,
        Some(NodeKind::SubstitutionReference) => node.field_name() == Some("text"),
        Some(NodeKind::List) => matches!(
            grandparent_kind(node),
            Some(NodeKind::ExportDirective | NodeKind::UnexportDirective)
        ),
        _ => false,
    }
}

fn is_function_definition(node: Node<'_>) -> bool {
    is_name_of(node, &[NodeKind::DefineDirective])
}

fn is_function_call(node: Node<'_>) -> bool {
    node.kind() == NodeKind::Text && parent_kind(node) == Some(NodeKind::Arguments)
}

fn is_target_definition(node: Node<'_>) -> bool {
    node.kind() == NodeKind::Word && parent_kind(node) == Some(NodeKind::Targets)
}

fn is_target_reference(node: Node<'_>) -> bool {
    node.kind() == NodeKind::Word && parent_kind(node) == Some(NodeKind::Prerequisites)
}

fn is_path_literal(node: Node<'_>) -> bool {
    node.kind() == NodeKind::Word
        && parent_kind(node) == Some(NodeKind::List)
        && grandparent_kind(node) == Some(NodeKind::IncludeDirective)
}

/// Classify a node from its kind, the grammar field it fills and its
/// parent's and grandparent's kinds.
///
/// Only the `name` field of an assignment defines a variable, so the target
/// list of `foo: CFLAGS += -g` is neither a definition nor a rule target.
pub fn classify(node: Node<'_>) -> Symbol<'_> {
    let text = node.text();
    let role = if node.is_missing() {
        Role::Other
    } else if is_variable_definition(node) {
        Role::VariableDefinition
    } else if is_target_definition(node) {
        Role::TargetDefinition
    } else if is_target_reference(node) {
        Role::TargetReference
    } else if is_variable_reference(node) {
        Role::VariableReference
    } else if is_function_call(node) {
        Role::FunctionCall
    } else if is_function_definition(node) {
        Role::FunctionDefinition
    } else if is_path_literal(node) {
        Role::PathLiteral
    } else {
        Role::Other
    };
    let name = match role {
        Role::FunctionCall => text.split(',').next().unwrap_or(text),
        _ => text,
    };
    Symbol { name, role }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atls_syntax::{SyntaxTree, parse};

    fn parse_ok(source: &str) -> SyntaxTree {
        parse(source).unwrap()
    }

    fn role_of<'a>(tree: &'a SyntaxTree, kind: NodeKind, text: &str) -> Symbol<'a> {
        let node = tree
            .nodes()
            .find(|n| n.kind() == kind && n.text() == text)
            .unwrap_or_else(|| panic!("no {kind:?} {text:?}"));
        classify(node)
    }

    #[test]
    fn assignment_name_is_definition() {
        let tree = parse_ok("CC := gcc\n");
        assert_eq!(
            role_of(&tree, NodeKind::Word, "CC"),
            Symbol { name: "CC", role: Role::VariableDefinition }
        );
    }

    #[test]
    fn export_assignment_is_definition() {
        let tree = parse_ok("export CC := gcc\n");
        assert_eq!(role_of(&tree, NodeKind::Word, "CC").role, Role::VariableDefinition);
    }

    #[test]
    fn export_list_is_reference() {
        let tree = parse_ok("export CC LD\nunexport AR\n");
        assert_eq!(role_of(&tree, NodeKind::Word, "LD").role, Role::VariableReference);
        assert_eq!(role_of(&tree, NodeKind::Word, "AR").role, Role::VariableReference);
    }

    #[test]
    fn reference_and_ifdef_are_references() {
        let tree = parse_ok("ifdef DEBUG\nX = $(CC)\nendif\n");
        assert_eq!(role_of(&tree, NodeKind::Word, "DEBUG").role, Role::VariableReference);
        assert_eq!(role_of(&tree, NodeKind::Word, "CC").role, Role::VariableReference);
    }

    #[test]
    fn rule_targets_and_prerequisites() {
        let tree = parse_ok("all: app\napp: main.o\n");
        let all = role_of(&tree, NodeKind::Word, "all");
        assert_eq!(all.role, Role::TargetDefinition);
        let app = tree
            .nodes()
            .filter(|n| n.kind() == NodeKind::Word && n.text() == "app")
            .map(|n| classify(n).role)
            .collect::<Vec<_>>();
        assert_eq!(app, vec![Role::TargetReference, Role::TargetDefinition]);
    }

    #[test]
    fn define_name_is_function_definition() {
        let tree = parse_ok("define greet\n@echo hi\nendef\n");
        assert_eq!(role_of(&tree, NodeKind::Word, "greet").role, Role::FunctionDefinition);
    }

    #[test]
    fn call_argument_is_function_call_named_by_first_segment() {
        let tree = parse_ok("X = $(call greet,world)\n");
        assert_eq!(
            role_of(&tree, NodeKind::Text, "greet,world"),
            Symbol { name: "greet", role: Role::FunctionCall }
        );
    }

    #[test]
    fn include_word_is_path() {
        let tree = parse_ok("include config.mk\n");
        assert_eq!(role_of(&tree, NodeKind::Word, "config.mk").role, Role::PathLiteral);
        let keyword = tree.nodes().find(|n| n.text() == "include").unwrap();
        assert_eq!(classify(keyword).role, Role::Other);
    }

    #[test]
    fn recipe_text_is_other() {
        let tree = parse_ok("all:\n\techo hi\n");
        let shell = tree.nodes().find(|n| n.kind() == NodeKind::ShellText).unwrap();
        assert_eq!(classify(shell).role, Role::Other);
    }

    #[test]
    fn target_specific_assignment_defines_no_target() {
        let tree = parse_ok("foo: CFLAGS += -g\nfoo:\n\techo\n");
        let roles: Vec<_> = tree
            .nodes()
            .filter(|n| n.kind() == NodeKind::Word && n.text() == "foo")
            .map(|n| classify(n).role)
            .collect();
        assert_eq!(roles, vec![Role::Other, Role::TargetDefinition]);
        assert_eq!(role_of(&tree, NodeKind::Word, "CFLAGS").role, Role::VariableDefinition);
    }

    #[test]
    fn undefine_operand_is_reference() {
        let tree = parse_ok("undefine FOO\noverride undefine BAR\n");
        assert_eq!(role_of(&tree, NodeKind::Word, "FOO").role, Role::VariableReference);
        assert_eq!(role_of(&tree, NodeKind::Word, "BAR").role, Role::VariableReference);
    }

    #[test]
    fn shell_assignment_name_is_definition() {
        let tree = parse_ok("NOW != date\n");
        assert_eq!(role_of(&tree, NodeKind::Word, "NOW").role, Role::VariableDefinition);
    }

    #[test]
    fn substitution_reference_names_its_variable() {
        let tree = parse_ok("OBJS = $(SRCS:.c=.o)\n");
        assert_eq!(role_of(&tree, NodeKind::Word, "SRCS").role, Role::VariableReference);
        assert_eq!(role_of(&tree, NodeKind::Word, ".c").role, Role::Other);
    }

    #[test]
    fn assignment_value_is_other() {
        let tree = parse_ok("A = b\n");
        let value = tree.nodes().find(|n| n.kind() == NodeKind::Text).unwrap();
        assert_eq!(classify(value).role, Role::Other);
    }

    #[test]
    fn families_pair_definitions_with_references() {
        for family in [Family::Variable, Family::Function, Family::Target] {
            assert!(family.definition().is_definition());
            assert!(!family.reference().is_definition());
            assert_eq!(family.definition().family(), Some(family));
            assert_eq!(family.reference().family(), Some(family));
        }
        assert_eq!(Role::PathLiteral.family(), None);
    }
}
