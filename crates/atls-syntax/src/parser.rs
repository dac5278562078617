use crate::error::{SyntaxError, SyntaxResult};
use crate::tree::SyntaxTree;

/// Functions the make grammar knows by name. `$(name ...)` with any other
/// name is a variable reference.
pub const FUNCTIONS: &[&str] = &[
    "subst", "patsubst", "strip", "findstring", "filter", "filter-out", "sort", "word", "words",
    "wordlist", "firstword", "lastword", "dir", "notdir", "suffix", "basename", "addsuffix",
    "addprefix", "join", "wildcard", "realpath", "abspath", "error", "warning", "info", "origin",
    "flavor", "foreach", "if", "or", "and", "call", "eval", "file", "value", "shell",
];

/// A tree-sitter parser loaded with the make grammar.
///
/// Holding on to one avoids reloading the grammar for every document; a
/// parser is not `Sync`, so each thread needs its own.
pub struct MakeParser {
    parser: tree_sitter::Parser,
}

impl MakeParser {
    /// Load the make grammar.
    pub fn new() -> SyntaxResult<Self> {
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&tree_sitter_make::LANGUAGE.into())?;
        Ok(Self { parser })
    }

    /// Parse a whole make file.
    ///
    /// Malformed input never fails: it shows up as `ERROR` and missing
    /// nodes in the tree. A final newline is added when the text lacks one,
    /// since the grammar ends every statement with a line break.
    pub fn parse(&mut self, source: &str) -> SyntaxResult<SyntaxTree> {
        let mut source = source.to_string();
        if !source.is_empty() && !source.ends_with('\n') {
            source.push('\n');
        }
        let tree = self
            .parser
            .parse(&source, None)
            .ok_or(SyntaxError::NoTree)?;
        tracing::debug!(
            bytes = source.len(),
            has_error = tree.root_node().has_error(),
            "parsed make file"
        );
        Ok(SyntaxTree::new(source, tree))
    }
}

/// Parse `source` with a fresh [`MakeParser`].
pub fn parse(source: &str) -> SyntaxResult<SyntaxTree> {
    MakeParser::new()?.parse(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::NodeKind;

    fn sexp(source: &str) -> String {
        parse(source).unwrap().to_sexp()
    }

    #[test]
    fn parse_empty_source() {
        let tree = parse("").unwrap();
        assert_eq!(tree.to_sexp(), "(makefile)");
        assert!(tree.is_empty());
        assert!(!tree.root_node().has_error());
    }

    #[test]
    fn parse_rule_with_recipe() {
        insta::assert_snapshot!(
            sexp("all: main.o util.o\n\tcc -o app $(OBJS)\n"),
            @"(makefile (rule (targets (word)) normal: (prerequisites (word) (word)) (recipe (recipe_line (shell_text (variable_reference (word)))))))"
        );
    }

    #[test]
    fn parse_assignment_flavors() {
        for source in ["A = 1", "A := 1", "A ::= 1", "A ?= 1", "A += 1"] {
            assert_eq!(
                sexp(source),
                "(makefile (variable_assignment name: (word) value: (text)))",
                "{source}"
            );
        }
        assert_eq!(
            sexp("A != echo 1\n"),
            "(makefile (shell_assignment name: (word) value: (shell_command)))"
        );
        assert_eq!(sexp("A =\n"), "(makefile (variable_assignment name: (word)))");
    }

    #[test]
    fn missing_final_newline_is_not_an_error() {
        let tree = parse("A = 1").unwrap();
        assert!(!tree.root_node().has_error());
        assert_eq!(tree.source(), "A = 1\n");
    }

    #[test]
    fn parse_target_specific_assignment() {
        insta::assert_snapshot!(
            sexp("foo: CFLAGS += -g\n"),
            @"(makefile (variable_assignment target_or_pattern: (list (word)) name: (word) value: (text)))"
        );
    }

    #[test]
    fn parse_undefine() {
        let tree = parse("undefine FOO\noverride undefine BAR\n").unwrap();
        assert!(!tree.root_node().has_error());
        insta::assert_snapshot!(
            tree.to_sexp(),
            @"(makefile (undefine_directive variable: (word)) (override_directive (undefine_directive variable: (word))))"
        );
    }

    #[test]
    fn parse_substitution_reference() {
        insta::assert_snapshot!(
            sexp("OBJS = $(SRCS:.c=.o)\n"),
            @"(makefile (variable_assignment name: (word) value: (text (substitution_reference text: (word) pattern: (word) replacement: (word)))))"
        );
    }

    #[test]
    fn parse_function_call_keeps_commas_in_text() {
        let tree = parse("X = $(subst a,b,c)\n").unwrap();
        let arguments = tree
            .nodes()
            .find(|n| n.kind() == NodeKind::Arguments)
            .unwrap();
        let texts: Vec<_> = arguments.named_children().map(|n| n.text()).collect();
        assert_eq!(texts, vec!["a,b,c"]);
        let call = arguments.parent().unwrap();
        assert_eq!(call.kind(), NodeKind::FunctionCall);
        assert_eq!(call.child(2).unwrap().grammar_kind(), "subst");
    }

    #[test]
    fn parse_include_with_reference() {
        insta::assert_snapshot!(
            sexp("include $(CURDIR)/x.mk\n"),
            @"(makefile (include_directive filenames: (list (concatenation (variable_reference (word)) (word)))))"
        );
    }

    #[test]
    fn parse_conditional_chain() {
        insta::assert_snapshot!(
            sexp("ifeq ($(CC),gcc)\nX = 1\nelse ifdef Y\nX = 2\nelse\nX = 3\nendif\n"),
            @"(makefile (conditional condition: (ifeq_directive arg0: (variable_reference (word)) arg1: (word)) consequence: (variable_assignment name: (word) value: (text)) (elsif_directive condition: (ifdef_directive variable: (word)) consequence: (variable_assignment name: (word) value: (text))) (else_directive consequence: (variable_assignment name: (word) value: (text)))))"
        );
    }

    #[test]
    fn parse_define_body_is_raw() {
        insta::assert_snapshot!(
            sexp("define greet =\n@echo $(1)\nendef\n"),
            @"(makefile (define_directive name: (word) value: (raw_text)))"
        );
    }

    #[test]
    fn parse_order_only_and_static_pattern_rules() {
        insta::assert_snapshot!(
            sexp("%.o: %.c | build\n\t$(CC) -c $<\n"),
            @"(makefile (rule (targets (word)) normal: (prerequisites (word)) order_only: (prerequisites (word)) (recipe (recipe_line (shell_text (variable_reference (word)) (automatic_variable))))))"
        );
        insta::assert_snapshot!(
            sexp("$(OBJS): %.o: %.c\n"),
            @"(makefile (rule (targets (variable_reference (word))) target: (pattern_list (word)) prerequisite: (pattern_list (word))))"
        );
    }

    #[test]
    fn parse_other_directives() {
        insta::assert_snapshot!(
            sexp("private X = 1\nvpath %.c src\nexport A B\n"),
            @"(makefile (private_directive (variable_assignment name: (word) value: (text))) (vpath_directive pattern: (word) directories: (paths (word))) (export_directive variables: (list (word) (word))))"
        );
    }

    #[test]
    fn parse_crlf_and_continuations() {
        assert_eq!(
            sexp("all:\r\n\techo\r\n"),
            "(makefile (rule (targets (word)) (recipe (recipe_line (shell_text)))))"
        );
        assert_eq!(
            sexp("SRC = a.c \\\n  b.c\n"),
            "(makefile (variable_assignment name: (word) value: (text)))"
        );
    }

    #[test]
    fn unparsable_line_is_an_error_node() {
        let tree = parse("all\n").unwrap();
        let error = tree.root_node().child(0).unwrap();
        assert!(error.is_error());
        assert_eq!(error.kind(), NodeKind::Error);
        assert_eq!(error.text(), "all");
    }

    #[test]
    fn missing_target_is_a_missing_node() {
        assert_eq!(
            sexp(": foo\n"),
            "(makefile (rule (targets (MISSING word)) normal: (prerequisites (word))))"
        );
    }

    #[test]
    fn parser_is_reusable() {
        let mut parser = MakeParser::new().unwrap();
        let first = parser.parse("A = 1\n").unwrap();
        let second = parser.parse("all:\n").unwrap();
        assert_eq!(first.source(), "A = 1\n");
        assert_eq!(second.root_node().child(0).unwrap().kind(), NodeKind::Rule);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn spans_stay_inside_source(source in "[a-z$(){}:=%|;,\t\n #\\\\]{0,60}") {
                let tree = parse(&source).unwrap();
                for node in tree.nodes() {
                    prop_assert!(node.start_byte() <= node.end_byte());
                    prop_assert!(node.end_byte() <= tree.source().len());
                    if let Some(parent) = node.parent() {
                        prop_assert!(parent.start_byte() <= node.start_byte());
                        prop_assert!(node.end_byte() <= parent.end_byte());
                    }
                }
            }

            #[test]
            fn parsing_is_deterministic(source in "[a-zA-Z$():= \t\n]{0,40}") {
                prop_assert_eq!(sexp(&source), sexp(&source));
            }
        }
    }
}
