use std::fmt;
use std::path::Path;

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use atls_syntax::{Node, Range, Span, SyntaxTree};

use crate::finder::shadowed_targets;
use crate::role::{Role, classify};

/// Severity level for findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// The file does not parse or refers to something that does not exist.
    Error,
    /// Legal make that probably does not do what was meant.
    Warning,
}

impl Severity {
    /// Lowercase name, as printed in front of messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

/// A problem found in a syntax tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// How bad it is.
    pub severity: Severity,
    /// Byte span, for terminal rendering.
    pub span: Span,
    /// Row/column range, for editors.
    pub range: Range,
    /// One-line description.
    pub message: String,
    /// Text shown at the span when rendered; the message if absent.
    pub label: Option<String>,
}

impl Finding {
    fn at(severity: Severity, node: Node<'_>, message: impl Into<String>) -> Self {
        Self {
            severity,
            span: node.span(),
            range: node.range(),
            message: message.into(),
            label: None,
        }
    }

    /// An error at `node`.
    pub fn error(node: Node<'_>, message: impl Into<String>) -> Self {
        Self::at(Severity::Error, node, message)
    }

    /// A warning at `node`.
    pub fn warning(node: Node<'_>, message: impl Into<String>) -> Self {
        Self::at(Severity::Warning, node, message)
    }

    /// Attach a label for terminal rendering.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity.as_str(), self.message)
    }
}

fn missing_nodes(tree: &SyntaxTree) -> impl Iterator<Item = Finding> + '_ {
    tree.nodes().filter(|n| n.is_missing()).map(|node| {
        let finding = Finding::error(node, "syntax error: missing token.");
        // hidden grammar tokens start with `_` and mean nothing to a reader
        match node.missing_text().filter(|kind| !kind.starts_with('_')) {
            Some(expected) => finding.with_label(format!("expected `{expected}`")),
            None => finding.with_label("something is missing here"),
        }
    })
}

fn error_nodes(tree: &SyntaxTree) -> impl Iterator<Item = Finding> + '_ {
    tree.nodes()
        .filter(|n| n.is_error())
        .map(|node| Finding::error(node, "syntax error.").with_label("could not parse this"))
}

/// `include` paths that do not name a file. `-include` and `sinclude`
/// tolerate missing files and are skipped, as are paths built from
/// references.
fn unresolved_includes<'t>(
    tree: &'t SyntaxTree,
    directory: &'t Path,
) -> impl Iterator<Item = Finding> + 't {
    tree.nodes()
        .filter(|&node| classify(node).role == Role::PathLiteral)
        .filter(|node| {
            node.parent()
                .and_then(|list| list.parent())
                .and_then(|directive| directive.child(0))
                .is_some_and(|keyword| keyword.text() == "include")
        })
        .filter(move |node| !directory.join(node.text()).is_file())
        .map(|node| {
            Finding::error(node, format!("{}: no such file", node.text()))
                .with_label("not found next to this file")
        })
}

fn repeated_targets(tree: &SyntaxTree) -> impl Iterator<Item = Finding> + '_ {
    shadowed_targets(tree).into_iter().map(|shadowed| {
        let definition = shadowed.definition.start_point();
        Finding::warning(
            shadowed.node,
            format!("{}: is repeated on {definition}", shadowed.node.text()),
        )
        .with_label(format!("overridden by the rule on line {}", definition.row + 1))
    })
}

/// Run every check over `tree`.
///
/// `directory` is where include paths are resolved from; without one (an
/// unsaved buffer) the include check is skipped.
pub fn diagnose(tree: &SyntaxTree, directory: Option<&Path>) -> Vec<Finding> {
    let mut findings: Vec<Finding> = missing_nodes(tree).chain(error_nodes(tree)).collect();
    if let Some(directory) = directory {
        findings.extend(unresolved_includes(tree, directory));
    }
    findings.extend(repeated_targets(tree));
    tracing::debug!(count = findings.len(), "diagnosed");
    findings
}

/// Number of findings of a severity.
pub fn count(findings: &[Finding], severity: Severity) -> usize {
    findings.iter().filter(|f| f.severity == severity).count()
}

/// Whether any finding is an error.
pub fn has_errors(findings: &[Finding]) -> bool {
    findings.iter().any(|f| f.severity == Severity::Error)
}

/// Render findings using ariadne for terminal output.
pub fn render_findings(source: &str, filename: &str, findings: &[Finding], color: bool) -> String {
    let mut output = Vec::new();

    for finding in findings {
        let kind = match finding.severity {
            Severity::Error => ReportKind::Error,
            Severity::Warning => ReportKind::Warning,
        };
        let label_color = match finding.severity {
            Severity::Error => Color::Red,
            Severity::Warning => Color::Yellow,
        };

        let span = finding.span.clone();
        let label_text = finding.label.as_deref().unwrap_or(&finding.message);
        Report::build(kind, (filename, span.clone()))
            .with_config(Config::default().with_color(color))
            .with_message(&finding.message)
            .with_label(
                Label::new((filename, span))
                    .with_message(label_text)
                    .with_color(label_color),
            )
            .finish()
            .write((filename, Source::from(source)), &mut output)
            .ok();
    }

    String::from_utf8(output).unwrap_or_default()
}
