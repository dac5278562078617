use std::sync::Arc;

use atls_analysis::workspace::{self, CompletionKind, Workspace};
use atls_analysis::{Finding, Severity};
use atls_docs::DocumentationTable;
use atls_syntax::Point;
use tokio::sync::RwLock;
use tower_lsp::jsonrpc::{Error, Result};
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use crate::config::{InitializationOptions, ServerConfig};

const SOURCE: &str = "autotools-language-server";

pub struct AtlsLanguageServer {
    client: Client,
    config: ServerConfig,
    state: Arc<RwLock<Workspace>>,
}

impl AtlsLanguageServer {
    pub fn new(client: Client, config: ServerConfig, docs: Arc<DocumentationTable>) -> Self {
        Self {
            client,
            config,
            state: Arc::new(RwLock::new(Workspace::new(docs))),
        }
    }

    async fn publish(&self, uri: Url, findings: Vec<Finding>, version: i32) {
        let diagnostics = findings.iter().map(to_diagnostic).collect();
        self.client
            .publish_diagnostics(uri, diagnostics, Some(version))
            .await;
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for AtlsLanguageServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let options = InitializationOptions::from_value(params.initialization_options)
            .map_err(|e| Error::invalid_params(format!("invalid initialization options: {e}")))?;
        if !options.is_empty() {
            let config = self.config.clone().merge(options);
            let docs = config
                .load()
                .map_err(|e| Error::invalid_params(format!("cannot load documentation: {e}")))?;
            tracing::info!(source = %config.documentation_source, "documentation reloaded");
            self.state.write().await.set_documentation(Arc::new(docs));
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                position_encoding: position_encoding(&params.capabilities),
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(vec!["$".into(), "(".into()]),
                    ..Default::default()
                }),
                definition_provider: Some(OneOf::Left(true)),
                references_provider: Some(OneOf::Left(true)),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: SOURCE.into(),
                version: Some(env!("CARGO_PKG_VERSION").into()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "Autotools language server initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let document = params.text_document;
        let path = document.uri.to_file_path().ok();
        let findings = {
            let mut state = self.state.write().await;
            state.did_open(document.uri.as_str(), path, document.text, document.version)
        };
        self.publish(document.uri, findings, document.version).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;
        if let Some(change) = params.content_changes.into_iter().last() {
            let findings = {
                let mut state = self.state.write().await;
                state.did_change(uri.as_str(), change.text, version)
            };
            self.publish(uri, findings, version).await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.state.write().await.did_close(uri.as_str());
        self.client.publish_diagnostics(uri, Vec::new(), None).await;
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let position = params.text_document_position_params;
        let state = self.state.read().await;
        let hover = state
            .hover(position.text_document.uri.as_str(), to_point(position.position))
            .map(|hover| Hover {
                contents: HoverContents::Markup(MarkupContent {
                    kind: MarkupKind::Markdown,
                    value: hover.contents,
                }),
                range: Some(to_range(hover.range)),
            });
        Ok(hover)
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let position = params.text_document_position;
        let state = self.state.read().await;
        let items = state
            .completion(position.text_document.uri.as_str(), to_point(position.position))
            .into_iter()
            .enumerate()
            .map(|(i, item)| CompletionItem {
                label: item.label,
                kind: Some(to_completion_kind(item.kind)),
                detail: item.detail,
                documentation: item.documentation.map(|value| {
                    Documentation::MarkupContent(MarkupContent {
                        kind: MarkupKind::Markdown,
                        value,
                    })
                }),
                insert_text: Some(item.insert_text),
                sort_text: Some(format!("{i:05}")),
                ..Default::default()
            })
            .collect();
        Ok(Some(CompletionResponse::Array(items)))
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let position = params.text_document_position_params;
        let state = self.state.read().await;
        let locations: Vec<Location> = state
            .definition(position.text_document.uri.as_str(), to_point(position.position))
            .iter()
            .filter_map(to_location)
            .collect();
        if locations.is_empty() {
            return Ok(None);
        }
        Ok(Some(GotoDefinitionResponse::Array(locations)))
    }

    async fn references(&self, params: ReferenceParams) -> Result<Option<Vec<Location>>> {
        let position = params.text_document_position;
        let state = self.state.read().await;
        let locations = state
            .references(
                position.text_document.uri.as_str(),
                to_point(position.position),
                params.context.include_declaration,
            )
            .iter()
            .filter_map(to_location)
            .collect();
        Ok(Some(locations))
    }
}

/// UTF-8 when the client offers it. Columns are always sent as bytes, so
/// other clients see correct positions on ASCII lines only.
fn position_encoding(capabilities: &ClientCapabilities) -> Option<PositionEncodingKind> {
    capabilities
        .general
        .as_ref()
        .and_then(|general| general.position_encodings.as_ref())
        .filter(|encodings| encodings.contains(&PositionEncodingKind::UTF8))
        .map(|_| PositionEncodingKind::UTF8)
}

/// Positions are byte columns on both sides.
fn to_point(position: Position) -> Point {
    Point::new(position.line, position.character)
}

fn to_position(point: Point) -> Position {
    Position::new(point.row, point.column)
}

fn to_range(range: atls_syntax::Range) -> Range {
    Range::new(to_position(range.start), to_position(range.end))
}

fn to_diagnostic(finding: &Finding) -> Diagnostic {
    let severity = match finding.severity {
        Severity::Error => DiagnosticSeverity::ERROR,
        Severity::Warning => DiagnosticSeverity::WARNING,
    };
    Diagnostic {
        range: to_range(finding.range),
        severity: Some(severity),
        source: Some(SOURCE.into()),
        message: finding.message.clone(),
        ..Default::default()
    }
}

fn to_completion_kind(kind: CompletionKind) -> CompletionItemKind {
    match kind {
        CompletionKind::Function => CompletionItemKind::FUNCTION,
        CompletionKind::Variable => CompletionItemKind::VARIABLE,
        CompletionKind::Keyword => CompletionItemKind::KEYWORD,
        CompletionKind::Target => CompletionItemKind::REFERENCE,
        CompletionKind::Macro => CompletionItemKind::FUNCTION,
    }
}

fn to_location(location: &workspace::Location) -> Option<Location> {
    let uri = match &location.target {
        workspace::Target::Document(uri) => Url::parse(uri).ok()?,
        workspace::Target::File(path) => Url::from_file_path(path).ok()?,
    };
    Some(Location::new(uri, to_range(location.range)))
}
