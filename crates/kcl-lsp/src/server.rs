//! `tower_lsp::LanguageServer` implementation. Every handler below is a
//! thin translation layer: fetch the current `Document` from the store,
//! hand it to the matching `kcl-analysis` function, translate the result
//! into the `tower_lsp` response shape.

use std::sync::Mutex;

use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use kcl_docstore::{Document, DocumentStore};

pub struct KclBackend {
    client: Client,
    documents: Mutex<DocumentStore>,
}

fn lsp_diagnostic(doc: &Document, diagnostic: &kcl_common::Diagnostic) -> Diagnostic {
    Diagnostic {
        range: kcl_analysis::lsp_range(doc, diagnostic.range),
        severity: Some(match diagnostic.severity {
            kcl_common::Severity::Error => DiagnosticSeverity::ERROR,
            kcl_common::Severity::Warning => DiagnosticSeverity::WARNING,
        }),
        code: diagnostic.code.map(|c| NumberOrString::String(c.to_string())),
        code_description: None,
        source: Some(diagnostic.source.to_string()),
        message: diagnostic.message.clone(),
        related_information: None,
        tags: None,
        data: None,
    }
}

fn full_document_range(doc: &Document) -> Range {
    let end = doc.line_index.offset_to_position(doc.text.len() as u32);
    Range { start: Position::new(0, 0), end: kcl_analysis::lsp_position(end) }
}

impl KclBackend {
    pub fn new(client: Client) -> Self {
        Self { client, documents: Mutex::new(DocumentStore::new()) }
    }

    async fn publish_diagnostics_for(&self, uri: Url, doc: &Document) {
        let diagnostics =
            kcl_analysis::diagnostics::diagnostics(doc).iter().map(|d| lsp_diagnostic(doc, d)).collect();
        self.client.publish_diagnostics(uri, diagnostics, Some(doc.version)).await;
    }

    fn with_document<T>(&self, uri: &Url, f: impl FnOnce(&Document) -> T) -> Option<T> {
        let docs = self.documents.lock().unwrap();
        docs.get(uri.as_str()).map(|doc| f(doc))
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for KclBackend {
    async fn initialize(&self, _: InitializeParams) -> Result<InitializeResult> {
        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::FULL)),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(vec![".".to_string(), "|".to_string()]),
                    ..Default::default()
                }),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                definition_provider: Some(OneOf::Left(true)),
                document_symbol_provider: Some(OneOf::Left(true)),
                document_formatting_provider: Some(OneOf::Left(true)),
                rename_provider: Some(OneOf::Right(RenameOptions {
                    prepare_provider: Some(true),
                    work_done_progress_options: Default::default(),
                })),
                code_action_provider: Some(CodeActionProviderCapability::Options(CodeActionOptions {
                    code_action_kinds: Some(vec![CodeActionKind::QUICKFIX, CodeActionKind::REFACTOR]),
                    work_done_progress_options: Default::default(),
                    resolve_provider: None,
                })),
                signature_help_provider: Some(SignatureHelpOptions {
                    trigger_characters: Some(vec!["(".to_string(), ",".to_string()]),
                    retrigger_characters: None,
                    work_done_progress_options: Default::default(),
                }),
                semantic_tokens_provider: Some(SemanticTokensServerCapabilities::SemanticTokensOptions(
                    SemanticTokensOptions {
                        work_done_progress_options: Default::default(),
                        legend: SemanticTokensLegend {
                            token_types: kcl_analysis::semantic_tokens::TOKEN_TYPES.to_vec(),
                            token_modifiers: kcl_analysis::semantic_tokens::TOKEN_MODIFIERS.to_vec(),
                        },
                        range: None,
                        full: Some(SemanticTokensFullOptions::Bool(true)),
                    },
                )),
                ..Default::default()
            },
            ..Default::default()
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client.log_message(MessageType::INFO, "kcl language server initialized").await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        let doc = {
            let mut docs = self.documents.lock().unwrap();
            docs.open(uri.as_str(), params.text_document.text, params.text_document.version)
        };
        self.publish_diagnostics_for(uri, &doc).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        // Full sync only: the single content change carries the whole document.
        let Some(change) = params.content_changes.into_iter().next() else { return };
        let doc = {
            let mut docs = self.documents.lock().unwrap();
            docs.update(uri.as_str(), change.text, params.text_document.version)
        };
        self.publish_diagnostics_for(uri, &doc).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        {
            let mut docs = self.documents.lock().unwrap();
            docs.close(uri.as_str());
        }
        self.client.publish_diagnostics(uri, vec![], None).await;
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = params.text_document_position.text_document.uri;
        let items = self.with_document(&uri, kcl_analysis::completion::completions).unwrap_or_default();
        Ok(Some(CompletionResponse::Array(items)))
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        Ok(self.with_document(&uri, |doc| kcl_analysis::hover::hover(doc, position)).flatten())
    }

    async fn goto_definition(&self, params: GotoDefinitionParams) -> Result<Option<GotoDefinitionResponse>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        let location = self
            .with_document(&uri, |doc| kcl_analysis::definition::definition(doc, position, uri.clone()))
            .flatten();
        Ok(location.map(GotoDefinitionResponse::Scalar))
    }

    async fn document_symbol(&self, params: DocumentSymbolParams) -> Result<Option<DocumentSymbolResponse>> {
        let uri = params.text_document.uri;
        let symbols = self.with_document(&uri, kcl_analysis::symbols::document_symbols).unwrap_or_default();
        Ok(Some(DocumentSymbolResponse::Nested(symbols)))
    }

    async fn formatting(&self, params: DocumentFormattingParams) -> Result<Option<Vec<TextEdit>>> {
        let uri = params.text_document.uri;
        let edit = self.with_document(&uri, |doc| {
            doc.outcome.program().map(|program| TextEdit {
                range: full_document_range(doc),
                new_text: kcl_fmt::format_program(program),
            })
        });
        Ok(edit.flatten().map(|e| vec![e]))
    }

    async fn prepare_rename(&self, params: TextDocumentPositionParams) -> Result<Option<PrepareRenameResponse>> {
        let uri = params.text_document.uri;
        let position = params.position;
        Ok(self.with_document(&uri, |doc| kcl_analysis::rename::prepare_rename(doc, position)).flatten())
    }

    async fn rename(&self, params: RenameParams) -> Result<Option<WorkspaceEdit>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;
        let new_name = params.new_name;
        let edit = self
            .with_document(&uri, |doc| kcl_analysis::rename::rename(doc, position, &new_name, uri.clone()))
            .flatten();
        Ok(edit)
    }

    async fn code_action(&self, params: CodeActionParams) -> Result<Option<CodeActionResponse>> {
        let uri = params.text_document.uri;
        let actions = self
            .with_document(&uri, |doc| {
                let diagnostics = kcl_analysis::diagnostics::diagnostics(doc);
                kcl_analysis::code_actions::code_actions(doc, uri.clone(), &diagnostics)
            })
            .unwrap_or_default();
        Ok(Some(actions))
    }

    async fn signature_help(&self, params: SignatureHelpParams) -> Result<Option<SignatureHelp>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        Ok(self
            .with_document(&uri, |doc| kcl_analysis::signature_help::signature_help(doc, position))
            .flatten())
    }

    async fn semantic_tokens_full(
        &self,
        params: SemanticTokensParams,
    ) -> Result<Option<SemanticTokensResult>> {
        let uri = params.text_document.uri;
        let tokens = self.with_document(&uri, kcl_analysis::semantic_tokens::semantic_tokens);
        Ok(tokens.map(SemanticTokensResult::Tokens))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn server_advertises_the_expected_capabilities() {
        let (service, _) = tower_lsp::LspService::new(KclBackend::new);
        let server = service.inner();
        let result = server.initialize(InitializeParams::default()).await.unwrap();

        let caps = result.capabilities;
        assert!(caps.hover_provider.is_some());
        assert!(caps.completion_provider.is_some());
        assert!(caps.definition_provider.is_some());
        assert!(caps.document_symbol_provider.is_some());
        assert!(caps.document_formatting_provider.is_some());
        assert!(caps.rename_provider.is_some());
        assert!(caps.code_action_provider.is_some());
        assert!(caps.signature_help_provider.is_some());
        assert!(caps.semantic_tokens_provider.is_some());
    }

    #[tokio::test]
    async fn did_open_publishes_diagnostics_and_populates_the_store() {
        let (service, _) = tower_lsp::LspService::new(KclBackend::new);
        let backend = service.inner();
        let uri = Url::parse("file:///a.kcl").unwrap();
        backend
            .did_open(DidOpenTextDocumentParams {
                text_document: TextDocumentItem {
                    uri: uri.clone(),
                    language_id: "kcl".to_string(),
                    version: 1,
                    text: "let x = 1\n".to_string(),
                },
            })
            .await;
        let has_doc = backend.with_document(&uri, |_| ());
        assert!(has_doc.is_some());
    }
}
