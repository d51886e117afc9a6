//! LSP server dispatcher (spec §6). This crate owns no semantic logic of
//! its own -- every request handler delegates straight to `kcl-analysis`
//! or `kcl-fmt` over a document fetched from `kcl-docstore`. Its only job
//! is wiring those pure functions to `tower-lsp`'s request/notification
//! dispatch and the per-document cache.

pub mod server;

use tower_lsp::{LspService, Server};

use server::KclBackend;

/// Run the server on stdin/stdout until the client disconnects.
pub async fn run_server() {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(KclBackend::new);
    Server::new(stdin, stdout, socket).serve(service).await;
}
